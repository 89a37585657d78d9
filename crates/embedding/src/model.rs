use crate::error::{EmbeddingError, Result};
use ndarray::{Array, Axis, Ix2, Ix3};
use once_cell::sync::OnceCell;
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::session::{builder::GraphOptimizationLevel, Session, SessionInputs};
use ort::value::{DynTensor, Tensor};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tokio::task::spawn_blocking;

/// Output dimension of the bundled sentence encoder (MiniLM family).
pub const MODEL_DIMENSION: usize = 384;

/// Token truncation limit for the encoder.
const MAX_TOKENS: usize = 256;

/// Inference batch size; larger inputs are chunked.
const MAX_BATCH: usize = 32;

const MODEL_FILE: &str = "model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Which embedding backend to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Real ONNX inference on the CPU
    Fast,
    /// Deterministic hash-based vectors for tests and offline runs
    Stub,
}

impl EmbeddingMode {
    /// Parse a mode string (`fast` or `stub`, case-insensitive)
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "stub" => Ok(Self::Stub),
            other => Err(EmbeddingError::UnsupportedMode(other.to_string())),
        }
    }

    fn from_env() -> Result<Self> {
        let raw = env::var("DOCMIND_EMBEDDING_MODE").unwrap_or_else(|_| "fast".to_string());
        Self::parse(&raw)
    }
}

/// Resolve the directory holding `model.onnx` and `tokenizer.json`.
///
/// `DOCMIND_MODEL_DIR` wins when set. Otherwise a `models/` directory is
/// searched for upwards from the executable and then from the current
/// directory, so the tool can run from an arbitrary project checkout.
pub(crate) fn model_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var("DOCMIND_MODEL_DIR") {
        return Ok(PathBuf::from(path));
    }

    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(found) = search_upwards(dir) {
                return Ok(found);
            }
        }
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(found) = search_upwards(&cwd) {
            return Ok(found);
        }
    }

    Err(EmbeddingError::ModelUnavailable(
        "No models directory found. Place model.onnx and tokenizer.json under ./models \
         or set DOCMIND_MODEL_DIR."
            .to_string(),
    ))
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join("models");
        if candidate.join(TOKENIZER_FILE).exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

struct OrtBackend {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

static ORT_BACKEND: OnceCell<Arc<OrtBackend>> = OnceCell::new();

impl OrtBackend {
    fn shared() -> Result<Arc<OrtBackend>> {
        ORT_BACKEND
            .get_or_try_init(|| {
                let dir = model_dir()?;
                Self::load(&dir).map(Arc::new)
            })
            .cloned()
    }

    fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        if !model_path.exists() || !tokenizer_path.exists() {
            return Err(EmbeddingError::ModelUnavailable(format!(
                "Model files missing. Expected ONNX at {} and tokenizer at {}.",
                model_path.display(),
                tokenizer_path.display()
            )));
        }

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbeddingError::ModelUnavailable(format!("Tokenizer load failed: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..PaddingParams::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..TruncationParams::default()
            }))
            .map_err(|e| {
                EmbeddingError::ModelUnavailable(format!("Tokenizer truncation setup failed: {e}"))
            })?;

        let session = Session::builder()
            .map_err(|e| EmbeddingError::ModelUnavailable(format!("{e}")))?
            .with_intra_threads(intra_threads())
            .map_err(|e| EmbeddingError::ModelUnavailable(format!("{e}")))?
            .with_execution_providers(cpu_only_providers())
            .map_err(|e| {
                EmbeddingError::ModelUnavailable(format!(
                    "Failed to register CPU execution provider: {e}"
                ))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EmbeddingError::ModelUnavailable(format!("{e}")))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                EmbeddingError::ModelUnavailable(format!("Failed to load ONNX model: {e}"))
            })?;

        log::info!(
            "Loaded embedding model from {} (dim {}, max tokens {}, batch {})",
            model_dir.display(),
            MODEL_DIMENSION,
            MAX_TOKENS,
            MAX_BATCH
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn embed_batch_blocking(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            let encodings = self
                .tokenizer
                .encode_batch(batch.to_vec(), true)
                .map_err(|e| EmbeddingError::Tokenizer(format!("{e}")))?;
            if encodings.is_empty() {
                continue;
            }

            let seq_len = encodings[0].len();
            if encodings.iter().any(|e| e.len() != seq_len) {
                return Err(EmbeddingError::Tokenizer(
                    "Inconsistent sequence lengths after padding".to_string(),
                ));
            }

            let rows = encodings.len();
            let mut ids = Vec::with_capacity(rows * seq_len);
            let mut masks = Vec::with_capacity(rows * seq_len);
            let mut type_ids = Vec::with_capacity(rows * seq_len);
            let mut mask_rows: Vec<Vec<i64>> = Vec::with_capacity(rows);
            for encoding in &encodings {
                let enc_ids = encoding.get_ids();
                let enc_mask = encoding.get_attention_mask();
                let enc_types = encoding.get_type_ids();
                for idx in 0..seq_len {
                    ids.push(i64::from(*enc_ids.get(idx).unwrap_or(&0)));
                    masks.push(i64::from(*enc_mask.get(idx).unwrap_or(&0)));
                    type_ids.push(i64::from(*enc_types.get(idx).unwrap_or(&0)));
                }
                mask_rows.push(
                    enc_mask
                        .iter()
                        .take(seq_len)
                        .map(|v| i64::from(*v))
                        .collect(),
                );
            }

            let output = self.run_session(rows, seq_len, ids, masks, type_ids)?;
            results.extend(rows_from_output(output, &mask_rows)?);
        }

        Ok(results)
    }

    fn run_session(
        &self,
        rows: usize,
        seq_len: usize,
        ids: Vec<i64>,
        masks: Vec<i64>,
        type_ids: Vec<i64>,
    ) -> Result<ndarray::ArrayD<f32>> {
        let shape_err = |e: ndarray::ShapeError| EmbeddingError::Inference(format!("{e}"));
        let ort_err = |e: ort::Error| EmbeddingError::Inference(format!("{e}"));

        let ids_tensor = Tensor::from_array(
            Array::from_shape_vec((rows, seq_len), ids)
                .map_err(shape_err)?
                .into_dyn(),
        )
        .map_err(ort_err)?
        .upcast();
        let mask_tensor = Tensor::from_array(
            Array::from_shape_vec((rows, seq_len), masks)
                .map_err(shape_err)?
                .into_dyn(),
        )
        .map_err(ort_err)?
        .upcast();
        let type_tensor = Tensor::from_array(
            Array::from_shape_vec((rows, seq_len), type_ids)
                .map_err(shape_err)?
                .into_dyn(),
        )
        .map_err(ort_err)?
        .upcast();

        let mut available: HashMap<&str, DynTensor> = HashMap::new();
        available.insert("input_ids", ids_tensor);
        available.insert("attention_mask", mask_tensor);
        available.insert("token_type_ids", type_tensor);

        let mut session = self
            .session
            .lock()
            .map_err(|_| EmbeddingError::Inference("Failed to lock ONNX session".to_string()))?;

        let mut feed: HashMap<String, DynTensor> = HashMap::new();
        for input in &session.inputs {
            match available.remove(input.name.as_str()) {
                Some(tensor) => {
                    feed.insert(input.name.clone(), tensor);
                }
                None => {
                    return Err(EmbeddingError::Inference(format!(
                        "Model expects unsupported input '{}'",
                        input.name
                    )));
                }
            }
        }

        let outputs = session
            .run(SessionInputs::from(feed))
            .map_err(|e| EmbeddingError::Inference(format!("ONNX forward failed: {e}")))?;
        if outputs.len() == 0 {
            return Err(EmbeddingError::Inference(
                "ONNX returned no outputs".to_string(),
            ));
        }

        let array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| EmbeddingError::Inference(format!("Failed to decode ONNX output: {e}")))?
            .to_owned();
        Ok(array)
    }
}

fn cpu_only_providers() -> Vec<ExecutionProviderDispatch> {
    vec![CPUExecutionProvider::default().build()]
}

fn intra_threads() -> usize {
    // Embedding is the only heavy compute in the pipeline; keep it polite on
    // shared machines rather than saturating every core.
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, 4)
}

/// Convert a model output into one normalized vector per input row.
///
/// Sentence-transformer exports either pool internally (2-D output) or emit
/// raw hidden states (3-D output) that need masked mean pooling here.
fn rows_from_output(array: ndarray::ArrayD<f32>, mask_rows: &[Vec<i64>]) -> Result<Vec<Vec<f32>>> {
    let mut out = Vec::new();
    match array.ndim() {
        2 => {
            let pooled = array
                .into_dimensionality::<Ix2>()
                .map_err(|e| EmbeddingError::Inference(format!("Bad output shape: {e}")))?;
            out.reserve(pooled.len_of(Axis(0)));
            for row in pooled.outer_iter() {
                let mut vector = row.to_vec();
                check_dimension(&vector)?;
                normalize(&mut vector);
                out.push(vector);
            }
        }
        3 => {
            let hidden = array
                .into_dimensionality::<Ix3>()
                .map_err(|e| EmbeddingError::Inference(format!("Bad output shape: {e}")))?;
            out.reserve(hidden.len_of(Axis(0)));
            for (idx, sample) in hidden.outer_iter().enumerate() {
                let mask = mask_rows
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| vec![1; sample.len_of(Axis(0))]);
                let mut vector = mean_pool(sample, &mask);
                check_dimension(&vector)?;
                normalize(&mut vector);
                out.push(vector);
            }
        }
        _ => {
            return Err(EmbeddingError::Inference(format!(
                "Unexpected ONNX output dims: {:?}",
                array.shape()
            )));
        }
    }
    Ok(out)
}

fn check_dimension(vector: &[f32]) -> Result<()> {
    if vector.len() != MODEL_DIMENSION {
        return Err(EmbeddingError::InvalidDimension {
            expected: MODEL_DIMENSION,
            actual: vector.len(),
        });
    }
    Ok(())
}

fn mean_pool(tokens: ndarray::ArrayView2<'_, f32>, mask: &[i64]) -> Vec<f32> {
    let hidden = tokens.len_of(Axis(1));
    let mut pooled = vec![0.0f32; hidden];
    let mut kept = 0.0f32;

    for (row, token) in tokens.outer_iter().enumerate() {
        if mask.get(row).copied().unwrap_or(0) == 0 {
            continue;
        }
        kept += 1.0;
        for (dim, value) in token.iter().enumerate() {
            pooled[dim] += value;
        }
    }

    if kept > 0.0 {
        for value in &mut pooled {
            *value /= kept;
        }
    }
    pooled
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector {
        *value /= norm;
    }
}

#[derive(Clone)]
struct StubBackend {
    dimension: usize,
}

impl StubBackend {
    fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        texts
            .iter()
            .map(|text| stub_embed(text, self.dimension))
            .collect()
    }
}

/// Deterministic pseudo-embedding: the text seeds an xorshift64* stream that
/// fills the vector, so identical inputs always produce identical vectors.
fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut seed: u64 = 0x517c_c1b7_2722_0a95;
    for byte in text.as_bytes() {
        seed = (seed.rotate_left(5) ^ u64::from(*byte)).wrapping_mul(0x2545_f491_4f6c_dd1d);
    }
    seed ^= dimension as u64;
    if seed == 0 {
        seed = 0x9e37_79b9_7f4a_7c15;
    }

    let mut vector = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        seed ^= seed >> 12;
        seed ^= seed << 25;
        seed ^= seed >> 27;
        let bits = seed.wrapping_mul(0x2545_f491_4f6c_dd1d);
        #[allow(clippy::cast_precision_loss)]
        let unit = ((bits >> 40) as f32) / ((1u64 << 24) as f32);
        vector.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vector);
    vector
}

enum Backend {
    Ort(Arc<OrtBackend>),
    Stub(StubBackend),
}

/// Handle to the process-wide embedding model.
///
/// Cheap to construct once the backend is loaded; intended to be created
/// once per run and injected into the ranking pipeline.
pub struct EmbeddingModel {
    backend: Backend,
}

impl EmbeddingModel {
    /// Create a model using the mode from `DOCMIND_EMBEDDING_MODE`
    /// (default: `fast`).
    pub fn new() -> Result<Self> {
        Self::with_mode(EmbeddingMode::from_env()?)
    }

    /// Create a model with an explicit backend mode.
    pub fn with_mode(mode: EmbeddingMode) -> Result<Self> {
        let backend = match mode {
            EmbeddingMode::Fast => Backend::Ort(OrtBackend::shared()?),
            EmbeddingMode::Stub => Backend::Stub(StubBackend {
                dimension: MODEL_DIMENSION,
            }),
        };
        Ok(Self { backend })
    }

    /// Stub model with a reduced dimension, for tests that do vector math.
    #[must_use]
    pub fn stub_with_dimension(dimension: usize) -> Self {
        Self {
            backend: Backend::Stub(StubBackend { dimension }),
        }
    }

    /// Embedding dimension of the active backend
    #[must_use]
    pub const fn dimension(&self) -> usize {
        match &self.backend {
            Backend::Ort(_) => MODEL_DIMENSION,
            Backend::Stub(stub) => stub.dimension,
        }
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(vec![text]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Other("Empty embedding result".to_string()))
    }

    /// Embed a batch of texts in one pass.
    ///
    /// Inference runs on the blocking pool; inputs longer than the model
    /// batch size are chunked internally.
    pub async fn embed_batch(&self, texts: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let owned: Vec<String> = texts.into_iter().map(ToString::to_string).collect();
        match &self.backend {
            Backend::Stub(stub) => Ok(stub.embed_batch(&owned)),
            Backend::Ort(backend) => {
                let backend = backend.clone();
                spawn_blocking(move || backend.embed_batch_blocking(&owned))
                    .await
                    .map_err(|e| EmbeddingError::Inference(format!("Join error: {e}")))?
            }
        }
    }

    /// Cosine similarity in [-1, 1]; zero-norm or mismatched vectors score 0.0.
    #[must_use]
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}
