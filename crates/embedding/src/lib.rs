//! # Docmind Embedding
//!
//! Sentence embeddings for relevance ranking, running a MiniLM-class encoder
//! on ONNX Runtime (CPU execution provider only; the whole system is
//! designed to work on machines without a GPU).
//!
//! The ONNX session and tokenizer are loaded once per process and shared
//! read-only afterwards. A deterministic hash-based stub backend is
//! available for tests and offline runs (`DOCMIND_EMBEDDING_MODE=stub`), so
//! nothing in the test suite needs model files.
//!
//! ## Example
//!
//! ```no_run
//! use docmind_embedding::EmbeddingModel;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let model = EmbeddingModel::new()?;
//!     let vectors = model.embed_batch(vec!["first passage", "second passage"]).await?;
//!     let query = model.embed("what changed in Q3?").await?;
//!     let score = EmbeddingModel::cosine_similarity(&vectors[0], &query);
//!     println!("{score:.3}");
//!     Ok(())
//! }
//! ```

mod error;
mod model;

pub use error::{EmbeddingError, Result};
pub use model::{EmbeddingMode, EmbeddingModel, MODEL_DIMENSION};
