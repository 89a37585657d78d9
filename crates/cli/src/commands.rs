use crate::print_stdout;
use anyhow::{bail, Context, Result};
use clap::Args;
use docmind_embedding::EmbeddingModel;
use docmind_extract::{Fragment, FragmentExtractor};
use docmind_protocol::{
    AnalysisReport, ProcessingRequest, RunMetadata, SectionEntry, SubsectionEntry, SummaryReport,
    EMPTY_SUMMARY_TEXT,
};
use docmind_relevance::{Intent, IntentPipeline, RankedAnalysis, SummaryOutcome};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Section count used by the JSON processing mode.
const DEFAULT_TOP_K: usize = 5;

#[derive(Args)]
pub(crate) struct AnalyzeArgs {
    /// Directory containing the documents to analyze
    #[arg(long)]
    pub(crate) input_dir: PathBuf,

    /// Target persona, e.g. "Investment Analyst"
    #[arg(long)]
    pub(crate) persona: String,

    /// Job to be done, e.g. "Analyze revenue trends and R&D investments"
    #[arg(long)]
    pub(crate) job: String,

    /// Number of sections to select
    #[arg(long, default_value_t = 5)]
    pub(crate) top_k: usize,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct SummarizeArgs {
    /// Directory containing the documents to summarize
    #[arg(long)]
    pub(crate) input_dir: PathBuf,

    /// Target persona
    #[arg(long)]
    pub(crate) persona: String,

    /// Job to be done
    #[arg(long)]
    pub(crate) job: String,

    /// Maximum words in the summary
    #[arg(long, default_value_t = 500)]
    pub(crate) max_words: usize,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct ProcessArgs {
    /// Input JSON request file
    #[arg(long, short = 'i')]
    pub(crate) input: PathBuf,

    /// Output JSON report file
    #[arg(long, short = 'o')]
    pub(crate) output: PathBuf,

    /// Base directory containing the referenced documents
    #[arg(long, short = 'd', default_value = "./input")]
    pub(crate) base_dir: PathBuf,
}

pub(crate) async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let started = Instant::now();
    let fragments = FragmentExtractor::default().extract_dir(&args.input_dir)?;
    let intent = Intent::new(&args.persona, &args.job);

    let report = if fragments.is_empty() {
        AnalysisReport::empty(&args.persona, &args.job)
    } else {
        let input_documents = distinct_sources(&fragments);
        let pipeline = IntentPipeline::new(EmbeddingModel::new()?);
        let analysis = pipeline
            .rank_and_refine(fragments, &intent, args.top_k)
            .await?;
        analysis_report(&intent, input_documents, &analysis, started)
    };

    emit(&report, args.output.as_deref())
}

pub(crate) async fn summarize(args: SummarizeArgs) -> Result<()> {
    let started = Instant::now();
    let fragments = FragmentExtractor::default().extract_dir(&args.input_dir)?;
    let intent = Intent::new(&args.persona, &args.job);

    let report = if fragments.is_empty() {
        SummaryReport::empty(&args.persona, &args.job)
    } else {
        let input_documents = distinct_sources(&fragments);
        let pipeline = IntentPipeline::new(EmbeddingModel::new()?);
        let outcome = pipeline
            .assemble_summary(fragments, &intent, args.max_words)
            .await?;
        summary_report(&intent, input_documents, &outcome, started)
    };

    emit(&report, args.output.as_deref())
}

pub(crate) async fn process(args: ProcessArgs) -> Result<()> {
    let started = Instant::now();
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read request {}", args.input.display()))?;
    let request: ProcessingRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid request JSON in {}", args.input.display()))?;
    request.validate()?;

    let requested: HashSet<&str> = request.filenames().into_iter().collect();
    let fragments: Vec<Fragment> = FragmentExtractor::default()
        .extract_dir(&args.base_dir)?
        .into_iter()
        .filter(|f| requested.contains(f.source_id.as_str()))
        .collect();
    if fragments.is_empty() {
        bail!(
            "No content extracted from the requested documents in {}",
            args.base_dir.display()
        );
    }

    let intent = Intent::new(&request.persona.role, &request.job_to_be_done.task);
    log::info!(
        "Processing {} documents for persona '{}'",
        request.documents.len(),
        request.persona.role
    );

    let input_documents = distinct_sources(&fragments);
    let pipeline = IntentPipeline::new(EmbeddingModel::new()?);
    let analysis = pipeline
        .rank_and_refine(fragments, &intent, DEFAULT_TOP_K)
        .await?;
    let report = analysis_report(&intent, input_documents, &analysis, started);

    emit(&report, Some(args.output.as_path()))
}

fn analysis_report(
    intent: &Intent,
    input_documents: Vec<String>,
    analysis: &RankedAnalysis,
    started: Instant,
) -> AnalysisReport {
    let extracted_sections = analysis
        .sections
        .iter()
        .map(|s| SectionEntry {
            document: s.document.clone(),
            section_title: s.refined.section_title.clone(),
            importance_rank: s.importance_rank,
            page_number: s.page_number,
        })
        .collect();
    let subsection_analysis = analysis
        .sections
        .iter()
        .map(|s| SubsectionEntry {
            document: s.document.clone(),
            refined_text: s.refined.refined_text.clone(),
            page_number: s.page_number,
        })
        .collect();

    AnalysisReport {
        metadata: RunMetadata::new(
            input_documents,
            &intent.persona,
            &intent.task,
            elapsed_seconds(started),
            analysis.total_fragments,
        ),
        extracted_sections,
        subsection_analysis,
    }
}

fn summary_report(
    intent: &Intent,
    input_documents: Vec<String>,
    outcome: &SummaryOutcome,
    started: Instant,
) -> SummaryReport {
    let cohesive_summary = if outcome.is_empty() {
        EMPTY_SUMMARY_TEXT.to_string()
    } else {
        outcome.text.clone()
    };

    SummaryReport {
        metadata: RunMetadata::new(
            input_documents,
            &intent.persona,
            &intent.task,
            elapsed_seconds(started),
            outcome.total_fragments,
        ),
        summary_word_count: outcome.word_count,
        cohesive_summary,
    }
}

/// Distinct source documents in extraction order.
fn distinct_sources(fragments: &[Fragment]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for fragment in fragments {
        if seen.insert(fragment.source_id.as_str()) {
            sources.push(fragment.source_id.clone());
        }
    }
    sources
}

fn elapsed_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}

fn emit<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(report)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            log::info!("Report saved to {}", path.display());
            Ok(())
        }
        None => print_stdout(&rendered),
    }
}
