use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use commands::{AnalyzeArgs, ProcessArgs, SummarizeArgs};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "docmind")]
#[command(about = "Persona-driven document intelligence", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Model directory (overrides DOCMIND_MODEL_DIR)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the most relevant document sections for a persona and job
    Analyze(AnalyzeArgs),

    /// Build a cohesive summary under a word budget
    Summarize(SummarizeArgs),

    /// Run a structured JSON processing request
    Process(ProcessArgs),
}

#[derive(Copy, Clone, ValueEnum)]
enum EmbedMode {
    Fast,
    Stub,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            EmbedMode::Fast => "fast",
            EmbedMode::Stub => "stub",
        }
    }
}

/// Parse arguments and run the selected command.
pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Some(mode) = cli.embed_mode {
        env::set_var("DOCMIND_EMBEDDING_MODE", mode.as_str());
    }
    if let Some(dir) = &cli.model_dir {
        env::set_var("DOCMIND_MODEL_DIR", dir);
    }

    match cli.command {
        Commands::Analyze(args) => commands::analyze(args).await,
        Commands::Summarize(args) => commands::summarize(args).await,
        Commands::Process(args) => commands::process(args).await,
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .try_init();
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
