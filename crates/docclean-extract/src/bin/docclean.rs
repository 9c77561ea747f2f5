//! CLI for extracting LLM-safe text from a document
//!
//! Usage:
//!   docclean report.pdf
//!   docclean --json --config docclean.toml page.html
//!   docclean --check upload.docx

use anyhow::{Context, Result};
use clap::Parser;
use docclean_extract::{DocumentPipeline, ExtractorConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "docclean",
    version,
    about = "Extract text from PDF, DOCX, HTML or PNG files and sanitize it for LLM use"
)]
struct Args {
    /// Document to process
    path: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Only report whether the extracted text contains injection patterns;
    /// exits 1 when it does
    #[arg(long)]
    check: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version are not failures; everything else is
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when a check found injection patterns
async fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => ExtractorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };
    let pipeline = Arc::new(DocumentPipeline::new(config)?);

    if args.check {
        let path = args.path.clone();
        let check = tokio::task::spawn_blocking(move || pipeline.check_path(path)).await??;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&check)?);
        }
        if check.safe {
            info!(source = %check.source, format = %check.format, "no injection patterns found");
        } else {
            for found in &check.detection.patterns {
                warn!(rule = %found.rule, position = found.position, matched = %found.matched, "injection pattern");
            }
        }
        return Ok(check.safe);
    }

    let result = pipeline.process_path_async(&args.path).await?;
    info!(
        source = %result.source,
        format = %result.format,
        original_bytes = result.original_length,
        text_bytes = result.text_length,
        injection_detected = result.injection_detected(),
        text = %result.text,
        "extracted"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
    }
    Ok(true)
}
