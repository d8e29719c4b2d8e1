//! ROUGE evaluation CLI
//!
//! Runs a summarizer over every document of a dataset directory and prints
//! the corpus-average ROUGE-1, ROUGE-2 and ROUGE-L scores.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use summary_rouge::{
    config::{Config, FailurePolicy},
    pipeline::Evaluator,
    summarizer::ProcessSummarizer,
};
use tracing_subscriber::EnvFilter;

/// Score a summarizer against the gold summaries of a dataset with ROUGE
#[derive(Parser)]
#[command(name = "rouge-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset directory holding 1.txt ... N.txt
    dataset_dir: PathBuf,

    /// Summarizer program to run for each document
    #[arg(long)]
    summarizer: Option<String>,

    /// Extra argument passed to the summarizer before the dataset directory (repeatable)
    #[arg(long = "summarizer-arg", allow_hyphen_values = true)]
    summarizer_args: Vec<String>,

    /// Working directory for the summarizer
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Per-document summarizer timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Number of documents to evaluate at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Spaces placed between flattened summary sentences
    #[arg(long)]
    separator_width: Option<usize>,

    /// Skip failed documents while the failed fraction stays at or below this value
    #[arg(long)]
    max_failure_fraction: Option<f64>,

    /// Pretty-print the aggregate score
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer CLI flags over the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(program) = &self.summarizer {
            config.summarizer.program = program.clone();
        }
        if !self.summarizer_args.is_empty() {
            config.summarizer.args = self.summarizer_args.clone();
        }
        if let Some(dir) = &self.workdir {
            config.summarizer.working_dir = Some(dir.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.summarizer.timeout_secs = Some(secs);
        }
        if let Some(jobs) = self.jobs {
            config.eval.concurrency = jobs;
        }
        if let Some(width) = self.separator_width {
            config.eval.separator_width = width;
        }
        if let Some(fraction) = self.max_failure_fraction {
            config.eval.failure_policy = FailurePolicy::Tolerate {
                max_failure_fraction: fraction,
            };
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the aggregate.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load().context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let summarizer = ProcessSummarizer::from_config(&config.summarizer);
    let evaluator = Evaluator::new(summarizer, config.eval);

    let report = evaluator
        .run(&cli.dataset_dir)
        .await
        .with_context(|| format!("Evaluation of '{}' failed", cli.dataset_dir.display()))?;

    if !report.skipped.is_empty() {
        let ids: Vec<String> = report.skipped.iter().map(|s| s.doc_id.to_string()).collect();
        eprintln!(
            "Skipped {} of {} documents: {}",
            report.skipped.len(),
            report.total_docs,
            ids.join(", ")
        );
    }

    let output = if cli.pretty {
        report.average.to_json_pretty()?
    } else {
        report.average.to_json()?
    };
    println!("{}", output);

    Ok(())
}
