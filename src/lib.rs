//! Summary ROUGE - a benchmarking harness for extractive summarizers.
//!
//! Each document in a dataset directory (`1.txt` ... `N.txt`) holds body
//! sentences, a blank line, and a human-written gold summary. For every
//! document the harness runs the summarizer under test, recovers both the
//! produced and the gold summary from the shared document layout, scores them
//! with ROUGE-1, ROUGE-2 and ROUGE-L, and averages the scores over the corpus.
//!
//! # Quick Start
//!
//! ```no_run
//! use summary_rouge::{
//!     config::Config,
//!     pipeline::Evaluator,
//!     summarizer::ProcessSummarizer,
//! };
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let summarizer = ProcessSummarizer::from_config(&config.summarizer);
//!     let evaluator = Evaluator::new(summarizer, config.eval);
//!
//!     let report = evaluator.run(Path::new("dataset")).await?;
//!     println!("{}", report.average.to_json()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **layout**: Splits a document at its last blank line and flattens the summary
//! - **summarizer**: The summarizer capability and its external-process implementation
//! - **retrieval**: Candidate and reference summary lookup
//! - **rouge**: ROUGE-1/2/L precision, recall and F1
//! - **score**: Score records and corpus averaging
//! - **pipeline**: Per-document scoring, failure policy and reporting

pub mod config;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod retrieval;
pub mod rouge;
pub mod score;
pub mod summarizer;

// Re-export commonly used types
pub use config::{Config, EvalConfig, FailurePolicy, SummarizerConfig};
pub use dataset::{DocumentSet, discover_documents};
pub use error::{ErrorKind, EvalError, Result};
pub use layout::{ExtractedSummary, extract_summary};
pub use pipeline::{DocumentOutcome, EvaluationReport, Evaluator};
pub use retrieval::{get_candidate, get_reference};
pub use score::{MetricScores, ScoreRecord, average};
pub use summarizer::{ProcessSummarizer, Summarizer};
