//! Per-document scoring and corpus evaluation.

use crate::config::{EvalConfig, FailurePolicy};
use crate::dataset::discover_documents;
use crate::error::{EvalError, Result};
use crate::retrieval::{get_candidate, get_reference};
use crate::rouge;
use crate::score::{ScoreRecord, average};
use crate::summarizer::Summarizer;
use futures::{StreamExt, TryStreamExt, stream};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The result of evaluating one document.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// 1-based document id.
    pub doc_id: usize,
    /// Scores, or why the document could not be scored.
    pub result: Result<ScoreRecord>,
}

/// A document left out of the aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub doc_id: usize,
    pub error: String,
}

/// Outcome of a full dataset evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Documents attempted.
    pub total_docs: usize,
    /// Per-document scores in document-id order.
    pub scores: Vec<(usize, ScoreRecord)>,
    /// Documents skipped under a tolerant failure policy.
    pub skipped: Vec<SkippedDocument>,
    /// Mean of all successful document scores.
    pub average: ScoreRecord,
    /// Wall-clock time of the run (seconds).
    pub total_time_secs: f64,
}

impl EvaluationReport {
    /// Apply a failure policy to per-document outcomes and aggregate.
    ///
    /// Under [`FailurePolicy::Abort`] the first failed document (by id) is
    /// returned as the error. Under [`FailurePolicy::Tolerate`] failed
    /// documents are skipped unless their share of the total exceeds the
    /// allowed fraction.
    pub fn from_outcomes(outcomes: Vec<DocumentOutcome>, policy: FailurePolicy) -> Result<Self> {
        let total_docs = outcomes.len();
        let mut scores = Vec::with_capacity(total_docs);
        let mut skipped = Vec::new();

        for outcome in outcomes {
            match (outcome.result, policy) {
                (Ok(record), _) => scores.push((outcome.doc_id, record)),
                (Err(e), FailurePolicy::Abort) => return Err(e),
                (Err(e), FailurePolicy::Tolerate { .. }) => {
                    warn!("Skipping document {}: {}", outcome.doc_id, e);
                    skipped.push(SkippedDocument {
                        doc_id: outcome.doc_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if let FailurePolicy::Tolerate {
            max_failure_fraction,
        } = policy
        {
            if total_docs > 0 && skipped.len() as f64 / total_docs as f64 > max_failure_fraction {
                return Err(EvalError::TooManyFailures {
                    failed: skipped.len(),
                    total: total_docs,
                    max_fraction: max_failure_fraction,
                });
            }
        }

        let records: Vec<ScoreRecord> = scores.iter().map(|(_, record)| *record).collect();
        let average = average(&records)?;

        Ok(Self {
            total_docs,
            scores,
            skipped,
            average,
            total_time_secs: 0.0,
        })
    }
}

/// Scores a summarizer against the gold summaries of a dataset.
pub struct Evaluator<S> {
    summarizer: S,
    config: EvalConfig,
}

impl<S: Summarizer> Evaluator<S> {
    /// Create a new evaluator.
    pub fn new(summarizer: S, config: EvalConfig) -> Self {
        Self { summarizer, config }
    }

    /// Score one document: produced summary against gold summary.
    pub async fn score_document(&self, dataset_dir: &Path, doc_id: usize) -> Result<ScoreRecord> {
        let width = self.config.separator_width;
        let candidate = get_candidate(&self.summarizer, dataset_dir, doc_id, width).await?;
        let reference = get_reference(dataset_dir, doc_id, width).await?;

        let record = rouge::score(&candidate, &reference)?;
        debug!(
            "Document {}: rouge-1 f={:.4} rouge-2 f={:.4} rouge-l f={:.4}",
            doc_id, record.rouge_1.f, record.rouge_2.f, record.rouge_l.f
        );
        Ok(record)
    }

    /// Score documents `1..=num_docs`, stopping at the first failure.
    ///
    /// Records come back in document-id order.
    pub async fn score_dataset(
        &self,
        dataset_dir: &Path,
        num_docs: usize,
    ) -> Result<Vec<ScoreRecord>> {
        stream::iter(1..=num_docs)
            .map(|doc_id| self.score_document(dataset_dir, doc_id))
            .buffered(self.config.concurrency.max(1))
            .try_collect()
            .await
    }

    /// Evaluate documents `1..=num_docs`, keeping every outcome.
    ///
    /// Outcomes come back in document-id order whatever order they finish in.
    pub async fn evaluate_documents(
        &self,
        dataset_dir: &Path,
        num_docs: usize,
    ) -> Vec<DocumentOutcome> {
        stream::iter(1..=num_docs)
            .map(|doc_id| async move {
                DocumentOutcome {
                    doc_id,
                    result: self.score_document(dataset_dir, doc_id).await,
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Discover the documents in `dataset_dir`, score them, and aggregate.
    pub async fn run(&self, dataset_dir: &Path) -> Result<EvaluationReport> {
        let start = Instant::now();
        let documents = discover_documents(dataset_dir)?;
        info!(
            "Evaluating {} documents in {} ({} at a time)",
            documents.num_docs,
            documents.dir.display(),
            self.config.concurrency
        );

        let mut report = match self.config.failure_policy {
            FailurePolicy::Abort => {
                let records = self.score_dataset(&documents.dir, documents.num_docs).await?;
                let average = average(&records)?;
                EvaluationReport {
                    total_docs: documents.num_docs,
                    scores: documents.doc_ids().zip(records).collect(),
                    skipped: Vec::new(),
                    average,
                    total_time_secs: 0.0,
                }
            }
            policy @ FailurePolicy::Tolerate { .. } => {
                let outcomes = self
                    .evaluate_documents(&documents.dir, documents.num_docs)
                    .await;
                EvaluationReport::from_outcomes(outcomes, policy)?
            }
        };

        report.total_time_secs = start.elapsed().as_secs_f64();
        info!(
            "Scored {} of {} documents in {:.1}s",
            report.scores.len(),
            report.total_docs,
            report.total_time_secs
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::document_path;
    use crate::error::ErrorKind;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Returns canned output per document, optionally after a delay.
    #[derive(Default)]
    struct MockSummarizer {
        outputs: HashMap<usize, String>,
        delays: HashMap<usize, Duration>,
        finished: Mutex<Vec<usize>>,
    }

    impl MockSummarizer {
        fn with_summary(mut self, doc_id: usize, summary: &str) -> Self {
            self.outputs.insert(doc_id, format!("0.5\n0.5\n\n{}\n", summary));
            self
        }

        fn with_delay(mut self, doc_id: usize, delay: Duration) -> Self {
            self.delays.insert(doc_id, delay);
            self
        }
    }

    impl Summarizer for MockSummarizer {
        async fn produce_candidate(&self, _dataset_dir: &Path, doc_id: usize) -> Result<String> {
            if let Some(delay) = self.delays.get(&doc_id) {
                tokio::time::sleep(*delay).await;
            }
            self.finished.lock().unwrap().push(doc_id);
            self.outputs
                .get(&doc_id)
                .cloned()
                .ok_or(EvalError::ProcessFailed {
                    doc_id,
                    code: Some(1),
                    stderr: "no output".to_string(),
                })
        }
    }

    fn write_dataset(summaries: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (i, summary) in summaries.iter().enumerate() {
            let text = format!("A body sentence.\nAnother body sentence.\n\n{}", summary);
            fs::write(document_path(dir.path(), i + 1), text).unwrap();
        }
        dir
    }

    fn config(concurrency: usize, failure_policy: FailurePolicy) -> EvalConfig {
        EvalConfig {
            concurrency,
            failure_policy,
            ..EvalConfig::default()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_two_documents() {
        let dir = write_dataset(&["The cat sat.", "Dogs bark loudly."]);
        let summarizer = MockSummarizer::default()
            .with_summary(1, "The cat sat on the mat.")
            .with_summary(2, "Dogs bark loudly.");
        let evaluator = Evaluator::new(summarizer, EvalConfig::default());

        let records = evaluator.score_dataset(dir.path(), 2).await.unwrap();
        assert_eq!(records.len(), 2);

        let doc1 = records[0].rouge_1.f;
        let doc2 = records[1].rouge_1.f;
        assert!((doc2 - 1.0).abs() < 1e-9);
        assert!(doc1 > 0.0 && doc1 < 1.0);

        let avg = average(&records).unwrap();
        assert!((avg.rouge_1.f - (doc1 + doc2) / 2.0).abs() < 1e-9);

        let report = evaluator.run(dir.path()).await.unwrap();
        assert_eq!(report.total_docs, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.average, avg);
        assert_eq!(report.scores[0], (1, records[0]));
    }

    #[tokio::test]
    async fn test_concurrent_results_keep_document_order() {
        let dir = write_dataset(&["alpha beta.", "gamma delta.", "epsilon zeta."]);
        let summarizer = MockSummarizer::default()
            .with_summary(1, "alpha")
            .with_summary(2, "gamma delta")
            .with_summary(3, "omega")
            .with_delay(1, Duration::from_millis(120))
            .with_delay(2, Duration::from_millis(60));
        let evaluator = Evaluator::new(summarizer, config(3, FailurePolicy::Abort));

        let records = evaluator.score_dataset(dir.path(), 3).await.unwrap();

        // Document 3 finishes first, yet the records stay in id order.
        assert_eq!(
            *evaluator.summarizer.finished.lock().unwrap(),
            vec![3, 2, 1]
        );
        assert!((records[0].rouge_1.r - 0.5).abs() < 1e-9);
        assert!((records[1].rouge_1.f - 1.0).abs() < 1e-9);
        assert_eq!(records[2].rouge_1.f, 0.0);

        let outcomes = evaluator.evaluate_documents(dir.path(), 3).await;
        let ids: Vec<usize> = outcomes.iter().map(|o| o.doc_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relative_dataset_dir_reaches_summarizer_and_reference() {
        use crate::summarizer::ProcessSummarizer;

        let dataset = tempfile::Builder::new()
            .prefix("rouge-eval-dataset")
            .tempdir_in(".")
            .unwrap();
        fs::write(
            document_path(dataset.path(), 1),
            "A body sentence.\n\nThe gold summary.",
        )
        .unwrap();
        let relative = Path::new(dataset.path().file_name().unwrap());

        let elsewhere = TempDir::new().unwrap();
        let summarizer = ProcessSummarizer::new("sh")
            .with_args(["-c", r#"cat "$0/$1""#])
            .with_working_dir(elsewhere.path());
        let evaluator = Evaluator::new(summarizer, EvalConfig::default());

        let records = evaluator.score_dataset(relative, 1).await.unwrap();
        assert_eq!(records[0].rouge_1.f, 1.0);
    }

    #[tokio::test]
    async fn test_missing_reference_aborts() {
        let dir = write_dataset(&["Gold."]);
        let summarizer = MockSummarizer::default()
            .with_summary(1, "Gold.")
            .with_summary(2, "Gold.");
        let evaluator = Evaluator::new(summarizer, EvalConfig::default());

        let err = evaluator.score_dataset(dir.path(), 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[tokio::test]
    async fn test_summarizer_failure_aborts_by_default() {
        let dir = write_dataset(&["One.", "Two.", "Three."]);
        let summarizer = MockSummarizer::default()
            .with_summary(1, "One.")
            .with_summary(3, "Three.");
        let evaluator = Evaluator::new(summarizer, EvalConfig::default());

        let err = evaluator.run(dir.path()).await.unwrap_err();
        assert!(matches!(err, EvalError::ProcessFailed { doc_id: 2, .. }));
        // Sequential abort never reaches document 3.
        assert_eq!(*evaluator.summarizer.finished.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_tolerant_policy_skips_failures() {
        let dir = write_dataset(&["One.", "Two.", "Three."]);
        let summarizer = MockSummarizer::default()
            .with_summary(1, "One.")
            .with_summary(3, "Three.");
        let policy = FailurePolicy::Tolerate {
            max_failure_fraction: 0.5,
        };
        let evaluator = Evaluator::new(summarizer, config(1, policy));

        let report = evaluator.run(dir.path()).await.unwrap();
        assert_eq!(report.total_docs, 3);
        assert_eq!(report.scores.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].doc_id, 2);
        assert!((report.average.rouge_1.f - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_tolerant_policy_enforces_limit() {
        let dir = write_dataset(&["One.", "Two.", "Three."]);
        let summarizer = MockSummarizer::default().with_summary(1, "One.");
        let policy = FailurePolicy::Tolerate {
            max_failure_fraction: 0.5,
        };
        let evaluator = Evaluator::new(summarizer, config(2, policy));

        let err = evaluator.run(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            EvalError::TooManyFailures {
                failed: 2,
                total: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_from_outcomes_abort_returns_first_failure() {
        let outcomes = vec![
            DocumentOutcome {
                doc_id: 1,
                result: Ok(ScoreRecord::default()),
            },
            DocumentOutcome {
                doc_id: 2,
                result: Err(EvalError::EmptyText("candidate")),
            },
            DocumentOutcome {
                doc_id: 3,
                result: Err(EvalError::DocumentNotFound("3.txt".into())),
            },
        ];

        let err = EvaluationReport::from_outcomes(outcomes, FailurePolicy::Abort).unwrap_err();
        assert!(matches!(err, EvalError::EmptyText(_)));
    }

    #[test]
    fn test_from_outcomes_all_failed_is_invalid_input() {
        let outcomes = vec![DocumentOutcome {
            doc_id: 1,
            result: Err(EvalError::EmptyText("reference")),
        }];
        let policy = FailurePolicy::Tolerate {
            max_failure_fraction: 1.0,
        };

        let err = EvaluationReport::from_outcomes(outcomes, policy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
