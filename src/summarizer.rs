//! The summarization tool under evaluation.
//!
//! The evaluator only needs one capability from a summarizer: given a dataset
//! directory and a document id, return text in the document layout whose
//! trailing section is the produced summary. [`ProcessSummarizer`] provides it
//! by running an external program; tests substitute their own implementations.

use crate::config::SummarizerConfig;
use crate::dataset::document_file_name;
use crate::error::{EvalError, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Produces candidate summaries.
#[allow(async_fn_in_trait)]
pub trait Summarizer {
    /// Return the raw output for document `doc_id` of `dataset_dir`.
    async fn produce_candidate(&self, dataset_dir: &Path, doc_id: usize) -> Result<String>;
}

/// Runs `program [args...] <dataset_dir> <doc_id>.txt` and captures stdout.
#[derive(Debug, Clone)]
pub struct ProcessSummarizer {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessSummarizer {
    /// Create a summarizer for `program` with no extra arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Create from summarizer config.
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            working_dir: config.working_dir.clone(),
            timeout: config.timeout(),
        }
    }

    /// Add arguments placed before the dataset directory.
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the program from `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill the program and fail if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn command(&self, dataset_dir: &Path, doc_id: usize) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(dataset_dir)
            .arg(document_file_name(doc_id))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Summarizer for ProcessSummarizer {
    async fn produce_candidate(&self, dataset_dir: &Path, doc_id: usize) -> Result<String> {
        // A relative dataset path would otherwise resolve against the child's
        // working directory instead of ours.
        let dataset_dir = if self.working_dir.is_some() && dataset_dir.is_relative() {
            let absolute =
                std::path::absolute(dataset_dir).map_err(|e| EvalError::io(dataset_dir, e))?;
            Cow::Owned(absolute)
        } else {
            Cow::Borrowed(dataset_dir)
        };
        let dataset_dir = dataset_dir.as_ref();

        debug!(
            "Running {} on {}",
            self.program,
            dataset_dir.join(document_file_name(doc_id)).display()
        );

        let child = self
            .command(dataset_dir, doc_id)
            .spawn()
            .map_err(|source| EvalError::ProcessSpawn {
                program: self.program.clone(),
                source,
            })?;

        // Dropping the pending future on timeout kills the child.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| EvalError::ProcessTimeout {
                    doc_id,
                    secs: limit.as_secs_f64(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| EvalError::ProcessIo { doc_id, source })?;

        if !output.status.success() {
            return Err(EvalError::ProcessFailed {
                doc_id,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
