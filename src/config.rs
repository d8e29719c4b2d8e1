//! Configuration for the evaluation harness.
//!
//! Supports both environment variables and a YAML config file.
//! Environment variables take precedence over config file values, and the
//! CLI applies its own flags on top of the loaded config.

use crate::error::{EvalError, Result};
use crate::layout::DEFAULT_SEPARATOR_WIDTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the external summarizer is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Program to run (e.g., "./lexrank")
    pub program: String,

    /// Arguments placed before the dataset directory and file name
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the summarizer process
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Per-document timeout in seconds; no timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl SummarizerConfig {
    /// The timeout as a `Duration`, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            program: "./lexrank".to_string(),
            args: Vec::new(),
            working_dir: Some(PathBuf::from("..")),
            timeout_secs: None,
        }
    }
}

/// What to do when individual documents fail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum FailurePolicy {
    /// Any failed document aborts the whole run.
    #[default]
    Abort,
    /// Skip failed documents as long as the failed fraction stays within the limit.
    Tolerate { max_failure_fraction: f64 },
}

/// Evaluation loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Spaces placed between flattened summary sentences
    #[serde(default = "default_separator_width")]
    pub separator_width: usize,

    /// Documents evaluated at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Failure handling
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_separator_width() -> usize {
    DEFAULT_SEPARATOR_WIDTH
}

fn default_concurrency() -> usize {
    1
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            separator_width: default_separator_width(),
            concurrency: default_concurrency(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Summarizer settings
    pub summarizer: SummarizerConfig,
    /// Evaluation settings
    pub eval: EvalConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    summarizer: Option<SummarizerFileSection>,
    eval: Option<EvalFileSection>,
}

#[derive(Debug, Deserialize)]
struct SummarizerFileSection {
    program: Option<String>,
    args: Option<Vec<String>>,
    working_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EvalFileSection {
    separator_width: Option<usize>,
    concurrency: Option<usize>,
    failure_policy: Option<FailurePolicy>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (ROUGE_EVAL_SUMMARIZER, ROUGE_EVAL_WORKDIR, ...)
    /// 2. Config file (~/.config/rouge-eval/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env(|key| env::var(key).ok());

        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Unparseable numeric values are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(program) = lookup("ROUGE_EVAL_SUMMARIZER") {
            self.summarizer.program = program;
        }

        if let Some(dir) = lookup("ROUGE_EVAL_WORKDIR") {
            self.summarizer.working_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Some(secs) = lookup("ROUGE_EVAL_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.summarizer.timeout_secs = Some(secs);
            }
        }

        if let Some(jobs) = lookup("ROUGE_EVAL_JOBS") {
            if let Ok(jobs) = jobs.parse() {
                self.eval.concurrency = jobs;
            }
        }

        if let Some(width) = lookup("ROUGE_EVAL_SEPARATOR_WIDTH") {
            if let Ok(width) = width.parse() {
                self.eval.separator_width = width;
            }
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling gaps with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| EvalError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(summarizer) = file_config.summarizer {
            if let Some(program) = summarizer.program {
                config.summarizer.program = program;
            }
            if let Some(args) = summarizer.args {
                config.summarizer.args = args;
            }
            if let Some(working_dir) = summarizer.working_dir {
                config.summarizer.working_dir = Some(working_dir);
            }
            if let Some(timeout_secs) = summarizer.timeout_secs {
                config.summarizer.timeout_secs = Some(timeout_secs);
            }
        }

        if let Some(eval) = file_config.eval {
            if let Some(separator_width) = eval.separator_width {
                config.eval.separator_width = separator_width;
            }
            if let Some(concurrency) = eval.concurrency {
                config.eval.concurrency = concurrency;
            }
            if let Some(failure_policy) = eval.failure_policy {
                config.eval.failure_policy = failure_policy;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rouge-eval")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.summarizer.program.is_empty() {
            return Err(EvalError::Config(
                "Summarizer program is required. Set ROUGE_EVAL_SUMMARIZER or add it to the config file.".to_string(),
            ));
        }

        if self.summarizer.timeout_secs == Some(0) {
            return Err(EvalError::Config(
                "Summarizer timeout must be at least one second.".to_string(),
            ));
        }

        if self.eval.concurrency == 0 {
            return Err(EvalError::Config(
                "Concurrency must be at least 1.".to_string(),
            ));
        }

        if let FailurePolicy::Tolerate {
            max_failure_fraction,
        } = self.eval.failure_policy
        {
            if !(0.0..=1.0).contains(&max_failure_fraction) {
                return Err(EvalError::Config(format!(
                    "Maximum failure fraction must be within [0, 1], got {}",
                    max_failure_fraction
                )));
            }
        }

        Ok(())
    }

    /// Create a config for a specific summarizer program (useful for testing).
    pub fn with_summarizer(program: impl Into<String>) -> Self {
        Self {
            summarizer: SummarizerConfig {
                program: program.into(),
                working_dir: None,
                ..Default::default()
            },
            eval: EvalConfig::default(),
        }
    }
}
