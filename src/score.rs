//! Score records and corpus-level aggregation.

use crate::error::{EvalError, Result};
use serde::Serialize;
use std::fmt;

/// A ROUGE variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    #[serde(rename = "rouge-1")]
    Rouge1,
    #[serde(rename = "rouge-2")]
    Rouge2,
    #[serde(rename = "rouge-l")]
    RougeL,
}

impl Variant {
    /// All variants in reporting order.
    pub const ALL: [Variant; 3] = [Variant::Rouge1, Variant::Rouge2, Variant::RougeL];

    /// The variant's key in a score mapping.
    pub fn name(self) -> &'static str {
        match self {
            Variant::Rouge1 => "rouge-1",
            Variant::Rouge2 => "rouge-2",
            Variant::RougeL => "rouge-l",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A metric reported for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// F1 score.
    F,
    /// Precision.
    P,
    /// Recall.
    R,
}

impl Metric {
    /// All metrics in reporting order.
    pub const ALL: [Metric; 3] = [Metric::F, Metric::P, Metric::R];
}

/// Precision, recall and F1 for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricScores {
    pub f: f64,
    pub p: f64,
    pub r: f64,
}

impl MetricScores {
    /// Create from precision and recall, deriving F1.
    pub fn from_precision_recall(p: f64, r: f64) -> Self {
        let f = if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        };
        Self { f, p, r }
    }

    /// Value of a single metric.
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::F => self.f,
            Metric::P => self.p,
            Metric::R => self.r,
        }
    }

    fn get_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::F => &mut self.f,
            Metric::P => &mut self.p,
            Metric::R => &mut self.r,
        }
    }
}

/// ROUGE-1, ROUGE-2 and ROUGE-L scores for one document (or a corpus mean).
///
/// Serializes as `{"rouge-1": {"f": .., "p": .., "r": ..}, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreRecord {
    #[serde(rename = "rouge-1")]
    pub rouge_1: MetricScores,
    #[serde(rename = "rouge-2")]
    pub rouge_2: MetricScores,
    #[serde(rename = "rouge-l")]
    pub rouge_l: MetricScores,
}

impl ScoreRecord {
    /// Scores for one variant.
    pub fn variant(&self, variant: Variant) -> &MetricScores {
        match variant {
            Variant::Rouge1 => &self.rouge_1,
            Variant::Rouge2 => &self.rouge_2,
            Variant::RougeL => &self.rouge_l,
        }
    }

    fn variant_mut(&mut self, variant: Variant) -> &mut MetricScores {
        match variant {
            Variant::Rouge1 => &mut self.rouge_1,
            Variant::Rouge2 => &mut self.rouge_2,
            Variant::RougeL => &mut self.rouge_l,
        }
    }

    /// Value of one (variant, metric) cell.
    pub fn get(&self, variant: Variant, metric: Metric) -> f64 {
        self.variant(variant).get(metric)
    }

    /// Serialize as a compact JSON mapping.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize as an indented JSON mapping.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Mean of every (variant, metric) cell across `records`.
///
/// The input is left untouched; the mean is built in a fresh record.
/// An empty slice is an error rather than a zero-filled record.
pub fn average(records: &[ScoreRecord]) -> Result<ScoreRecord> {
    if records.is_empty() {
        return Err(EvalError::InvalidInput(
            "cannot average an empty set of score records".to_string(),
        ));
    }

    let mut total = records.iter().fold(ScoreRecord::default(), |mut acc, record| {
        for variant in Variant::ALL {
            for metric in Metric::ALL {
                *acc.variant_mut(variant).get_mut(metric) += record.get(variant, metric);
            }
        }
        acc
    });

    let count = records.len() as f64;
    for variant in Variant::ALL {
        for metric in Metric::ALL {
            *total.variant_mut(variant).get_mut(metric) /= count;
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn record(seed: f64) -> ScoreRecord {
        ScoreRecord {
            rouge_1: MetricScores {
                f: seed,
                p: seed / 2.0,
                r: seed / 4.0,
            },
            rouge_2: MetricScores {
                f: seed * 0.1,
                p: seed * 0.2,
                r: seed * 0.3,
            },
            rouge_l: MetricScores {
                f: 1.0 - seed,
                p: 0.5,
                r: seed * seed,
            },
        }
    }

    #[test]
    fn test_average_matches_cellwise_mean() {
        let records = vec![record(0.9), record(0.3), record(0.6), record(0.0)];
        let avg = average(&records).unwrap();

        for variant in Variant::ALL {
            for metric in Metric::ALL {
                let expected = records.iter().map(|r| r.get(variant, metric)).sum::<f64>()
                    / records.len() as f64;
                assert!(
                    (avg.get(variant, metric) - expected).abs() < 1e-9,
                    "{variant} {metric:?}"
                );
            }
        }
        assert!((avg.rouge_1.f - 0.45).abs() < 1e-9);
        assert!((avg.rouge_l.p - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_average_does_not_mutate_input() {
        let records = vec![record(0.8), record(0.2)];
        let before = records.clone();

        let avg = average(&records).unwrap();

        assert_eq!(records, before);
        assert_ne!(avg, records[0]);
    }

    #[test]
    fn test_average_single_record_is_identity() {
        let r = record(0.7);
        assert_eq!(average(&[r]).unwrap(), r);
    }

    #[test]
    fn test_average_empty_is_invalid_input() {
        let err = average(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_f1_from_precision_recall() {
        let scores = MetricScores::from_precision_recall(0.5, 1.0);
        assert!((scores.f - 2.0 / 3.0).abs() < 1e-12);

        let zero = MetricScores::from_precision_recall(0.0, 0.0);
        assert_eq!(zero, MetricScores::default());
    }

    #[test]
    fn test_json_uses_rouge_keys() {
        let json = record(0.5).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        for variant in Variant::ALL {
            let cell = &value[variant.name()];
            assert!(cell["f"].is_f64());
            assert!(cell["p"].is_f64());
            assert!(cell["r"].is_f64());
        }
        assert_eq!(value["rouge-1"]["f"], 0.5);
    }
}
