//! ROUGE-1, ROUGE-2 and ROUGE-L overlap metrics.
//!
//! Texts are split into sentences on `.`, and sentences into lower-cased
//! whitespace tokens. ROUGE-N uses clipped n-gram counts. ROUGE-L is the
//! summary-level union-LCS variant from Lin (2004), which makes it suitable
//! for multi-sentence summaries.

use crate::error::{EvalError, Result};
use crate::score::{MetricScores, ScoreRecord};
use std::collections::{BTreeSet, HashMap};

/// Score a candidate summary against a reference summary.
pub fn score(candidate: &str, reference: &str) -> Result<ScoreRecord> {
    let candidate = sentences(candidate);
    let reference = sentences(reference);

    if candidate.iter().all(Vec::is_empty) {
        return Err(EvalError::EmptyText("candidate"));
    }
    if reference.iter().all(Vec::is_empty) {
        return Err(EvalError::EmptyText("reference"));
    }

    let candidate_words: Vec<&str> = candidate.iter().flatten().map(String::as_str).collect();
    let reference_words: Vec<&str> = reference.iter().flatten().map(String::as_str).collect();

    Ok(ScoreRecord {
        rouge_1: rouge_n(&candidate_words, &reference_words, 1),
        rouge_2: rouge_n(&candidate_words, &reference_words, 2),
        rouge_l: rouge_l_summary(&candidate, &reference),
    })
}

/// Split text into sentences of lower-cased tokens.
fn sentences(text: &str) -> Vec<Vec<String>> {
    text.split('.')
        .map(|s| s.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>())
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

fn ngram_counts<'a>(words: &'a [&'a str], n: usize) -> HashMap<&'a [&'a str], usize> {
    let mut counts = HashMap::new();
    if n == 0 || words.len() < n {
        return counts;
    }
    for gram in words.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// ROUGE-N with clipped counts.
fn rouge_n(candidate: &[&str], reference: &[&str], n: usize) -> MetricScores {
    let candidate_counts = ngram_counts(candidate, n);
    let reference_counts = ngram_counts(reference, n);

    let candidate_total: usize = candidate_counts.values().sum();
    let reference_total: usize = reference_counts.values().sum();
    if candidate_total == 0 || reference_total == 0 {
        return MetricScores::default();
    }

    let overlap: usize = candidate_counts
        .iter()
        .map(|(gram, &count)| count.min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();

    MetricScores::from_precision_recall(
        overlap as f64 / candidate_total as f64,
        overlap as f64 / reference_total as f64,
    )
}

/// Indices into `a` of one longest common subsequence of `a` and `b`.
fn lcs_indices(a: &[String], b: &[String]) -> Vec<usize> {
    let m = a.len();
    let n = b.len();
    let mut dp = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    // Walk back from the corner to recover positions in `a`.
    let mut indices = Vec::with_capacity(dp[m][n]);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] >= dp[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    indices.reverse();
    indices
}

/// Summary-level ROUGE-L.
fn rouge_l_summary(candidate: &[Vec<String>], reference: &[Vec<String>]) -> MetricScores {
    let candidate_len: usize = candidate.iter().map(Vec::len).sum();
    let reference_len: usize = reference.iter().map(Vec::len).sum();

    let mut candidate_unigrams: HashMap<&str, usize> = HashMap::new();
    for token in candidate.iter().flatten() {
        *candidate_unigrams.entry(token.as_str()).or_insert(0) += 1;
    }
    let mut reference_unigrams: HashMap<&str, usize> = HashMap::new();
    for token in reference.iter().flatten() {
        *reference_unigrams.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0usize;
    for ref_sentence in reference {
        let union: BTreeSet<usize> = candidate
            .iter()
            .flat_map(|cand_sentence| lcs_indices(ref_sentence, cand_sentence))
            .collect();

        for idx in union {
            let token = ref_sentence[idx].as_str();
            let (Some(in_candidate), Some(in_reference)) = (
                candidate_unigrams.get(token).copied(),
                reference_unigrams.get(token).copied(),
            ) else {
                continue;
            };
            if in_candidate > 0 && in_reference > 0 {
                candidate_unigrams.insert(token, in_candidate - 1);
                reference_unigrams.insert(token, in_reference - 1);
                hits += 1;
            }
        }
    }

    if hits == 0 || candidate_len == 0 || reference_len == 0 {
        return MetricScores::default();
    }

    let r = hits as f64 / reference_len as f64;
    let p = hits as f64 / candidate_len as f64;
    let beta = p / r;
    let f = (1.0 + beta * beta) * r * p / (r + beta * beta * p);

    MetricScores { f, p, r }
}
