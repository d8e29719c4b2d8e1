//! Candidate and reference summary retrieval.

use crate::dataset::document_path;
use crate::error::{EvalError, Result};
use crate::layout::{ExtractedSummary, extract_summary};
use crate::summarizer::Summarizer;
use std::path::Path;
use tracing::warn;

/// Get the summary a summarizer produces for one document, flattened.
pub async fn get_candidate<S: Summarizer>(
    summarizer: &S,
    dataset_dir: &Path,
    doc_id: usize,
    separator_width: usize,
) -> Result<String> {
    let output = summarizer.produce_candidate(dataset_dir, doc_id).await?;
    Ok(unwrap_summary(
        extract_summary(&output, separator_width),
        "summarizer output",
        doc_id,
    ))
}

/// Get the gold summary stored at the end of a document, flattened.
pub async fn get_reference(
    dataset_dir: &Path,
    doc_id: usize,
    separator_width: usize,
) -> Result<String> {
    let path = document_path(dataset_dir, doc_id);
    let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EvalError::DocumentNotFound(path.clone())
        } else {
            EvalError::io(&path, e)
        }
    })?;

    Ok(unwrap_summary(
        extract_summary(&text, separator_width),
        "reference document",
        doc_id,
    ))
}

fn unwrap_summary(extracted: ExtractedSummary, source: &str, doc_id: usize) -> String {
    if extracted.is_fallback() {
        warn!(
            "No blank line in {} for document {}; scoring the whole text as its summary",
            source, doc_id
        );
    }
    extracted.into_text()
}
