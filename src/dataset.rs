//! Dataset directory discovery.
//!
//! A dataset is a directory of documents named `1.txt`, `2.txt`, ... `N.txt`.

use crate::error::{EvalError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name of a document.
pub fn document_file_name(doc_id: usize) -> String {
    format!("{}.txt", doc_id)
}

/// Path of a document inside a dataset directory.
pub fn document_path(dataset_dir: &Path, doc_id: usize) -> PathBuf {
    dataset_dir.join(document_file_name(doc_id))
}

/// Parse a document id out of a file name like `12.txt`.
fn parse_doc_id(file_name: &str) -> Option<usize> {
    let stem = file_name.strip_suffix(".txt")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok().filter(|&id| id > 0)
}

/// A validated dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSet {
    /// Absolute path of the dataset directory.
    pub dir: PathBuf,
    /// Number of documents; ids run from 1 to `num_docs` inclusive.
    pub num_docs: usize,
}

impl DocumentSet {
    /// Document ids in ascending order.
    pub fn doc_ids(&self) -> impl Iterator<Item = usize> {
        1..=self.num_docs
    }
}

/// Resolve a dataset path to an absolute directory path.
pub fn resolve_dataset_dir(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(EvalError::invalid_dataset(
            path,
            "path does not exist or is not a directory",
        ));
    }
    std::fs::canonicalize(path).map_err(|e| EvalError::io(path, e))
}

/// Count every entry in the dataset directory, documents or not.
pub fn count_entries(dataset_dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dataset_dir).min_depth(1).max_depth(1) {
        entry.map_err(|e| walk_error(dataset_dir, e))?;
        count += 1;
    }
    Ok(count)
}

/// Find the documents in a dataset directory.
///
/// Only regular files named `<id>.txt` count as documents; anything else is
/// skipped. The ids found must be exactly `1..=N` with `N >= 1`.
pub fn discover_documents(dataset_dir: &Path) -> Result<DocumentSet> {
    let dir = resolve_dataset_dir(dataset_dir)?;

    let mut ids = BTreeSet::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(&dir, e))?;
        let name = entry.file_name().to_string_lossy();

        match parse_doc_id(&name) {
            Some(id) if entry.file_type().is_file() => {
                ids.insert(id);
            }
            _ => debug!("Ignoring non-document entry '{}'", name),
        }
    }

    let num_docs = ids.len();
    if num_docs == 0 {
        return Err(EvalError::invalid_dataset(&dir, "no documents named <id>.txt"));
    }

    if let Some(missing) = (1..=num_docs).find(|id| !ids.contains(id)) {
        return Err(EvalError::invalid_dataset(
            &dir,
            format!(
                "document ids must run from 1 to {} without gaps, but {} is missing",
                num_docs,
                document_file_name(missing)
            ),
        ));
    }

    let entries = count_entries(&dir)?;
    debug!(
        "Found {} documents in {} ({} entries ignored)",
        num_docs,
        dir.display(),
        entries.saturating_sub(num_docs)
    );
    Ok(DocumentSet { dir, num_docs })
}

fn walk_error(dir: &Path, err: walkdir::Error) -> EvalError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    match err.into_io_error() {
        Some(source) => EvalError::io(path, source),
        None => EvalError::invalid_dataset(path, "filesystem loop detected"),
    }
}
