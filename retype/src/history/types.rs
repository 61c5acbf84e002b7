//! Owned data types exchanged with the history worker thread.
//!
//! Everything here is `Send` and free of borrowed lifetimes so it can cross
//! from the thread that owns the `git2::Repository` to the event loop.

use std::path::PathBuf;

use retype_core::{Commit, FeedError};
use thiserror::Error;

/// Errors a history load can end in. Shown verbatim in the editor panel.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history payload rejected: {0}")]
    Feed(#[from] FeedError),

    #[error("git error: {0}")]
    Git2(#[from] git2::Error),

    /// The walk finished without a single commit touching the file.
    #[error("no commits touch {file} at {rev}")]
    FileNotFound { file: String, rev: String },

    #[error("not a GitHub file URL: {url} (expected https://github.com/<owner>/<repo>/blob/<branch>/<path>)")]
    BadUrl { url: String },
}

/// Where a commit list should come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRequest {
    /// A saved history payload: a bare commit array or the proxy's `{"data": [...]}` envelope.
    Json { path: PathBuf },
    /// The history of one file in a local repository.
    Repo {
        /// Repository path, or any directory inside its work tree.
        repo: PathBuf,
        /// Repository-relative path of the tracked file.
        file: String,
        /// Revision to walk back from.
        rev: String,
        /// Keep at most this many of the most recent matching commits.
        limit: Option<usize>,
    },
}

impl HistoryRequest {
    /// Short human label for the status bar and logs, e.g. `src/main.rs@HEAD`.
    pub fn label(&self) -> String {
        match self {
            Self::Json { path } => path.display().to_string(),
            Self::Repo { file, rev, .. } => format!("{file}@{rev}"),
        }
    }

    /// Path of the file being replayed, used for the language hint.
    pub fn file_path(&self) -> String {
        match self {
            Self::Json { path } => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::Repo { file, .. } => file.clone(),
        }
    }
}

/// Result sent back from the worker, boxed inside `AppEvent::History`.
#[derive(Debug)]
pub struct HistoryPayload {
    /// The request this answers.
    pub request: HistoryRequest,
    /// Commits oldest first, or why none could be loaded.
    pub result: Result<Vec<Commit>, HistoryError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_file_path_drops_the_payload_extension() {
        // `history.rs.json` carries the history of a Rust file.
        let request = HistoryRequest::Json { path: PathBuf::from("/tmp/history.rs.json") };
        assert_eq!(request.file_path(), "history.rs");
        assert_eq!(request.label(), "/tmp/history.rs.json");
    }

    #[test]
    fn repo_label_names_file_and_rev() {
        let request = HistoryRequest::Repo {
            repo: PathBuf::from("."),
            file: "src/lib.rs".into(),
            rev: "main".into(),
            limit: None,
        };
        assert_eq!(request.label(), "src/lib.rs@main");
        assert_eq!(request.file_path(), "src/lib.rs");
    }
}
