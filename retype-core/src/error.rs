use thiserror::Error;

/// Why a patch could not be turned into operations.
///
/// Never escapes [`crate::normalize::normalize_commit`]: a malformed patch
/// degrades to the placeholder operation there.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("malformed hunk header on patch line {line}: {header:?}")]
    MalformedHunkHeader { line: usize, header: String },
}

/// Failure to read a history payload.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("history payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The proxy answered with `{"error": "..."}`.
    #[error("history service reported an error: {0}")]
    Upstream(String),
}
