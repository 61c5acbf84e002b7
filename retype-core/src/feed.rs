//! History payload parsing.
//!
//! The history proxy answers with `{"data": [...]}` on success and
//! `{"error": "..."}` on failure. A bare JSON array of commits is accepted
//! too, which is what `--json` files saved by hand usually contain.

use serde::Deserialize;

use crate::error::FeedError;
use crate::types::Commit;

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Failure { error: String },
    Success { data: Vec<Commit> },
    Bare(Vec<Commit>),
}

/// Parses a history payload into commits, oldest first as served.
///
/// # Errors
///
/// [`FeedError::Upstream`] when the payload is an error envelope,
/// [`FeedError::Json`] when it is not one of the accepted shapes.
pub fn parse_history(json: &str) -> Result<Vec<Commit>, FeedError> {
    match serde_json::from_str::<Envelope>(json)? {
        Envelope::Failure { error } => Err(FeedError::Upstream(error)),
        Envelope::Success { data } | Envelope::Bare(data) => Ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn parses_proxy_envelope() {
        let json = r#"{"data": [
            {"author": "a", "date": "2024-01-01T00:00:00Z", "message": "init",
             "ai_comment": "DUMMY COMMENT", "patch": "@@ -0,0 +1 @@\n+x"},
            {"author": "b", "message": "more", "ai_comment": "Adds y",
             "changes": [{"type": "add", "line": 2, "content": "y"}]}
        ]}"#;
        let commits = parse_history(json).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].patch.as_deref(), Some("@@ -0,0 +1 @@\n+x"));
        assert_eq!(commits[1].changes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn parses_bare_array() {
        let commits = parse_history(r#"[{"author": "a", "patch": null}]"#).unwrap();
        assert_eq!(commits.len(), 1);
    }

    #[test]
    fn error_envelope_is_upstream_error() {
        let err = parse_history(r#"{"error": "Authorization header required"}"#).unwrap_err();
        assert!(matches!(err, FeedError::Upstream(ref m) if m == "Authorization header required"));
    }

    #[test]
    fn garbage_is_json_error() {
        assert!(matches!(parse_history("not json"), Err(FeedError::Json(_))));
    }
}
