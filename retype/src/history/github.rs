//! GitHub blob URL parsing.
//!
//! `https://github.com/<owner>/<repo>/blob/<branch>/<path>` names a file at a
//! branch. retype replays it from a local clone, so only the branch and the
//! path matter once the URL is validated.

use std::sync::LazyLock;

use regex::Regex;

use crate::history::types::HistoryError;

static BLOB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([^/]+)/([^/]+)/blob/([^/]+)/(.+?)/?$")
        .expect("valid regex")
});

/// The parts of a GitHub blob URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrl {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl BlobUrl {
    /// Parses a GitHub file URL. Query strings and `#L10` anchors are ignored.
    ///
    /// # Errors
    ///
    /// [`HistoryError::BadUrl`] when the URL does not name a file on a branch.
    pub fn parse(url: &str) -> Result<Self, HistoryError> {
        let trimmed = url.trim();
        let without_fragment = trimmed.split(['#', '?']).next().unwrap_or(trimmed);
        let caps = BLOB_URL
            .captures(without_fragment)
            .ok_or_else(|| HistoryError::BadUrl { url: url.to_owned() })?;
        Ok(Self {
            owner: caps[1].to_owned(),
            repo: caps[2].trim_end_matches(".git").to_owned(),
            branch: caps[3].to_owned(),
            path: caps[4].to_owned(),
        })
    }

    /// `owner/repo`, for display.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn parses_branch_and_nested_path() {
        let url = BlobUrl::parse("https://github.com/rust-lang/rust/blob/master/src/tools/x/src/main.rs")
            .unwrap();
        assert_eq!(
            url,
            BlobUrl {
                owner: "rust-lang".into(),
                repo: "rust".into(),
                branch: "master".into(),
                path: "src/tools/x/src/main.rs".into(),
            }
        );
        assert_eq!(url.slug(), "rust-lang/rust");
    }

    #[test]
    fn line_anchor_and_query_are_ignored() {
        let url = BlobUrl::parse("https://github.com/a/b/blob/dev/lib.py?plain=1#L10-L20").unwrap();
        assert_eq!(url.branch, "dev");
        assert_eq!(url.path, "lib.py");
    }

    #[test]
    fn tree_and_repo_urls_are_rejected() {
        for bad in [
            "https://github.com/a/b",
            "https://github.com/a/b/tree/main/src",
            "https://gitlab.com/a/b/blob/main/x.rs",
            "not a url",
        ] {
            assert!(
                matches!(BlobUrl::parse(bad), Err(HistoryError::BadUrl { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
