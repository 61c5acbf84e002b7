//! Owned data types shared by the normalizer, the replay engine, and the
//! history sources.
//!
//! `Commit` and `Change` mirror the JSON shape served by the history proxy, so
//! they derive serde traits and tolerate missing or `null` fields. Everything
//! downstream of the normalizer (`CommitMeta`, `LineOperation`, `Timeline`)
//! has its defaults already applied and never needs to look at an `Option`
//! metadata field again.

use serde::{Deserialize, Serialize};

/// `ai_comment` value the proxy sends when no commentary was generated.
pub const NO_COMMENT_SENTINEL: &str = "DUMMY COMMENT";

/// Author label used when a commit carries no author name.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One historical change to the tracked file, exactly as received.
///
/// Either `patch` (unified diff text) or `changes` (pre-structured list) is
/// expected; when both are present `changes` wins. `Hash` and `Eq` are
/// structural so two content-equal lists fingerprint identically regardless
/// of where they were allocated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commit {
    pub author: Option<String>,
    /// ISO-8601 timestamp string.
    pub date: Option<String>,
    pub message: Option<String>,
    pub ai_comment: Option<String>,
    pub patch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<Change>>,
}

/// One entry of a pre-structured change list.
///
/// `content` also accepts the legacy `code` key used by older code-chunk payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type", default)]
    pub kind: Option<OperationKind>,
    #[serde(default)]
    pub line: Option<usize>,
    #[serde(alias = "code", default)]
    pub content: String,
}

/// The kind of line-level edit an operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Add,
    Remove,
    Context,
}

/// Commit metadata with every default applied, ready for the commit card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CommitMeta {
    pub author: String,
    pub date: String,
    pub message: String,
    /// Empty when the commit has no commentary.
    pub comment: String,
}

impl CommitMeta {
    /// Builds display metadata from a raw commit.
    ///
    /// Blank or missing authors become [`UNKNOWN_AUTHOR`]; the comment sentinel
    /// and blank comments become the empty string.
    pub fn from_commit(commit: &Commit) -> Self {
        let author = commit
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
            .to_owned();
        let comment = commit
            .ai_comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != NO_COMMENT_SENTINEL)
            .unwrap_or_default()
            .to_owned();
        Self {
            author,
            date: commit.date.clone().unwrap_or_default(),
            message: commit.message.as_deref().unwrap_or_default().trim().to_owned(),
            comment,
        }
    }

    /// Uppercase initials of the author, used as a text avatar.
    pub fn initials(&self) -> String {
        self.author
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// One atomic edit extracted from a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOperation {
    pub kind: OperationKind,
    /// Full line content without the diff prefix character.
    pub text: String,
    /// 1-based line in the evolving file; `None` means the current end.
    pub target_line: Option<usize>,
    /// Index of the owning commit inside the [`Timeline`].
    pub commit: usize,
    /// Set only on the placeholder emitted for a commit with no content.
    pub synthetic: bool,
}

impl LineOperation {
    pub fn new(kind: OperationKind, text: impl Into<String>, target_line: Option<usize>) -> Self {
        Self { kind, text: text.into(), target_line, commit: 0, synthetic: false }
    }

    /// Number of Unicode scalar values in `text`; the unit the engine animates in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// The operations of one commit, in patch order, with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOps {
    pub meta: CommitMeta,
    pub ops: Vec<LineOperation>,
}

/// The global replay timeline: one operation list per commit, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub commits: Vec<CommitOps>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn commit(&self, index: usize) -> Option<&CommitOps> {
        self.commits.get(index)
    }

    /// Returns the operation at `(commit, op)` if both indices are in range.
    pub fn operation(&self, commit: usize, op: usize) -> Option<&LineOperation> {
        self.commits.get(commit).and_then(|c| c.ops.get(op))
    }

    /// Iterates every operation of every commit in replay order.
    pub fn operations(&self) -> impl Iterator<Item = &LineOperation> {
        self.commits.iter().flat_map(|c| c.ops.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn sentinel_comment_normalises_to_empty() {
        let commit = Commit {
            author: Some("Ada Lovelace".into()),
            ai_comment: Some(NO_COMMENT_SENTINEL.into()),
            ..Default::default()
        };
        let meta = CommitMeta::from_commit(&commit);
        assert_eq!(meta.comment, "");
        assert_eq!(meta.author, "Ada Lovelace");
    }

    #[test]
    fn missing_author_gets_default_label() {
        let meta = CommitMeta::from_commit(&Commit {
            author: Some("   ".into()),
            message: Some("  fix typo\n".into()),
            ..Default::default()
        });
        assert_eq!(meta.author, UNKNOWN_AUTHOR);
        assert_eq!(meta.message, "fix typo");
        assert_eq!(meta.date, "");
    }

    #[test]
    fn initials_from_multi_word_name() {
        let meta = CommitMeta { author: "grace brewster hopper".into(), ..Default::default() };
        assert_eq!(meta.initials(), "GBH");
    }

    #[test]
    fn change_accepts_legacy_code_key_and_missing_type() {
        let change: Change = serde_json::from_str(r#"{"code": "let x = 1;"}"#).unwrap();
        assert_eq!(change.content, "let x = 1;");
        assert_eq!(change.kind, None);
        assert_eq!(change.line, None);
    }

    #[test]
    fn commit_tolerates_null_patch() {
        let commit: Commit =
            serde_json::from_str(r#"{"author": "a", "patch": null, "ai_comment": "DUMMY COMMENT"}"#)
                .unwrap();
        assert_eq!(commit.patch, None);
        assert_eq!(commit.changes, None);
    }
}
