//! Diff normalizer: commit → ordered line operations.
//!
//! Patch lines are classified by their prefix. Hunk headers never become
//! operations but do supply the running new-file cursor, so operations after a
//! header carry the 1-based line they touch in the evolving file:
//!
//! | line      | operation | target  | cursor  |
//! |-----------|-----------|---------|---------|
//! | `+text`   | add       | cursor  | +1      |
//! | `-text`   | remove    | cursor  | same    |
//! | ` text`   | context   | cursor  | +1      |
//!
//! A removed line sits at the cursor because every line above it has already
//! been brought to its new form by the time the engine reaches it.

use tracing::warn;

use crate::error::PatchError;
use crate::language::Language;
use crate::types::{Commit, CommitMeta, CommitOps, LineOperation, OperationKind, Timeline};

/// Builds the replay timeline for a commit list, preserving its order.
pub fn normalize(commits: &[Commit], language: Language) -> Timeline {
    Timeline {
        commits: commits
            .iter()
            .enumerate()
            .map(|(index, commit)| normalize_commit(commit, index, language))
            .collect(),
    }
}

/// Normalizes one commit. Always returns at least one operation.
///
/// `changes` takes precedence over `patch`. A malformed patch is logged and
/// treated as empty; an empty result is replaced by a single synthetic
/// context operation holding a placeholder comment.
pub fn normalize_commit(commit: &Commit, index: usize, language: Language) -> CommitOps {
    let meta = CommitMeta::from_commit(commit);

    let mut ops = match (&commit.changes, commit.patch.as_deref()) {
        (Some(changes), _) => changes
            .iter()
            .map(|change| LineOperation {
                kind: change.kind.unwrap_or(OperationKind::Add),
                text: change.content.clone(),
                target_line: change.line.filter(|&l| l > 0),
                commit: index,
                synthetic: false,
            })
            .collect(),
        (None, Some(patch)) => match parse_patch(patch) {
            Ok(ops) => ops,
            Err(e) => {
                warn!(commit = index, error = %e, "discarding malformed patch");
                Vec::new()
            }
        },
        (None, None) => Vec::new(),
    };

    if ops.is_empty() {
        ops.push(LineOperation {
            kind: OperationKind::Context,
            text: language.placeholder_comment(),
            target_line: None,
            commit: index,
            synthetic: true,
        });
    }

    for op in &mut ops {
        op.commit = index;
    }

    CommitOps { meta, ops }
}

/// Parses unified diff text into operations in patch order.
///
/// The returned operations have `commit == 0`; [`normalize_commit`] stamps
/// the real owner.
///
/// # Errors
///
/// Returns [`PatchError::MalformedHunkHeader`] when a line starts with `@@`
/// but does not carry readable `-old` and `+new` ranges.
pub fn parse_patch(patch: &str) -> Result<Vec<LineOperation>, PatchError> {
    let mut ops = Vec::new();
    let mut cursor: Option<usize> = None;
    let mut hunk = HunkBody::default();

    for (number, line) in patch.lines().enumerate() {
        if line.starts_with("@@") {
            let header = parse_hunk_header(line).ok_or_else(|| PatchError::MalformedHunkHeader {
                line: number + 1,
                header: line.to_owned(),
            })?;
            cursor = Some(header.first_touched_line());
            hunk = HunkBody { old: header.old_len, new: header.new_len };
            continue;
        }
        if line.starts_with('\\') || (!hunk.is_open() && is_preamble(line)) {
            continue;
        }

        let (kind, text) = if let Some(rest) = line.strip_prefix('+') {
            (OperationKind::Add, rest)
        } else if let Some(rest) = line.strip_prefix('-') {
            (OperationKind::Remove, rest)
        } else {
            (OperationKind::Context, line.strip_prefix(' ').unwrap_or(line))
        };

        ops.push(LineOperation::new(kind, text, cursor));
        hunk.consume(kind);

        if kind != OperationKind::Remove {
            cursor = cursor.map(|c| c.saturating_add(1));
        }
    }

    Ok(ops)
}

/// Lines still expected in the current hunk, per side.
#[derive(Debug, Default, Clone, Copy)]
struct HunkBody {
    old: usize,
    new: usize,
}

impl HunkBody {
    fn is_open(self) -> bool {
        self.old > 0 || self.new > 0
    }

    fn consume(&mut self, kind: OperationKind) {
        if kind != OperationKind::Add {
            self.old = self.old.saturating_sub(1);
        }
        if kind != OperationKind::Remove {
            self.new = self.new.saturating_sub(1);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkHeader {
    old_len: usize,
    new_start: usize,
    new_len: usize,
}

impl HunkHeader {
    /// 1-based line in the new file where the hunk's first edit lands.
    ///
    /// An empty new range names the line *before* the hunk, so its edits sit
    /// one further down. `+0,0` (everything deleted) therefore lands on 1.
    fn first_touched_line(self) -> usize {
        if self.new_len == 0 {
            self.new_start + 1
        } else {
            self.new_start.max(1)
        }
    }
}

/// File headers and git preamble between hunks.
fn is_preamble(line: &str) -> bool {
    line.starts_with("+++")
        || line.starts_with("---")
        || line.starts_with("diff ")
        || line.starts_with("index ")
}

/// Parses `@@ -a[,b] +c[,d] @@ ...`. Omitted lengths default to 1.
fn parse_hunk_header(header: &str) -> Option<HunkHeader> {
    let ranges = header.strip_prefix("@@")?;
    let ranges = &ranges[..ranges.find("@@")?];
    let mut tokens = ranges.split_whitespace();
    let (_, old_len) = parse_range(tokens.next()?.strip_prefix('-')?)?;
    let (new_start, new_len) = parse_range(tokens.next()?.strip_prefix('+')?)?;
    // The new range has to end inside `usize` for the cursor to walk it.
    new_start.checked_add(new_len.max(1))?;
    Some(HunkHeader { old_len, new_start, new_len })
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, len)) => Some((start.parse().ok()?, len.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}
