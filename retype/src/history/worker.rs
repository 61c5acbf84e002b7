//! Background thread that loads commit histories.
//!
//! `git2::Repository` is `!Send`, so repositories are opened inside this
//! thread and never leave it. Requests arrive over a crossbeam channel and
//! every answer goes back as `AppEvent::History` on the unified event bus.

use std::path::Path;

use chrono::{TimeZone, Utc};
use crossbeam_channel::Receiver;
use git2::{DiffFormat, DiffOptions, Repository, Sort, Tree};
use retype_core::feed::parse_history;
use retype_core::types::NO_COMMENT_SENTINEL;
use retype_core::Commit;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::event::AppEvent;
use crate::history::types::{HistoryError, HistoryPayload, HistoryRequest};

/// Entry point of the history thread.
///
/// Serves requests until the request channel closes or the event loop has
/// gone away.
pub fn history_worker_loop(rx: Receiver<HistoryRequest>, event_tx: UnboundedSender<AppEvent>) {
    for request in rx {
        let result = load(&request);
        match &result {
            Ok(commits) => info!(source = %request.label(), commits = commits.len(), "history loaded"),
            Err(e) => warn!(source = %request.label(), error = %e, "history load failed"),
        }
        let payload = HistoryPayload { request, result };
        if event_tx.send(AppEvent::History(Box::new(payload))).is_err() {
            debug!("event loop gone, history worker exiting");
            return;
        }
    }
}

/// Resolves one request to a commit list, oldest first.
///
/// # Errors
///
/// Any [`HistoryError`]; the worker forwards it to the UI unchanged.
pub fn load(request: &HistoryRequest) -> Result<Vec<Commit>, HistoryError> {
    match request {
        HistoryRequest::Json { path } => load_json(path),
        HistoryRequest::Repo { repo, file, rev, limit } => {
            let repo = Repository::discover(repo)?;
            file_history(&repo, file, rev, *limit)
        }
    }
}

fn load_json(path: &Path) -> Result<Vec<Commit>, HistoryError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|source| HistoryError::Io { path: path.to_path_buf(), source })?;
    Ok(parse_history(&raw)?)
}

/// Walks the first-parent history of `rev` and keeps the commits that touch `file`.
///
/// Each kept commit carries that file's unified diff against its first
/// parent. When `limit` cuts older commits off, the oldest kept commit is
/// diffed against the empty tree instead, so replaying the list still ends
/// on the file's content at `rev`.
///
/// # Errors
///
/// [`HistoryError::Git2`] when `rev` cannot be resolved or the walk fails,
/// [`HistoryError::FileNotFound`] when no commit touches `file`.
pub fn file_history(
    repo: &Repository,
    file: &str,
    rev: &str,
    limit: Option<usize>,
) -> Result<Vec<Commit>, HistoryError> {
    let start = repo.revparse_single(rev)?.peel_to_commit()?;

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(start.id())?;
    revwalk.simplify_first_parent()?;

    let limit = limit.unwrap_or(usize::MAX);
    let mut kept: Vec<(git2::Commit<'_>, String)> = Vec::new();
    let mut truncated = false;

    for oid in revwalk {
        let git_commit = repo.find_commit(oid?)?;
        let parent_tree = match git_commit.parent_count() {
            0 => None,
            _ => Some(git_commit.parent(0)?.tree()?),
        };
        let Some(patch) = file_patch(repo, parent_tree.as_ref(), &git_commit.tree()?, file)? else {
            continue;
        };
        if kept.len() == limit {
            truncated = true;
            break;
        }
        kept.push((git_commit, patch));
    }

    if kept.is_empty() {
        return Err(HistoryError::FileNotFound { file: file.to_owned(), rev: rev.to_owned() });
    }

    if truncated {
        if let Some((oldest, patch)) = kept.last_mut() {
            debug!(commit = %oldest.id(), "history truncated, typing oldest kept version in full");
            *patch = file_patch(repo, None, &oldest.tree()?, file)?.unwrap_or_default();
        }
    }

    Ok(kept.into_iter().rev().map(|(c, patch)| to_commit(&c, patch)).collect())
}

/// Unified diff of `file` between two trees, or `None` when the file did not change.
fn file_patch(
    repo: &Repository,
    old: Option<&Tree<'_>>,
    new: &Tree<'_>,
    file: &str,
) -> Result<Option<String>, git2::Error> {
    let mut opts = DiffOptions::new();
    opts.pathspec(file).disable_pathspec_match(true);
    let diff = repo.diff_tree_to_tree(old, Some(new), Some(&mut opts))?;
    if diff.deltas().next().is_none() {
        return Ok(None);
    }

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let content = String::from_utf8_lossy(line.content());
        match line.origin() {
            origin @ ('+' | '-' | ' ') => {
                text.push(origin);
                text.push_str(&content);
            }
            'H' => text.push_str(&content),
            // File headers ('F') would include mode lines outside any hunk;
            // end-of-file newline markers carry no line content.
            _ => return true,
        }
        if !text.ends_with('\n') {
            text.push('\n');
        }
        true
    })?;
    Ok(Some(text))
}

fn to_commit(git_commit: &git2::Commit<'_>, patch: String) -> Commit {
    let author = git_commit.author();
    let date = Utc
        .timestamp_opt(git_commit.time().seconds(), 0)
        .single()
        .map(|d| d.to_rfc3339());
    Commit {
        author: author.name().map(str::to_owned),
        date,
        message: git_commit.message().map(str::to_owned),
        ai_comment: Some(NO_COMMENT_SENTINEL.to_owned()),
        patch: Some(patch),
        changes: None,
    }
}
