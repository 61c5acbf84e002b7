//! End-to-end properties of normalize + replay.
//!
//! Exercises: parse_history, normalize, Replay::tick, Replay::run_to_end,
//! ReplaySession::load.

use proptest::prelude::*;
use retype_core::normalize::normalize;
use retype_core::{
    Commit, Language, LoadOutcome, Next, OperationKind, Pacing, Replay, ReplayEvent, ReplaySession,
    TypingSpeed,
};
use similar::{ChangeTag, TextDiff};
use similar_asserts::assert_eq;

fn commit(patch: Option<&str>) -> Commit {
    Commit {
        author: Some("Margaret Hamilton".into()),
        date: Some("2024-03-01T12:00:00Z".into()),
        message: Some("update".into()),
        ai_comment: Some("DUMMY COMMENT".into()),
        patch: patch.map(str::to_owned),
        changes: None,
    }
}

fn file_text(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{l}\n")).collect()
}

/// `start,len` for one side of a hunk header, the way `git diff` writes it:
/// 1-based, and an empty range names the line before the hunk.
fn hunk_range(range: std::ops::Range<usize>) -> String {
    let start = if range.is_empty() { range.start } else { range.start + 1 };
    format!("{start},{}", range.len())
}

/// Unified diff between two file texts with two lines of context.
fn unified_patch(old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    let mut patch = String::from("--- a/notes.txt\n+++ b/notes.txt\n");
    for group in diff.grouped_ops(2) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;
        patch.push_str(&format!("@@ -{} +{} @@\n", hunk_range(old_range), hunk_range(new_range)));
        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                patch.push(sign);
                patch.push_str(change.value().trim_end_matches('\n'));
                patch.push('\n');
            }
        }
    }
    patch
}

/// Patches that take the file from nothing through every version in turn.
fn commits_for_versions(versions: &[Vec<String>]) -> Vec<Commit> {
    let mut previous = String::new();
    versions
        .iter()
        .map(|version| {
            let next = file_text(version);
            let patch = unified_patch(&previous, &next);
            previous = next;
            commit(Some(&patch))
        })
        .collect()
}

/// Runs the replay to completion, capturing the buffer whenever a commit boundary is crossed.
fn boundary_snapshots(replay: &mut Replay) -> Vec<Vec<String>> {
    let mut snapshots = Vec::new();
    loop {
        let outcome = replay.tick();
        for event in &outcome.events {
            match event {
                ReplayEvent::CommitStarted(i) if *i > 0 => {
                    snapshots.push(replay.buffer().lines().to_vec());
                }
                ReplayEvent::Finished => snapshots.push(replay.buffer().lines().to_vec()),
                _ => {}
            }
        }
        if outcome.next == Next::Finished {
            return snapshots;
        }
    }
}

#[test]
fn scenario_a_replaces_line_from_empty_buffer() {
    let commits = vec![commit(Some("@@ -1,1 +1,2 @@\n-old line\n+new line\n+second line"))];
    let timeline = normalize(&commits, Language::PlainText);

    let ops: Vec<_> = timeline.operations().map(|o| (o.kind, o.text.as_str())).collect();
    assert_eq!(
        ops,
        vec![
            (OperationKind::Remove, "old line"),
            (OperationKind::Add, "new line"),
            (OperationKind::Add, "second line"),
        ]
    );

    let mut replay = Replay::new(timeline, Pacing::default());
    replay.run_to_end();
    assert_eq!(replay.buffer().lines(), ["new line", "second line"]);
}

#[test]
fn scenario_b_null_patch_and_sentinel_comment() {
    let commits = vec![commit(None)];
    let timeline = normalize(&commits, Language::Python);
    assert_eq!(timeline.commits[0].ops.len(), 1, "placeholder guarantee");
    assert_eq!(timeline.commits[0].ops[0].kind, OperationKind::Context);

    let mut replay = Replay::new(timeline, Pacing::default());
    replay.tick();
    let meta = replay.active_commit().cloned().unwrap_or_default();
    assert_eq!(meta.comment, "", "sentinel comment must read as absent");
    assert_eq!(meta.author, "Margaret Hamilton");
}

#[test]
fn scenario_c_boundary_snapshot_equals_first_commit_alone() {
    let first = "@@ -0,0 +1,2 @@\n+fn main() {\n+}";
    let second = "@@ -1,2 +1,3 @@\n fn main() {\n+    println!(\"hi\");\n }";
    let commits = vec![commit(Some(first)), commit(Some(second))];

    let mut alone = Replay::new(normalize(&commits[..1], Language::Rust), Pacing::default());
    alone.run_to_end();

    let mut replay = Replay::new(normalize(&commits, Language::Rust), Pacing::default());
    let mut at_transition = None;
    while at_transition.is_none() {
        let before = replay.state().commit_index;
        let outcome = replay.tick();
        assert_ne!(outcome.next, Next::Finished, "second commit never started");
        if before == 0 && replay.state().commit_index == 1 {
            at_transition = Some(replay.buffer().clone());
        }
    }
    assert_eq!(at_transition.as_ref(), Some(alone.buffer()));

    replay.run_to_end();
    assert_eq!(replay.buffer().lines(), ["fn main() {", "    println!(\"hi\");", "}"]);
}

#[test]
fn placeholder_for_empty_patch_is_a_single_operation() {
    for patch in [None, Some("")] {
        let timeline = normalize(&[commit(patch)], Language::Go);
        assert_eq!(timeline.commits[0].ops.len(), 1);
        assert_eq!(timeline.commits[0].ops[0].text, "// No code changes in this commit");
    }
}

#[test]
fn reloading_equal_history_from_json_does_not_restart() {
    let json = r#"{"data": [{"author": "a", "patch": "@@ -0,0 +1 @@\n+one"}]}"#;
    let mut session = ReplaySession::new(Language::PlainText, Pacing::default());

    let first = retype_core::feed::parse_history(json).unwrap();
    assert_eq!(session.load(first), LoadOutcome::Started);
    session.tick();
    session.tick();
    let progressed = session.replay().map(|r| r.state().clone());

    // A second parse produces an equal list in a new allocation.
    let second = retype_core::feed::parse_history(json).unwrap();
    assert_eq!(session.load(second), LoadOutcome::Unchanged);
    assert_eq!(session.replay().map(|r| r.state().clone()), progressed);
}

#[test]
fn history_walkthrough_with_removals_and_blank_lines() {
    let versions = vec![
        vec!["alpha".to_owned(), "beta".to_owned(), "gamma".to_owned()],
        vec!["alpha".to_owned(), String::new(), "gamma".to_owned(), "delta".to_owned()],
        vec!["gamma".to_owned()],
        Vec::new(),
    ];
    let commits = commits_for_versions(&versions);
    let mut replay = Replay::new(normalize(&commits, Language::PlainText), Pacing::default());
    assert_eq!(boundary_snapshots(&mut replay), versions);
}

#[test]
fn rewriting_first_line_to_match_second() {
    let patch = unified_patch("a\nb\n", "b\nb\n");
    assert!(patch.contains("@@ -1,2 +1,2 @@"), "{patch}");

    let versions = vec![
        vec!["a".to_owned(), "b".to_owned()],
        vec!["b".to_owned(), "b".to_owned()],
    ];
    let mut replay =
        Replay::new(normalize(&commits_for_versions(&versions), Language::PlainText), Pacing::default());
    assert_eq!(boundary_snapshots(&mut replay), versions);
}

#[test]
fn whitespace_only_line_removed_before_blank_line() {
    let versions = vec![
        vec!["  ".to_owned(), String::new()],
        vec![String::new(), String::new()],
    ];
    let mut replay =
        Replay::new(normalize(&commits_for_versions(&versions), Language::PlainText), Pacing::default());
    assert_eq!(boundary_snapshots(&mut replay), versions);
}

fn versions_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[ab ]{0,3}", 0..8), 1..6)
}

proptest! {
    #[test]
    fn replay_matches_sequential_patch_application(
        versions in versions_strategy(),
        speed in prop::sample::select(TypingSpeed::PRESETS.to_vec()),
    ) {
        let commits = commits_for_versions(&versions);
        let mut replay = Replay::new(normalize(&commits, Language::PlainText), Pacing::new(speed));
        let snapshots = boundary_snapshots(&mut replay);
        prop_assert_eq!(snapshots, versions);
    }

    #[test]
    fn removal_always_takes_len_plus_one_ticks(text in "[a-z]{0,20}") {
        let patch = format!("@@ -1,1 +0,0 @@\n-{text}");
        let timeline = normalize(&[commit(Some(&patch))], Language::PlainText);
        let mut replay = Replay::new(timeline, Pacing::default());
        let ticks = replay.run_to_end();
        // One tick to start, then N removals and the line deletion.
        prop_assert_eq!(ticks, 1 + text.len() + 1);
    }
}
