//! Replay session: one engine instance guarded by a content fingerprint.
//!
//! Loading the same commit list twice must not restart playback, even when
//! the second copy is a fresh allocation. The session therefore compares a
//! structural hash of the input, never its address.

use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::{debug, info};

use crate::language::Language;
use crate::normalize::normalize;
use crate::replay::{Pacing, Replay, TickOutcome, TypingSpeed};
use crate::types::Commit;

/// What [`ReplaySession::load`] did with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// New content: the previous state was discarded and a fresh replay built.
    Started,
    /// Content-equal to what is already loaded: nothing changed.
    Unchanged,
    /// No commits: any previous replay was discarded and nothing will run.
    Empty,
}

/// Structural fingerprint of a commit list under a language hint.
pub fn fingerprint(commits: &[Commit], language: Language) -> u64 {
    let mut hasher = DefaultHasher::new();
    commits.hash(&mut hasher);
    language.hash(&mut hasher);
    hasher.finish()
}

/// Owns the replay for the currently loaded history.
#[derive(Debug, Clone)]
pub struct ReplaySession {
    language: Language,
    pacing: Pacing,
    commits: Vec<Commit>,
    fingerprint: Option<u64>,
    replay: Option<Replay>,
    generation: u64,
}

impl ReplaySession {
    pub fn new(language: Language, pacing: Pacing) -> Self {
        Self {
            language,
            pacing,
            commits: Vec::new(),
            fingerprint: None,
            replay: None,
            generation: 0,
        }
    }

    /// Loads a commit list, rebuilding the replay only when its content changed.
    pub fn load(&mut self, commits: Vec<Commit>) -> LoadOutcome {
        let print = fingerprint(&commits, self.language);
        if self.fingerprint == Some(print) {
            debug!(fingerprint = print, "history unchanged, keeping replay state");
            return if self.replay.is_some() { LoadOutcome::Unchanged } else { LoadOutcome::Empty };
        }

        self.fingerprint = Some(print);
        self.commits = commits;
        self.rebuild();

        if self.replay.is_some() {
            info!(commits = self.commits.len(), generation = self.generation, "replay loaded");
            LoadOutcome::Started
        } else {
            info!("history is empty, nothing to replay");
            LoadOutcome::Empty
        }
    }

    /// Discards progress and starts the loaded history again from the beginning.
    pub fn restart(&mut self) {
        self.rebuild();
    }

    /// Changes the language hint. The fingerprint includes it, so the next
    /// load of the same commits rebuilds.
    pub fn set_language(&mut self, language: Language) {
        if self.language != language {
            self.language = language;
            self.fingerprint = None;
        }
    }

    pub fn set_speed(&mut self, speed: TypingSpeed) {
        self.pacing.speed = speed;
        if let Some(replay) = &mut self.replay {
            replay.set_speed(speed);
        }
    }

    /// Advances the replay by one tick, if one is loaded.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        self.replay.as_mut().map(Replay::tick)
    }

    /// Increments on every rebuild; timer ticks carrying an older value are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replay(&self) -> Option<&Replay> {
        self.replay.as_ref()
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    fn rebuild(&mut self) {
        self.generation += 1;
        self.replay = if self.commits.is_empty() {
            None
        } else {
            Some(Replay::new(normalize(&self.commits, self.language), self.pacing))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::Phase;
    use similar_asserts::assert_eq;

    fn commits() -> Vec<Commit> {
        vec![Commit {
            author: Some("Linus".into()),
            patch: Some("@@ -0,0 +1,1 @@\n+hello".into()),
            ..Default::default()
        }]
    }

    #[test]
    fn content_equal_reload_keeps_progress() {
        let mut session = ReplaySession::new(Language::Rust, Pacing::default());
        assert_eq!(session.load(commits()), LoadOutcome::Started);
        session.tick();
        session.tick();
        let progressed = session.replay().map(|r| r.state().clone());
        let generation = session.generation();

        assert_eq!(session.load(commits()), LoadOutcome::Unchanged);
        assert_eq!(session.replay().map(|r| r.state().clone()), progressed);
        assert_eq!(session.generation(), generation);
    }

    #[test]
    fn different_content_rebuilds_from_scratch() {
        let mut session = ReplaySession::new(Language::Rust, Pacing::default());
        session.load(commits());
        session.tick();
        session.tick();

        let mut changed = commits();
        changed[0].message = Some("reworded".into());
        assert_eq!(session.load(changed), LoadOutcome::Started);
        let state = session.replay().map(|r| r.state().clone()).unwrap_or_default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.buffer.is_empty());
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn empty_history_never_builds_a_replay() {
        let mut session = ReplaySession::new(Language::Rust, Pacing::default());
        session.load(commits());
        assert_eq!(session.load(Vec::new()), LoadOutcome::Empty);
        assert!(session.replay().is_none());
        assert!(session.tick().is_none());
        assert_eq!(session.load(Vec::new()), LoadOutcome::Empty);
    }

    #[test]
    fn restart_resets_state_and_bumps_generation() {
        let mut session = ReplaySession::new(Language::Rust, Pacing::default());
        session.load(commits());
        session.tick();
        session.tick();
        session.restart();
        assert_eq!(session.generation(), 2);
        assert_eq!(session.replay().map(|r| r.state().phase), Some(Phase::Idle));
    }

    #[test]
    fn speed_change_applies_to_loaded_replay() {
        let mut session = ReplaySession::new(Language::Rust, Pacing::default());
        session.load(commits());
        session.set_speed(TypingSpeed::Zen);
        assert_eq!(session.replay().map(|r| r.pacing().speed), Some(TypingSpeed::Zen));
        assert_eq!(session.pacing().speed, TypingSpeed::Zen);
    }
}
