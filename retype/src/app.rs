//! Central application state for retype.
//!
//! `AppState` owns the replay session, the one replay timer, and every piece
//! of UI state (mode, scroll, toggles). No ratatui rendering happens here: the
//! render module reads this state, and the keybinding dispatcher and the event
//! loop mutate it.

use std::time::Duration;

use crossbeam_channel::Sender;
use retype_core::{LoadOutcome, Next, Phase, ReplaySession, TypingSpeed};
use tracing::{debug, info};

use crate::feedback::{FeedbackSink, Keystrokes};
use crate::history::types::{HistoryPayload, HistoryRequest};
use crate::timer::TickTimer;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Help overlay shown above the panels.
    HelpOverlay,
}

/// What the editor panel and status bar should say about playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// A history request is in flight and nothing is loaded yet.
    Loading,
    /// The last load failed and nothing is loaded.
    Failed,
    /// The history has no commits.
    Empty,
    /// Loaded, waiting out the initial delay.
    Waiting,
    Playing,
    Paused,
    Finished,
}

/// All mutable application state.
pub struct AppState {
    pub mode: Mode,
    pub session: ReplaySession,
    timer: TickTimer,
    history_tx: Option<Sender<HistoryRequest>>,
    /// The request that produced the current history; `R` sends it again.
    pub request: Option<HistoryRequest>,

    /// True while a history request is in flight.
    pub loading: bool,
    /// Message of the last failed load, shown until the next successful one.
    pub load_error: Option<String>,

    pub paused: bool,
    /// Wait that was left on the timer when playback was paused.
    resume_wait: Option<Duration>,
    /// Ring the bell on new lines.
    pub sound: bool,
    pub keystrokes: Keystrokes,
    bell: Box<dyn FeedbackSink>,

    /// First visible buffer line (0-based) in the editor panel.
    pub editor_scroll: usize,
    /// Keep the line being edited in view. Manual scrolling turns it off.
    pub follow: bool,
    /// Inner height of the editor panel, cached after each render.
    pub editor_viewport_height: u16,

    /// Vertical scroll offset of the help overlay.
    pub help_scroll: u16,
    /// Frame counter for the loading spinner.
    pub spinner: usize,
}

impl AppState {
    /// # Arguments
    ///
    /// * `session` — replay session with language and pacing already set
    /// * `timer` — the timer that will deliver `ReplayTick` events
    /// * `sound` — initial state of the bell toggle
    /// * `bell` — sink that receives keystroke signals while sound is on
    pub fn new(
        session: ReplaySession,
        timer: TickTimer,
        sound: bool,
        bell: Box<dyn FeedbackSink>,
    ) -> Self {
        Self {
            mode: Mode::default(),
            session,
            timer,
            history_tx: None,
            request: None,
            loading: false,
            load_error: None,
            paused: false,
            resume_wait: None,
            sound,
            keystrokes: Keystrokes::default(),
            bell,
            editor_scroll: 0,
            follow: true,
            editor_viewport_height: 0,
            help_scroll: 0,
            spinner: 0,
        }
    }

    /// Connects the state to the history worker.
    pub fn with_history(mut self, history_tx: Sender<HistoryRequest>) -> Self {
        self.history_tx = Some(history_tx);
        self
    }

    pub fn playback(&self) -> Playback {
        let Some(replay) = self.session.replay() else {
            return if self.loading {
                Playback::Loading
            } else if self.load_error.is_some() {
                Playback::Failed
            } else if self.request.is_some() {
                Playback::Empty
            } else {
                Playback::Loading
            };
        };
        match replay.state().phase {
            Phase::Finished => Playback::Finished,
            _ if self.paused => Playback::Paused,
            Phase::Idle => Playback::Waiting,
            Phase::Running => Playback::Playing,
        }
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Asks the history worker for a commit list.
    pub fn request_history(&mut self, request: HistoryRequest) {
        info!(source = %request.label(), "requesting history");
        self.request = Some(request.clone());
        self.loading = true;
        match &self.history_tx {
            Some(tx) if tx.send(request).is_ok() => {}
            _ => {
                self.loading = false;
                self.load_error = Some("history worker is not running".to_owned());
            }
        }
    }

    /// Sends the last request again. Content-equal results keep playback going.
    pub fn reload(&mut self) {
        if let Some(request) = self.request.clone() {
            self.request_history(request);
        }
    }

    /// Applies a worker answer.
    ///
    /// New content restarts playback after the initial delay; content equal to
    /// what is loaded changes nothing.
    pub fn apply_history(&mut self, payload: HistoryPayload) {
        self.loading = false;
        let commits = match payload.result {
            Ok(commits) => commits,
            Err(e) => {
                self.load_error = Some(e.to_string());
                return;
            }
        };
        self.load_error = None;

        match self.session.load(commits) {
            LoadOutcome::Started => self.start_fresh(),
            LoadOutcome::Unchanged => debug!("reloaded history is unchanged"),
            LoadOutcome::Empty => {
                self.timer.cancel();
                info!(source = %payload.request.label(), "history has no commits");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Replay driving
    // -----------------------------------------------------------------------

    /// Advances the replay in response to a timer firing.
    ///
    /// Ticks armed for an older generation, or arriving while paused, are dropped.
    pub fn on_replay_tick(&mut self, generation: u64) {
        if generation != self.session.generation() || self.paused {
            debug!(generation, current = self.session.generation(), "dropping stale replay tick");
            return;
        }
        let Some(outcome) = self.session.tick() else {
            return;
        };

        for event in outcome.events {
            self.keystrokes.signal(event);
            if self.sound && event.is_signal() {
                self.bell.signal(event);
            }
        }

        match outcome.next {
            Next::After(wait) => self.timer.arm(wait, generation),
            Next::Finished => {
                info!(
                    typed = self.keystrokes.typed,
                    deleted = self.keystrokes.deleted,
                    "replay finished"
                );
            }
        }
    }

    /// Pauses or resumes playback. On a finished replay this starts it over.
    pub fn toggle_pause(&mut self) {
        match self.playback() {
            Playback::Finished => self.restart(),
            Playback::Paused => {
                self.paused = false;
                let wait = self
                    .resume_wait
                    .take()
                    .unwrap_or_else(|| self.session.pacing().char_interval());
                self.timer.arm(wait, self.session.generation());
            }
            Playback::Playing | Playback::Waiting => {
                self.paused = true;
                self.resume_wait = self.timer.remaining();
                self.timer.cancel();
            }
            Playback::Loading | Playback::Failed | Playback::Empty => {}
        }
    }

    /// Discards progress and plays the loaded history from the start.
    pub fn restart(&mut self) {
        if self.session.replay().is_none() {
            return;
        }
        self.session.restart();
        self.start_fresh();
    }

    fn start_fresh(&mut self) {
        self.timer.cancel();
        self.paused = false;
        self.resume_wait = None;
        self.keystrokes = Keystrokes::default();
        self.editor_scroll = 0;
        self.follow = true;
        let delay = self.session.pacing().initial_delay;
        self.timer.arm(delay, self.session.generation());
    }

    pub fn set_speed(&mut self, speed: TypingSpeed) {
        if speed != self.session.pacing().speed {
            info!(%speed, "typing speed changed");
            self.session.set_speed(speed);
        }
    }

    pub fn faster(&mut self) {
        self.set_speed(self.session.pacing().speed.faster());
    }

    pub fn slower(&mut self) {
        self.set_speed(self.session.pacing().speed.slower());
    }

    pub fn toggle_sound(&mut self) {
        self.sound = !self.sound;
    }

    pub fn toggle_follow(&mut self) {
        self.follow = !self.follow;
    }

    pub fn on_tick(&mut self) {
        self.spinner = self.spinner.wrapping_add(1);
    }

    // -----------------------------------------------------------------------
    // Editor scrolling
    // -----------------------------------------------------------------------

    fn line_count(&self) -> usize {
        self.session.replay().map_or(0, |r| r.buffer().len())
    }

    /// Recomputes the scroll offset for a viewport of `height` rows.
    ///
    /// With follow on, the line being edited is kept near the middle of the
    /// view. The offset is always clamped to the buffer.
    pub fn sync_scroll(&mut self, height: usize) {
        let lines = self.line_count();
        if self.follow {
            let reveal = self.session.replay().map_or(0, |r| r.state().reveal_line);
            if reveal > 0 {
                let index = reveal - 1;
                if index < self.editor_scroll || index >= self.editor_scroll + height {
                    self.editor_scroll = index.saturating_sub(height / 2);
                }
            }
        }
        self.editor_scroll = self.editor_scroll.min(lines.saturating_sub(1));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.follow = false;
        self.editor_scroll = self
            .editor_scroll
            .saturating_add(lines)
            .min(self.line_count().saturating_sub(1));
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.follow = false;
        self.editor_scroll = self.editor_scroll.saturating_sub(lines);
    }

    pub fn scroll_top(&mut self) {
        self.follow = false;
        self.editor_scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.follow = false;
        let height = usize::from(self.editor_viewport_height);
        self.editor_scroll = self.line_count().saturating_sub(height.max(1));
    }

    /// Scrolls by half the cached viewport height (at least one line).
    pub fn half_page_down(&mut self) {
        self.scroll_down(usize::from(self.editor_viewport_height / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up(usize::from(self.editor_viewport_height / 2).max(1));
    }

    pub fn full_page_down(&mut self) {
        self.scroll_down(usize::from(self.editor_viewport_height).max(1));
    }

    pub fn full_page_up(&mut self) {
        self.scroll_up(usize::from(self.editor_viewport_height).max(1));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use retype_core::{Commit, Language, Pacing, ReplayEvent};
    use similar_asserts::assert_eq;
    use tokio::sync::mpsc;

    use crate::event::AppEvent;

    /// Records what reached the bell.
    #[derive(Clone, Default)]
    pub(crate) struct Recorder(pub Arc<Mutex<Vec<ReplayEvent>>>);

    impl FeedbackSink for Recorder {
        fn signal(&mut self, event: ReplayEvent) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(event);
            }
        }
    }

    pub(crate) fn state_with(recorder: Recorder) -> (AppState, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pacing = Pacing::default().with_initial_delay(Duration::from_millis(5));
        let session = ReplaySession::new(Language::Rust, pacing);
        (AppState::new(session, TickTimer::new(tx), true, Box::new(recorder)), rx)
    }

    pub(crate) fn payload(patch: &str) -> HistoryPayload {
        HistoryPayload {
            request: HistoryRequest::Json { path: "h.json".into() },
            result: Ok(vec![Commit {
                author: Some("Ken Thompson".into()),
                patch: Some(patch.into()),
                ..Default::default()
            }]),
        }
    }

    /// Delivers ticks until the timer goes quiet.
    async fn drain(state: &mut AppState, rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(5), rx.recv()).await
        {
            if let AppEvent::ReplayTick(generation) = event {
                state.on_replay_tick(generation);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loaded_history_plays_to_completion() {
        let recorder = Recorder::default();
        let (mut state, mut rx) = state_with(recorder.clone());
        state.apply_history(payload("@@ -0,0 +1,2 @@\n+ab\n+c"));
        assert_eq!(state.playback(), Playback::Waiting);

        drain(&mut state, &mut rx).await;

        assert_eq!(state.playback(), Playback::Finished);
        let lines = state.session.replay().map(|r| r.buffer().lines().to_vec());
        assert_eq!(lines, Some(vec!["ab".to_owned(), "c".to_owned()]));
        assert_eq!(state.keystrokes, Keystrokes { typed: 3, deleted: 0, lines: 2 });
        let seen = recorder.0.lock().map(|v| v.len()).unwrap_or_default();
        assert_eq!(seen, 5, "bell receives every keystroke signal while sound is on");
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_progress_and_resume_continues() {
        let (mut state, mut rx) = state_with(Recorder::default());
        state.apply_history(payload("@@ -0,0 +1 @@\n+abcdef"));

        // Start tick plus three characters.
        for _ in 0..4 {
            if let Some(AppEvent::ReplayTick(g)) = rx.recv().await {
                state.on_replay_tick(g);
            }
        }
        state.toggle_pause();
        assert_eq!(state.playback(), Playback::Paused);
        let frozen = state.session.replay().map(|r| r.buffer().text());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err(), "no ticks while paused");
        assert_eq!(state.session.replay().map(|r| r.buffer().text()), frozen);
        assert_eq!(frozen.as_deref(), Some("abc"));

        state.toggle_pause();
        drain(&mut state, &mut rx).await;
        assert_eq!(state.session.replay().map(|r| r.buffer().text()).as_deref(), Some("abcdef"));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_waits_out_the_rest_of_the_initial_delay() {
        let (mut state, _rx) = state_with(Recorder::default());
        state.apply_history(payload("@@ -0,0 +1 @@\n+abc"));
        tokio::time::advance(Duration::from_millis(2)).await;

        state.toggle_pause();
        assert_eq!(state.playback(), Playback::Paused);
        tokio::time::advance(Duration::from_secs(1)).await;
        state.toggle_pause();

        assert_eq!(state.playback(), Playback::Waiting);
        assert_eq!(state.timer.remaining(), Some(Duration::from_millis(3)));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_after_a_finished_line_keeps_the_line_pause() {
        let (mut state, mut rx) = state_with(Recorder::default());
        state.apply_history(payload("@@ -0,0 +1,2 @@\n+a\n+b"));

        // Start tick, then the only character of the first line.
        for _ in 0..2 {
            if let Some(AppEvent::ReplayTick(g)) = rx.recv().await {
                state.on_replay_tick(g);
            }
        }
        let pause = state.session.pacing().pause;
        assert_eq!(state.timer.remaining(), Some(pause));

        state.toggle_pause();
        state.toggle_pause();
        assert_eq!(state.timer.remaining(), Some(pause));
        assert_ne!(pause, state.session.pacing().char_interval());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_ticks_are_ignored() {
        let (mut state, _rx) = state_with(Recorder::default());
        state.apply_history(payload("@@ -0,0 +1 @@\n+x"));
        let old = state.session.generation();
        state.restart();
        state.on_replay_tick(old);
        assert_eq!(state.session.replay().map(|r| r.state().phase), Some(Phase::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn equal_reload_keeps_playing_and_new_content_restarts() {
        let (mut state, mut rx) = state_with(Recorder::default());
        state.apply_history(payload("@@ -0,0 +1 @@\n+hello"));
        for _ in 0..3 {
            if let Some(AppEvent::ReplayTick(g)) = rx.recv().await {
                state.on_replay_tick(g);
            }
        }
        let generation = state.session.generation();

        state.apply_history(payload("@@ -0,0 +1 @@\n+hello"));
        assert_eq!(state.session.generation(), generation);
        assert_eq!(state.keystrokes.typed, 2);

        state.apply_history(payload("@@ -0,0 +1 @@\n+world"));
        assert_eq!(state.session.generation(), generation + 1);
        assert_eq!(state.keystrokes, Keystrokes::default());
        assert_eq!(state.playback(), Playback::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn sound_off_keeps_the_bell_quiet() {
        let recorder = Recorder::default();
        let (mut state, mut rx) = state_with(recorder.clone());
        state.toggle_sound();
        state.apply_history(payload("@@ -0,0 +1 @@\n+abc"));
        drain(&mut state, &mut rx).await;
        assert_eq!(state.keystrokes.typed, 3);
        assert!(recorder.0.lock().map(|v| v.is_empty()).unwrap_or(false));
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_empty_history_never_starts() {
        let (mut state, _rx) = state_with(Recorder::default());
        state.request = Some(HistoryRequest::Json { path: "h.json".into() });
        state.apply_history(HistoryPayload {
            request: HistoryRequest::Json { path: "h.json".into() },
            result: Err(crate::history::types::HistoryError::BadUrl { url: "x".into() }),
        });
        assert_eq!(state.playback(), Playback::Failed);
        assert!(state.load_error.as_deref().unwrap_or("").contains("not a GitHub file URL"));

        state.apply_history(HistoryPayload {
            request: HistoryRequest::Json { path: "h.json".into() },
            result: Ok(Vec::new()),
        });
        assert_eq!(state.playback(), Playback::Empty);
        assert!(!state.timer.is_armed());
    }

    #[tokio::test]
    async fn request_without_worker_fails_fast() {
        let (mut state, _rx) = state_with(Recorder::default());
        state.request_history(HistoryRequest::Json { path: "h.json".into() });
        assert!(!state.loading);
        assert_eq!(state.playback(), Playback::Failed);
    }

    #[tokio::test]
    async fn request_reaches_the_worker_channel() {
        let (state, _rx) = state_with(Recorder::default());
        let (tx, worker_rx) = crossbeam_channel::unbounded();
        let mut state = state.with_history(tx);
        let request = HistoryRequest::Json { path: "h.json".into() };
        state.request_history(request.clone());
        state.reload();
        assert_eq!(worker_rx.try_iter().collect::<Vec<_>>(), vec![request.clone(), request]);
        assert_eq!(state.playback(), Playback::Loading);
    }

    #[tokio::test]
    async fn speed_steps_through_presets() {
        let (mut state, _rx) = state_with(Recorder::default());
        state.faster();
        assert_eq!(state.session.pacing().speed, TypingSpeed::Blitz);
        state.faster();
        state.faster();
        assert_eq!(state.session.pacing().speed, TypingSpeed::Quantum);
        state.slower();
        assert_eq!(state.session.pacing().speed, TypingSpeed::Blitz);
    }

    #[test]
    fn follow_keeps_reveal_line_in_view() {
        let mut replay_lines = String::from("@@ -0,0 +1,40 @@\n");
        for i in 0..40 {
            replay_lines.push_str(&format!("+line {i}\n"));
        }
        let mut session = ReplaySession::new(Language::PlainText, Pacing::default());
        session.load(vec![Commit { patch: Some(replay_lines), ..Default::default() }]);
        while session.replay().is_some_and(|r| !r.is_finished()) {
            session.tick();
        }

        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(session, TickTimer::new(tx), false, Box::new(Recorder::default()));
        state.sync_scroll(10);
        // Last line typed is line 40 (index 39), centred in a 10-row view.
        assert_eq!(state.editor_scroll, 34);

        state.scroll_up(30);
        assert!(!state.follow);
        state.sync_scroll(10);
        assert_eq!(state.editor_scroll, 4);

        state.scroll_down(1_000);
        assert_eq!(state.editor_scroll, 39);
    }
}
