//! Replay engine: an explicit state object plus a `tick` transition.
//!
//! One call to [`tick`] advances the replay by exactly one discrete unit:
//!
//! - **add**: the first tick inserts an empty line at the target (clamped,
//!   absent = append); every tick appends one character. Completing the
//!   line is followed by the inter-operation pause.
//! - **remove**: `char_index` counts down from the text length. Each tick
//!   trims one trailing character; the tick at zero deletes the line, so a
//!   text of N characters takes N + 1 ticks. A target that does not exist is
//!   clamped to "nothing to remove": the ticks still elapse.
//! - **context**: one tick writes (or appends) the whole line, no pause.
//!
//! Every tick reports how long the caller should wait before the next one,
//! or that the replay finished. The engine never sleeps or spawns anything
//! itself; timing belongs to whoever drives it.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::buffer::LineBuffer;
use crate::types::{CommitMeta, LineOperation, OperationKind, Timeline};

/// Breath between two animated operations. Independent of the typing speed.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(500);

/// Delay between data becoming available and the first tick.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Typing speed in characters per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypingSpeed {
    /// 10 cps.
    Zen,
    /// 20 cps.
    #[default]
    Flow,
    /// 40 cps.
    Blitz,
    /// 80 cps.
    Quantum,
    /// Any positive rate; zero is treated as 1.
    Custom(u32),
}

impl TypingSpeed {
    pub const PRESETS: [TypingSpeed; 4] =
        [TypingSpeed::Zen, TypingSpeed::Flow, TypingSpeed::Blitz, TypingSpeed::Quantum];

    pub fn chars_per_second(self) -> u32 {
        match self {
            Self::Zen => 10,
            Self::Flow => 20,
            Self::Blitz => 40,
            Self::Quantum => 80,
            Self::Custom(cps) => cps.max(1),
        }
    }

    /// `1000 / cps` milliseconds, computed in microseconds so presets stay exact.
    pub fn char_interval(self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.chars_per_second()))
    }

    /// Next faster preset. Custom speeds snap to the first preset above them.
    pub fn faster(self) -> Self {
        let cps = self.chars_per_second();
        Self::PRESETS
            .into_iter()
            .find(|p| p.chars_per_second() > cps)
            .unwrap_or(Self::Quantum)
    }

    /// Next slower preset. Custom speeds snap to the first preset below them.
    pub fn slower(self) -> Self {
        let cps = self.chars_per_second();
        Self::PRESETS
            .into_iter()
            .rev()
            .find(|p| p.chars_per_second() < cps)
            .unwrap_or(Self::Zen)
    }
}

impl fmt::Display for TypingSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zen => f.write_str("zen"),
            Self::Flow => f.write_str("flow"),
            Self::Blitz => f.write_str("blitz"),
            Self::Quantum => f.write_str("quantum"),
            Self::Custom(cps) => write!(f, "{cps} cps"),
        }
    }
}

impl FromStr for TypingSpeed {
    type Err = String;

    /// Accepts a preset name (`zen`, `flow`, `blitz`, `quantum`) or a positive integer cps.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zen" => Ok(Self::Zen),
            "flow" => Ok(Self::Flow),
            "blitz" => Ok(Self::Blitz),
            "quantum" => Ok(Self::Quantum),
            other => match other.parse::<u32>() {
                Ok(0) => Err("typing speed must be positive".to_owned()),
                Ok(cps) => Ok(Self::PRESETS
                    .into_iter()
                    .find(|p| p.chars_per_second() == cps)
                    .unwrap_or(Self::Custom(cps))),
                Err(_) => Err(format!(
                    "unknown typing speed {s:?} (expected zen, flow, blitz, quantum or a number)"
                )),
            },
        }
    }
}

/// Timing configuration handed to [`tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pacing {
    pub speed: TypingSpeed,
    pub pause: Duration,
    pub initial_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(TypingSpeed::default())
    }
}

impl Pacing {
    pub fn new(speed: TypingSpeed) -> Self {
        Self { speed, pause: DEFAULT_PAUSE, initial_delay: DEFAULT_INITIAL_DELAY }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn char_interval(&self) -> Duration {
        self.speed.char_interval()
    }
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayEvent {
    /// One character typed.
    Typed,
    /// One character erased.
    Deleted,
    /// A new line was opened for an add operation.
    LineBreak,
    /// The commit at this timeline index became active.
    CommitStarted(usize),
    /// The last operation of the last commit completed.
    Finished,
}

impl ReplayEvent {
    /// Whether this is a per-character feedback signal (typed / deleted / line break).
    pub fn is_signal(self) -> bool {
        matches!(self, Self::Typed | Self::Deleted | Self::LineBreak)
    }
}

/// When the next tick should happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    After(Duration),
    Finished,
}

/// Result of one [`tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub events: Vec<ReplayEvent>,
    pub next: Next,
}

impl TickOutcome {
    fn after(events: Vec<ReplayEvent>, wait: Duration) -> Self {
        Self { events, next: Next::After(wait) }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Loaded, waiting for the first tick.
    #[default]
    Idle,
    Running,
    /// Terminal. The buffer keeps its final content.
    Finished,
}

/// The mutable playback cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayState {
    pub phase: Phase,
    pub commit_index: usize,
    pub operation_index: usize,
    /// Characters typed so far (add) or characters still on the line (remove).
    pub char_index: usize,
    pub buffer: LineBuffer,
    /// Timeline index of the commit whose metadata is on display.
    pub active: Option<usize>,
    /// Placeholder text shown for a commit that carried no content.
    pub notice: Option<String>,
    /// 1-based line the display should keep in view; 0 when nothing was touched yet.
    pub reveal_line: usize,
    line_index: Option<usize>,
    op_started: bool,
}

impl ReplayState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Advances `state` by one unit of work.
///
/// The first tick of an idle replay activates commit 0 without touching the
/// buffer. Ticking a finished replay is a no-op.
pub fn tick(state: &mut ReplayState, timeline: &Timeline, pacing: &Pacing) -> TickOutcome {
    match state.phase {
        Phase::Finished => return TickOutcome { events: Vec::new(), next: Next::Finished },
        Phase::Idle => {
            state.phase = Phase::Running;
            state.commit_index = 0;
            state.operation_index = 0;
            return seek_commit(state, timeline, pacing.char_interval(), Vec::new());
        }
        Phase::Running => {}
    }

    let Some(op) = timeline.operation(state.commit_index, state.operation_index) else {
        // Cursor past the end of a commit; resynchronise on the next one.
        state.commit_index += 1;
        state.operation_index = 0;
        return seek_commit(state, timeline, pacing.char_interval(), Vec::new());
    };

    let mut events = Vec::new();
    if !op.synthetic && !state.op_started {
        state.notice = None;
    }

    let completed = match op.kind {
        OperationKind::Add => type_step(state, op, pacing, &mut events),
        OperationKind::Remove => erase_step(state, op, pacing, &mut events),
        OperationKind::Context => Some(context_step(state, op, pacing)),
    };

    match completed {
        Some(wait) => complete_operation(state, timeline, wait, events),
        None => TickOutcome::after(events, pacing.char_interval()),
    }
}

/// One add tick. Returns the wait to apply if the operation just completed.
fn type_step(
    state: &mut ReplayState,
    op: &LineOperation,
    pacing: &Pacing,
    events: &mut Vec<ReplayEvent>,
) -> Option<Duration> {
    let index = match state.line_index {
        Some(index) => index,
        None => {
            let at = state.buffer.insertion_index(op.target_line);
            let index = state.buffer.insert(at, String::new());
            state.line_index = Some(index);
            state.op_started = true;
            events.push(ReplayEvent::LineBreak);
            index
        }
    };
    state.reveal_line = index + 1;

    if let Some(ch) = op.text.chars().nth(state.char_index) {
        state.buffer.push_char(index, ch);
        state.char_index += 1;
        events.push(ReplayEvent::Typed);
    }

    (state.char_index >= op.char_len()).then_some(pacing.pause)
}

/// One remove tick. Returns the wait to apply if the operation just completed.
fn erase_step(
    state: &mut ReplayState,
    op: &LineOperation,
    pacing: &Pacing,
    events: &mut Vec<ReplayEvent>,
) -> Option<Duration> {
    if !state.op_started {
        state.op_started = true;
        state.line_index = state.buffer.existing_index(op.target_line);
    }

    if state.char_index > 0 {
        state.char_index -= 1;
        if let Some(index) = state.line_index {
            let kept: String = op.text.chars().take(state.char_index).collect();
            state.buffer.set(index, kept);
            state.reveal_line = index + 1;
        }
        events.push(ReplayEvent::Deleted);
        return None;
    }

    if let Some(index) = state.line_index {
        state.buffer.remove(index);
        state.reveal_line = (index + 1).min(state.buffer.len());
    }
    Some(pacing.pause)
}

/// Applies a context line atomically and returns the wait before the next tick.
fn context_step(state: &mut ReplayState, op: &LineOperation, pacing: &Pacing) -> Duration {
    if op.synthetic {
        state.notice = Some(op.text.clone());
        return pacing.pause;
    }
    let index = match op.target_line {
        Some(line) => line.saturating_sub(1),
        None => state.buffer.len(),
    };
    let index = state.buffer.write_or_append(index, op.text.as_str());
    state.reveal_line = index + 1;
    pacing.char_interval()
}

fn complete_operation(
    state: &mut ReplayState,
    timeline: &Timeline,
    wait: Duration,
    events: Vec<ReplayEvent>,
) -> TickOutcome {
    state.operation_index += 1;
    let commit_len = timeline.commit(state.commit_index).map_or(0, |c| c.ops.len());
    if state.operation_index < commit_len {
        enter_operation(state, timeline);
        return TickOutcome::after(events, wait);
    }
    state.commit_index += 1;
    state.operation_index = 0;
    seek_commit(state, timeline, wait, events)
}

/// Moves to the first commit at or after `commit_index` that has operations,
/// or finishes the replay when there is none.
fn seek_commit(
    state: &mut ReplayState,
    timeline: &Timeline,
    wait: Duration,
    mut events: Vec<ReplayEvent>,
) -> TickOutcome {
    while timeline.commit(state.commit_index).is_some_and(|c| c.ops.is_empty()) {
        state.commit_index += 1;
    }
    if state.commit_index >= timeline.len() {
        state.phase = Phase::Finished;
        state.char_index = 0;
        state.op_started = false;
        state.line_index = None;
        events.push(ReplayEvent::Finished);
        return TickOutcome { events, next: Next::Finished };
    }
    state.active = Some(state.commit_index);
    enter_operation(state, timeline);
    events.push(ReplayEvent::CommitStarted(state.commit_index));
    TickOutcome::after(events, wait)
}

fn enter_operation(state: &mut ReplayState, timeline: &Timeline) {
    state.op_started = false;
    state.line_index = None;
    state.char_index = match timeline.operation(state.commit_index, state.operation_index) {
        Some(op) if op.kind == OperationKind::Remove => op.char_len(),
        _ => 0,
    };
}

/// A timeline, its pacing, and the state replaying it.
#[derive(Debug, Clone)]
pub struct Replay {
    timeline: Timeline,
    pacing: Pacing,
    state: ReplayState,
}

impl Replay {
    pub fn new(timeline: Timeline, pacing: Pacing) -> Self {
        Self { timeline, pacing, state: ReplayState::new() }
    }

    pub fn tick(&mut self) -> TickOutcome {
        tick(&mut self.state, &self.timeline, &self.pacing)
    }

    /// Ticks until the replay finishes and returns how many ticks that took.
    pub fn run_to_end(&mut self) -> usize {
        let mut ticks = 0;
        loop {
            ticks += 1;
            if self.tick().next == Next::Finished {
                return ticks;
            }
        }
    }

    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Changes the typing speed for every following tick without resetting progress.
    pub fn set_speed(&mut self, speed: TypingSpeed) {
        self.pacing.speed = speed;
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.state.buffer
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase == Phase::Finished
    }

    pub fn active_commit(&self) -> Option<&CommitMeta> {
        self.state.active.and_then(|i| self.timeline.commit(i)).map(|c| &c.meta)
    }

    /// The operation the next tick will work on, if any.
    pub fn current_operation(&self) -> Option<&LineOperation> {
        match self.state.phase {
            Phase::Running => {
                self.timeline.operation(self.state.commit_index, self.state.operation_index)
            }
            Phase::Idle | Phase::Finished => None,
        }
    }
}
