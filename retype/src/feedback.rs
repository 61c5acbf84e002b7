//! Keystroke feedback.
//!
//! The engine reports `Typed`, `Deleted` and `LineBreak` signals on every
//! tick. They are fire-and-forget: counting them for the status bar and
//! ringing the terminal bell must never hold up the next tick.

use std::io::{Stderr, Write};

use retype_core::ReplayEvent;

/// Receiver of per-keystroke signals.
pub trait FeedbackSink {
    fn signal(&mut self, event: ReplayEvent);
}

/// Running totals shown in the status bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keystrokes {
    pub typed: u64,
    pub deleted: u64,
    pub lines: u64,
}

impl Keystrokes {
    pub fn total(&self) -> u64 {
        self.typed + self.deleted
    }
}

impl FeedbackSink for Keystrokes {
    fn signal(&mut self, event: ReplayEvent) {
        match event {
            ReplayEvent::Typed => self.typed += 1,
            ReplayEvent::Deleted => self.deleted += 1,
            ReplayEvent::LineBreak => self.lines += 1,
            ReplayEvent::CommitStarted(_) | ReplayEvent::Finished => {}
        }
    }
}

/// Rings the terminal bell (BEL, `0x07`) once per opened line.
pub struct Bell<W: Write> {
    out: W,
}

impl Bell<Stderr> {
    /// A bell on the terminal the TUI draws to.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> Bell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> FeedbackSink for Bell<W> {
    fn signal(&mut self, event: ReplayEvent) {
        if event == ReplayEvent::LineBreak {
            let _ = self.out.write_all(b"\x07").and_then(|()| self.out.flush());
        }
    }
}
