//! The single replay timer.
//!
//! The engine never sleeps; after every step it says how long to wait. A
//! `TickTimer` turns that wait into exactly one `AppEvent::ReplayTick` on the
//! event bus. At most one timer task is alive at a time: arming again aborts
//! the pending one, and dropping the timer aborts it too, so no tick can
//! outlive the replay it belongs to.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::event::AppEvent;

/// Cancellable one-shot timer feeding the event bus.
#[derive(Debug)]
pub struct TickTimer {
    tx: UnboundedSender<AppEvent>,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    handle: JoinHandle<()>,
    deadline: Instant,
}

impl TickTimer {
    pub fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx, pending: None }
    }

    /// Schedules a `ReplayTick(generation)` after `wait`, replacing any pending tick.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, wait: Duration, generation: u64) {
        self.cancel();
        let tx = self.tx.clone();
        let deadline = Instant::now() + wait;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(AppEvent::ReplayTick(generation));
        });
        self.pending = Some(Pending { handle, deadline });
    }

    /// Drops the pending tick, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }

    /// Whether a tick is scheduled and has not been delivered yet.
    pub fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.handle.is_finished())
    }

    /// Time left before the pending tick fires; zero once it is due.
    /// `None` when nothing was armed since the last `cancel`.
    pub fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
