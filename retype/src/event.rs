//! Event bus for retype.
//!
//! Terminal input, the render/tick intervals, replay timer firings, and
//! history-worker results are all funnelled into one `AppEvent` enum carried
//! over a tokio unbounded MPSC channel. The main loop is the only consumer.
//!
//! Two independent intervals drive the frame and housekeeping cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (100 ms) advances the loading spinner.
//!
//! Replay progress is *not* driven by either interval. The engine asks for a
//! wait after every step and [`crate::timer::TickTimer`] turns that wait into
//! a single [`AppEvent::ReplayTick`].

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::history::types::HistoryPayload;

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// A mouse event from the terminal (click, scroll, move).
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Housekeeping tick (spinner animation).
    Tick,
    /// Render tick, triggers a `terminal.draw()` call.
    Render,
    /// The replay timer fired. Carries the session generation it was armed for.
    ReplayTick(u64),
    /// Result from the history worker thread.
    History(Box<HistoryPayload>),
    /// Quit signal.
    Quit,
}

/// Holds the sender and receiver ends of the unified event channel.
pub struct EventHandler {
    /// Send half. Cloned into the timer, the history worker, and the input task.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Receive half, owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background task that forwards terminal input and interval ticks.
///
/// The task ends once every receiver is gone and a send fails. Key release and
/// repeat events are dropped so a keystroke is seen once on every platform.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(100));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(Event::Mouse(mouse))) => tx.send(AppEvent::Mouse(mouse)),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "terminal input stream error");
                        Ok(())
                    }
                    None => {
                        tracing::debug!("terminal input stream closed");
                        return;
                    }
                    _ => Ok(()),
                },
            };

            if sent.is_err() {
                return;
            }
        }
    });
}
