//! History loading for retype.
//!
//! A dedicated `std::thread` serves [`types::HistoryRequest`]s: it reads saved
//! JSON payloads or walks a local repository with `git2`. `Repository` is
//! `!Send`, so it is opened inside that thread and never crosses a thread
//! boundary. GitHub blob URLs are turned into repository requests by
//! [`github::BlobUrl`].

pub mod github;
pub mod types;
pub mod worker;

use crossbeam_channel::Sender;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;
use types::HistoryRequest;

/// Starts the history thread and returns the request sender.
///
/// The thread exits once every clone of the returned sender is dropped.
///
/// # Errors
///
/// Returns `Err` if the OS cannot spawn the thread.
pub fn spawn_history_worker(
    event_tx: UnboundedSender<AppEvent>,
) -> std::io::Result<Sender<HistoryRequest>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::Builder::new()
        .name("retype-history".into())
        .spawn(move || worker::history_worker_loop(rx, event_tx))?;
    Ok(tx)
}
