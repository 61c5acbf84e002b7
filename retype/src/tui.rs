//! Terminal lifecycle for retype.
//!
//! The replay is drawn on stderr so stdout stays free for redirection; logs
//! go to a file (see `main.rs`). Entering the replay screen turns on raw mode,
//! the alternate screen and mouse capture (for wheel scrolling), and names the
//! window after the file being replayed. Leaving undoes all of it.

use std::io::{self, BufWriter, Stderr, Write, stderr};
use std::panic;
use std::sync::{Arc, atomic::AtomicBool};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use signal_hook::consts::SIGTERM;

/// Ratatui terminal over buffered stderr. Buffering keeps each one-character
/// frame to a single write.
pub type Tui = Terminal<CrosstermBackend<BufWriter<Stderr>>>;

/// Window title shown while `file` is being replayed.
pub fn window_title(file: &str) -> String {
    if file.is_empty() { "retype".to_owned() } else { format!("retype · {file}") }
}

/// Switches the terminal to the replay screen.
///
/// Pair every call with [`restore_tui`].
///
/// # Errors
///
/// Returns `Err` if raw mode, the screen switch or backend creation fails.
pub fn init_tui(file: &str) -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut out = BufWriter::new(stderr());
    execute!(out, EnterAlternateScreen, EnableMouseCapture, SetTitle(window_title(file)))?;
    Terminal::new(CrosstermBackend::new(out))
}

/// Leaves the replay screen. Safe to call more than once.
///
/// Every step is attempted even if an earlier one fails; the first error is
/// returned. ratatui does not restore on `Drop`, so the main exit path and the
/// panic hook both call this.
///
/// # Errors
///
/// Returns the first failure among leaving raw mode and the screen switch.
pub fn restore_tui() -> io::Result<()> {
    let raw = disable_raw_mode();
    let mut err = stderr();
    let screen = execute!(err, DisableMouseCapture, LeaveAlternateScreen).and_then(|()| err.flush());
    raw.and(screen)
}

/// Restores the terminal before the previous panic hook prints its message.
///
/// Install before [`init_tui`].
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_tui();
        previous(info);
    }));
}

/// Flag set by SIGTERM; the event loop checks it on every heartbeat.
///
/// # Errors
///
/// Returns `Err` if the handler cannot be registered.
pub fn register_sigterm() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, Arc::clone(&flag))?;
    Ok(flag)
}
