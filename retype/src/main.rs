//! retype: watch a file's git history typed out, one keystroke at a time.
//!
//! Entry point for the `retype` binary. Wires together the terminal lifecycle
//! (`tui`), the unified event bus (`event`), the history worker (`history`),
//! the replay timer (`timer`), and the renderer (`ui`).
//!
//! # Startup sequence
//!
//! 1. Parse flags, start file logging, read `config.toml`. Bad arguments fail
//!    here, before the terminal is touched.
//! 2. `install_panic_hook()` so a panic restores the terminal first.
//! 3. `register_sigterm()`; the flag is polled in the event loop.
//! 4. `init_tui()` enters the alternate screen and raw mode and titles the
//!    window after the replayed file.
//! 5. Spawn the input task and the history worker, then send the first request.
//!
//! `restore_tui()` runs after the event loop exits, whatever the reason. Inside
//! the loop `?` is only used on `terminal.draw()`, whose error breaks out to
//! the same restore path.

mod app;
mod config;
mod event;
mod feedback;
mod history;
mod theme;
mod timer;
mod tui;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use retype_core::ReplaySession;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::AppState;
use crate::config::{Cli, Settings};
use crate::event::AppEvent;
use crate::feedback::Bell;
use crate::ui::keybindings::{KeyAction, handle_key, handle_mouse};

/// Environment variable holding the log filter, e.g. `RETYPE_LOG=debug`.
const LOG_ENV: &str = "RETYPE_LOG";

/// Sends `tracing` output to `<dir>/retype.log`; the terminal belongs to the TUI.
fn init_tracing(dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let log_path = dir.join("retype.log");
    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&config::state_dir())?;

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let file_config = config::load_file_config(&config_path);
    let settings = Settings::resolve(&cli, &file_config);
    let request = config::history_request(&cli)?;
    let language = config::language(&cli, &request);
    let theme = theme::Theme::from_name(&settings.theme);
    info!(source = %request.label(), language = language.name(), speed = %settings.pacing.speed, "starting");

    ui::highlight::warm_up();

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui(&request.file_path())?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let history_tx = match history::spawn_history_worker(handler.tx.clone()) {
        Ok(tx) => tx,
        Err(e) => {
            tui::restore_tui()?;
            return Err(e).context("cannot start the history worker");
        }
    };

    let session = ReplaySession::new(language, settings.pacing);
    let timer = timer::TickTimer::new(handler.tx.clone());
    let mut state = AppState::new(session, timer, settings.sound, Box::new(Bell::stderr()))
        .with_history(history_tx);
    state.request_history(request);

    // Exits only via `break`, so `restore_tui()` below is always reached.
    let result: anyhow::Result<()> = 'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when idle.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop Ok(());
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            break 'event_loop Err(e.into());
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop Ok(());
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    // ratatui picks up the new size on the next draw.
                    Some(AppEvent::Resize(_, _)) => {}
                    Some(AppEvent::Tick) => state.on_tick(),
                    Some(AppEvent::ReplayTick(generation)) => state.on_replay_tick(generation),
                    Some(AppEvent::History(payload)) => state.apply_history(*payload),
                    Some(AppEvent::Quit) | None => break 'event_loop Ok(()),
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop Ok(());
                }
            }
        }
    };

    tui::restore_tui()?;
    info!(keystrokes = state.keystrokes.total(), "exiting");
    result
}
