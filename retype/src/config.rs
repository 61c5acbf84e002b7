//! Command line and config file for retype.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! `$XDG_CONFIG_HOME/retype/config.toml`, then command line flags. Config
//! file problems are soft failures: they are logged and the defaults stay.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use retype_core::{Language, Pacing, TypingSpeed};
use serde::Deserialize;

use crate::history::github::BlobUrl;
use crate::history::types::HistoryRequest;

const DEFAULT_THEME: &str = "catppuccin-mocha";

/// retype - replay a file's commit history as live typing
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "retype")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// File to replay (relative to the repository root) or a GitHub file URL
    ///
    /// GitHub URLs look like https://github.com/<owner>/<repo>/blob/<branch>/<path>
    /// and are resolved against the local clone given by --repo.
    pub target: Option<String>,

    /// Repository to read history from (any directory inside its work tree)
    #[arg(short, long, default_value = ".", env = "RETYPE_REPO")]
    pub repo: PathBuf,

    /// Revision to walk back from [default: HEAD, or the URL's branch]
    #[arg(long)]
    pub rev: Option<String>,

    /// Replay a saved history payload instead of a repository
    ///
    /// Accepts a JSON array of commits or the proxy envelope {"data": [...]}.
    #[arg(long, conflicts_with = "target")]
    pub json: Option<PathBuf>,

    /// Language hint as an extension or file name, e.g. `py` or `app.tsx`
    #[arg(long)]
    pub lang: Option<String>,

    /// Replay only the most recent N commits that touch the file
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Typing speed: zen, flow, blitz, quantum, or characters per second
    #[arg(short, long)]
    pub speed: Option<TypingSpeed>,

    /// Delay before the first keystroke, in milliseconds
    #[arg(long, value_name = "MS")]
    pub initial_delay: Option<u64>,

    /// Pause after each typed or erased line, in milliseconds
    #[arg(long, value_name = "MS")]
    pub pause: Option<u64>,

    /// Color theme: dark or catppuccin-mocha
    #[arg(long)]
    pub theme: Option<String>,

    /// Ring the terminal bell as lines are typed
    #[arg(long, conflicts_with = "mute")]
    pub sound: bool,

    /// Never ring the bell, even if the config file enables it
    #[arg(long)]
    pub mute: bool,

    /// Config file to read instead of the default location
    #[arg(long, env = "RETYPE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub theme: Option<String>,
    /// Preset name or characters per second, as a string or a number.
    pub speed: Option<SpeedSetting>,
    pub initial_delay_ms: Option<u64>,
    pub pause_ms: Option<u64>,
    pub sound: Option<bool>,
}

/// `speed = "blitz"` and `speed = 30` are both accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SpeedSetting {
    Cps(u32),
    Name(String),
}

impl SpeedSetting {
    fn resolve(&self) -> Result<TypingSpeed, String> {
        match self {
            Self::Cps(cps) => cps.to_string().parse(),
            Self::Name(name) => name.parse(),
        }
    }
}

/// Final settings after layering defaults, file and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub theme: String,
    pub pacing: Pacing,
    pub sound: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Self {
        let file_speed = file.speed.as_ref().and_then(|s| match s.resolve() {
            Ok(speed) => Some(speed),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring speed from config file");
                None
            }
        });
        let speed = cli.speed.or(file_speed).unwrap_or_default();

        let mut pacing = Pacing::new(speed);
        if let Some(ms) = cli.pause.or(file.pause_ms) {
            pacing = pacing.with_pause(Duration::from_millis(ms));
        }
        if let Some(ms) = cli.initial_delay.or(file.initial_delay_ms) {
            pacing = pacing.with_initial_delay(Duration::from_millis(ms));
        }

        let sound = if cli.mute { false } else { cli.sound || file.sound.unwrap_or(false) };

        Self {
            theme: cli
                .theme
                .clone()
                .or_else(|| file.theme.clone())
                .unwrap_or_else(|| DEFAULT_THEME.to_owned()),
            pacing,
            sound,
        }
    }
}

/// Returns the path of the config file.
///
/// Prefers `$XDG_CONFIG_HOME/retype/config.toml`; falls back to
/// `~/.config/retype/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("retype").join("config.toml")
}

/// Directory for the log file: `$XDG_STATE_HOME/retype`, or `~/.local/state/retype`.
pub fn state_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("retype")
}

fn xdg_dir(var: &str, home_relative: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(home_relative)))
        .unwrap_or_else(|| PathBuf::from(home_relative))
}

/// Reads the config file. A missing file is silent; an unreadable or invalid
/// one is logged and ignored.
pub fn load_file_config(path: &Path) -> FileConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FileConfig::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
            return FileConfig::default();
        }
    };
    parse_file_config(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "config parse error, using defaults");
        FileConfig::default()
    })
}

fn parse_file_config(raw: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(raw)
}

/// Turns the command line into the request the history worker serves.
///
/// # Errors
///
/// Fails when no history source was given or a GitHub URL is malformed.
pub fn history_request(cli: &Cli) -> anyhow::Result<HistoryRequest> {
    let limit = cli.limit.map(|n| usize::try_from(n).unwrap_or(usize::MAX));

    if let Some(path) = &cli.json {
        return Ok(HistoryRequest::Json { path: path.clone() });
    }

    let Some(target) = cli.target.as_deref() else {
        bail!("nothing to replay: pass a file path, a GitHub file URL, or --json <FILE>");
    };

    if target.starts_with("http://") || target.starts_with("https://") {
        let url = BlobUrl::parse(target).context("cannot replay this URL")?;
        tracing::info!(repo = %url.slug(), branch = %url.branch, path = %url.path, "resolving GitHub URL against local clone");
        return Ok(HistoryRequest::Repo {
            repo: cli.repo.clone(),
            file: url.path,
            rev: cli.rev.clone().unwrap_or(url.branch),
            limit,
        });
    }

    Ok(HistoryRequest::Repo {
        repo: cli.repo.clone(),
        file: target.trim_start_matches("./").to_owned(),
        rev: cli.rev.clone().unwrap_or_else(|| "HEAD".to_owned()),
        limit,
    })
}

/// Language hint: `--lang` when given, otherwise the replayed file's extension.
pub fn language(cli: &Cli, request: &HistoryRequest) -> Language {
    match cli.lang.as_deref() {
        Some(hint) if hint.contains('.') => Language::from_path(hint),
        Some(ext) => Language::from_extension(ext),
        None => Language::from_path(request.file_path()),
    }
}
