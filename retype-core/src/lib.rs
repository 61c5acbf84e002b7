//! Core of retype: turns a file's commit history into line operations and
//! replays them, one keystroke per tick, against a line buffer.
//!
//! Nothing in this crate touches a terminal, a clock, or the network. The
//! front end decides when [`replay::tick`] runs and what to draw.

pub mod buffer;
pub mod error;
pub mod feed;
pub mod language;
pub mod normalize;
pub mod replay;
pub mod session;
pub mod types;

pub use buffer::LineBuffer;
pub use error::{FeedError, PatchError};
pub use language::Language;
pub use replay::{Next, Pacing, Phase, Replay, ReplayEvent, ReplayState, TickOutcome, TypingSpeed};
pub use session::{LoadOutcome, ReplaySession};
pub use types::{Change, Commit, CommitMeta, CommitOps, LineOperation, OperationKind, Timeline};
