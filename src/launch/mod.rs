//! Launch command build and orchestration
//!
//! [`command`] assembles the single `devicectl ... process launch`
//! invocation (and parses stored history entries back apart); [`launcher`]
//! runs it with the warm-up/relaunch dance on a worker thread.

pub mod command;
pub mod launcher;

pub use command::{HistoryEntry, LaunchCommand, LaunchRequest, parse_history_command};
pub use launcher::{LaunchEvent, Launcher};
