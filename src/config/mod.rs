//! Preference persistence
//!
//! Saved device/app combos, launch history and last-used HUD settings,
//! stored as JSON under `~/Library/Application Support/hudctl/` with
//! atomic writes to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::{AppData, HudSettings, MAX_HISTORY, SavedCombo};
