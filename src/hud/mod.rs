//! Metal HUD configuration
//!
//! Presets, overlay elements, placement and scale, plus the derivation of
//! the `MTL_HUD_*` environment variables a launch injects.

pub mod config;
pub mod elements;

pub use config::{HudAlignment, HudConfig, HudPreset, HudScale};
pub use elements::HudElement;
