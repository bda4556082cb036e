//! Preference data models
//!
//! The on-disk JSON keeps the field names of the original data file
//! (`saved_paths`, `command_history`, `hud_settings`) so existing files
//! keep loading. HUD settings are stored as the display strings the file
//! has always held; [`AppData::hud_config`] turns them back into typed
//! values, falling back to defaults for anything unrecognized.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hud::{HudAlignment, HudConfig, HudElement, HudPreset, HudScale};

/// Launch history entries kept, newest first.
pub const MAX_HISTORY: usize = 10;

/// A named device/app pair the user chose to keep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedCombo {
    /// Target device UDID
    pub udid: String,
    /// Full bundle container path on the device
    #[serde(rename = "app_path")]
    pub bundle_path: String,
}

/// Persisted HUD choices, as display strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HudSettings {
    /// Preset label, e.g. "FPS Only"
    pub preset: String,
    /// Alignment label or internal token; both load
    pub alignment: String,
    /// Scale label, e.g. "Large"
    pub scale: String,
    /// Element token → 0/1 selection for the Custom preset
    pub custom_elements: BTreeMap<String, u8>,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            preset: HudPreset::Default.label().to_string(),
            alignment: HudAlignment::TopRight.label().to_string(),
            scale: HudScale::Default.label().to_string(),
            custom_elements: BTreeMap::new(),
        }
    }
}

/// Top-level persisted state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppData {
    /// Saved device/app combos, keyed by the user-chosen name
    #[serde(rename = "saved_paths")]
    pub saved_combos: BTreeMap<String, SavedCombo>,
    /// Launch history as full command strings, newest first
    #[serde(rename = "command_history")]
    pub history: Vec<String>,
    /// Last-used HUD choices
    #[serde(rename = "hud_settings")]
    pub hud: HudSettings,
}

impl AppData {
    /// Record a launch command at the front of the history.
    ///
    /// Already-known commands are left where they are. The list is capped
    /// at [`MAX_HISTORY`]. Returns whether anything changed.
    pub fn record_history(&mut self, cmd: &str) -> bool {
        if self.history.iter().any(|c| c == cmd) {
            return false;
        }
        self.history.insert(0, cmd.to_string());
        self.history.truncate(MAX_HISTORY);
        true
    }

    /// Typed HUD configuration from the persisted strings.
    ///
    /// Unrecognized presets, alignments, scales or element tokens fall
    /// back to defaults rather than failing the load.
    pub fn hud_config(&self) -> HudConfig {
        let preset = self.hud.preset.parse().unwrap_or_default();
        let alignment = self.hud.alignment.parse().unwrap_or_default();
        let scale = self.hud.scale.parse().unwrap_or_default();
        let custom_elements = HudElement::ALL
            .iter()
            .copied()
            .filter(|e| self.hud.custom_elements.get(e.token()) == Some(&1))
            .collect();
        HudConfig {
            preset,
            custom_elements,
            alignment,
            scale,
        }
    }

    /// Persist a typed HUD configuration back as display strings.
    ///
    /// Every element's selection state is written out, selected or not,
    /// mirroring the original file's full checkbox dump.
    pub fn set_hud_config(&mut self, config: &HudConfig) {
        self.hud.preset = config.preset.label().to_string();
        self.hud.alignment = config.alignment.label().to_string();
        self.hud.scale = config.scale.label().to_string();
        self.hud.custom_elements = HudElement::ALL
            .iter()
            .map(|e| {
                let selected = u8::from(config.custom_elements.contains(e));
                (e.token().to_string(), selected)
            })
            .collect();
    }
}
