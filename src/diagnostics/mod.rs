//! Launch log analysis
//!
//! `devicectl --console` streams the app's console output back, and a
//! handful of known failure signatures hide in it: Developer Mode being
//! off, games rendering through OpenGL (where the HUD cannot draw),
//! anti-cheat reactions from specific titles, and missing Developer Disk
//! Images on brand-new hardware.
//!
//! Detection is split into pure predicates over captured text, and an
//! [`AdvisoryLatch`] that makes each advisory fire at most once per run so
//! a chatty log does not repeat the same warning every line.

use std::collections::HashSet;

use parking_lot::Mutex;
use tracing::warn;

/// Log fragments indicating the Farlight 84 client rejected the HUD.
pub const FARLIGHT_LOG_INDICATORS: &[&str] = &[
    "device anomaly detected",
    "temporarily unable to access the game",
    "0-3-2048",
    "accesskeyid not found",
    "solarlandclient",
    "farlight",
];

/// Log fragments indicating the Developer Disk Image failed to mount.
pub const DDI_ERROR_KEYWORDS: &[&str] = &[
    "developer disk image could not be mounted",
    "missing the requested variant for this device",
    "kamdmobileimagemounterpersonalizedbundlemissingvarianterror",
    "unable to find a valid ddi for the ios platform",
    "unable to find a developer disk image to use for the ios platform",
    "ddi not found",
    "0xe800010f",
    "com.apple.mobiledevice error -402652913",
    "com.apple.dt.coredeviceerror error 12001",
    "com.apple.dt.coredeviceerror error 12007",
];

/// Device models that need a Developer Disk Image newer than stable Xcode
/// ships (the M5 iPad Pro family).
const DDI_AFFECTED_MODEL: &str = "ipad17,1";

/// Developer Mode is turned off on the device.
pub fn detect_developer_mode_disabled(output: &str) -> bool {
    output.contains("Developer Mode is disabled")
}

/// The app renders through OpenGL, where the Metal HUD cannot draw.
pub fn detect_opengl(output: &str) -> bool {
    output.contains("OpenGL")
}

/// Warzone's anti-cheat tore the app down.
///
/// Requires both the telemetry endpoint and the signal-10 termination; the
/// endpoint alone shows up in harmless logs too.
pub fn detect_warzone_anti_cheat(output: &str) -> bool {
    if output.is_empty() {
        return false;
    }
    let text = output.to_lowercase();
    text.contains("telemetry.codefusion.technology") && text.contains("app terminated due to signal 10")
}

/// Farlight 84 flagged the HUD as a device anomaly.
///
/// Called per-line as logs stream in; any known indicator counts.
pub fn detect_farlight_issue(output: &str) -> bool {
    if output.is_empty() {
        return false;
    }
    let text = output.to_lowercase();
    FARLIGHT_LOG_INDICATORS
        .iter()
        .any(|indicator| text.contains(indicator))
}

/// The Developer Disk Image for an M5 iPad Pro could not be mounted.
///
/// Only fires for the affected model; the keywords alone appear in noise
/// on other hardware.
pub fn detect_missing_ddi(model: &str, output: &str) -> bool {
    if model.is_empty() || output.is_empty() {
        return false;
    }
    if !model.to_lowercase().contains(DDI_AFFECTED_MODEL) {
        return false;
    }
    let text = output.to_lowercase();
    DDI_ERROR_KEYWORDS.iter().any(|key| text.contains(key))
}

/// A condition worth warning the user about, derived from launch output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advisory {
    /// Developer Mode is off on the device
    DeveloperModeDisabled,
    /// OpenGL rendering detected
    OpenGlDetected,
    /// COD Warzone anti-cheat reaction
    WarzoneAntiCheat,
    /// Farlight 84 anomaly detection
    FarlightAnomaly,
    /// Developer Disk Image missing for this device
    MissingDeveloperDiskImage,
}

impl Advisory {
    /// Message shown to the user when the advisory fires.
    pub fn message(self) -> &'static str {
        match self {
            Advisory::DeveloperModeDisabled => {
                "Operation failed because Developer Mode is disabled on your iPhone or iPad.\n\
                 Go to Settings > Privacy & Security > Developer Mode on your device to enable it."
            }
            Advisory::OpenGlDetected => {
                "Warning: OpenGL detected in the logs. Metal HUD may not work!"
            }
            Advisory::WarzoneAntiCheat => {
                "Note! Metal HUD doesn't work with COD Warzone due to anti-cheat. \
                 The game may crash if you try to use it."
            }
            Advisory::FarlightAnomaly => {
                "Note! Metal HUD does not work with Farlight 84 (SolarlandClient.app).\n\
                 The game detects the HUD as a device anomaly and will refuse to run. \
                 In-game you may see: \"Device anomaly detected. Temporarily unable to access the game. (0-3-2048)\".\n\
                 Launch the game without the HUD to play."
            }
            Advisory::MissingDeveloperDiskImage => {
                "Your version of Xcode or Command Line Tools doesn't include the Developer Disk Image \
                 required for this iPad Pro (iPad17,1).\n\
                 Install the latest beta tools from https://developer.apple.com/download/all/"
            }
        }
    }
}

/// One-shot latch over launch output.
///
/// Scanning is cheap enough to run per streamed line; the latch remembers
/// which advisories already fired so each is reported once.
#[derive(Default)]
pub struct AdvisoryLatch {
    seen: Mutex<HashSet<Advisory>>,
}

impl AdvisoryLatch {
    /// Create a latch with nothing fired yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a chunk of output and return the advisories firing for the
    /// first time.
    ///
    /// `model` is the device's model string, used to gate the DDI check.
    pub fn scan(&self, model: &str, output: &str) -> Vec<Advisory> {
        let mut triggered = Vec::new();

        if detect_developer_mode_disabled(output) {
            triggered.push(Advisory::DeveloperModeDisabled);
        }
        if detect_opengl(output) {
            triggered.push(Advisory::OpenGlDetected);
        }
        if detect_warzone_anti_cheat(output) {
            triggered.push(Advisory::WarzoneAntiCheat);
        }
        if detect_farlight_issue(output) {
            triggered.push(Advisory::FarlightAnomaly);
        }
        if detect_missing_ddi(model, output) {
            triggered.push(Advisory::MissingDeveloperDiskImage);
        }

        let mut seen = self.seen.lock();
        triggered.retain(|advisory| seen.insert(*advisory));
        for advisory in &triggered {
            warn!("Advisory triggered: {:?}", advisory);
        }
        triggered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_developer_mode_detection() {
        assert!(detect_developer_mode_disabled(
            "ERROR: Developer Mode is disabled on this device"
        ));
        assert!(!detect_developer_mode_disabled("developer mode is disabled"));
    }

    #[test]
    fn test_warzone_requires_both_signatures() {
        assert!(!detect_warzone_anti_cheat(
            "connected to telemetry.codefusion.technology"
        ));
        assert!(!detect_warzone_anti_cheat("App terminated due to signal 10"));
        assert!(detect_warzone_anti_cheat(
            "Connected to Telemetry.codefusion.technology\nApp terminated due to SIGNAL 10"
        ));
        assert!(!detect_warzone_anti_cheat(""));
    }

    #[test]
    fn test_farlight_any_indicator() {
        assert!(detect_farlight_issue("SolarlandClient crashed"));
        assert!(detect_farlight_issue("error code 0-3-2048 returned"));
        assert!(!detect_farlight_issue("a perfectly fine log line"));
        assert!(!detect_farlight_issue(""));
    }

    #[test]
    fn test_missing_ddi_is_model_gated() {
        let output = "The developer disk image could not be mounted on this device.";
        assert!(detect_missing_ddi("iPad (iPad17,1)", output));
        assert!(!detect_missing_ddi("iPad (iPad16,3)", output));
        assert!(!detect_missing_ddi("iPad (iPad17,1)", "all good"));
        assert!(!detect_missing_ddi("", output));
    }

    #[test]
    fn test_ddi_error_code_keywords() {
        assert!(detect_missing_ddi(
            "iPad (iPad17,1)",
            "request failed: com.apple.dt.CoreDeviceError error 12001"
        ));
        assert!(detect_missing_ddi("ipad17,1", "mount failed with 0xE800010F"));
    }

    #[test]
    fn test_latch_fires_each_advisory_once() {
        let latch = AdvisoryLatch::new();
        let first = latch.scan("iPhone", "OpenGL renderer in use");
        assert_eq!(first, vec![Advisory::OpenGlDetected]);
        let second = latch.scan("iPhone", "OpenGL renderer in use");
        assert!(second.is_empty(), "advisory must not repeat");
        let third = latch.scan("iPhone", "Developer Mode is disabled");
        assert_eq!(third, vec![Advisory::DeveloperModeDisabled]);
    }

    #[test]
    fn test_latch_can_fire_multiple_advisories_in_one_chunk() {
        let latch = AdvisoryLatch::new();
        let output = "OpenGL in use\nSolarlandClient anomaly";
        let fired = latch.scan("iPad (iPad17,1)", output);
        assert!(fired.contains(&Advisory::OpenGlDetected));
        assert!(fired.contains(&Advisory::FarlightAnomaly));
    }

    #[test]
    fn test_messages_are_nonempty() {
        for advisory in [
            Advisory::DeveloperModeDisabled,
            Advisory::OpenGlDetected,
            Advisory::WarzoneAntiCheat,
            Advisory::FarlightAnomaly,
            Advisory::MissingDeveloperDiskImage,
        ] {
            assert!(!advisory.message().is_empty());
        }
    }
}
