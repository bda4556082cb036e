//! Xcode toolchain environment checks
//!
//! `devicectl` needs a full Xcode installation with an accepted license,
//! and the newest iPads additionally need the beta toolchain for their
//! Developer Disk Image. These checks probe the environment the same way
//! the doctor command reports it: nothing here mutates the system beyond
//! the wireless pairing repair, which only drives `devicectl` itself.

pub mod version;

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::devicectl::runner::ToolRunner;
use crate::error::{HudctlError, Result, StringError};

pub use version::{MIN_MACOS_VERSION, MacosVersion, ensure_supported_macos};

/// Device models that require the Xcode beta toolchain.
pub const BETA_REQUIRED_MODELS: &[&str] = &["ipad17,1", "ipad17,2"];

/// Standard Xcode installation path.
const XCODE_APP: &str = "/Applications/Xcode.app";

/// Marker of a beta developer directory selection.
const XCODE_BETA_MARKER: &str = "Xcode-beta.app";

/// Pause between the wireless discovery start and stop.
const DISCOVERY_SETTLE: Duration = Duration::from_secs(2);

/// Whether Xcode is installed at the standard location.
pub fn xcode_installed() -> bool {
    Path::new(XCODE_APP).exists()
}

/// Currently selected developer directory (`xcode-select -p`).
pub fn developer_dir(runner: &dyn ToolRunner) -> Result<String> {
    let output = runner.run("xcode-select", &["-p"])?;
    if !output.success {
        return Err(HudctlError::DevicectlError(StringError::new(format!(
            "xcode-select -p failed: {}",
            output.text.trim()
        ))));
    }
    Ok(output.text.trim().to_string())
}

/// Whether the Xcode license has been accepted.
///
/// Probed the way the original tool does: `devicectl list devices` fails
/// outright until the license is accepted.
pub fn license_accepted(runner: &dyn ToolRunner) -> Result<bool> {
    let output = runner.run("xcrun", &["devicectl", "list", "devices"])?;
    Ok(output.success)
}

/// Whether a device model needs the beta toolchain.
pub fn beta_required(model: &str) -> bool {
    let model = model.to_lowercase();
    BETA_REQUIRED_MODELS.iter().any(|m| model.contains(m))
}

/// Whether the selected developer directory is a beta install.
pub fn beta_selected(developer_dir: &str) -> bool {
    developer_dir.contains(XCODE_BETA_MARKER)
}

/// Whether the device list shows the device connected wirelessly.
pub fn seen_wireless(device_list_output: &str) -> bool {
    device_list_output.to_lowercase().contains("wireless")
}

/// Best-effort pairing repair for M5 iPads connected wirelessly.
///
/// Their Developer Disk Image mount is flaky over the wireless transport;
/// cycling discovery and re-pairing usually restores it. Every step is
/// advisory: failures are logged and the launch proceeds regardless.
pub fn repair_wireless_pairing(runner: &dyn ToolRunner, udid: &str) {
    info!("Attempting wireless pairing repair for {}", udid);

    let steps: &[&[&str]] = &[
        &["devicectl", "discover", "start"],
        &["devicectl", "discover", "stop"],
        &["devicectl", "device", "pair", "--device", udid],
        &["devicectl", "device", "info", "--device", udid],
    ];

    for (i, args) in steps.iter().enumerate() {
        if let Err(e) = runner.run("xcrun", args) {
            warn!("Wireless repair step {:?} failed: {}", args, e);
        }
        // Let discovery settle before stopping it again
        if i == 0 {
            std::thread::sleep(DISCOVERY_SETTLE);
        }
    }
}
