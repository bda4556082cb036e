//! Device listing and identity cache
//!
//! `devicectl list devices` prints a fixed-width table:
//!
//! ```text
//! Devices:
//! Name             Hostname                 Identifier      State                Model
//! Stewie?s iPad    Stewies-iPad.coredevice  12345678-ABCD   available (paired)   iPad (iPad17,1)
//! ```
//!
//! Columns are separated by runs of two or more spaces, and names may
//! themselves contain single spaces, so each line is split with a
//! reluctant fixed-width pattern rather than on whitespace. The hostname
//! column is not interesting and is skipped. Mis-encoded apostrophes show
//! up as `?` and are restored for display only.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::devicectl::runner::{ToolOutput, ToolRunner};
use crate::error::Result;

/// Number of header lines before the first device row.
const HEADER_LINES: usize = 2;

/// Fixed-width table row: name, hostname (skipped), identifier, state, model.
static DEVICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s{2,}.*?\s{2,}(.*?)\s{2,}(.*?)\s{2,}(.*)$")
        .expect("device table pattern is valid")
});

/// A connected (or previously paired) iOS device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// User-visible device name, e.g. "Stewie's iPad"
    pub name: String,
    /// Unique device identifier (UDID)
    pub udid: String,
    /// Connection state, e.g. "available (paired)"
    pub state: String,
    /// Model string, e.g. "iPad (iPad17,1)"
    pub model: String,
}

impl Device {
    /// Row used for terminal display, mirroring the table the tool prints.
    pub fn display_row(&self) -> String {
        format!("{:<40}  {:<40}  {}", self.name, self.state, self.model)
    }
}

/// Restore apostrophes that the tool's table encoding mangles into `?`.
pub fn restore_apostrophes(text: &str) -> String {
    text.replace('?', "'")
}

/// Parse the output of `devicectl list devices`.
///
/// Unparseable lines are skipped; an empty table yields an empty list.
pub fn parse_device_list(raw: &str) -> Vec<Device> {
    let mut devices = Vec::new();
    for line in raw.lines().skip(HEADER_LINES) {
        let Some(caps) = DEVICE_LINE.captures(line) else {
            continue;
        };
        let device = Device {
            name: caps[1].trim().to_string(),
            udid: caps[2].trim().to_string(),
            state: caps[3].trim().to_string(),
            model: caps[4].trim().to_string(),
        };
        if device.udid.is_empty() {
            continue;
        }
        debug!("Parsed device {} ({})", device.name, device.udid);
        devices.push(device);
    }
    devices
}

/// Run `devicectl list devices` and parse the table.
pub fn list_devices(runner: &dyn ToolRunner) -> Result<Vec<Device>> {
    let output = runner.run("xcrun", &["devicectl", "list", "devices"])?;
    if !output.success {
        warn!("devicectl list devices exited unsuccessfully");
    }
    Ok(parse_device_list(&output.text))
}

/// Resolve a user-supplied device query against the parsed list.
///
/// Matches the UDID exactly first, then the device name case-insensitively.
pub fn resolve_device<'a>(devices: &'a [Device], query: &str) -> Option<&'a Device> {
    devices
        .iter()
        .find(|d| d.udid == query)
        .or_else(|| {
            devices
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(query))
        })
}

/// Unpair a device: `devicectl manage unpair --device <udid>`.
pub fn unpair(runner: &dyn ToolRunner, udid: &str) -> Result<ToolOutput> {
    info!("Unpairing device {}", udid);
    runner.run("xcrun", &["devicectl", "manage", "unpair", "--device", udid])
}

/// Cache of device identity, refreshed from `list devices` on miss.
///
/// Display strings and advisory checks need the model for a UDID long after
/// the listing that produced it, so the udid → model mapping is kept behind
/// a lock and re-fetched wholesale when an unknown UDID shows up.
pub struct DeviceRegistry {
    runner: Arc<dyn ToolRunner>,
    models: Mutex<HashMap<String, String>>,
}

impl DeviceRegistry {
    /// Create an empty registry backed by the given runner.
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            runner,
            models: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the cached mapping from a freshly parsed device list.
    pub fn update_from(&self, devices: &[Device]) {
        let mut models = self.models.lock();
        models.clear();
        for device in devices {
            models.insert(device.udid.clone(), device.model.clone());
        }
    }

    /// Model string for a UDID, e.g. "iPad (iPad17,1)".
    ///
    /// Refreshes the whole cache on a miss; falls back to the UDID itself
    /// when the device is still unknown (matching how the original tool
    /// degrades its display strings).
    pub fn model_for(&self, udid: &str) -> String {
        if udid.is_empty() {
            return "Unknown Device".to_string();
        }
        if let Some(model) = self.models.lock().get(udid) {
            return model.clone();
        }
        match list_devices(self.runner.as_ref()) {
            Ok(devices) => self.update_from(&devices),
            Err(e) => warn!("Device cache refresh failed: {}", e),
        }
        self.models
            .lock()
            .get(udid)
            .cloned()
            .unwrap_or_else(|| udid.to_string())
    }
}
