//! Error types for `hudctl`
//!
//! This module defines all error types used throughout the application,
//! providing clear error messages and proper error propagation.
//!
//! Error variants use `#[source]` to preserve error chains for better
//! observability and debugging.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for `hudctl`
#[derive(Debug, Error)]
pub enum HudctlError {
    /// Failed to spawn an external tool (xcrun, xcode-select, sw_vers)
    #[error("Failed to run {tool}: {source}")]
    ToolSpawn {
        /// Program that could not be started
        tool: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but its output could not be used
    /// Preserves the underlying error source for full error chain transparency
    #[error("devicectl error: {0}")]
    DevicectlError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No device matched the requested identifier
    #[error("No device found for '{0}'")]
    DeviceNotFound(String),

    /// No connected devices at all
    #[error("No devices found")]
    NoDevices,

    /// No running app matched the requested name or path
    #[error("No running app found for '{0}'")]
    AppNotFound(String),

    /// A saved device/app combo was requested but does not exist
    #[error("No saved combo named '{0}'")]
    SavedComboNotFound(String),

    /// Launch orchestration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Failed to launch app: {0}")]
    LaunchFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An unrecognized HUD preset, element, alignment or scale name
    #[error("Unknown HUD option: {0}")]
    UnknownHudOption(String),

    /// The running macOS version is older than the minimum devicectl needs
    #[error("macOS {found} is not supported (requires {required} or later)")]
    UnsupportedMacos {
        /// Version reported by `sw_vers`
        found: String,
        /// Minimum supported version
        required: &'static str,
    },

    /// Xcode is not installed at /Applications/Xcode.app
    #[error("Xcode installation not found")]
    XcodeMissing,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for `hudctl` operations
pub type Result<T> = std::result::Result<T, HudctlError>;

/// Convert an error to a user-friendly message
///
/// Takes a `HudctlError` and returns a message suitable for printing to the
/// terminal, including troubleshooting hints for the common failure modes.
pub fn get_user_friendly_error(error: &HudctlError) -> String {
    match error {
        HudctlError::ToolSpawn { tool, .. } => {
            format!(
                "Could not run '{tool}'.\n\n\
                 Please ensure:\n\
                 - Xcode is installed from the App Store\n\
                 - The command line tools are selected (xcode-select -p)"
            )
        }
        HudctlError::DevicectlError(e) => {
            format!(
                "devicectl reported a problem:\n\n{e}\n\n\
                 Reconnect the device via USB and make sure it is unlocked."
            )
        }
        HudctlError::DeviceNotFound(udid) => {
            format!(
                "No device matched '{udid}'.\n\n\
                 Run 'hudctl devices' to see connected devices.\n\
                 Wireless devices only appear after pairing over USB once."
            )
        }
        HudctlError::NoDevices => "No devices found.\n\n\
             Please connect your device via USB. Wireless works after pairing."
            .to_string(),
        HudctlError::AppNotFound(name) => {
            format!(
                "No running app matched '{name}'.\n\n\
                 Make sure the game is open on the device, then run\n\
                 'hudctl apps' to list what is running."
            )
        }
        HudctlError::SavedComboNotFound(name) => {
            format!(
                "No saved combo named '{name}'.\n\n\
                 Run 'hudctl saved list' to see what has been saved."
            )
        }
        HudctlError::LaunchFailed(e) => {
            format!(
                "The app could not be launched:\n\n{e}\n\n\
                 If the Metal HUD doesn't appear, close and reopen the app\n\
                 on your device."
            )
        }
        HudctlError::ConfigError(_) => "Failed to load or save preferences.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to:\n\
             ~/Library/Application Support/hudctl"
            .to_string(),
        HudctlError::UnknownHudOption(name) => {
            format!(
                "Unknown HUD option: {name}\n\n\
                 Run 'hudctl launch --help' for the accepted presets,\n\
                 alignments, scales and elements."
            )
        }
        HudctlError::UnsupportedMacos { found, required } => {
            format!(
                "This tool requires macOS {required} or later.\n\
                 You are running {found}."
            )
        }
        HudctlError::XcodeMissing => "Xcode not found in Applications.\n\
             Please install it from the App Store. No need to open it after install."
            .to_string(),
        HudctlError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        HudctlError::JsonError(e) => {
            format!(
                "Preferences file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}
