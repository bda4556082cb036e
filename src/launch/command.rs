//! Launch command construction and history-string parsing
//!
//! A launch is one `devicectl` invocation with the HUD environment embedded
//! as a JSON blob:
//!
//! ```text
//! xcrun devicectl device process launch -e '{"MTL_HUD_ENABLED":"1",...}' \
//!     --console --device <udid> "<bundle path>"
//! ```
//!
//! The shell-style rendering of that command doubles as the persisted
//! launch-history format, so this module can also parse device, bundle
//! path and alignment back out of a stored entry.

use std::sync::LazyLock;

use regex::Regex;

use crate::devicectl::processes::app_name_from_path;
use crate::error::Result;
use crate::hud::{HudAlignment, HudConfig};

static HISTORY_DEVICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--device\s+(\S+)").expect("history device pattern is valid"));

static HISTORY_APP_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"$"#).expect("history app path pattern is valid"));

static HISTORY_ALIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""MTL_HUD_ALIGNMENT"\s*:\s*"(\w+)""#).expect("history alignment pattern is valid")
});

/// Everything needed to launch one app with the HUD.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Target device UDID
    pub udid: String,
    /// Full bundle container path on the device
    pub bundle_path: String,
    /// HUD configuration to inject
    pub hud: HudConfig,
}

/// A fully built launch invocation.
#[derive(Debug, Clone)]
pub struct LaunchCommand {
    program: String,
    args: Vec<String>,
    display: String,
}

impl LaunchCommand {
    /// Build the `devicectl` invocation for a request.
    pub fn build(request: &LaunchRequest) -> Result<Self> {
        let env_json = serde_json::to_string(&request.hud.env_vars())?;

        let args = vec![
            "devicectl".to_string(),
            "device".to_string(),
            "process".to_string(),
            "launch".to_string(),
            "-e".to_string(),
            env_json.clone(),
            "--console".to_string(),
            "--device".to_string(),
            request.udid.clone(),
            request.bundle_path.clone(),
        ];

        let display = format!(
            "xcrun devicectl device process launch -e '{env_json}' --console --device {} \"{}\"",
            request.udid, request.bundle_path
        );

        Ok(Self {
            program: "xcrun".to_string(),
            args,
            display,
        })
    }

    /// Program to execute.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for [`Self::program`].
    pub fn args(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// Shell-style rendering, used for logs and the launch history.
    pub fn shell_string(&self) -> &str {
        &self.display
    }
}

/// Fields recovered from a stored history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Target device UDID, when present
    pub udid: Option<String>,
    /// Bundle container path, when present
    pub bundle_path: Option<String>,
    /// HUD alignment, when present and recognized
    pub alignment: Option<HudAlignment>,
}

impl HistoryEntry {
    /// App name derived from the bundle path, e.g. "SolarlandClient".
    pub fn app_name(&self) -> Option<String> {
        self.bundle_path.as_deref().map(app_name_from_path)
    }
}

/// Recover device, bundle path and alignment from a stored command string.
///
/// Tolerant by design: a missing or mangled field comes back as `None`
/// rather than failing the whole entry, since history files may hold
/// entries written by older versions.
pub fn parse_history_command(cmd: &str) -> HistoryEntry {
    let udid = HISTORY_DEVICE
        .captures(cmd)
        .map(|caps| caps[1].to_string());
    let bundle_path = HISTORY_APP_PATH
        .captures(cmd)
        .map(|caps| caps[1].to_string());
    let alignment = HISTORY_ALIGNMENT
        .captures(cmd)
        .and_then(|caps| caps[1].parse().ok());

    HistoryEntry {
        udid,
        bundle_path,
        alignment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hud::{HudPreset, HudScale};

    fn request() -> LaunchRequest {
        LaunchRequest {
            udid: "00008120-001A2B3C4D5E6F".to_string(),
            bundle_path:
                "/private/var/containers/Bundle/Application/1A2B3C4D-0000-1111-2222-333344445555/SolarlandClient.app"
                    .to_string(),
            hud: HudConfig::default(),
        }
    }

    #[test]
    fn test_build_argv_shape() {
        let cmd = LaunchCommand::build(&request()).unwrap();
        assert_eq!(cmd.program(), "xcrun");
        let args = cmd.args();
        assert_eq!(args[0], "devicectl");
        assert_eq!(&args[1..4], &["device", "process", "launch"]);
        assert_eq!(args[4], "-e");
        assert!(args[5].starts_with('{'));
        assert_eq!(args[6], "--console");
        assert_eq!(args[7], "--device");
        assert_eq!(args[8], "00008120-001A2B3C4D5E6F");
        assert!(args[9].ends_with("SolarlandClient.app"));
    }

    #[test]
    fn test_env_json_is_embedded() {
        let cmd = LaunchCommand::build(&request()).unwrap();
        let args = cmd.args();
        let env: std::collections::BTreeMap<String, String> =
            serde_json::from_str(args[5]).unwrap();
        assert_eq!(env.get("MTL_HUD_ENABLED").map(String::as_str), Some("1"));
        assert_eq!(
            env.get("MTL_HUD_ALIGNMENT").map(String::as_str),
            Some("topright")
        );
    }

    #[test]
    fn test_shell_string_format() {
        let cmd = LaunchCommand::build(&request()).unwrap();
        let shell = cmd.shell_string();
        assert!(shell.starts_with("xcrun devicectl device process launch -e '{"));
        assert!(shell.contains("--console --device 00008120-001A2B3C4D5E6F"));
        assert!(shell.ends_with("SolarlandClient.app\""));
    }

    #[test]
    fn test_history_round_trip() {
        let mut req = request();
        req.hud = HudConfig {
            preset: HudPreset::FpsOnly,
            custom_elements: Vec::new(),
            alignment: HudAlignment::BottomLeft,
            scale: HudScale::Large,
        };
        let cmd = LaunchCommand::build(&req).unwrap();
        let entry = parse_history_command(cmd.shell_string());
        assert_eq!(entry.udid.as_deref(), Some("00008120-001A2B3C4D5E6F"));
        assert_eq!(entry.bundle_path.as_deref(), Some(req.bundle_path.as_str()));
        assert_eq!(entry.alignment, Some(HudAlignment::BottomLeft));
        assert_eq!(entry.app_name().as_deref(), Some("SolarlandClient"));
    }

    #[test]
    fn test_history_parse_tolerates_garbage() {
        let entry = parse_history_command("not a launch command");
        assert_eq!(entry, HistoryEntry::default());
        assert!(entry.app_name().is_none());
    }
}
