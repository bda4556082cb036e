//! End-to-end pipeline tests with a scripted tool runner
//!
//! Exercises the full flow the CLI wires together: device table → app
//! listing → launch command → history/persistence → warm-up/relaunch
//! streaming → advisory scanning, all without a real device.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use hudctl::config::{AppData, ConfigManager};
use hudctl::devicectl::runner::{ChildHandle, ToolOutput, ToolRunner};
use hudctl::devicectl::{list_devices, list_running_apps};
use hudctl::diagnostics::{Advisory, AdvisoryLatch};
use hudctl::error::Result;
use hudctl::hud::{HudAlignment, HudConfig, HudPreset, HudScale};
use hudctl::launch::{LaunchCommand, LaunchEvent, LaunchRequest, Launcher, parse_history_command};

const DEVICE_TABLE: &str = "\
Devices:
Name             Hostname                          Identifier                  State                  Model
Stewie?s iPad    Stewies-iPad.coredevice.local     00008120-000A4D3E2C1B0F9E   available (paired)     iPad (iPad17,1)
";

const PROCESS_DUMP: &str = "\
 PID   Executable
 811   /private/var/containers/Bundle/Application/5E1F2A3B-4C5D-6E7F-8091-A2B3C4D5E6F0/SolarlandClient.app/SolarlandClient
 903   /private/var/containers/Bundle/Application/0A1B2C3D-4E5F-6071-8293-A4B5C6D7E8F9/Photos.app/Photos
";

/// Runner scripted per argv: canned text for `run`, canned children for
/// `spawn`.
struct ScriptedRunner {
    children: Mutex<Vec<Vec<String>>>,
    spawns: Mutex<usize>,
}

impl ScriptedRunner {
    fn new(children: Vec<Vec<String>>) -> Self {
        Self {
            children: Mutex::new(children),
            spawns: Mutex::new(0),
        }
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, _program: &str, args: &[&str]) -> Result<ToolOutput> {
        let text = match args {
            ["devicectl", "list", "devices"] => DEVICE_TABLE.to_string(),
            ["devicectl", "device", "info", "processes", ..] => PROCESS_DUMP.to_string(),
            _ => String::new(),
        };
        Ok(ToolOutput {
            success: true,
            text,
        })
    }

    fn spawn(&self, _program: &str, _args: &[&str]) -> Result<Box<dyn ChildHandle>> {
        *self.spawns.lock() += 1;
        let lines = self.children.lock().remove(0);
        Ok(Box::new(ScriptedChild {
            lines: lines.into_iter(),
        }))
    }
}

struct ScriptedChild {
    lines: std::vec::IntoIter<String>,
}

impl ChildHandle for ScriptedChild {
    fn next_line(&mut self) -> Option<String> {
        self.lines.next()
    }

    fn terminate(&mut self, _grace: Duration) {}

    fn wait(&mut self) -> Result<bool> {
        Ok(true)
    }
}

#[test]
fn test_device_to_app_to_command_pipeline() {
    let runner = ScriptedRunner::new(Vec::new());

    let devices = list_devices(&runner).unwrap();
    assert_eq!(devices.len(), 1);
    let device = &devices[0];
    assert_eq!(device.udid, "00008120-000A4D3E2C1B0F9E");

    let apps = list_running_apps(&runner, &device.udid).unwrap();
    assert_eq!(apps.len(), 1, "Photos.app is filtered out");
    assert_eq!(apps[0].display_name, "SolarlandClient(Farlight 84)");

    let command = LaunchCommand::build(&LaunchRequest {
        udid: device.udid.clone(),
        bundle_path: apps[0].bundle_path.clone(),
        hud: HudConfig {
            preset: HudPreset::FpsOnly,
            custom_elements: Vec::new(),
            alignment: HudAlignment::BottomRight,
            scale: HudScale::Large,
        },
    })
    .unwrap();

    let shell = command.shell_string();
    assert!(shell.contains("--device 00008120-000A4D3E2C1B0F9E"));
    assert!(shell.contains("\"MTL_HUD_ELEMENTS\":\"fps\""));
    assert!(shell.contains("\"MTL_HUD_ALIGNMENT\":\"bottomright\""));
    assert!(shell.contains("\"MTL_HUD_SCALE\":\"0.3\""));

    // The history entry written from this command parses back apart
    let entry = parse_history_command(shell);
    assert_eq!(entry.udid.as_deref(), Some(device.udid.as_str()));
    assert_eq!(entry.bundle_path.as_deref(), Some(apps[0].bundle_path.as_str()));
    assert_eq!(entry.alignment, Some(HudAlignment::BottomRight));
    assert_eq!(entry.app_name().as_deref(), Some("SolarlandClient"));
}

#[test]
fn test_history_and_hud_settings_persist_across_reload() {
    let dir = tempfile::tempdir().unwrap();
    let manager = ConfigManager::with_dir(dir.path());

    let mut data = manager.load().unwrap();
    assert_eq!(data, AppData::default());

    let hud = HudConfig {
        preset: HudPreset::Thermals,
        custom_elements: Vec::new(),
        alignment: HudAlignment::TopLeft,
        scale: HudScale::Larger,
    };
    data.set_hud_config(&hud);
    assert!(data.record_history(
        "xcrun devicectl device process launch -e '{}' --console --device UDID \"/x/Game.app\""
    ));
    manager.save(&data).unwrap();

    let reloaded = manager.load().unwrap();
    assert_eq!(reloaded.history.len(), 1);
    assert_eq!(reloaded.hud_config(), hud);
}

#[test]
fn test_launch_streams_and_fires_advisories_once() {
    let runner = Arc::new(ScriptedRunner::new(vec![
        // Warm-up child: its output is discarded
        vec!["warm-up output".to_string()],
        // Relaunch child: streamed, with a known failure signature
        vec![
            "Launching app...".to_string(),
            "Using OpenGL renderer".to_string(),
            "Still using OpenGL renderer".to_string(),
        ],
    ]));

    let launcher = Launcher::new(Arc::clone(&runner) as Arc<dyn ToolRunner>);
    let command = LaunchCommand::build(&LaunchRequest {
        udid: "00008120-000A4D3E2C1B0F9E".to_string(),
        bundle_path:
            "/private/var/containers/Bundle/Application/5E1F2A3B-4C5D-6E7F-8091-A2B3C4D5E6F0/SolarlandClient.app"
                .to_string(),
        hud: HudConfig::default(),
    })
    .unwrap();

    let (events, worker) = launcher.launch_with_restart(command);

    let latch = AdvisoryLatch::new();
    let mut transcript = String::new();
    let mut advisories = Vec::new();
    let mut lines = 0;
    for event in events {
        if let LaunchEvent::Line(line) = event {
            lines += 1;
            transcript.push_str(&line);
            transcript.push('\n');
            advisories.extend(latch.scan("iPad (iPad17,1)", &transcript));
        }
    }
    worker.join().unwrap();

    assert_eq!(*runner.spawns.lock(), 2, "warm-up plus relaunch");
    assert_eq!(lines, 3, "only the relaunch output is streamed");
    assert_eq!(
        advisories,
        vec![Advisory::OpenGlDetected],
        "the OpenGL advisory fires exactly once despite repeating in the log"
    );
}
