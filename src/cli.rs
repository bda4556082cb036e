//! Command-line surface
//!
//! Argument definitions and the command implementations. Everything here
//! is wiring: resolve the device and app the user meant, pull persisted
//! defaults, hand off to the library, and print what comes back.

use std::io::Write;
use std::sync::Arc;

use clap::{ArgGroup, Parser, Subcommand};
use tracing::{info, warn};

use hudctl::config::{AppData, ConfigManager, SavedCombo};
use hudctl::devicectl::{
    self, Device, DeviceRegistry, RunningApp, ToolRunner, parse_device_list, resolve_device,
    restore_apostrophes,
};
use hudctl::diagnostics::AdvisoryLatch;
use hudctl::error::{HudctlError, Result};
use hudctl::hud::{HudConfig, HudElement, HudPreset};
use hudctl::launch::{LaunchCommand, LaunchEvent, LaunchRequest, Launcher, parse_history_command};
use hudctl::xcode;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(
    name = "hudctl",
    version,
    about = "Launch iOS apps with the Metal Performance HUD via devicectl"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Whether the doctor command was selected (it reports environment
    /// problems itself instead of being gated on them).
    pub fn is_doctor(&self) -> bool {
        matches!(self.command, Commands::Doctor)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List connected iOS devices
    Devices,
    /// List app bundles running on a device
    Apps {
        /// Device UDID or name (defaults to the first listed device)
        #[arg(long)]
        device: Option<String>,
    },
    /// Relaunch an app with the Metal HUD injected
    #[command(group = ArgGroup::new("target").required(true).args(["app", "saved", "history"]))]
    Launch {
        /// Device UDID or name (defaults to the first listed device)
        #[arg(long)]
        device: Option<String>,
        /// Bundle path, or the name of a running app
        #[arg(long)]
        app: Option<String>,
        /// Launch a saved device/app combo by name
        #[arg(long)]
        saved: Option<String>,
        /// Relaunch a history entry by number (see `hudctl history`)
        #[arg(long)]
        history: Option<usize>,
        /// HUD preset: Default, Simple, "FPS Only", Thermals, Rich, Full, Custom
        #[arg(long)]
        preset: Option<String>,
        /// HUD position, e.g. top-right, centered, bottom-left
        #[arg(long)]
        alignment: Option<String>,
        /// HUD scale: Small, Default, Large, Larger, Max
        #[arg(long)]
        scale: Option<String>,
        /// Comma-separated HUD elements (implies the Custom preset)
        #[arg(long)]
        elements: Option<String>,
        /// Persist these HUD choices as the new defaults
        #[arg(long)]
        remember: bool,
    },
    /// Unpair a device
    Unpair {
        /// Device UDID or name
        #[arg(long)]
        device: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Manage saved device/app combos
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
    /// Show the launch history
    History {
        /// Also print the full stored commands
        #[arg(long)]
        full: bool,
    },
    /// Check the Xcode/devicectl environment
    Doctor,
}

#[derive(Debug, Subcommand)]
enum SavedAction {
    /// List saved combos
    List,
    /// Save a device/app combo under a name
    Add {
        /// Name for the combo
        name: String,
        /// Device UDID or name
        #[arg(long)]
        device: Option<String>,
        /// Bundle path, or the name of a running app
        #[arg(long)]
        app: String,
    },
    /// Delete a saved combo
    Remove {
        /// Name of the combo to delete
        name: String,
    },
}

/// Shared context for the command implementations.
struct App {
    runner: Arc<dyn ToolRunner>,
    registry: DeviceRegistry,
    manager: ConfigManager,
}

/// Parse arguments and run the selected command.
pub fn run(cli: Cli, runner: Arc<dyn ToolRunner>, manager: ConfigManager) -> Result<()> {
    let app = App {
        registry: DeviceRegistry::new(Arc::clone(&runner)),
        runner,
        manager,
    };

    match cli.command {
        Commands::Devices => app.devices(),
        Commands::Apps { device } => app.apps(device.as_deref()),
        Commands::Launch {
            device,
            app: target_app,
            saved,
            history,
            preset,
            alignment,
            scale,
            elements,
            remember,
        } => app.launch(&LaunchArgs {
            device,
            app: target_app,
            saved,
            history,
            preset,
            alignment,
            scale,
            elements,
            remember,
        }),
        Commands::Unpair { device, yes } => app.unpair(&device, yes),
        Commands::Saved { action } => match action {
            SavedAction::List => app.saved_list(),
            SavedAction::Add { name, device, app: target_app } => {
                app.saved_add(&name, device.as_deref(), &target_app)
            }
            SavedAction::Remove { name } => app.saved_remove(&name),
        },
        Commands::History { full } => app.history(full),
        Commands::Doctor => app.doctor(),
    }
}

/// Options of the launch command, bundled to keep signatures sane.
struct LaunchArgs {
    device: Option<String>,
    app: Option<String>,
    saved: Option<String>,
    history: Option<usize>,
    preset: Option<String>,
    alignment: Option<String>,
    scale: Option<String>,
    elements: Option<String>,
    remember: bool,
}

/// Resolve the device the user meant, defaulting to the first listed.
fn pick_device(query: Option<&str>, devices: &[Device]) -> Result<Device> {
    match query {
        Some(query) => resolve_device(devices, query)
            .cloned()
            .ok_or_else(|| HudctlError::DeviceNotFound(query.to_string())),
        None => devices.first().cloned().ok_or(HudctlError::NoDevices),
    }
}

/// Assemble the HUD configuration: persisted defaults overridden by
/// whatever the user passed on the command line.
fn resolve_hud(data: &AppData, args: &LaunchArgs) -> Result<HudConfig> {
    let mut hud = data.hud_config();
    if let Some(preset) = &args.preset {
        hud.preset = preset.parse()?;
    }
    if let Some(alignment) = &args.alignment {
        hud.alignment = alignment.parse()?;
    }
    if let Some(scale) = &args.scale {
        hud.scale = scale.parse()?;
    }
    if let Some(elements) = &args.elements {
        hud.preset = HudPreset::Custom;
        hud.custom_elements = elements
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<HudElement>())
            .collect::<Result<Vec<_>>>()?;
    }
    Ok(hud)
}

impl App {
    /// Fetch and parse the device table, refreshing the identity cache.
    fn fetch_devices(&self) -> Result<(String, Vec<Device>)> {
        let output = self
            .runner
            .run("xcrun", &["devicectl", "list", "devices"])?;
        let devices = parse_device_list(&output.text);
        self.registry.update_from(&devices);
        Ok((output.text, devices))
    }

    /// Pre-launch environment nudges for the newest iPads.
    fn check_device_toolchain(&self, device: &Device, raw_listing: &str) {
        if xcode::beta_required(&device.model) {
            match xcode::developer_dir(self.runner.as_ref()) {
                Ok(dir) if !xcode::beta_selected(&dir) => {
                    eprintln!(
                        "Note: {} requires the Xcode beta toolchain.\n\
                         Switch with: sudo xcode-select -s /Applications/Xcode-beta.app/Contents/Developer",
                        device.model
                    );
                }
                Ok(_) => {}
                Err(e) => warn!("xcode-select probe failed: {}", e),
            }

            if xcode::seen_wireless(raw_listing) {
                eprintln!("Wireless {} detected, repairing pairing...", device.model);
                xcode::repair_wireless_pairing(self.runner.as_ref(), &device.udid);
            }
        }
    }

    fn devices(&self) -> Result<()> {
        let (_, devices) = self.fetch_devices()?;
        if devices.is_empty() {
            return Err(HudctlError::NoDevices);
        }
        for device in &devices {
            println!("{}", restore_apostrophes(&device.display_row()));
            println!("    udid: {}", device.udid);
        }
        Ok(())
    }

    fn apps(&self, device_query: Option<&str>) -> Result<()> {
        let (raw, devices) = self.fetch_devices()?;
        let device = pick_device(device_query, &devices)?;
        self.check_device_toolchain(&device, &raw);

        let apps = devicectl::list_running_apps(self.runner.as_ref(), &device.udid)?;
        if apps.is_empty() {
            eprintln!(
                "No running games found on {}.\n\
                 Make sure your game is open and other apps are closed.",
                restore_apostrophes(&device.name)
            );
            return Ok(());
        }
        for app in &apps {
            println!("{}", app.display_name);
            println!("    {}", app.bundle_path);
        }
        Ok(())
    }

    /// Resolve `--app`: an absolute path as-is, anything else against the
    /// device's running apps by display name or executable name.
    fn resolve_app(&self, udid: &str, query: &str) -> Result<String> {
        if query.starts_with('/') {
            return Ok(query.trim_end_matches('/').to_string());
        }
        let apps = devicectl::list_running_apps(self.runner.as_ref(), udid)?;
        let wanted = devicectl::strip_suffix(query);
        apps.iter()
            .find(|a| {
                a.display_name.eq_ignore_ascii_case(query)
                    || a.app_name.eq_ignore_ascii_case(&wanted)
            })
            .map(|a: &RunningApp| a.bundle_path.clone())
            .ok_or_else(|| HudctlError::AppNotFound(query.to_string()))
    }

    fn launch(&self, args: &LaunchArgs) -> Result<()> {
        let (raw, devices) = self.fetch_devices()?;
        let mut data = self.manager.load()?;
        let mut hud = resolve_hud(&data, args)?;

        // Resolve target device and bundle path, by precedence:
        // saved combo, history entry, then explicit --app
        let (udid, bundle_path) = if let Some(name) = &args.saved {
            let combo = data
                .saved_combos
                .get(name)
                .ok_or_else(|| HudctlError::SavedComboNotFound(name.clone()))?;
            let udid = match args.device.as_deref() {
                Some(query) => pick_device(Some(query), &devices)?.udid,
                None => combo.udid.clone(),
            };
            (udid, combo.bundle_path.clone())
        } else if let Some(index) = args.history {
            let cmd = data
                .history
                .get(index.saturating_sub(1))
                .ok_or_else(|| HudctlError::AppNotFound(format!("history entry {index}")))?;
            let entry = parse_history_command(cmd);
            let udid = match (args.device.as_deref(), entry.udid) {
                (Some(query), _) => pick_device(Some(query), &devices)?.udid,
                (None, Some(udid)) => udid,
                (None, None) => pick_device(None, &devices)?.udid,
            };
            let bundle_path = entry
                .bundle_path
                .ok_or_else(|| HudctlError::AppNotFound(format!("history entry {index}")))?;
            if args.alignment.is_none() {
                if let Some(alignment) = entry.alignment {
                    hud.alignment = alignment;
                }
            }
            (udid, bundle_path)
        } else {
            let device = pick_device(args.device.as_deref(), &devices)?;
            let query = args.app.as_deref().unwrap_or_default();
            let bundle_path = self.resolve_app(&device.udid, query)?;
            (device.udid, bundle_path)
        };

        if let Some(device) = devices.iter().find(|d| d.udid == udid) {
            self.check_device_toolchain(device, &raw);
        }

        let request = LaunchRequest {
            udid: udid.clone(),
            bundle_path,
            hud: hud.clone(),
        };
        let command = LaunchCommand::build(&request)?;

        if data.record_history(command.shell_string()) {
            info!("Recorded launch in history");
        }
        if args.remember {
            data.set_hud_config(&hud);
        }
        self.manager.save(&data)?;

        let model = self.registry.model_for(&udid);
        let latch = AdvisoryLatch::new();
        let launcher = Launcher::new(Arc::clone(&self.runner));
        let (events, worker) = launcher.launch_with_restart(command);

        let mut transcript = String::new();
        let mut failed = None;
        for event in events {
            match event {
                LaunchEvent::Status(message) => eprintln!("{message}"),
                LaunchEvent::Line(line) => {
                    println!("{line}");
                    transcript.push_str(&line);
                    transcript.push('\n');
                    for advisory in latch.scan(&model, &transcript) {
                        eprintln!("\n{}\n", advisory.message());
                    }
                }
                LaunchEvent::Exited { success } => {
                    if success {
                        eprintln!("App relaunched with Metal HUD.");
                    } else {
                        eprintln!(
                            "devicectl exited with an error; see the output above."
                        );
                    }
                }
                LaunchEvent::Failed(message) => failed = Some(message),
            }
        }
        let _ = worker.join();

        match failed {
            Some(message) => Err(HudctlError::LaunchFailed(
                hudctl::error::StringError::new(message),
            )),
            None => Ok(()),
        }
    }

    fn unpair(&self, device_query: &str, yes: bool) -> Result<()> {
        let (_, devices) = self.fetch_devices()?;
        let device = pick_device(Some(device_query), &devices)?;

        if !yes {
            let name = restore_apostrophes(&device.name);
            print!("Unpair {} ({})? [y/N] ", name, device.model);
            std::io::stdout().flush()?;
            let mut answer = String::new();
            std::io::stdin().read_line(&mut answer)?;
            if !answer.trim().eq_ignore_ascii_case("y") {
                eprintln!("Aborted.");
                return Ok(());
            }
        }

        let output = devicectl::unpair(self.runner.as_ref(), &device.udid)?;
        print!("{}", output.text);
        Ok(())
    }

    fn saved_list(&self) -> Result<()> {
        let data = self.manager.load()?;
        if data.saved_combos.is_empty() {
            eprintln!("No saved combos. Add one with 'hudctl saved add'.");
            return Ok(());
        }
        for (name, combo) in &data.saved_combos {
            let model = self.registry.model_for(&combo.udid);
            println!("{name}");
            println!("    device: {} ({model})", combo.udid);
            println!("    app:    {}", combo.bundle_path);
        }
        Ok(())
    }

    fn saved_add(&self, name: &str, device_query: Option<&str>, app_query: &str) -> Result<()> {
        let (_, devices) = self.fetch_devices()?;
        let device = pick_device(device_query, &devices)?;
        let bundle_path = self.resolve_app(&device.udid, app_query)?;

        let mut data = self.manager.load()?;
        data.saved_combos.insert(
            name.to_string(),
            SavedCombo {
                udid: device.udid.clone(),
                bundle_path: bundle_path.clone(),
            },
        );
        self.manager.save(&data)?;
        println!("Saved '{name}' -> {} on {}", bundle_path, device.udid);
        Ok(())
    }

    fn saved_remove(&self, name: &str) -> Result<()> {
        let mut data = self.manager.load()?;
        if data.saved_combos.remove(name).is_none() {
            return Err(HudctlError::SavedComboNotFound(name.to_string()));
        }
        self.manager.save(&data)?;
        println!("Removed '{name}'.");
        Ok(())
    }

    fn history(&self, full: bool) -> Result<()> {
        let data = self.manager.load()?;
        if data.history.is_empty() {
            eprintln!("No launches recorded yet.");
            return Ok(());
        }
        for (i, cmd) in data.history.iter().enumerate() {
            let entry = parse_history_command(cmd);
            let device = entry
                .udid
                .as_deref()
                .map_or_else(|| "Unknown Device".to_string(), |u| self.registry.model_for(u));
            let app = entry
                .app_name()
                .map_or_else(|| "Unknown App".to_string(), |name| devicectl::add_suffix(&name));
            println!("{}. {device} - {app}", i + 1);
            if full {
                println!("    {cmd}");
            }
        }
        Ok(())
    }

    fn doctor(&self) -> Result<()> {
        let mut problems = 0_u32;
        let mut report = |ok: bool, good: &str, bad: &str| {
            if ok {
                println!("ok    {good}");
            } else {
                println!("FAIL  {bad}");
                problems += 1;
            }
        };

        match xcode::MacosVersion::detect(self.runner.as_ref()) {
            Ok(version) => report(
                version.meets(xcode::MIN_MACOS_VERSION),
                &format!("macOS {}", version.as_str()),
                &format!(
                    "macOS {} (requires {} or later)",
                    version.as_str(),
                    xcode::MIN_MACOS_VERSION
                ),
            ),
            Err(e) => report(false, "", &format!("could not detect macOS version: {e}")),
        }

        report(
            xcode::xcode_installed(),
            "Xcode installed at /Applications/Xcode.app",
            "Xcode not found in /Applications (install from the App Store)",
        );

        match xcode::developer_dir(self.runner.as_ref()) {
            Ok(dir) => {
                let full_xcode = !dir.contains("CommandLineTools");
                report(
                    full_xcode,
                    &format!("developer dir: {dir}"),
                    &format!(
                        "developer dir is {dir}\n      switch with: sudo xcode-select -s /Applications/Xcode.app/Contents/Developer"
                    ),
                );
            }
            Err(e) => report(false, "", &format!("xcode-select failed: {e}")),
        }

        match xcode::license_accepted(self.runner.as_ref()) {
            Ok(accepted) => report(
                accepted,
                "devicectl runs (license accepted)",
                "devicectl failed; accept the license with: sudo xcodebuild -license accept",
            ),
            Err(e) => report(false, "", &format!("could not run devicectl: {e}")),
        }

        match self.fetch_devices() {
            Ok((_, devices)) => report(
                !devices.is_empty(),
                &format!("{} device(s) connected", devices.len()),
                "no devices connected (USB first; wireless works after pairing)",
            ),
            Err(e) => report(false, "", &format!("device listing failed: {e}")),
        }

        if problems > 0 {
            eprintln!("\n{problems} problem(s) found.");
        }
        Ok(())
    }
}
