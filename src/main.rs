//! `hudctl` - launch iOS apps with the Metal Performance HUD
//!
//! Entry point: initialize logging, gate on the macOS version, then hand
//! off to the selected subcommand.

// CLI module is only in the binary, not the library
mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hudctl::config::ConfigManager;
use hudctl::devicectl::{SystemRunner, ToolRunner};
use hudctl::error::get_user_friendly_error;
use hudctl::{utils, xcode};
use tracing::error;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let manager = ConfigManager::new();
    utils::init_logging(manager.data_dir()).context("Failed to initialize logging system")?;

    let runner: Arc<dyn ToolRunner> = Arc::new(SystemRunner::new());

    // devicectl only ships with recent macOS and a full Xcode install;
    // fail early with a real message instead of letting every command trip
    // over xcrun. The doctor command is exempt so it can report the
    // problems itself.
    if cfg!(target_os = "macos") && !args.is_doctor() {
        if let Err(e) = xcode::ensure_supported_macos(runner.as_ref()) {
            error!("macOS version gate failed: {}", e);
            eprintln!("{}", get_user_friendly_error(&e));
            std::process::exit(1);
        }
        if !xcode::xcode_installed() {
            let e = hudctl::HudctlError::XcodeMissing;
            error!("{}", e);
            eprintln!("{}", get_user_friendly_error(&e));
            std::process::exit(1);
        }
    }

    if let Err(e) = cli::run(args, runner, manager) {
        error!("Command failed: {}", e);
        eprintln!("{}", get_user_friendly_error(&e));
        std::process::exit(1);
    }

    Ok(())
}
