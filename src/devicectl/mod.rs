//! Interface to Apple's `devicectl` tool
//!
//! This module owns every interaction with the external CLI: subprocess
//! plumbing ([`runner`]), the device table parser and identity cache
//! ([`devices`]), and the running-app listing with its denylist filter
//! ([`processes`]).
//!
//! The parsers are pure functions over captured text, so everything here
//! is testable without a connected device by scripting a [`ToolRunner`].

pub mod devices;
pub mod processes;
pub mod runner;

pub use devices::{
    Device, DeviceRegistry, list_devices, parse_device_list, resolve_device,
    restore_apostrophes, unpair,
};
pub use processes::{
    RunningApp, add_suffix, app_name_from_path, is_app_running, list_running_apps,
    parse_running_apps, strip_suffix,
};
pub use runner::{ChildHandle, SystemRunner, ToolOutput, ToolRunner};
