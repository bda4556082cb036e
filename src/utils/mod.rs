//! Utility modules
//!
//! Currently just logging initialization with startup rotation.

pub mod logging;

pub use logging::init_logging;
