//! macOS version detection
//!
//! `devicectl` only ships with the tools on macOS Sequoia 15.6 or later,
//! so the version reported by `sw_vers -productVersion` is checked before
//! doing anything else.

use crate::devicectl::runner::ToolRunner;
use crate::error::{HudctlError, Result};

/// Minimum macOS version that carries a usable `devicectl`.
pub const MIN_MACOS_VERSION: &str = "15.6";

/// A dotted macOS product version, compared numerically per component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacosVersion {
    parts: Vec<u32>,
    raw: String,
}

impl MacosVersion {
    /// Parse a dotted version string like "15.6" or "26.0.1".
    ///
    /// Non-numeric components parse as zero, matching the lenient handling
    /// of beta version strings.
    pub fn parse(raw: &str) -> Self {
        let parts = raw
            .trim()
            .split('.')
            .map(|part| part.parse().unwrap_or(0))
            .collect();
        Self {
            parts,
            raw: raw.trim().to_string(),
        }
    }

    /// Query `sw_vers -productVersion`.
    pub fn detect(runner: &dyn ToolRunner) -> Result<Self> {
        let output = runner.run("sw_vers", &["-productVersion"])?;
        Ok(Self::parse(&output.text))
    }

    /// Component-wise comparison against a minimum version.
    pub fn meets(&self, minimum: &str) -> bool {
        let min = Self::parse(minimum);
        // Missing trailing components count as zero: 15 == 15.0
        let len = self.parts.len().max(min.parts.len());
        for i in 0..len {
            let have = self.parts.get(i).copied().unwrap_or(0);
            let want = min.parts.get(i).copied().unwrap_or(0);
            if have != want {
                return have > want;
            }
        }
        true
    }

    /// The string as reported by the system.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Error unless the running macOS is at least [`MIN_MACOS_VERSION`].
pub fn ensure_supported_macos(runner: &dyn ToolRunner) -> Result<()> {
    let version = MacosVersion::detect(runner)?;
    if version.meets(MIN_MACOS_VERSION) {
        Ok(())
    } else {
        Err(HudctlError::UnsupportedMacos {
            found: version.as_str().to_string(),
            required: MIN_MACOS_VERSION,
        })
    }
}
