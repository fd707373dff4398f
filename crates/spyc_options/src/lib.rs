//! spyc_options: Options for the declaration-binding pass.
//!
//! Options are plain serde structures so drivers can load them from JSON
//! alongside their own configuration.

use serde::{Deserialize, Serialize};

/// `sys.hexversion` of CPython 3.12.0 final.
pub const DEFAULT_TARGET_HEXVERSION: u32 = 0x030C_00F0;

/// Options consumed by the declaration-binding pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BindOptions {
    /// Optimization level recorded on every deferred import.
    pub optimize: u8,
    /// The interpreter version the module is compiled for, in
    /// `sys.hexversion` encoding. Static version checks compare against it.
    pub target_hexversion: u32,
    /// Bare names whose `if` guards gate declarations meant only for
    /// static analysis.
    pub type_checking_guards: Vec<String>,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            optimize: 0,
            target_hexversion: DEFAULT_TARGET_HEXVERSION,
            type_checking_guards: vec!["TYPE_CHECKING".to_string()],
        }
    }
}

impl BindOptions {
    /// `(major, minor, micro)` of the target version.
    pub fn version_info(&self) -> (u32, u32, u32) {
        let hex = self.target_hexversion;
        (hex >> 24, (hex >> 16) & 0xff, (hex >> 8) & 0xff)
    }

    pub fn is_type_checking_guard(&self, name: &str) -> bool {
        self.type_checking_guards.iter().any(|g| g == name)
    }
}

/// Parse bind options from JSON. Missing fields take their defaults.
pub fn parse_options(content: &str) -> Result<BindOptions, serde_json::Error> {
    serde_json::from_str(content)
}
