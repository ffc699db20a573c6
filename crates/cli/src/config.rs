//! Configuration file for `envcond rewrite`.
//!
//! Read from `--config PATH`, or from `envcond.toml` in the working directory
//! when that file exists. Command-line flags override what the file says.
//!
//! # Example
//!
//! ```toml
//! undefine = ["CI"]
//!
//! [rewrite]
//! unterminated = "allow"
//! keep_placeholders = false
//!
//! [define]
//! TARGET = "linux"
//! DEBUG = "1"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use envcond_core::{LayeredEnvironment, RewriteOptions, UnterminatedPolicy};
use serde::Deserialize;

use crate::Define;

pub const DEFAULT_CONFIG_FILE: &str = "envcond.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvcondConfig {
    /// Variables hidden from the process environment.
    #[serde(default)]
    pub undefine: Vec<String>,
    /// `[rewrite]` section.
    #[serde(default)]
    pub rewrite: RewriteOptions,
    /// `[define]` section: variables set regardless of the process environment.
    #[serde(default)]
    pub define: BTreeMap<String, String>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config file from `path`.
pub fn read_config(path: &Path) -> Result<EnvcondConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// The explicit file if given, else the default file if it exists, else
/// defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EnvcondConfig, String> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    let default = Path::new(DEFAULT_CONFIG_FILE);
    if default.is_file() {
        log::debug!("using {}", DEFAULT_CONFIG_FILE);
        read_config(default)
    } else {
        Ok(EnvcondConfig::default())
    }
}

impl EnvcondConfig {
    /// Fold command-line flags into the file's options.
    pub fn options(&self, allow_unterminated: bool, compact: bool) -> RewriteOptions {
        let mut options = self.rewrite.clone();
        if allow_unterminated {
            options.unterminated = UnterminatedPolicy::Allow;
        }
        if compact {
            options.keep_placeholders = false;
        }
        options
    }

    /// Apply overrides in precedence order: file defines, file undefines,
    /// then command-line defines and undefines.
    pub fn apply(&self, env: &mut LayeredEnvironment<'_>, define: &[Define], undefine: &[String]) {
        for (name, value) in &self.define {
            env.define(name.as_str(), value.as_str());
        }
        for name in &self.undefine {
            env.undefine(name.as_str());
        }
        for d in define {
            env.define(d.name.as_str(), d.value.as_str());
        }
        for name in undefine {
            env.undefine(name.as_str());
        }
    }
}
