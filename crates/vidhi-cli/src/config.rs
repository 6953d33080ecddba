//! # CLI Configuration
//!
//! Read from `--config <file>` or, when absent, `vidhi.yaml` in the
//! working directory. Every field has a default. Relative paths are
//! resolved against the directory holding the configuration file.
//!
//! ```yaml
//! rules_dir: rules
//! store_dir: .vidhi/records
//! engine:
//!   staleness_days: 60
//!   default_language: English
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vidhi_engine::EngineConfig;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vidhi.yaml";

/// Default record directory, relative to the working directory.
pub const DEFAULT_STORE_DIR: &str = ".vidhi/records";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VidhiConfig {
    /// Directory of rule tables. The embedded tables are used when unset.
    pub rules_dir: Option<PathBuf>,
    /// Directory holding one JSON file per document record.
    pub store_dir: PathBuf,
    pub engine: EngineConfig,
}

impl Default for VidhiConfig {
    fn default() -> Self {
        Self {
            rules_dir: None,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            engine: EngineConfig::default(),
        }
    }
}

impl VidhiConfig {
    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.rules_dir = config.rules_dir.map(|dir| base.join(dir));
        config.store_dir = base.join(&config.store_dir);
        Ok(config)
    }

    /// The explicit file if given, else `vidhi.yaml` in `cwd` if present,
    /// else the defaults.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = cwd.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "using config file from working directory");
            return Self::load(&implicit);
        }
        Ok(Self {
            store_dir: cwd.join(DEFAULT_STORE_DIR),
            ..Self::default()
        })
    }
}
