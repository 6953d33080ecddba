//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default age in days after which a reference date is reported as stale.
pub const DEFAULT_STALENESS_DAYS: u32 = 90;

/// Tunables of the document pipeline. Every field has a default, so a
/// partial configuration file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reference dates older than this many days draw a `date_stale`
    /// warning.
    pub staleness_days: u32,
    /// Language used when the input names none.
    pub default_language: String,
    /// Format preference used when the input names none.
    pub default_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            staleness_days: DEFAULT_STALENESS_DAYS,
            default_language: "English".to_string(),
            default_format: "electronic or physical".to_string(),
        }
    }
}
