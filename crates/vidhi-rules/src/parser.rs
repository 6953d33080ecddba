//! Shared YAML/JSON loading for rule tables.
//!
//! Every source (embedded, directory) funnels through these functions so
//! that parse failures always name their origin, and every table is
//! indexed through [`index_unique`] so duplicate identifiers are rejected
//! the same way everywhere.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{RuleDataError, RuleResult};

/// Parse YAML text into a typed value. `origin` names the text in errors.
pub fn parse_yaml<T: DeserializeOwned>(origin: &str, text: &str) -> RuleResult<T> {
    serde_yaml::from_str(text).map_err(|source| RuleDataError::YamlParse {
        origin: origin.to_string(),
        source,
    })
}

/// Parse JSON text into a typed value. `origin` names the text in errors.
pub fn parse_json<T: DeserializeOwned>(origin: &str, text: &str) -> RuleResult<T> {
    serde_json::from_str(text).map_err(|source| RuleDataError::JsonParse {
        origin: origin.to_string(),
        source,
    })
}

/// Read a file, mapping a missing file to `FileNotFound`.
pub fn read_rule_file(path: &Path) -> RuleResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RuleDataError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RuleDataError::Io(e)
        }
    })
}

/// Load a YAML file into a typed value.
pub fn load_yaml_typed<T: DeserializeOwned>(path: &Path) -> RuleResult<T> {
    let text = read_rule_file(path)?;
    parse_yaml(&path.display().to_string(), &text)
}

/// Load a JSON file into a typed value.
pub fn load_json_typed<T: DeserializeOwned>(path: &Path) -> RuleResult<T> {
    let text = read_rule_file(path)?;
    parse_json(&path.display().to_string(), &text)
}

/// Index a list of entries by key, rejecting duplicates.
///
/// `dedupe_key` maps a key to the form compared for duplicates, so that
/// jurisdictions differing only in case collide.
pub fn index_unique<K, T>(
    table: &'static str,
    items: Vec<T>,
    key: impl Fn(&T) -> K,
    dedupe_key: impl Fn(&K) -> String,
) -> RuleResult<BTreeMap<K, T>>
where
    K: Ord + std::fmt::Display,
{
    let mut seen = std::collections::BTreeSet::new();
    let mut out = BTreeMap::new();
    for item in items {
        let k = key(&item);
        if !seen.insert(dedupe_key(&k)) {
            return Err(RuleDataError::DuplicateId {
                table,
                id: k.to_string(),
            });
        }
        out.insert(k, item);
    }
    Ok(out)
}
