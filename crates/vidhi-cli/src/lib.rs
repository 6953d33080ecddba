//! # vidhi-cli: Command-Line Front End
//!
//! Provides the `vidhi` binary over the engine and lifecycle crates.
//! Records live as JSON files in a local directory (`file_store.rs`).
//!
//! ## Subcommands
//!
//! - `vidhi rules`: List jurisdictions, categories and appeal grounds;
//!   export the embedded tables; check a rules directory.
//! - `vidhi detect`: Detect regulatory categories in text.
//! - `vidhi validate`: Validate an input file and print the verdict.
//! - `vidhi generate`: Generate a document, optionally recording it.
//! - `vidhi submit | reply | close`: Lifecycle transitions.
//! - `vidhi status`: Show one record, or list all.
//! - `vidhi appeal`: Derive a first appeal from an RTI application.
//! - `vidhi deadlines`: Running reply deadlines, soonest first.
//!
//! Handlers return an exit code: `0` on success, `2` when an input was
//! blocked. Errors surface as `anyhow` chains and exit `1`.

pub mod config;
pub mod document;
pub mod file_store;
pub mod lifecycle;
pub mod rules;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use vidhi_core::{Clock, DocumentId, FixedClock, SystemClock, Timestamp};
use vidhi_engine::{ApplicationInput, DocumentEngine};
use vidhi_lifecycle::LifecycleManager;
use vidhi_rules::{DirectorySource, EmbeddedSource, RuleSet, RuleStore};

use crate::config::VidhiConfig;
use crate::file_store::JsonFileRecordStore;

/// Exit code for an input the validator blocked.
pub const EXIT_BLOCKED: u8 = 2;

/// Output format of reporting subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Loaded rules, engine and record store for one invocation.
pub struct Session {
    pub config: VidhiConfig,
    manager: LifecycleManager,
}

impl Session {
    pub fn open(config: VidhiConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let rules = match &config.rules_dir {
            Some(dir) => RuleStore::load(&DirectorySource::new(dir))
                .with_context(|| format!("failed to load rules from {}", dir.display()))?,
            None => RuleStore::load(&EmbeddedSource).context("failed to load embedded rules")?,
        };
        for warning in rules.snapshot().warnings() {
            tracing::warn!(%warning, "rule data");
        }
        let engine = DocumentEngine::new(Arc::new(rules), clock).with_config(config.engine.clone());
        let store = Arc::new(JsonFileRecordStore::new(&config.store_dir));
        Ok(Self {
            manager: LifecycleManager::new(engine, store),
            config,
        })
    }

    pub fn engine(&self) -> &DocumentEngine {
        self.manager.engine()
    }

    pub fn manager(&self) -> &LifecycleManager {
        &self.manager
    }

    pub fn rules(&self) -> Arc<RuleSet> {
        self.engine().rules().snapshot()
    }

    pub fn now(&self) -> Timestamp {
        self.engine().clock().now()
    }

    /// Resolve a full record id or a unique prefix of one.
    pub fn resolve_id(&self, raw: &str) -> Result<DocumentId> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("record id must not be empty");
        }
        let matching: Vec<DocumentId> = self
            .manager
            .records()?
            .into_iter()
            .map(|r| r.id)
            .filter(|id| id.as_str().starts_with(raw))
            .collect();
        match matching.as_slice() {
            [id] => Ok(id.clone()),
            [] => bail!("no record matches {raw:?}"),
            _ => bail!("{} records match {raw:?}; use a longer prefix", matching.len()),
        }
    }
}

/// The clock for this invocation: fixed at `as_of` when given, the
/// system clock otherwise. `as_of` is an RFC 3339 instant or a date.
pub fn clock_for(as_of: Option<&str>) -> Result<Arc<dyn Clock>> {
    let Some(raw) = as_of else {
        return Ok(Arc::new(SystemClock));
    };
    let at = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Timestamp::start_of_day(date),
        Err(_) => Timestamp::parse_lenient(raw).with_context(|| format!("invalid --as-of value {raw:?}"))?,
    };
    Ok(Arc::new(FixedClock(at)))
}

/// Read an application input from a YAML or JSON file.
pub fn load_input(path: &Path) -> Result<ApplicationInput> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read input {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse input {}", path.display()))
}
