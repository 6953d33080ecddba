//! # Rule Sources
//!
//! A [`RuleSource`] produces the five rule tables. Two implementations
//! ship with the crate:
//!
//! - [`EmbeddedSource`]: the tables compiled into the binary from
//!   `rules/*.yaml`.
//! - [`DirectorySource`]: the same file names read from a directory at
//!   load time, as YAML (`.yaml`/`.yml`) or JSON (`.json`).
//!
//! Sources only parse and index. Cross-table checks run when a
//! [`RuleSet`](crate::RuleSet) is built from the tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use vidhi_core::{CategoryId, DocumentKind, JurisdictionId};

use crate::appeal::AppealGround;
use crate::category::CategoryRule;
use crate::clause::ClauseSpec;
use crate::error::{RuleDataError, RuleResult};
use crate::jurisdiction::JurisdictionProfile;
use crate::kind_profile::KindProfile;
use crate::parser::{index_unique, parse_json, parse_yaml, read_rule_file};

const JURISDICTIONS: &str = "jurisdictions";
const CATEGORIES: &str = "categories";
const CLAUSES: &str = "clauses";
const APPEAL_GROUNDS: &str = "appeal_grounds";
const DOCUMENT_KINDS: &str = "document_kinds";

/// Loader for rule tables.
pub trait RuleSource: Send + Sync {
    /// Jurisdiction profiles keyed by identifier.
    fn load_jurisdiction_profiles(&self) -> RuleResult<BTreeMap<JurisdictionId, JurisdictionProfile>>;

    /// Category rules keyed by identifier.
    fn load_category_rules(&self) -> RuleResult<BTreeMap<CategoryId, CategoryRule>>;

    /// Clause catalog in declaration order, before expansion.
    fn load_clause_templates(&self) -> RuleResult<Vec<ClauseSpec>>;

    /// Appeal grounds keyed by reason code.
    fn load_appeal_grounds(&self) -> RuleResult<BTreeMap<String, AppealGround>>;

    /// Kind profiles keyed by document kind.
    fn load_kind_profiles(&self) -> RuleResult<BTreeMap<DocumentKind, KindProfile>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn parse_table<T: DeserializeOwned>(origin: &str, text: &str, format: Format) -> RuleResult<Vec<T>> {
    match format {
        Format::Yaml => parse_yaml(origin, text),
        Format::Json => parse_json(origin, text),
    }
}

fn index_jurisdictions(rows: Vec<JurisdictionProfile>) -> RuleResult<BTreeMap<JurisdictionId, JurisdictionProfile>> {
    index_unique("jurisdiction", rows, |p| p.id.clone(), JurisdictionId::lookup_key)
}

fn index_categories(rows: Vec<CategoryRule>) -> RuleResult<BTreeMap<CategoryId, CategoryRule>> {
    index_unique("category", rows, |c| c.id.clone(), |k: &CategoryId| k.to_string())
}

fn index_grounds(rows: Vec<AppealGround>) -> RuleResult<BTreeMap<String, AppealGround>> {
    index_unique("appeal ground", rows, |g| g.code.clone(), |k: &String| k.to_lowercase())
}

fn index_kinds(rows: Vec<KindProfile>) -> RuleResult<BTreeMap<DocumentKind, KindProfile>> {
    index_unique("document kind", rows, |p| p.kind, |k: &DocumentKind| k.as_str().to_string())
}

// ---------------------------------------------------------------------------
// Embedded
// ---------------------------------------------------------------------------

/// Rule tables compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    const JURISDICTIONS_YAML: &'static str = include_str!("../rules/jurisdictions.yaml");
    const CATEGORIES_YAML: &'static str = include_str!("../rules/categories.yaml");
    const CLAUSES_YAML: &'static str = include_str!("../rules/clauses.yaml");
    const APPEAL_GROUNDS_YAML: &'static str = include_str!("../rules/appeal_grounds.yaml");
    const DOCUMENT_KINDS_YAML: &'static str = include_str!("../rules/document_kinds.yaml");
}

impl RuleSource for EmbeddedSource {
    fn load_jurisdiction_profiles(&self) -> RuleResult<BTreeMap<JurisdictionId, JurisdictionProfile>> {
        index_jurisdictions(parse_table(
            "embedded:jurisdictions.yaml",
            Self::JURISDICTIONS_YAML,
            Format::Yaml,
        )?)
    }

    fn load_category_rules(&self) -> RuleResult<BTreeMap<CategoryId, CategoryRule>> {
        index_categories(parse_table(
            "embedded:categories.yaml",
            Self::CATEGORIES_YAML,
            Format::Yaml,
        )?)
    }

    fn load_clause_templates(&self) -> RuleResult<Vec<ClauseSpec>> {
        parse_table("embedded:clauses.yaml", Self::CLAUSES_YAML, Format::Yaml)
    }

    fn load_appeal_grounds(&self) -> RuleResult<BTreeMap<String, AppealGround>> {
        index_grounds(parse_table(
            "embedded:appeal_grounds.yaml",
            Self::APPEAL_GROUNDS_YAML,
            Format::Yaml,
        )?)
    }

    fn load_kind_profiles(&self) -> RuleResult<BTreeMap<DocumentKind, KindProfile>> {
        index_kinds(parse_table(
            "embedded:document_kinds.yaml",
            Self::DOCUMENT_KINDS_YAML,
            Format::Yaml,
        )?)
    }

    fn describe(&self) -> String {
        "embedded rules".to_string()
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Rule tables read from
/// `<root>/{jurisdictions,categories,clauses,appeal_grounds,document_kinds}.{yaml,yml,json}`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, stem: &str) -> RuleResult<(PathBuf, Format)> {
        for (ext, format) in [("yaml", Format::Yaml), ("yml", Format::Yaml), ("json", Format::Json)] {
            let candidate = self.root.join(format!("{stem}.{ext}"));
            if candidate.is_file() {
                return Ok((candidate, format));
            }
        }
        Err(RuleDataError::FileNotFound {
            path: self.root.join(format!("{stem}.yaml")),
        })
    }

    fn read_table<T: DeserializeOwned>(&self, stem: &str) -> RuleResult<Vec<T>> {
        let (path, format) = self.locate(stem)?;
        let text = read_rule_file(&path)?;
        tracing::debug!(path = %path.display(), "reading rule table");
        parse_table(&path.display().to_string(), &text, format)
    }
}

impl RuleSource for DirectorySource {
    fn load_jurisdiction_profiles(&self) -> RuleResult<BTreeMap<JurisdictionId, JurisdictionProfile>> {
        index_jurisdictions(self.read_table(JURISDICTIONS)?)
    }

    fn load_category_rules(&self) -> RuleResult<BTreeMap<CategoryId, CategoryRule>> {
        index_categories(self.read_table(CATEGORIES)?)
    }

    fn load_clause_templates(&self) -> RuleResult<Vec<ClauseSpec>> {
        self.read_table(CLAUSES)
    }

    fn load_appeal_grounds(&self) -> RuleResult<BTreeMap<String, AppealGround>> {
        index_grounds(self.read_table(APPEAL_GROUNDS)?)
    }

    fn load_kind_profiles(&self) -> RuleResult<BTreeMap<DocumentKind, KindProfile>> {
        index_kinds(self.read_table(DOCUMENT_KINDS)?)
    }

    fn describe(&self) -> String {
        format!("rules directory {}", self.root.display())
    }
}

/// Write the embedded tables into `dir` as YAML files. Used to seed an
/// editable rules directory.
pub fn export_embedded(dir: &Path) -> RuleResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let files = [
        (JURISDICTIONS, EmbeddedSource::JURISDICTIONS_YAML),
        (CATEGORIES, EmbeddedSource::CATEGORIES_YAML),
        (CLAUSES, EmbeddedSource::CLAUSES_YAML),
        (APPEAL_GROUNDS, EmbeddedSource::APPEAL_GROUNDS_YAML),
        (DOCUMENT_KINDS, EmbeddedSource::DOCUMENT_KINDS_YAML),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (stem, text) in files {
        let path = dir.join(format!("{stem}.yaml"));
        std::fs::write(&path, text)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_tables_parse() {
        let src = EmbeddedSource;
        let jurisdictions = src.load_jurisdiction_profiles().unwrap();
        assert!(jurisdictions.len() >= 8);
        assert!(jurisdictions.keys().any(|k| k.as_str() == "Maharashtra"));
        let categories = src.load_category_rules().unwrap();
        assert!(categories.keys().any(|k| k.as_str() == "personal_information"));
        assert!(!src.load_clause_templates().unwrap().is_empty());
        assert!(src.load_appeal_grounds().unwrap().contains_key("no_response"));
        let kinds = src.load_kind_profiles().unwrap();
        assert!(DocumentKind::ALL.iter().all(|k| kinds.contains_key(k)));
    }

    #[test]
    fn directory_source_reads_exported_tables() {
        let dir = tempfile::tempdir().unwrap();
        let written = export_embedded(dir.path()).unwrap();
        assert_eq!(written.len(), 5);
        let src = DirectorySource::new(dir.path());
        assert_eq!(
            src.load_jurisdiction_profiles().unwrap(),
            EmbeddedSource.load_jurisdiction_profiles().unwrap()
        );
        assert!(src.describe().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn directory_source_accepts_json() {
        let dir = tempfile::tempdir().unwrap();
        let grounds = r#"[{"code": "rejected", "label": "Rejected", "requires": "reply_received",
            "statement": "the request was rejected", "grounds": ["g"], "prayer": "p"}]"#;
        std::fs::write(dir.path().join("appeal_grounds.json"), grounds).unwrap();
        let loaded = DirectorySource::new(dir.path()).load_appeal_grounds().unwrap();
        assert!(loaded.contains_key("rejected"));
    }

    #[test]
    fn missing_table_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectorySource::new(dir.path()).load_category_rules().unwrap_err();
        assert!(matches!(err, RuleDataError::FileNotFound { .. }));
    }

    #[test]
    fn duplicate_kind_profile_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let one = "- kind: affidavit\n  complexity: 7\n  purpose: p\n  approach: a\n  keywords: [affidavit]\n";
        std::fs::write(dir.path().join("document_kinds.yaml"), format!("{one}{one}")).unwrap();
        let err = DirectorySource::new(dir.path()).load_kind_profiles().unwrap_err();
        assert!(matches!(err, RuleDataError::DuplicateId { table: "document kind", .. }));
    }

    #[test]
    fn duplicate_jurisdiction_rejected_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let one = r#"
- id: Delhi
  name: Delhi
  payment_modes: [Cash]
  fee_rule: Delhi RTI Rules, 2005
  stamp_act: Indian Stamp Act, 1899
  designations: { rti_application: Public Information Officer }
  languages: [English]
  notarization: notary
"#;
        let text = format!("{one}{}", one.replace("id: Delhi", "id: DELHI"));
        std::fs::write(dir.path().join("jurisdictions.yaml"), text).unwrap();
        let err = DirectorySource::new(dir.path())
            .load_jurisdiction_profiles()
            .unwrap_err();
        assert!(matches!(err, RuleDataError::DuplicateId { table: "jurisdiction", .. }));
    }
}
