//! # Rule Repository
//!
//! A [`RuleSet`] is an immutable, fully checked snapshot of the five rule
//! tables with the clause catalog expanded. A [`RuleStore`] publishes one
//! snapshot at a time and swaps it atomically on reload.
//!
//! ## Snapshot Semantics
//!
//! Readers take an `Arc<RuleSet>` and keep it for the whole of one
//! generation. A reload builds and checks a complete new set before
//! publishing it, so in-flight work never observes a mix of old and new
//! rules. A reload that fails leaves the previous snapshot in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use vidhi_core::identity::normalize_lookup_key;
use vidhi_core::{sha256_digest, CanonicalBytes, CategoryId, ContentDigest, DocumentKind, JurisdictionId};

use crate::appeal::AppealGround;
use crate::category::CategoryRule;
use crate::clause::{ClauseSpec, Expansion, Predicate};
use crate::error::{RuleDataError, RuleResult};
use crate::jurisdiction::JurisdictionProfile;
use crate::kind_profile::KindProfile;
use crate::source::RuleSource;
use crate::validation::{check_kind_profiles, check_rule_tables};

/// Checked, expanded rule tables.
#[derive(Debug, Clone)]
pub struct RuleSet {
    jurisdictions: BTreeMap<JurisdictionId, JurisdictionProfile>,
    jurisdiction_index: BTreeMap<String, JurisdictionId>,
    categories: BTreeMap<CategoryId, CategoryRule>,
    clauses: Vec<ClauseSpec>,
    appeal_grounds: BTreeMap<String, AppealGround>,
    kinds: BTreeMap<DocumentKind, KindProfile>,
    digest: ContentDigest,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct DigestView<'a> {
    jurisdictions: &'a BTreeMap<JurisdictionId, JurisdictionProfile>,
    categories: &'a BTreeMap<CategoryId, CategoryRule>,
    clauses: &'a [ClauseSpec],
    appeal_grounds: &'a BTreeMap<String, AppealGround>,
    kinds: &'a BTreeMap<DocumentKind, KindProfile>,
}

impl RuleSet {
    /// Load every table from `source`, check it, and expand the catalog.
    pub fn load(source: &dyn RuleSource) -> RuleResult<Self> {
        Self::from_parts(
            source.load_jurisdiction_profiles()?,
            source.load_category_rules()?,
            source.load_clause_templates()?,
            source.load_appeal_grounds()?,
            source.load_kind_profiles()?,
        )
    }

    /// Build a set from already-parsed tables.
    pub fn from_parts(
        jurisdictions: BTreeMap<JurisdictionId, JurisdictionProfile>,
        categories: BTreeMap<CategoryId, CategoryRule>,
        catalog: Vec<ClauseSpec>,
        appeal_grounds: BTreeMap<String, AppealGround>,
        kinds: BTreeMap<DocumentKind, KindProfile>,
    ) -> RuleResult<Self> {
        let mut report = check_rule_tables(&jurisdictions, &categories, &catalog, &appeal_grounds)?;
        check_kind_profiles(&kinds, &mut report)?;

        let jurisdiction_index = jurisdictions
            .keys()
            .map(|id| (id.lookup_key(), id.clone()))
            .collect();

        let digest = {
            let view = DigestView {
                jurisdictions: &jurisdictions,
                categories: &categories,
                clauses: &catalog,
                appeal_grounds: &appeal_grounds,
                kinds: &kinds,
            };
            let bytes = CanonicalBytes::new(&view).map_err(|e| RuleDataError::Malformed {
                table: "rule set",
                id: "digest".to_string(),
                detail: e.to_string(),
            })?;
            sha256_digest(&bytes)
        };

        let clauses = expand_catalog(catalog, &jurisdictions, &categories);

        Ok(Self {
            jurisdictions,
            jurisdiction_index,
            categories,
            clauses,
            appeal_grounds,
            kinds,
            digest,
            warnings: report.warnings,
        })
    }

    /// Resolve a jurisdiction by name, ignoring case and extra whitespace.
    pub fn jurisdiction(&self, raw: &str) -> Option<&JurisdictionProfile> {
        self.jurisdiction_index
            .get(&normalize_lookup_key(raw))
            .and_then(|id| self.jurisdictions.get(id))
    }

    /// Every profile, ordered by identifier.
    pub fn jurisdictions(&self) -> impl Iterator<Item = &JurisdictionProfile> {
        self.jurisdictions.values()
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CategoryRule> {
        self.categories.get(id)
    }

    /// Every category, ordered by identifier.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryRule> {
        self.categories.values()
    }

    /// Categories scanned for `kind`.
    pub fn categories_for(&self, kind: DocumentKind) -> impl Iterator<Item = &CategoryRule> {
        self.categories.values().filter(move |c| c.applies_to(kind))
    }

    /// The expanded catalog in assembly order: by stage, then declaration
    /// order.
    pub fn clauses(&self) -> &[ClauseSpec] {
        &self.clauses
    }

    /// Expanded clauses that may appear in `kind`, in assembly order.
    pub fn clauses_for(&self, kind: DocumentKind) -> impl Iterator<Item = &ClauseSpec> {
        self.clauses.iter().filter(move |c| c.applies_to(kind))
    }

    /// Look up an expanded clause by its full id.
    pub fn clause(&self, id: &str) -> Option<&ClauseSpec> {
        self.clauses.iter().find(|c| c.id.as_str() == id)
    }

    /// Look up appeal grounds by reason code (case-insensitive).
    pub fn appeal_ground(&self, code: &str) -> Option<&AppealGround> {
        self.appeal_grounds.get(&code.trim().to_lowercase())
    }

    pub fn appeal_grounds(&self) -> impl Iterator<Item = &AppealGround> {
        self.appeal_grounds.values()
    }

    pub fn kind_profile(&self, kind: DocumentKind) -> Option<&KindProfile> {
        self.kinds.get(&kind)
    }

    /// Every kind profile, in [`DocumentKind`] order.
    pub fn kind_profiles(&self) -> impl Iterator<Item = &KindProfile> {
        self.kinds.values()
    }

    /// Digest of the unexpanded tables. Identifies the rule version that
    /// produced a document.
    pub fn digest(&self) -> &ContentDigest {
        &self.digest
    }

    /// Non-fatal findings from the load-time check.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn guarded(guard: Predicate, original: Predicate) -> Predicate {
    if original == Predicate::Always {
        guard
    } else {
        Predicate::All {
            of: vec![guard, original],
        }
    }
}

/// Expand per-jurisdiction and per-category entries, then order by stage.
/// The sort is stable, so declaration order holds within a stage.
fn expand_catalog(
    catalog: Vec<ClauseSpec>,
    jurisdictions: &BTreeMap<JurisdictionId, JurisdictionProfile>,
    categories: &BTreeMap<CategoryId, CategoryRule>,
) -> Vec<ClauseSpec> {
    let mut out = Vec::with_capacity(catalog.len());
    for spec in catalog {
        match spec.expand {
            Expansion::None => out.push(spec),
            Expansion::PerJurisdiction => {
                for id in jurisdictions.keys() {
                    let mut clause = spec.clone();
                    clause.id = spec.id.expanded(id.as_str());
                    clause.applies = guarded(Predicate::Jurisdiction { id: id.clone() }, spec.applies.clone());
                    clause.expand = Expansion::None;
                    out.push(clause);
                }
            }
            Expansion::PerCategory => {
                for category in categories.values() {
                    let kinds: Vec<DocumentKind> = spec
                        .kinds
                        .iter()
                        .copied()
                        .filter(|k| category.applies_to(*k))
                        .collect();
                    if kinds.is_empty() {
                        continue;
                    }
                    let mut clause = spec.clone();
                    clause.id = spec.id.expanded(category.id.as_str());
                    clause.kinds = kinds;
                    clause.applies = guarded(
                        Predicate::Category {
                            id: category.id.clone(),
                        },
                        spec.applies.clone(),
                    );
                    clause.expand = Expansion::None;
                    clause.bound_category = Some(category.id.clone());
                    out.push(clause);
                }
            }
        }
    }
    out.sort_by_key(|c| c.stage);
    out
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Publishes the current [`RuleSet`] snapshot.
#[derive(Debug)]
pub struct RuleStore {
    current: RwLock<Arc<RuleSet>>,
}

impl RuleStore {
    pub fn new(set: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(set)),
        }
    }

    /// Load the initial snapshot from `source`.
    pub fn load(source: &dyn RuleSource) -> RuleResult<Self> {
        let set = RuleSet::load(source)?;
        log_loaded(source, &set);
        Ok(Self::new(set))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&*self.current.read())
    }

    /// Rebuild from `source` and publish the result. On failure the
    /// previous snapshot stays current and the error is returned.
    pub fn reload(&self, source: &dyn RuleSource) -> RuleResult<Arc<RuleSet>> {
        match RuleSet::load(source) {
            Ok(set) => {
                log_loaded(source, &set);
                Ok(self.replace(set))
            }
            Err(e) => {
                tracing::warn!(source = %source.describe(), error = %e, "rule reload rejected, keeping previous rules");
                Err(e)
            }
        }
    }

    /// Publish `set` unconditionally, returning it.
    pub fn replace(&self, set: RuleSet) -> Arc<RuleSet> {
        let set = Arc::new(set);
        *self.current.write() = Arc::clone(&set);
        set
    }
}

fn log_loaded(source: &dyn RuleSource, set: &RuleSet) {
    tracing::info!(
        source = %source.describe(),
        digest = %set.digest(),
        jurisdictions = set.jurisdictions.len(),
        categories = set.categories.len(),
        clauses = set.clauses.len(),
        "rules loaded"
    );
    for warning in set.warnings() {
        tracing::warn!(source = %source.describe(), "{warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseStage;
    use crate::source::{export_embedded, DirectorySource, EmbeddedSource};

    fn embedded() -> RuleSet {
        RuleSet::load(&EmbeddedSource).unwrap()
    }

    #[test]
    fn jurisdiction_lookup_ignores_case_and_spacing() {
        let rules = embedded();
        assert_eq!(rules.jurisdiction("maharashtra").unwrap().id.as_str(), "Maharashtra");
        assert_eq!(rules.jurisdiction("  TAMIL   nadu ").unwrap().id.as_str(), "Tamil Nadu");
        assert!(rules.jurisdiction("Atlantis").is_none());
    }

    #[test]
    fn per_jurisdiction_clauses_expand_once_per_profile() {
        let rules = embedded();
        let count = rules
            .clauses()
            .iter()
            .filter(|c| c.id.base() == "rti_fee_payment")
            .count();
        assert_eq!(count, rules.jurisdictions().count());
        let clause = rules.clause("rti_fee_payment@Maharashtra").unwrap();
        let mut names = Vec::new();
        clause.applies.walk(&mut |p| {
            if let Predicate::Jurisdiction { id } = p {
                names.push(id.to_string());
            }
        });
        assert_eq!(names, vec!["Maharashtra"]);
    }

    #[test]
    fn per_category_clauses_bind_their_category() {
        let rules = embedded();
        let clause = rules.clause("exemption_notice@personal_information").unwrap();
        assert_eq!(clause.bound_category.as_ref().unwrap().as_str(), "personal_information");
        assert!(clause.applies_to(DocumentKind::RtiApplication));
        // affidavit-only categories produce no RTI notice
        assert!(rules.clause("exemption_notice@hearsay").is_none());
    }

    #[test]
    fn clauses_are_ordered_by_stage() {
        let rules = embedded();
        let stages: Vec<ClauseStage> = rules.clauses().iter().map(|c| c.stage).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);
        assert!(rules.clauses().iter().all(|c| c.expand == Expansion::None));
    }

    #[test]
    fn appeal_ground_lookup_is_case_insensitive() {
        let rules = embedded();
        assert!(rules.appeal_ground(" No_Response ").is_some());
        assert!(rules.appeal_ground("bored").is_none());
    }

    #[test]
    fn digest_is_stable_across_sources() {
        let dir = tempfile::tempdir().unwrap();
        export_embedded(dir.path()).unwrap();
        let from_dir = RuleSet::load(&DirectorySource::new(dir.path())).unwrap();
        assert_eq!(from_dir.digest(), embedded().digest());
    }

    #[test]
    fn reload_publishes_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        export_embedded(dir.path()).unwrap();
        let store = RuleStore::load(&EmbeddedSource).unwrap();
        let before = store.snapshot();

        let path = dir.path().join("jurisdictions.yaml");
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replacen("rti_application: 10", "rti_application: 50", 1)).unwrap();

        let after = store.reload(&DirectorySource::new(dir.path())).unwrap();
        assert_ne!(before.digest(), after.digest());
        assert_eq!(store.snapshot().digest(), after.digest());
        // the earlier snapshot is untouched
        assert_eq!(before.digest(), embedded().digest());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        export_embedded(dir.path()).unwrap();
        std::fs::write(dir.path().join("categories.yaml"), "- id: [broken").unwrap();

        let store = RuleStore::load(&EmbeddedSource).unwrap();
        let before = store.snapshot();
        assert!(store.reload(&DirectorySource::new(dir.path())).is_err());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }
}
