//! # Jurisdiction Profiles
//!
//! A profile holds every region-specific parameter the engine needs: fees,
//! payment modes, stamp values, authority designations, languages, and the
//! affidavit attestation format. Business logic never branches on a
//! jurisdiction's name; it reads fields from the profile.
//!
//! ## Deadline Windows
//!
//! Reply and appeal-filing windows default to the statutory 30 days
//! (Sections 7(1) and 19(1) of the RTI Act, 2005) and may be overridden per
//! profile and document kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vidhi_core::{DocumentKind, JurisdictionId};

/// Statutory period for a reply to an RTI application or first appeal.
pub const STATUTORY_REPLY_DAYS: u32 = 30;

/// Statutory period for filing a first appeal after the reply deadline.
pub const STATUTORY_APPEAL_FILING_DAYS: u32 = 30;

/// Default age below which a deponent needs a guardian.
pub const DEFAULT_GUARDIAN_AGE_LIMIT: u32 = 18;

/// How affidavits are attested in a jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotarizationFormat {
    /// Verified on solemn affirmation before an executive magistrate.
    MagistrateCourt,
    /// Verified before a notary public or oath commissioner.
    Notary,
}

impl NotarizationFormat {
    /// Stable tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MagistrateCourt => "magistrate_court",
            Self::Notary => "notary",
        }
    }
}

impl std::fmt::Display for NotarizationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-profile overrides of the statutory deadline windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineWindows {
    /// Reply window in days, per document kind.
    #[serde(default)]
    pub reply_days: BTreeMap<DocumentKind, u32>,
    /// Days after the reply deadline within which an appeal may be filed.
    #[serde(default)]
    pub appeal_filing_days: Option<u32>,
}

/// Region-specific legal parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionProfile {
    /// Canonical identifier, as spelled in rule data.
    pub id: JurisdictionId,
    /// Display name used in rendered clauses.
    pub name: String,
    /// Prescribed fee in rupees, per document kind. A missing or zero entry
    /// means no fee is prescribed.
    #[serde(default)]
    pub fees: BTreeMap<DocumentKind, u32>,
    /// Accepted payment modes, in the order they are listed in clauses.
    pub payment_modes: Vec<String>,
    /// Citation for the fee rule (e.g. the state's RTI Rules).
    pub fee_rule: String,
    /// Whether below-poverty-line applicants are exempt from fees.
    #[serde(default)]
    pub bpl_exemption: bool,
    /// Non-judicial stamp paper value in rupees, per document kind.
    #[serde(default)]
    pub stamp_paper: BTreeMap<DocumentKind, u32>,
    /// Citation for the state stamp act.
    pub stamp_act: String,
    /// Authority designation, per document kind.
    pub designations: BTreeMap<DocumentKind, String>,
    /// Languages in which documents may be filed.
    pub languages: Vec<String>,
    /// Whether affidavits need witness identification.
    #[serde(default)]
    pub witness_required: bool,
    /// Affidavit attestation format.
    pub notarization: NotarizationFormat,
    /// Age below which a deponent needs a guardian.
    #[serde(default = "default_guardian_age_limit")]
    pub guardian_age_limit: u32,
    /// Deadline window overrides.
    #[serde(default)]
    pub deadlines: DeadlineWindows,
}

fn default_guardian_age_limit() -> u32 {
    DEFAULT_GUARDIAN_AGE_LIMIT
}

impl JurisdictionProfile {
    /// Prescribed fee for `kind`, if any.
    pub fn fee_for(&self, kind: DocumentKind) -> Option<u32> {
        self.fees.get(&kind).copied().filter(|fee| *fee > 0)
    }

    /// Stamp paper value for `kind`, if stamp paper is mandatory.
    pub fn stamp_paper_for(&self, kind: DocumentKind) -> Option<u32> {
        self.stamp_paper.get(&kind).copied().filter(|v| *v > 0)
    }

    /// Authority designation for `kind`.
    pub fn designation_for(&self, kind: DocumentKind) -> Option<&str> {
        self.designations.get(&kind).map(String::as_str)
    }

    /// Payment modes joined the way fee clauses list them.
    pub fn payment_modes_joined(&self) -> String {
        self.payment_modes.join(" / ")
    }

    /// Whether `mode` is an accepted payment mode (case-insensitive).
    pub fn accepts_payment_mode(&self, mode: &str) -> bool {
        let mode = mode.trim();
        self.payment_modes.iter().any(|m| m.eq_ignore_ascii_case(mode))
    }

    /// Whether documents may be filed in `language` (case-insensitive).
    pub fn supports_language(&self, language: &str) -> bool {
        let language = language.trim();
        self.languages.iter().any(|l| l.eq_ignore_ascii_case(language))
    }

    /// Reply window in days for `kind`, or `None` for kinds without a
    /// statutory reply clock.
    pub fn reply_window_days(&self, kind: DocumentKind) -> Option<u32> {
        if !kind.has_reply_deadline() {
            return None;
        }
        Some(
            self.deadlines
                .reply_days
                .get(&kind)
                .copied()
                .unwrap_or(STATUTORY_REPLY_DAYS),
        )
    }

    /// Appeal filing window in days after the reply deadline.
    pub fn appeal_filing_window_days(&self) -> u32 {
        self.deadlines
            .appeal_filing_days
            .unwrap_or(STATUTORY_APPEAL_FILING_DAYS)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_profile(id: &str) -> JurisdictionProfile {
        let mut fees = BTreeMap::new();
        fees.insert(DocumentKind::RtiApplication, 10);
        fees.insert(DocumentKind::FirstAppeal, 0);
        let mut stamp_paper = BTreeMap::new();
        stamp_paper.insert(DocumentKind::Affidavit, 100);
        let mut designations = BTreeMap::new();
        designations.insert(DocumentKind::RtiApplication, "Public Information Officer".to_string());
        designations.insert(DocumentKind::FirstAppeal, "First Appellate Authority".to_string());
        designations.insert(DocumentKind::Affidavit, "Executive Magistrate".to_string());
        JurisdictionProfile {
            id: JurisdictionId::new(id).unwrap(),
            name: id.to_string(),
            fees,
            payment_modes: vec!["Court Fee Stamp".into(), "Demand Draft".into()],
            fee_rule: format!("{id} Right to Information Rules, 2005"),
            bpl_exemption: true,
            stamp_paper,
            stamp_act: format!("{id} Stamp Act"),
            designations,
            languages: vec!["English".into(), "Hindi".into()],
            witness_required: false,
            notarization: NotarizationFormat::Notary,
            guardian_age_limit: DEFAULT_GUARDIAN_AGE_LIMIT,
            deadlines: DeadlineWindows::default(),
        }
    }

    #[test]
    fn zero_fee_means_no_fee() {
        let p = sample_profile("Delhi");
        assert_eq!(p.fee_for(DocumentKind::RtiApplication), Some(10));
        assert_eq!(p.fee_for(DocumentKind::FirstAppeal), None);
        assert_eq!(p.fee_for(DocumentKind::Affidavit), None);
    }

    #[test]
    fn payment_modes_join_with_slashes() {
        let p = sample_profile("Delhi");
        assert_eq!(p.payment_modes_joined(), "Court Fee Stamp / Demand Draft");
        assert!(p.accepts_payment_mode(" demand draft "));
        assert!(!p.accepts_payment_mode("Cryptocurrency"));
    }

    #[test]
    fn reply_window_defaults_to_statute() {
        let p = sample_profile("Delhi");
        assert_eq!(p.reply_window_days(DocumentKind::RtiApplication), Some(30));
        assert_eq!(p.reply_window_days(DocumentKind::Affidavit), None);
        assert_eq!(p.appeal_filing_window_days(), 30);
    }

    #[test]
    fn reply_window_override() {
        let mut p = sample_profile("Delhi");
        p.deadlines.reply_days.insert(DocumentKind::FirstAppeal, 45);
        p.deadlines.appeal_filing_days = Some(60);
        assert_eq!(p.reply_window_days(DocumentKind::FirstAppeal), Some(45));
        assert_eq!(p.reply_window_days(DocumentKind::RtiApplication), Some(30));
        assert_eq!(p.appeal_filing_window_days(), 60);
    }

    #[test]
    fn yaml_defaults_apply() {
        let yaml = r#"
id: Goa
name: Goa
payment_modes: [Cash]
fee_rule: Goa RTI Rules
stamp_act: Indian Stamp Act, 1899
designations:
  rti_application: Public Information Officer
languages: [English, Konkani]
notarization: notary
"#;
        let p: JurisdictionProfile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(p.guardian_age_limit, 18);
        assert!(!p.bpl_exemption);
        assert!(p.fees.is_empty());
        assert_eq!(p.deadlines, DeadlineWindows::default());
        assert_eq!(p.designation_for(DocumentKind::RtiApplication), Some("Public Information Officer"));
    }
}
