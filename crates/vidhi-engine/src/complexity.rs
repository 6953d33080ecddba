//! # Complexity Score
//!
//! A rough measure of how much care a document needs, computed with every
//! assessment. The score is the sum of four weighted parts:
//!
//! | Part | Points |
//! |---|---|
//! | kind | profile complexity x [`KIND_WEIGHT`] |
//! | jurisdiction | [`JURISDICTION_WEIGHT`] when the jurisdiction resolved |
//! | categories | [`CATEGORY_WEIGHT`] per detected category |
//! | findings | [`FINDING_WEIGHT`] per validation finding |
//!
//! Totals above [`MEDIUM_ABOVE`] are medium, above [`HIGH_ABOVE`] high.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use vidhi_rules::KindProfile;

use crate::detect::CategoryMatch;
use crate::verdict::VerdictResult;

pub const KIND_WEIGHT: u32 = 3;
pub const JURISDICTION_WEIGHT: u32 = 5;
pub const CATEGORY_WEIGHT: u32 = 3;
pub const FINDING_WEIGHT: u32 = 2;

pub const MEDIUM_ABOVE: u32 = 30;
pub const HIGH_ABOVE: u32 = 45;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    pub fn classify(total: u32) -> Self {
        if total > HIGH_ABOVE {
            Self::High
        } else if total > MEDIUM_ABOVE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityScore {
    pub kind: u32,
    pub jurisdiction: u32,
    pub categories: u32,
    pub findings: u32,
    pub total: u32,
    pub level: ComplexityLevel,
}

fn weighted(count: usize, weight: u32) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(weight)
}

impl ComplexityScore {
    /// Score one assessment. `profile` is the kind's profile, if the rules
    /// carry one.
    pub fn compute(
        profile: Option<&KindProfile>,
        jurisdiction_resolved: bool,
        matches: &BTreeSet<CategoryMatch>,
        result: &VerdictResult,
    ) -> Self {
        let kind = profile.map_or(0, |p| u32::from(p.complexity) * KIND_WEIGHT);
        let jurisdiction = if jurisdiction_resolved { JURISDICTION_WEIGHT } else { 0 };
        let categories = weighted(matches.len(), CATEGORY_WEIGHT);
        let findings = weighted(result.findings.len(), FINDING_WEIGHT);
        let total = kind
            .saturating_add(jurisdiction)
            .saturating_add(categories)
            .saturating_add(findings);
        Self {
            kind,
            jurisdiction,
            categories,
            findings,
            total,
            level: ComplexityLevel::classify(total),
        }
    }
}
