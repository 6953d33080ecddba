//! # Verdicts and Findings
//!
//! A validation pass produces an ordered list of [`ValidationFinding`]s and
//! a [`Verdict`]. The verdict is the maximum severity over all findings
//! and only ever moves upward while checks run.

use serde::{Deserialize, Serialize};

/// Severity of a single finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Drafting advice. Never affects the verdict.
    Advisory,
    /// Generation proceeds; the finding is carried into the explanation.
    Warning,
    /// Generation is refused.
    Block,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Advisory => "advisory",
            Self::Warning => "warning",
            Self::Block => "block",
        }
    }
}

/// Where a finding comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingClass {
    /// Missing or malformed input, unresolvable jurisdiction.
    Structural,
    /// Exemptions, capacity, dates, fees.
    Legal,
    /// Drafting quality.
    Advisory,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    PassWithWarnings,
    Blocked,
}

impl Verdict {
    /// The verdict a finding of `severity` implies on its own.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Advisory => Self::Pass,
            Severity::Warning => Self::PassWithWarnings,
            Severity::Block => Self::Blocked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::PassWithWarnings => "PASS_WITH_WARNINGS",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Stable identifier of the check, e.g. `guardian_required` or
    /// `exemption.personal_information`.
    pub rule_id: String,
    pub class: FindingClass,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Offending input field, dotted (e.g. `applicant.age`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl ValidationFinding {
    fn new(rule_id: impl Into<String>, class: FindingClass, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            class,
            severity,
            message: message.into(),
            remediation: None,
            field: None,
            citation: None,
        }
    }

    /// A blocking structural finding on `field`.
    pub fn structural(rule_id: impl Into<String>, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, FindingClass::Structural, Severity::Block, message).with_field(field)
    }

    /// A legal finding of the given severity.
    pub fn legal(rule_id: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self::new(rule_id, FindingClass::Legal, severity, message)
    }

    /// A drafting advisory.
    pub fn advisory(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_id, FindingClass::Advisory, Severity::Advisory, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = Some(citation.into());
        self
    }
}

/// Verdict plus the findings that produced it, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub verdict: Verdict,
    pub findings: Vec<ValidationFinding>,
}

impl Default for VerdictResult {
    fn default() -> Self {
        Self {
            verdict: Verdict::Pass,
            findings: Vec::new(),
        }
    }
}

impl VerdictResult {
    /// Record a finding, upgrading the verdict if needed.
    pub fn push(&mut self, finding: ValidationFinding) {
        self.verdict = self.verdict.max(Verdict::from_severity(finding.severity));
        self.findings.push(finding);
    }

    pub fn is_blocked(&self) -> bool {
        self.verdict == Verdict::Blocked
    }

    /// Findings of exactly `severity`, in check order.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    /// The first finding with `rule_id`.
    pub fn finding(&self, rule_id: &str) -> Option<&ValidationFinding> {
        self.findings.iter().find(|f| f.rule_id == rule_id)
    }

    pub fn has(&self, rule_id: &str) -> bool {
        self.finding(rule_id).is_some()
    }
}
