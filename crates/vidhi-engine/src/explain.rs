//! # Explanation Report
//!
//! The human-readable account of a generated document: every included
//! clause, numbered, with what triggered it and its legal basis, followed
//! by the warnings and advisories of the validation pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assemble::ClauseDecision;
use crate::verdict::{Severity, ValidationFinding, Verdict, VerdictResult};

/// One explained clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationEntry {
    pub number: usize,
    pub clause_id: String,
    pub reason: String,
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_basis: Option<String>,
}

/// Clause-by-clause explanation plus carried findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationReport {
    pub verdict: Verdict,
    pub clauses: Vec<ExplanationEntry>,
    pub warnings: Vec<ValidationFinding>,
    pub advisories: Vec<ValidationFinding>,
}

/// Build the report for a validation result and its decisions.
pub fn explain(result: &VerdictResult, decisions: &[ClauseDecision]) -> ExplanationReport {
    ExplanationReport {
        verdict: result.verdict,
        clauses: decisions
            .iter()
            .enumerate()
            .map(|(i, d)| ExplanationEntry {
                number: i + 1,
                clause_id: d.clause_id.to_string(),
                reason: d.reason.explanation.clone(),
                trigger: d.reason.trigger.clone(),
                legal_basis: d.citation.clone(),
            })
            .collect(),
        warnings: result.with_severity(Severity::Warning).cloned().collect(),
        advisories: result.with_severity(Severity::Advisory).cloned().collect(),
    }
}

impl fmt::Display for ExplanationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verdict: {}", self.verdict)?;
        writeln!(f)?;
        writeln!(f, "Clauses:")?;
        for entry in &self.clauses {
            writeln!(f, "{}. {} [{}]", entry.number, entry.reason, entry.clause_id)?;
            writeln!(f, "   Trigger: {}", entry.trigger)?;
            if let Some(basis) = &entry.legal_basis {
                writeln!(f, "   Legal basis: {basis}")?;
            }
        }
        write_findings(f, "Warnings", &self.warnings)?;
        write_findings(f, "Suggestions", &self.advisories)
    }
}

fn write_findings(f: &mut fmt::Formatter<'_>, heading: &str, findings: &[ValidationFinding]) -> fmt::Result {
    if findings.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{heading}:")?;
    for finding in findings {
        write!(f, "- [{}] {}", finding.rule_id, finding.message)?;
        if let Some(citation) = &finding.citation {
            write!(f, " ({citation})")?;
        }
        writeln!(f)?;
        if let Some(remediation) = &finding.remediation {
            writeln!(f, "  {remediation}")?;
        }
    }
    Ok(())
}
