//! # Application Input
//!
//! The request payload for one document. Inputs are created per request
//! and persisted only inside a document record, where an appeal later
//! reads them back to derive its own input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vidhi_core::{DocumentId, DocumentKind};

/// Gender of the principal party. Selects the relation phrase
/// ("son of", "daughter of") in affidavit introductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// The applicant, deponent or appellant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: String,
    /// Father's, mother's or spouse's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Guardian deposing on behalf of a minor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub name: String,
    pub age: u32,
    /// Relation to the minor, e.g. "mother".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

/// Public authority an application or appeal is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Link from a first appeal to the application it appeals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealContext {
    pub parent_id: DocumentId,
    pub reason_code: String,
    /// Date of the original application.
    pub original_date: NaiveDate,
}

/// Everything needed to generate one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub kind: DocumentKind,
    /// Jurisdiction as supplied; resolved case-insensitively.
    pub jurisdiction: String,
    pub applicant: Party,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<Guardian>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<Authority>,
    /// Free-text information request.
    #[serde(default)]
    pub body: String,
    /// Affidavit statements, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<String>,
    /// Date the document is made.
    pub reference_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub below_poverty_line: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpl_card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_preference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appeal: Option<AppealContext>,
}

impl ApplicationInput {
    /// Text scanned by the category detector: the statements of an
    /// affidavit, the request body otherwise.
    pub fn free_text(&self) -> String {
        match self.kind {
            DocumentKind::Affidavit => self.statements.join("\n"),
            DocumentKind::RtiApplication | DocumentKind::FirstAppeal => self.body.clone(),
        }
    }

    /// Authority name, or "" when absent.
    pub fn authority_name(&self) -> &str {
        self.authority.as_ref().map_or("", |a| a.name.as_str())
    }

    /// Authority address, or "" when absent.
    pub fn authority_address(&self) -> &str {
        self.authority.as_ref().map_or("", |a| a.address.as_str())
    }
}

/// Trimmed value of an optional field, `None` when absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
