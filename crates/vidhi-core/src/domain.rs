//! # Document Kinds
//!
//! The closed set of documents the engine can produce. Every rule table is
//! keyed or filtered by `DocumentKind`, and the lifecycle state machine
//! selects its transition subset from it.

use serde::{Deserialize, Serialize};

use crate::error::VidhiError;

/// A kind of legal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Application for information under Section 6(1) of the RTI Act, 2005.
    RtiApplication,
    /// Sworn statement of facts by a deponent.
    Affidavit,
    /// First appeal under Section 19(1) of the RTI Act, 2005, derived from
    /// an RTI application.
    FirstAppeal,
}

impl DocumentKind {
    /// Every kind, in declaration order.
    pub const ALL: [DocumentKind; 3] = [Self::RtiApplication, Self::Affidavit, Self::FirstAppeal];

    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RtiApplication => "rti_application",
            Self::Affidavit => "affidavit",
            Self::FirstAppeal => "first_appeal",
        }
    }

    /// Parse a kind from its snake_case name. Hyphens are accepted.
    pub fn from_name(name: &str) -> Result<Self, VidhiError> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| VidhiError::UnknownDocumentKind(name.to_string()))
    }

    /// Human-readable name used in document titles.
    pub fn title(&self) -> &'static str {
        match self {
            Self::RtiApplication => "RTI Application",
            Self::Affidavit => "Affidavit",
            Self::FirstAppeal => "RTI First Appeal",
        }
    }

    /// Whether the document is sworn by a principal party whose age and
    /// capacity must be checked.
    pub fn requires_principal_party(&self) -> bool {
        matches!(self, Self::Affidavit)
    }

    /// Whether filing the document starts a statutory reply clock.
    pub fn has_reply_deadline(&self) -> bool {
        matches!(self, Self::RtiApplication | Self::FirstAppeal)
    }

    /// Whether the document is addressed to a public authority.
    pub fn addresses_authority(&self) -> bool {
        matches!(self, Self::RtiApplication | Self::FirstAppeal)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
