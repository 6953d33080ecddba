//! # Identifier Newtypes
//!
//! Distinct identifier types for each namespace the engine deals with. You
//! cannot pass a `CategoryId` where a `ClauseId` is expected.
//!
//! All identifiers are non-blank strings. Jurisdiction identifiers keep the
//! spelling used in rule data (`Maharashtra`, `Tamil Nadu`); case-insensitive
//! resolution is the rule repository's job, not the identifier's.

use serde::{Deserialize, Serialize};

use crate::error::VidhiError;

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting blank values.
            pub fn new(value: impl Into<String>) -> Result<Self, VidhiError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(VidhiError::InvalidIdentifier {
                        kind: $kind,
                        value,
                        reason: "must not be blank".to_string(),
                    });
                }
                Ok(Self(value))
            }

            /// The identifier as written.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_identifier!(
    /// Identifier of a jurisdiction profile (a state or union territory).
    JurisdictionId,
    "jurisdiction"
);

string_identifier!(
    /// Identifier of a regulatory category (e.g. `personal_information`).
    CategoryId,
    "category"
);

string_identifier!(
    /// Identifier of a clause in the catalog. Clauses expanded per
    /// jurisdiction or per category carry an `@<key>` suffix.
    ClauseId,
    "clause"
);

string_identifier!(
    /// Identifier of a generated document record, derived from its content.
    DocumentId,
    "document"
);

impl JurisdictionId {
    /// Lower-cased form used for case-insensitive lookup.
    pub fn lookup_key(&self) -> String {
        normalize_lookup_key(&self.0)
    }
}

impl ClauseId {
    /// Derive the identifier of an expanded clause (`base@key`).
    pub fn expanded(&self, key: &str) -> Self {
        Self(format!("{}@{}", self.0, key))
    }

    /// The catalog identifier without any expansion suffix.
    pub fn base(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

/// Normalize a jurisdiction spelling for lookup: trimmed, lower-cased,
/// inner whitespace collapsed.
pub fn normalize_lookup_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
