//! # Content Digests and Document Identifiers
//!
//! `sha256_digest()` accepts only [`CanonicalBytes`]. On top of it sits the
//! [`DocumentHasher`] seam: the lifecycle layer asks a hasher for the
//! identifier of a freshly composed document, and the default
//! [`Sha256Hasher`] answers with the digest of the document bytes bound to
//! the creation timestamp.
//!
//! Deployments that anchor documents elsewhere (a notarization service, a
//! ledger) supply their own `DocumentHasher`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::VidhiError;
use crate::identity::DocumentId;
use crate::temporal::Timestamp;

/// A SHA-256 digest over canonical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Derives the identifier of a composed document.
///
/// Implementations must be deterministic: the same bytes and timestamp
/// always produce the same identifier.
pub trait DocumentHasher: Send + Sync {
    /// Identify a document composed at `issued_at`.
    fn identify(
        &self,
        document: &CanonicalBytes,
        issued_at: Timestamp,
    ) -> Result<DocumentId, VidhiError>;
}

/// Default hasher: `sha256(jcs({content, issued_at}))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

#[derive(Serialize)]
struct IdentityEnvelope {
    content: String,
    issued_at: Timestamp,
}

impl DocumentHasher for Sha256Hasher {
    fn identify(
        &self,
        document: &CanonicalBytes,
        issued_at: Timestamp,
    ) -> Result<DocumentId, VidhiError> {
        let envelope = IdentityEnvelope {
            content: sha256_digest(document).to_hex(),
            issued_at,
        };
        let bytes = CanonicalBytes::new(&envelope)?;
        DocumentId::new(sha256_digest(&bytes).to_hex())
    }
}
