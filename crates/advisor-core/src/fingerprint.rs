//! Deterministic cache key for one provider/requirement pair
//!
//! The fingerprint covers only the fields a provider's quote depends on:
//! provider identity, analysis kind, machine class, region, and the
//! storage tier and size. Budget, priority, horizon, and the request id
//! deliberately stay out — two requests that differ only in those must
//! share a cache slot.

use crate::provider::ProviderId;
use crate::requirement::ResourceRequirement;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic key derived from provider + the quote-relevant subset of
/// a requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fingerprint {
    digest: String,
    canonical: String,
}

impl Fingerprint {
    /// Compute the fingerprint for one provider's view of a requirement
    pub fn for_query(provider: ProviderId, requirement: &ResourceRequirement) -> Self {
        let canonical = format!(
            "{provider}|{kind:?}|{shape}|{region}|{class}|{gb}",
            provider = provider,
            kind = requirement.analysis_kind,
            shape = requirement.compute_shape,
            region = requirement.region,
            class = requirement.storage_class,
            gb = requirement.storage_gb,
        );

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        Self { digest, canonical }
    }

    /// Hex digest used as the cache key
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Assemble a fingerprint from raw parts, bypassing hashing.
    ///
    /// Exists so cache tests can inject a digest collision, which cannot
    /// be produced through `for_query`. Not part of the public contract.
    #[doc(hidden)]
    pub fn from_raw_parts(digest: impl Into<String>, canonical: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            canonical: canonical.into(),
        }
    }

    /// The canonical input string behind the digest.
    ///
    /// Kept so the cache can detect a digest collision with differing
    /// inputs, which is a defect and never silently resolved.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for Fingerprint {}

impl std::hash::Hash for Fingerprint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short prefix reads better in logs; full digest is for the cache
        write!(f, "{}", &self.digest[..16.min(self.digest.len())])
    }
}
