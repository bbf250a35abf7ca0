//! Provider identity and the `ProviderQuery` capability
//!
//! Every pricing source — real API client or in-process catalog — exposes
//! the same `quote` contract. The orchestrator treats providers uniformly
//! through this trait; no provider-specific branching exists beyond the
//! construction of the request payload inside each implementation.

use crate::record::QuoteLine;
use crate::requirement::ResourceRequirement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cloud provider identity
///
/// `Ord` matters: ranking tie-breaks and fan-out ordering use it to keep
/// results deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Amazon Web Services
    Aws,
    /// Google Cloud Platform
    Gcp,
    /// Microsoft Azure
    Azure,
}

impl ProviderId {
    /// Stable lowercase name used in fingerprints and wire payloads
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
            Self::Azure => "azure",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure modes of a provider query
///
/// All variants except `UpstreamRejected` are retryable: a rejection means
/// the request itself is invalid for that provider (unknown instance type,
/// unsupported storage tier) and retrying cannot help.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ProviderError {
    /// The provider did not answer in time
    #[error("provider {provider} timed out: {detail}")]
    Timeout {
        provider: ProviderId,
        detail: String,
    },

    /// The provider rejected the request as invalid; terminal
    #[error("provider {provider} rejected the request: {detail}")]
    UpstreamRejected {
        provider: ProviderId,
        detail: String,
    },

    /// The provider could not be reached or errored internally
    #[error("provider {provider} unavailable: {detail}")]
    Unavailable {
        provider: ProviderId,
        detail: String,
    },
}

impl ProviderError {
    /// Which provider produced this error
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Timeout { provider, .. }
            | Self::UpstreamRejected { provider, .. }
            | Self::Unavailable { provider, .. } => *provider,
        }
    }

    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::UpstreamRejected { .. })
    }
}

/// Capability contract for one provider's pricing source
///
/// Implementations are stateless with respect to requests: `quote` may be
/// called concurrently and must not retain per-request state.
#[async_trait]
pub trait ProviderQuery: Send + Sync {
    /// Which provider this source prices
    fn provider(&self) -> ProviderId;

    /// Return priced line items for the requirement, or a classified error
    async fn quote(
        &self,
        requirement: &ResourceRequirement,
    ) -> std::result::Result<Vec<QuoteLine>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_ordering_is_stable() {
        let mut providers = vec![ProviderId::Azure, ProviderId::Gcp, ProviderId::Aws];
        providers.sort();
        assert_eq!(
            providers,
            vec![ProviderId::Aws, ProviderId::Gcp, ProviderId::Azure]
        );
    }

    #[test]
    fn test_retryability() {
        let timeout = ProviderError::Timeout {
            provider: ProviderId::Aws,
            detail: "no response in 10s".to_string(),
        };
        let rejected = ProviderError::UpstreamRejected {
            provider: ProviderId::Gcp,
            detail: "unknown machine type".to_string(),
        };
        let unavailable = ProviderError::Unavailable {
            provider: ProviderId::Aws,
            detail: "connection refused".to_string(),
        };

        assert!(timeout.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!rejected.is_retryable());
    }

    #[test]
    fn test_error_display_names_provider() {
        let err = ProviderError::Unavailable {
            provider: ProviderId::Gcp,
            detail: "503".to_string(),
        };
        assert_eq!(err.provider(), ProviderId::Gcp);
        assert!(err.to_string().contains("gcp"));
    }
}
