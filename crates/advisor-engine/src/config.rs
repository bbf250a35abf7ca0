//! Engine configuration: dispatch policy and the static scoring tables
//!
//! The capability tables and weight profiles are configuration, not
//! behavior: they are plain data consumed by the scoring engine,
//! constructed once at process start and passed by reference.

use crate::error::{AnalysisError, Result};
use crate::scoring::Criterion;
use advisor_core::{PerformancePriority, ProviderId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Dispatch policy for the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum attempts per provider, first try included
    pub max_attempts: u32,

    /// Backoff before the first retry
    pub backoff_base: Duration,

    /// Multiplier applied to the backoff per further retry
    pub backoff_factor: u32,

    /// Global per-request deadline; providers still pending when it
    /// expires are marked failed and the analysis proceeds without them
    pub request_deadline: Duration,

    /// How long a cached provider record stays fresh
    pub cache_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(200),
            backoff_factor: 2,
            request_deadline: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration builder
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if self.backoff_factor == 0 {
            return Err(AnalysisError::InvalidConfig(
                "backoff_factor must be at least 1".to_string(),
            ));
        }

        if self.request_deadline.is_zero() {
            return Err(AnalysisError::InvalidConfig(
                "request_deadline must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Backoff to sleep after `failed_attempts` attempts have failed
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1);
        self.backoff_base * self.backoff_factor.saturating_pow(exponent)
    }
}

/// Builder for `OrchestratorConfig`
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    max_attempts: Option<u32>,
    backoff_base: Option<Duration>,
    backoff_factor: Option<u32>,
    request_deadline: Option<Duration>,
    cache_ttl: Option<Duration>,
}

impl OrchestratorConfigBuilder {
    /// Set the maximum attempts per provider
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the backoff before the first retry
    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = Some(base);
        self
    }

    /// Set the backoff multiplier
    pub fn backoff_factor(mut self, factor: u32) -> Self {
        self.backoff_factor = Some(factor);
        self
    }

    /// Set the global per-request deadline
    pub fn request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = Some(deadline);
        self
    }

    /// Set the cache TTL for provider records
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<OrchestratorConfig> {
        let defaults = OrchestratorConfig::default();

        let config = OrchestratorConfig {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            backoff_base: self.backoff_base.unwrap_or(defaults.backoff_base),
            backoff_factor: self.backoff_factor.unwrap_or(defaults.backoff_factor),
            request_deadline: self.request_deadline.unwrap_or(defaults.request_deadline),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Static capability baseline for one provider, each value in [0, 100].
///
/// These are fixed assessments of the platform itself — not learned, not
/// per-request — and only become comparable after normalization across
/// the providers evaluated in one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub performance: f64,
    pub scalability: f64,
    pub reliability: f64,
    pub maintainability: f64,
}

impl CapabilityProfile {
    /// Raw table value for a capability criterion.
    ///
    /// Cost is never read from the profile; it comes from the priced
    /// records.
    pub fn raw(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Cost => 0.0,
            Criterion::Performance => self.performance,
            Criterion::Scalability => self.scalability,
            Criterion::Reliability => self.reliability,
            Criterion::Maintainability => self.maintainability,
        }
    }
}

impl Default for CapabilityProfile {
    /// Neutral baseline for providers without a curated profile
    fn default() -> Self {
        Self {
            performance: 75.0,
            scalability: 75.0,
            reliability: 75.0,
            maintainability: 75.0,
        }
    }
}

/// Weights combining the five criteria into one rankable score.
///
/// Each profile sums to 1.0 so weighted totals stay in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeights {
    pub cost: f64,
    pub performance: f64,
    pub scalability: f64,
    pub reliability: f64,
    pub maintainability: f64,
}

impl CriterionWeights {
    /// Default trade-off
    pub fn balanced() -> Self {
        Self {
            cost: 0.35,
            performance: 0.25,
            scalability: 0.20,
            reliability: 0.15,
            maintainability: 0.05,
        }
    }

    /// Performance-critical workloads: weight shifted from cost to
    /// performance
    pub fn performance_tilted() -> Self {
        Self {
            cost: 0.25,
            performance: 0.35,
            ..Self::balanced()
        }
    }

    /// Cost-driven workloads: weight shifted from performance to cost
    pub fn cost_tilted() -> Self {
        Self {
            cost: 0.45,
            performance: 0.15,
            ..Self::balanced()
        }
    }

    /// Select the static profile for a caller's priority
    pub fn for_priority(priority: PerformancePriority) -> Self {
        match priority {
            PerformancePriority::Low => Self::cost_tilted(),
            PerformancePriority::Balanced => Self::balanced(),
            PerformancePriority::High => Self::performance_tilted(),
        }
    }

    /// Weight for one criterion
    pub fn weight(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Cost => self.cost,
            Criterion::Performance => self.performance,
            Criterion::Scalability => self.scalability,
            Criterion::Reliability => self.reliability,
            Criterion::Maintainability => self.maintainability,
        }
    }

    fn sum(&self) -> f64 {
        self.cost + self.performance + self.scalability + self.reliability + self.maintainability
    }
}

/// Static configuration consumed by the scoring engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Curated capability baselines per provider
    pub capability_profiles: BTreeMap<ProviderId, CapabilityProfile>,

    /// Points subtracted from a provider's weighted total when its cost
    /// exceeds the advisory budget; never disqualifying
    pub budget_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut capability_profiles = BTreeMap::new();
        capability_profiles.insert(
            ProviderId::Aws,
            CapabilityProfile {
                performance: 88.0,
                scalability: 95.0,
                reliability: 92.0,
                maintainability: 70.0,
            },
        );
        capability_profiles.insert(
            ProviderId::Gcp,
            CapabilityProfile {
                performance: 85.0,
                scalability: 90.0,
                reliability: 89.0,
                maintainability: 78.0,
            },
        );
        capability_profiles.insert(
            ProviderId::Azure,
            CapabilityProfile {
                performance: 84.0,
                scalability: 88.0,
                reliability: 90.0,
                maintainability: 74.0,
            },
        );

        Self {
            capability_profiles,
            budget_penalty: 8.0,
        }
    }
}

impl ScoringConfig {
    /// Capability baseline for a provider, falling back to the neutral
    /// profile for providers without a curated entry
    pub fn profile(&self, provider: ProviderId) -> CapabilityProfile {
        self.capability_profiles
            .get(&provider)
            .copied()
            .unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.budget_penalty < 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "budget_penalty must not be negative".to_string(),
            ));
        }

        for priority in [
            PerformancePriority::Low,
            PerformancePriority::Balanced,
            PerformancePriority::High,
        ] {
            let weights = CriterionWeights::for_priority(priority);
            if (weights.sum() - 1.0).abs() > 1e-9 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "criterion weights for {priority:?} must sum to 1.0"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_orchestrator_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_base, Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_schedule() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(200));
        assert_eq!(config.backoff(2), Duration::from_millis(400));
        assert_eq!(config.backoff(3), Duration::from_millis(800));
    }

    #[test]
    fn test_builder_rejects_zero_attempts() {
        let result = OrchestratorConfig::builder().max_attempts(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_weight_profiles_sum_to_one() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_priority_selects_profile() {
        let high = CriterionWeights::for_priority(PerformancePriority::High);
        let balanced = CriterionWeights::for_priority(PerformancePriority::Balanced);
        let low = CriterionWeights::for_priority(PerformancePriority::Low);

        assert!(high.performance > balanced.performance);
        assert!(high.cost < balanced.cost);
        assert!(low.cost > balanced.cost);
        assert_eq!(balanced.cost, 0.35);
    }

    #[test]
    fn test_unknown_provider_gets_neutral_profile() {
        let mut config = ScoringConfig::default();
        config.capability_profiles.remove(&ProviderId::Azure);

        let profile = config.profile(ProviderId::Azure);
        assert_eq!(profile, CapabilityProfile::default());
    }
}
