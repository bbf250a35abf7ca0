//! Top-level facade: one call from requirement to comprehensive result
//!
//! The advisor owns the orchestrator and scoring engine, constructed once
//! at process start and passed by reference wherever an analysis runs.
//! There is no global mutable state; the cache inside the orchestrator is
//! the only shared structure.

use crate::config::{OrchestratorConfig, ScoringConfig};
use crate::error::{AnalysisError, Result};
use crate::orchestrator::Orchestrator;
use crate::report::{ComprehensiveResult, ReportAssembler};
use crate::scoring::ScoringEngine;
use advisor_cache::ResultCache;
use advisor_core::{ProviderId, ProviderQuery, ResourceRequirement};
use std::sync::Arc;
use tracing::info;

/// Orchestrates, scores, and assembles one analysis per call
pub struct CostAdvisor {
    orchestrator: Orchestrator,
    scoring: ScoringEngine,
}

impl CostAdvisor {
    /// Create a new advisor builder
    pub fn builder() -> CostAdvisorBuilder {
        CostAdvisorBuilder::new()
    }

    /// Run one full analysis: fan out, score, assemble.
    ///
    /// A request that finds at least one usable provider record always
    /// returns a result, possibly with reduced confidence and failed
    /// providers reported in the records. `InsufficientData` is the only
    /// hard failure.
    pub async fn analyze_and_recommend(
        &self,
        requirement: &ResourceRequirement,
        providers: &[ProviderId],
    ) -> Result<ComprehensiveResult> {
        requirement.validate()?;

        let records = self.orchestrator.analyze(requirement, providers).await;
        let recommendation = self.scoring.score(&records, requirement)?;

        info!(
            request_id = %requirement.request_id,
            winner = %recommendation.winner,
            confidence = recommendation.confidence,
            "analysis complete"
        );

        Ok(ReportAssembler::assemble(
            records,
            recommendation,
            requirement.horizon_months,
        ))
    }

    /// The cache shared by every analysis through this advisor
    pub fn cache(&self) -> &ResultCache {
        self.orchestrator.cache()
    }
}

/// Builder for `CostAdvisor`
pub struct CostAdvisorBuilder {
    queries: Vec<Arc<dyn ProviderQuery>>,
    orchestrator_config: OrchestratorConfig,
    scoring_config: ScoringConfig,
    cache: Option<ResultCache>,
}

impl CostAdvisorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            queries: Vec::new(),
            orchestrator_config: OrchestratorConfig::default(),
            scoring_config: ScoringConfig::default(),
            cache: None,
        }
    }

    /// Register a provider query source
    pub fn register_query(mut self, query: Arc<dyn ProviderQuery>) -> Self {
        self.queries.push(query);
        self
    }

    /// Set the orchestrator configuration
    pub fn orchestrator_config(mut self, config: OrchestratorConfig) -> Self {
        self.orchestrator_config = config;
        self
    }

    /// Set the scoring configuration
    pub fn scoring_config(mut self, config: ScoringConfig) -> Self {
        self.scoring_config = config;
        self
    }

    /// Share an existing cache instead of creating a fresh one
    pub fn cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the advisor
    pub fn build(self) -> Result<CostAdvisor> {
        if self.queries.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "at least one provider query must be registered".to_string(),
            ));
        }

        self.orchestrator_config.validate()?;
        let scoring = ScoringEngine::new(self.scoring_config)?;

        let orchestrator = Orchestrator::new(
            self.queries,
            self.cache.unwrap_or_default(),
            self.orchestrator_config,
        );

        Ok(CostAdvisor {
            orchestrator,
            scoring,
        })
    }
}

impl Default for CostAdvisorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
