//! Orchestration-and-scoring engine for the multi-cloud cost advisor
//!
//! The engine fans analysis requests out to provider pricing sources
//! through the singleflight cache, tolerates partial failure, merges the
//! heterogeneous results into normalized per-provider records, and scores
//! them under a weighted multi-criteria model into a single ranked,
//! explainable recommendation.

pub mod advisor;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod scoring;

pub use advisor::{CostAdvisor, CostAdvisorBuilder};
pub use config::{CapabilityProfile, CriterionWeights, OrchestratorConfig, ScoringConfig};
pub use error::{AnalysisError, Result};
pub use orchestrator::Orchestrator;
pub use report::{ComprehensiveResult, ReportAssembler};
pub use scoring::{Criterion, ProviderScore, Recommendation, ScoringEngine};
