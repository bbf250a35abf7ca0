//! Workload requirement submitted for one analysis
//!
//! A `ResourceRequirement` is the immutable input to a single analysis
//! call. It is created by the external API layer, carried through
//! orchestration and scoring, and discarded once the recommendation has
//! been produced — no cross-request state survives it.

use crate::error::{CoreError, Result};
use crate::record::CostCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which cost categories an analysis queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Compute pricing only
    Compute,
    /// Storage pricing only
    Storage,
    /// Compute and storage together
    Comprehensive,
}

impl AnalysisKind {
    /// Categories a record must cover to count as complete for this kind.
    ///
    /// Providers may return additional categories (network egress,
    /// support surcharges); those pass through to the breakdown but are
    /// never required.
    pub fn expected_categories(self) -> &'static [CostCategory] {
        match self {
            Self::Compute => &[CostCategory::Compute],
            Self::Storage => &[CostCategory::Storage],
            Self::Comprehensive => &[CostCategory::Compute, CostCategory::Storage],
        }
    }
}

/// Normalized machine class, mapped by each provider to its own instance type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeShape {
    /// Burstable general-purpose class (t3.medium / e2-medium)
    Medium,
    /// Standard general-purpose class (m5.large / n2-standard-2)
    Large,
    /// Compute-optimized class (c5.xlarge / c2-standard-4)
    Xlarge,
}

impl std::fmt::Display for ComputeShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
        };
        write!(f, "{name}")
    }
}

/// Normalized storage tier, mapped by each provider to its own class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    /// Hot object storage (S3 Standard / GCS Standard)
    Standard,
    /// Infrequent access (S3 IA / GCS Nearline)
    Infrequent,
    /// Cold archival (S3 Glacier / GCS Coldline)
    Archive,
    /// Deep archival (S3 Deep Archive / GCS Archive)
    DeepArchive,
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Standard => "standard",
            Self::Infrequent => "infrequent",
            Self::Archive => "archive",
            Self::DeepArchive => "deep_archive",
        };
        write!(f, "{name}")
    }
}

/// How strongly the caller favors raw performance over cost
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformancePriority {
    /// Cost matters most; performance is secondary
    Low,
    /// The default trade-off
    #[default]
    Balanced,
    /// Performance-critical workload
    High,
}

/// Workload specification for one analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequirement {
    /// Request identity, for log correlation only
    pub request_id: Uuid,

    /// Machine class to price
    pub compute_shape: ComputeShape,

    /// Deployment region (provider-neutral region name)
    pub region: String,

    /// Storage tier to price
    pub storage_class: StorageClass,

    /// Storage footprint in GB
    pub storage_gb: u64,

    /// Time horizon for TCO projections, in months
    pub horizon_months: u32,

    /// Advisory monthly budget in USD; exceeding it costs score points
    /// but never disqualifies a provider
    pub monthly_budget: Option<f64>,

    /// Performance-vs-cost preference
    pub performance_priority: PerformancePriority,

    /// Which categories this analysis queries
    pub analysis_kind: AnalysisKind,
}

impl ResourceRequirement {
    /// Create a new requirement builder
    pub fn builder() -> ResourceRequirementBuilder {
        ResourceRequirementBuilder::default()
    }

    /// Validate the requirement
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(CoreError::InvalidRequirement(
                "region must not be empty".to_string(),
            ));
        }

        if self.horizon_months == 0 {
            return Err(CoreError::InvalidRequirement(
                "horizon_months must be at least 1".to_string(),
            ));
        }

        if let Some(budget) = self.monthly_budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(CoreError::InvalidRequirement(format!(
                    "monthly_budget must be a positive amount, got {budget}"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for `ResourceRequirement`
#[derive(Debug, Default)]
pub struct ResourceRequirementBuilder {
    compute_shape: Option<ComputeShape>,
    region: Option<String>,
    storage_class: Option<StorageClass>,
    storage_gb: Option<u64>,
    horizon_months: Option<u32>,
    monthly_budget: Option<f64>,
    performance_priority: Option<PerformancePriority>,
    analysis_kind: Option<AnalysisKind>,
}

impl ResourceRequirementBuilder {
    /// Set the machine class
    pub fn compute_shape(mut self, shape: ComputeShape) -> Self {
        self.compute_shape = Some(shape);
        self
    }

    /// Set the deployment region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the storage tier
    pub fn storage_class(mut self, class: StorageClass) -> Self {
        self.storage_class = Some(class);
        self
    }

    /// Set the storage footprint in GB
    pub fn storage_gb(mut self, gb: u64) -> Self {
        self.storage_gb = Some(gb);
        self
    }

    /// Set the TCO horizon in months
    pub fn horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = Some(months);
        self
    }

    /// Set the advisory monthly budget in USD
    pub fn monthly_budget(mut self, budget: f64) -> Self {
        self.monthly_budget = Some(budget);
        self
    }

    /// Set the performance-vs-cost preference
    pub fn performance_priority(mut self, priority: PerformancePriority) -> Self {
        self.performance_priority = Some(priority);
        self
    }

    /// Set the analysis kind
    pub fn analysis_kind(mut self, kind: AnalysisKind) -> Self {
        self.analysis_kind = Some(kind);
        self
    }

    /// Build and validate the requirement
    pub fn build(self) -> Result<ResourceRequirement> {
        let requirement = ResourceRequirement {
            request_id: Uuid::new_v4(),
            compute_shape: self.compute_shape.unwrap_or(ComputeShape::Medium),
            region: self.region.unwrap_or_else(|| "us-east-1".to_string()),
            storage_class: self.storage_class.unwrap_or(StorageClass::Standard),
            storage_gb: self.storage_gb.unwrap_or(100),
            horizon_months: self.horizon_months.unwrap_or(12),
            monthly_budget: self.monthly_budget,
            performance_priority: self.performance_priority.unwrap_or_default(),
            analysis_kind: self.analysis_kind.unwrap_or(AnalysisKind::Comprehensive),
        };

        requirement.validate()?;
        Ok(requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let req = ResourceRequirement::builder().build().unwrap();
        assert_eq!(req.compute_shape, ComputeShape::Medium);
        assert_eq!(req.region, "us-east-1");
        assert_eq!(req.horizon_months, 12);
        assert_eq!(req.performance_priority, PerformancePriority::Balanced);
        assert_eq!(req.analysis_kind, AnalysisKind::Comprehensive);
        assert!(req.monthly_budget.is_none());
    }

    #[test]
    fn test_builder_explicit_values() {
        let req = ResourceRequirement::builder()
            .compute_shape(ComputeShape::Xlarge)
            .region("eu-west-1")
            .storage_class(StorageClass::Archive)
            .storage_gb(2048)
            .horizon_months(36)
            .monthly_budget(1500.0)
            .performance_priority(PerformancePriority::High)
            .analysis_kind(AnalysisKind::Compute)
            .build()
            .unwrap();

        assert_eq!(req.compute_shape, ComputeShape::Xlarge);
        assert_eq!(req.region, "eu-west-1");
        assert_eq!(req.storage_gb, 2048);
        assert_eq!(req.monthly_budget, Some(1500.0));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = ResourceRequirement::builder().horizon_months(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_region_rejected() {
        let result = ResourceRequirement::builder().region("  ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_budget_rejected() {
        let result = ResourceRequirement::builder().monthly_budget(0.0).build();
        assert!(result.is_err());

        let result = ResourceRequirement::builder().monthly_budget(-10.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_expected_categories() {
        assert_eq!(
            AnalysisKind::Compute.expected_categories(),
            &[CostCategory::Compute]
        );
        assert_eq!(
            AnalysisKind::Comprehensive.expected_categories(),
            &[CostCategory::Compute, CostCategory::Storage]
        );
    }
}
