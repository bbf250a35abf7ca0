//! Priced line items and the per-provider record they aggregate into
//!
//! A `ProviderRecord` is built once by the orchestrator (or served
//! verbatim from cache) and never mutated afterwards; rescoring always
//! works from a fresh copy.

use crate::provider::{ProviderError, ProviderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cost category of one priced line item
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    /// Compute instances
    Compute,
    /// Object or block storage
    Storage,
    /// Network egress and transfer
    Network,
    /// Anything else a provider itemizes (support, licensing)
    Additional,
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Compute => "compute",
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Additional => "additional",
        };
        write!(f, "{name}")
    }
}

/// Quote currency; only USD is supported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
}

/// One priced item for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    /// What this line prices
    pub category: CostCategory,

    /// Recurring monthly cost in `currency`
    pub monthly_cost: f64,

    /// Quote currency
    pub currency: Currency,

    /// Data quality in [0, 1]: freshness and estimation quality of the
    /// underlying price point
    pub confidence: f64,

    /// One-time setup or migration cost, when the provider itemizes one
    pub one_time_cost: Option<f64>,

    /// Human-readable description (instance type, storage tier, region)
    pub detail: String,
}

impl QuoteLine {
    /// Create a new quote line; confidence is clamped into [0, 1]
    pub fn new(
        category: CostCategory,
        monthly_cost: f64,
        confidence: f64,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            category,
            monthly_cost,
            currency: Currency::Usd,
            confidence: confidence.clamp(0.0, 1.0),
            one_time_cost: None,
            detail: detail.into(),
        }
    }

    /// Attach a one-time cost to this line
    pub fn with_one_time_cost(mut self, cost: f64) -> Self {
        self.one_time_cost = Some(cost);
        self
    }
}

/// Outcome classification of one provider's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Every expected category was priced
    Complete,
    /// Some expected categories are missing but at least one was priced
    PartialFailure,
    /// Nothing usable came back; excluded from ranking, still reported
    TotalFailure,
}

/// Aggregated priced result for one provider for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Which provider this record prices
    pub provider: ProviderId,

    /// The underlying line items
    pub lines: Vec<QuoteLine>,

    /// Sum of all recurring monthly costs
    pub total_monthly_cost: f64,

    /// Monthly cost summed per category
    pub breakdown: BTreeMap<CostCategory, f64>,

    /// Expected categories the provider did not price
    pub missing_categories: Vec<CostCategory>,

    /// Completeness classification
    pub status: RecordStatus,

    /// Diagnostic detail when the query degraded or failed
    pub error: Option<String>,

    /// When the underlying quote was obtained
    pub fetched_at: DateTime<Utc>,
}

impl ProviderRecord {
    /// Build a record from quote lines, classifying completeness against
    /// the expected category set.
    ///
    /// An empty line set is a total failure: a provider that answers with
    /// nothing priced is as unusable as one that errored.
    pub fn from_lines(
        provider: ProviderId,
        lines: Vec<QuoteLine>,
        expected: &[CostCategory],
    ) -> Self {
        let mut breakdown: BTreeMap<CostCategory, f64> = BTreeMap::new();
        for line in &lines {
            *breakdown.entry(line.category).or_insert(0.0) += line.monthly_cost;
        }

        let missing_categories: Vec<CostCategory> = expected
            .iter()
            .copied()
            .filter(|category| !breakdown.contains_key(category))
            .collect();

        let (status, error) = if lines.is_empty() {
            (
                RecordStatus::TotalFailure,
                Some("provider returned no priced line items".to_string()),
            )
        } else if missing_categories.is_empty() {
            (RecordStatus::Complete, None)
        } else {
            let listed = missing_categories
                .iter()
                .map(CostCategory::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            (
                RecordStatus::PartialFailure,
                Some(format!("missing categories: {listed}")),
            )
        };

        let total_monthly_cost = breakdown.values().sum();

        Self {
            provider,
            lines,
            total_monthly_cost,
            breakdown,
            missing_categories,
            status,
            error,
            fetched_at: Utc::now(),
        }
    }

    /// Build a total-failure record from a provider error
    pub fn failure(provider: ProviderId, error: &ProviderError) -> Self {
        Self {
            provider,
            lines: Vec::new(),
            total_monthly_cost: 0.0,
            breakdown: BTreeMap::new(),
            missing_categories: Vec::new(),
            status: RecordStatus::TotalFailure,
            error: Some(error.to_string()),
            fetched_at: Utc::now(),
        }
    }

    /// Whether this record participates in ranking
    pub fn is_usable(&self) -> bool {
        self.status != RecordStatus::TotalFailure
    }

    /// Sum of one-time costs across all lines
    pub fn one_time_total(&self) -> f64 {
        self.lines
            .iter()
            .filter_map(|line| line.one_time_cost)
            .sum()
    }
}
