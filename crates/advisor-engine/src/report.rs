//! Assembly of orchestration and scoring output into the final result
//!
//! The `ComprehensiveResult` is the payload the external API layer
//! serializes to its callers: per-provider breakdown, recommendation,
//! savings, and TCO projections over the requested horizon.

use crate::scoring::Recommendation;
use advisor_core::{CostCategory, ProviderId, ProviderRecord, RecordStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Structured comprehensive-analysis result returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveResult {
    /// Every requested provider's record, failed ones included so the
    /// caller can render a partial result
    pub records: Vec<ProviderRecord>,

    /// The ranked recommendation
    pub recommendation: Recommendation,

    /// Monthly savings of the winner vs the runner-up, never negative
    pub monthly_savings: f64,

    /// Twelve months of `monthly_savings`
    pub annual_savings: f64,

    /// Horizon the TCO projection covers
    pub horizon_months: u32,

    /// Winner's total cost of ownership over the horizon, one-time costs
    /// included
    pub tco: f64,

    /// Per-provider per-category monthly costs over the union category
    /// set, zero-filled so the schema is stable for consumers
    pub breakdown: BTreeMap<ProviderId, BTreeMap<CostCategory, f64>>,

    /// When the underlying recommendation was produced
    pub generated_at: DateTime<Utc>,
}

impl ComprehensiveResult {
    /// Providers that produced no usable record
    pub fn failed_providers(&self) -> Vec<ProviderId> {
        self.records
            .iter()
            .filter(|r| r.status == RecordStatus::TotalFailure)
            .map(|r| r.provider)
            .collect()
    }
}

/// Merges records and a recommendation into a `ComprehensiveResult`
pub struct ReportAssembler;

impl ReportAssembler {
    /// Assemble the final result.
    ///
    /// Savings compare the winner against the runner-up and are clamped
    /// at zero — a winner chosen on capability may cost more, but
    /// negative savings are never reported.
    pub fn assemble(
        records: Vec<ProviderRecord>,
        recommendation: Recommendation,
        horizon_months: u32,
    ) -> ComprehensiveResult {
        let totals: BTreeMap<ProviderId, f64> = records
            .iter()
            .filter(|r| r.is_usable())
            .map(|r| (r.provider, r.total_monthly_cost))
            .collect();

        let winner = recommendation.winner;
        let monthly_savings = recommendation
            .rankings
            .get(1)
            .and_then(|runner_up| {
                let runner_total = totals.get(&runner_up.provider)?;
                let winner_total = totals.get(&winner)?;
                Some((runner_total - winner_total).max(0.0))
            })
            .unwrap_or(0.0);

        let tco = records
            .iter()
            .find(|r| r.provider == winner)
            .map(|r| r.total_monthly_cost * f64::from(horizon_months) + r.one_time_total())
            .unwrap_or(0.0);

        let breakdown = unified_breakdown(&records);
        let generated_at = recommendation.generated_at;

        ComprehensiveResult {
            records,
            monthly_savings,
            annual_savings: monthly_savings * 12.0,
            horizon_months,
            tco,
            breakdown,
            generated_at,
            recommendation,
        }
    }
}

/// Per-category union across usable records, zero-filled per provider
fn unified_breakdown(
    records: &[ProviderRecord],
) -> BTreeMap<ProviderId, BTreeMap<CostCategory, f64>> {
    let categories: BTreeSet<CostCategory> = records
        .iter()
        .filter(|r| r.is_usable())
        .flat_map(|r| r.breakdown.keys().copied())
        .collect();

    records
        .iter()
        .filter(|r| r.is_usable())
        .map(|record| {
            let by_category = categories
                .iter()
                .map(|category| {
                    (
                        *category,
                        record.breakdown.get(category).copied().unwrap_or(0.0),
                    )
                })
                .collect();
            (record.provider, by_category)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ProviderScore;
    use advisor_core::{ProviderError, QuoteLine};

    fn record(provider: ProviderId, lines: Vec<QuoteLine>) -> ProviderRecord {
        ProviderRecord::from_lines(provider, lines, &[CostCategory::Compute])
    }

    fn ranking(provider: ProviderId, weighted_total: f64) -> ProviderScore {
        ProviderScore {
            provider,
            criteria: BTreeMap::new(),
            weighted_total,
            over_budget: false,
        }
    }

    fn recommendation(rankings: Vec<ProviderScore>) -> Recommendation {
        Recommendation {
            winner: rankings[0].provider,
            confidence: 80.0,
            monthly_savings: 0.0,
            annual_savings: 0.0,
            reasoning: String::new(),
            rankings,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_savings_and_tco() {
        let records = vec![
            record(
                ProviderId::Aws,
                vec![QuoteLine::new(CostCategory::Compute, 100.0, 0.9, "aws")],
            ),
            record(
                ProviderId::Gcp,
                vec![QuoteLine::new(CostCategory::Compute, 150.0, 0.9, "gcp")],
            ),
        ];
        let rec = recommendation(vec![
            ranking(ProviderId::Aws, 90.0),
            ranking(ProviderId::Gcp, 70.0),
        ]);

        let result = ReportAssembler::assemble(records, rec, 24);
        assert_eq!(result.monthly_savings, 50.0);
        assert_eq!(result.annual_savings, 600.0);
        assert_eq!(result.tco, 2400.0);
        assert_eq!(result.horizon_months, 24);
    }

    #[test]
    fn test_savings_never_negative() {
        // The winner won on capability and costs more than the runner-up.
        let records = vec![
            record(
                ProviderId::Aws,
                vec![QuoteLine::new(CostCategory::Compute, 180.0, 0.9, "aws")],
            ),
            record(
                ProviderId::Gcp,
                vec![QuoteLine::new(CostCategory::Compute, 150.0, 0.9, "gcp")],
            ),
        ];
        let rec = recommendation(vec![
            ranking(ProviderId::Aws, 90.0),
            ranking(ProviderId::Gcp, 85.0),
        ]);

        let result = ReportAssembler::assemble(records, rec, 12);
        assert_eq!(result.monthly_savings, 0.0);
        assert_eq!(result.annual_savings, 0.0);
    }

    #[test]
    fn test_one_time_costs_flow_into_tco() {
        let records = vec![record(
            ProviderId::Aws,
            vec![
                QuoteLine::new(CostCategory::Compute, 100.0, 0.9, "aws")
                    .with_one_time_cost(500.0),
            ],
        )];
        let rec = recommendation(vec![ranking(ProviderId::Aws, 90.0)]);

        let result = ReportAssembler::assemble(records, rec, 12);
        assert_eq!(result.tco, 1700.0);
    }

    #[test]
    fn test_breakdown_zero_fills_unmatched_categories() {
        let records = vec![
            record(
                ProviderId::Aws,
                vec![
                    QuoteLine::new(CostCategory::Compute, 100.0, 0.9, "aws"),
                    QuoteLine::new(CostCategory::Network, 12.0, 0.7, "egress"),
                ],
            ),
            record(
                ProviderId::Gcp,
                vec![QuoteLine::new(CostCategory::Compute, 90.0, 0.9, "gcp")],
            ),
        ];
        let rec = recommendation(vec![
            ranking(ProviderId::Gcp, 90.0),
            ranking(ProviderId::Aws, 80.0),
        ]);

        let result = ReportAssembler::assemble(records, rec, 12);

        // Both providers expose the same category set; GCP's network cost
        // is filled with zero instead of omitted.
        assert_eq!(result.breakdown[&ProviderId::Aws][&CostCategory::Network], 12.0);
        assert_eq!(result.breakdown[&ProviderId::Gcp][&CostCategory::Network], 0.0);
        assert_eq!(
            result.breakdown[&ProviderId::Aws].keys().collect::<Vec<_>>(),
            result.breakdown[&ProviderId::Gcp].keys().collect::<Vec<_>>(),
        );
    }

    #[test]
    fn test_failed_providers_reported_not_ranked() {
        let err = ProviderError::Timeout {
            provider: ProviderId::Gcp,
            detail: "deadline".to_string(),
        };
        let records = vec![
            record(
                ProviderId::Aws,
                vec![QuoteLine::new(CostCategory::Compute, 100.0, 0.9, "aws")],
            ),
            ProviderRecord::failure(ProviderId::Gcp, &err),
        ];
        let rec = recommendation(vec![ranking(ProviderId::Aws, 90.0)]);

        let result = ReportAssembler::assemble(records, rec, 12);
        assert_eq!(result.failed_providers(), vec![ProviderId::Gcp]);
        assert!(!result.breakdown.contains_key(&ProviderId::Gcp));
        assert_eq!(result.records.len(), 2);
    }
}
