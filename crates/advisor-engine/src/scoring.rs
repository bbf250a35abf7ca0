//! Weighted multi-criteria scoring of normalized provider records
//!
//! Scoring is a pure function of the record set, the requirement, and the
//! static scoring tables: identical inputs produce identical
//! recommendations regardless of how the records arrived.

use crate::config::{CriterionWeights, ScoringConfig};
use crate::error::{AnalysisError, Result};
use advisor_core::{ProviderId, ProviderRecord, ResourceRequirement};
use advisor_utils::format_usd;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The five ranked decision criteria
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Cost,
    Performance,
    Scalability,
    Reliability,
    Maintainability,
}

impl Criterion {
    /// All criteria in tie-break order
    pub const ALL: [Criterion; 5] = [
        Criterion::Cost,
        Criterion::Performance,
        Criterion::Scalability,
        Criterion::Reliability,
        Criterion::Maintainability,
    ];
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cost => "cost",
            Self::Performance => "performance",
            Self::Scalability => "scalability",
            Self::Reliability => "reliability",
            Self::Maintainability => "maintainability",
        };
        write!(f, "{name}")
    }
}

/// One provider's normalized criterion scores and weighted total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderScore {
    /// Scored provider
    pub provider: ProviderId,

    /// Normalized score per criterion, each in [0, 100], comparable only
    /// within this analysis
    pub criteria: BTreeMap<Criterion, f64>,

    /// Weighted sum after any budget penalty
    pub weighted_total: f64,

    /// Whether the advisory budget was exceeded and penalized
    pub over_budget: bool,
}

/// The ranked, explainable outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Winning provider
    pub winner: ProviderId,

    /// Confidence in the ranking, 50–100
    pub confidence: f64,

    /// Monthly savings of the winner against the runner-up, never negative
    pub monthly_savings: f64,

    /// Twelve months of `monthly_savings`
    pub annual_savings: f64,

    /// Deterministic explanation of the deciding factor
    pub reasoning: String,

    /// Every evaluated provider, best first
    pub rankings: Vec<ProviderScore>,

    /// When this recommendation was produced
    pub generated_at: DateTime<Utc>,
}

/// Scores normalized provider records into a ranked recommendation
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Create a scoring engine over a validated configuration
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Score records, stamping the recommendation with the current time
    pub fn score(
        &self,
        records: &[ProviderRecord],
        requirement: &ResourceRequirement,
    ) -> Result<Recommendation> {
        self.score_at(records, requirement, Utc::now())
    }

    /// Score records with an explicit timestamp.
    ///
    /// This is the deterministic core: identical record sets and
    /// requirements produce bit-identical recommendations.
    pub fn score_at(
        &self,
        records: &[ProviderRecord],
        requirement: &ResourceRequirement,
        generated_at: DateTime<Utc>,
    ) -> Result<Recommendation> {
        let usable: Vec<&ProviderRecord> = records.iter().filter(|r| r.is_usable()).collect();
        if usable.is_empty() {
            tracing::warn!(
                request_id = %requirement.request_id,
                records = records.len(),
                "no usable provider records to score"
            );
            return Err(AnalysisError::InsufficientData);
        }

        let totals: BTreeMap<ProviderId, f64> = usable
            .iter()
            .map(|r| (r.provider, r.total_monthly_cost))
            .collect();

        let mut rankings = self.criterion_scores(&usable);
        self.apply_weights(&mut rankings, &usable, requirement);

        rankings.sort_by(|a, b| {
            b.weighted_total
                .total_cmp(&a.weighted_total)
                .then_with(|| totals[&a.provider].total_cmp(&totals[&b.provider]))
                .then_with(|| a.provider.cmp(&b.provider))
        });

        let winner = rankings[0].provider;
        let margin = if rankings.len() >= 2 {
            rankings[0].weighted_total - rankings[1].weighted_total
        } else {
            0.0
        };

        let completeness = data_completeness(&usable, requirement);
        let confidence = (50.0 + 0.3 * margin + 20.0 * completeness).clamp(50.0, 100.0);

        let monthly_savings = if rankings.len() >= 2 {
            (totals[&rankings[1].provider] - totals[&winner]).max(0.0)
        } else {
            0.0
        };

        let reasoning = build_reasoning(&rankings, &totals, monthly_savings);

        tracing::info!(
            request_id = %requirement.request_id,
            winner = %winner,
            confidence = confidence,
            margin = margin,
            evaluated = rankings.len(),
            "scoring complete"
        );

        Ok(Recommendation {
            winner,
            confidence,
            monthly_savings,
            annual_savings: monthly_savings * 12.0,
            reasoning,
            rankings,
            generated_at,
        })
    }

    /// Normalized criterion scores for every usable record
    fn criterion_scores(&self, usable: &[&ProviderRecord]) -> Vec<ProviderScore> {
        let mut rankings: Vec<ProviderScore> = usable
            .iter()
            .map(|r| ProviderScore {
                provider: r.provider,
                criteria: BTreeMap::new(),
                weighted_total: 0.0,
                over_budget: false,
            })
            .collect();

        for criterion in Criterion::ALL {
            let raw: Vec<f64> = usable
                .iter()
                .map(|r| match criterion {
                    Criterion::Cost => r.total_monthly_cost,
                    capability => self.config.profile(r.provider).raw(capability),
                })
                .collect();

            // Cheapest cost is best, so cost normalizes inverted.
            let normalized = normalize(&raw, criterion == Criterion::Cost);
            for (score, value) in rankings.iter_mut().zip(&normalized) {
                score.criteria.insert(criterion, *value);
            }
        }

        rankings
    }

    /// Weighted totals plus the advisory budget penalty
    fn apply_weights(
        &self,
        rankings: &mut [ProviderScore],
        usable: &[&ProviderRecord],
        requirement: &ResourceRequirement,
    ) {
        let weights = CriterionWeights::for_priority(requirement.performance_priority);

        for (score, record) in rankings.iter_mut().zip(usable) {
            let mut total: f64 = Criterion::ALL
                .iter()
                .map(|c| weights.weight(*c) * score.criteria[c])
                .sum();

            if let Some(budget) = requirement.monthly_budget {
                if record.total_monthly_cost > budget {
                    score.over_budget = true;
                    total = (total - self.config.budget_penalty).max(0.0);
                    tracing::debug!(
                        provider = %record.provider,
                        cost = record.total_monthly_cost,
                        budget = budget,
                        "budget exceeded, penalty applied"
                    );
                }
            }

            score.weighted_total = total;
        }
    }
}

/// Min-max normalize raw values into [0, 100] across the evaluated set.
///
/// All-equal inputs degenerate to 100 for everyone: with no spread there
/// is nothing to rank on.
fn normalize(raw: &[f64], invert: bool) -> Vec<f64> {
    let min = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![100.0; raw.len()];
    }

    raw.iter()
        .map(|value| {
            let fraction = (value - min) / (max - min);
            if invert {
                (1.0 - fraction) * 100.0
            } else {
                fraction * 100.0
            }
        })
        .collect()
}

/// Fraction of expected categories actually priced across usable records
fn data_completeness(usable: &[&ProviderRecord], requirement: &ResourceRequirement) -> f64 {
    let expected_per_record = requirement.analysis_kind.expected_categories().len();
    let expected_total = expected_per_record * usable.len();
    if expected_total == 0 {
        return 1.0;
    }

    let missing: usize = usable.iter().map(|r| r.missing_categories.len()).sum();
    1.0 - missing as f64 / expected_total as f64
}

/// Deterministic explanation built from the dominant differentiating
/// criterion — the one with the largest winner-vs-runner-up score gap,
/// ties broken by criterion order.
fn build_reasoning(
    rankings: &[ProviderScore],
    totals: &BTreeMap<ProviderId, f64>,
    monthly_savings: f64,
) -> String {
    let winner = &rankings[0];

    let Some(runner_up) = rankings.get(1) else {
        return format!(
            "{} is the only provider with usable pricing data at {}/month; \
             no competing offer was available for comparison.",
            winner.provider,
            format_usd(totals[&winner.provider]),
        );
    };

    let mut dominant = Criterion::Cost;
    let mut widest_gap = f64::NEG_INFINITY;
    for criterion in Criterion::ALL {
        let gap = winner.criteria[&criterion] - runner_up.criteria[&criterion];
        if gap > widest_gap {
            widest_gap = gap;
            dominant = criterion;
        }
    }

    let mut reasoning = format!(
        "{} ranks first with a weighted score of {:.1} against {:.1} for {}; \
         the deciding factor is {} ({:.0} vs {:.0}).",
        winner.provider,
        winner.weighted_total,
        runner_up.weighted_total,
        runner_up.provider,
        dominant,
        winner.criteria[&dominant],
        runner_up.criteria[&dominant],
    );

    if monthly_savings > 0.0 {
        reasoning.push_str(&format!(
            " Choosing {} saves {}/month over {}.",
            winner.provider,
            format_usd(monthly_savings),
            runner_up.provider,
        ));
    } else {
        reasoning.push_str(" Monthly costs are level with the runner-up.");
    }

    reasoning
}
