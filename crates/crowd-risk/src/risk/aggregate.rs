use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::domain::{PartialAssessment, RiskFactor, RiskLevel};
use super::weights::WeightConfig;

/// Audit trail for one reporting factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub score: f64,
    /// Weight as configured, before re-normalisation.
    pub weight: f64,
    /// `score * weight / total_weight_present`; these sum to the overall score.
    pub weighted_contribution: f64,
    pub rationale: String,
}

/// Combined view of every recognised partial assessment for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRiskResult {
    pub overall_score: f64,
    pub level: RiskLevel,
    /// Fraction of configured weight backed by a report, not model certainty.
    pub confidence: f64,
    pub contributions: BTreeMap<RiskFactor, FactorContribution>,
}

impl AggregateRiskResult {
    /// Configured factors with positive weight that did not report.
    pub fn missing_factors(&self, config: &WeightConfig) -> Vec<RiskFactor> {
        config
            .weights()
            .iter()
            .filter(|(factor, weight)| **weight > 0.0 && !self.contributions.contains_key(*factor))
            .map(|(factor, _)| *factor)
            .collect()
    }

    /// Share of the overall score carried by `factor`, `0.0` when the score is zero.
    pub fn contribution_share(&self, factor: RiskFactor) -> f64 {
        match self.contributions.get(&factor) {
            Some(contribution) if self.overall_score > 0.0 => {
                contribution.weighted_contribution / self.overall_score
            }
            _ => 0.0,
        }
    }
}

/// Stateless combiner of partial assessments into a single weighted score.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAggregator;

impl RiskAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Weighted average over reporting factors, re-normalised so that missing
    /// factors lower confidence rather than the score.
    pub fn aggregate(
        &self,
        assessments: &[PartialAssessment],
        config: &WeightConfig,
    ) -> Result<AggregateRiskResult, AggregationError> {
        let mut reported: BTreeMap<RiskFactor, (f64, f64, &str)> = BTreeMap::new();

        for assessment in assessments {
            let factor = assessment.factor();
            let Some(weight) = config.weight(factor) else {
                debug!(%factor, "discarding assessment for unconfigured factor");
                continue;
            };

            let score = assessment.score();
            if score.is_nan() {
                debug!(%factor, "discarding assessment without a numeric score");
                continue;
            }
            let score = score.clamp(0.0, 1.0);

            let keep_existing = reported
                .get(&factor)
                .is_some_and(|(existing, _, _)| *existing >= score);
            if keep_existing {
                debug!(%factor, score, "keeping higher earlier report for factor");
            } else {
                reported.insert(factor, (score, weight, assessment.rationale()));
            }
        }

        let total_weight_present: f64 = reported.values().map(|(_, weight, _)| weight).sum();
        if total_weight_present <= 0.0 {
            return Err(AggregationError::InsufficientData {
                received: assessments.len(),
                recognized: reported.len(),
            });
        }

        let weighted_sum: f64 = reported
            .values()
            .map(|(score, weight, _)| score * weight)
            .sum();
        let overall_score = (weighted_sum / total_weight_present).clamp(0.0, 1.0);
        let confidence = (total_weight_present / config.total_weight()).clamp(0.0, 1.0);
        let level = config.level_for(overall_score);

        let contributions = reported
            .into_iter()
            .map(|(factor, (score, weight, rationale))| {
                (
                    factor,
                    FactorContribution {
                        score,
                        weight,
                        weighted_contribution: score * weight / total_weight_present,
                        rationale: rationale.to_string(),
                    },
                )
            })
            .collect();

        Ok(AggregateRiskResult {
            overall_score,
            level,
            confidence,
            contributions,
        })
    }
}

/// Aggregation refused to produce a score.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error(
        "insufficient data: {recognized} of {received} assessment(s) matched a weighted factor"
    )]
    InsufficientData { received: usize, recognized: usize },
}
