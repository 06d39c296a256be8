use std::cmp::Ordering;

use super::aggregate::AggregateRiskResult;
use super::domain::{RiskFactor, RiskLevel};

/// Share of the overall score at which a factor counts as dominant.
pub const DOMINANCE_SHARE: f64 = 0.25;

/// Deterministic rule table mapping an aggregate result to advice.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationSelector {
    dominance_share: f64,
}

impl Default for RecommendationSelector {
    fn default() -> Self {
        Self {
            dominance_share: DOMINANCE_SHARE,
        }
    }
}

impl RecommendationSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level recommendations first, then one line per dominant factor ordered
    /// by descending contribution (ties by factor order).
    pub fn select(&self, result: &AggregateRiskResult) -> Vec<String> {
        let mut recommendations: Vec<String> = level_recommendations(result.level)
            .iter()
            .map(|line| line.to_string())
            .collect();

        recommendations.extend(
            self.dominant_factors(result)
                .into_iter()
                .map(|factor| factor_recommendation(factor).to_string()),
        );

        recommendations
    }

    /// Factors whose normalised contribution meets the dominance share.
    pub fn dominant_factors(&self, result: &AggregateRiskResult) -> Vec<RiskFactor> {
        if result.overall_score <= 0.0 {
            return Vec::new();
        }

        let mut dominant: Vec<(RiskFactor, f64)> = result
            .contributions
            .iter()
            .filter(|(factor, _)| result.contribution_share(**factor) >= self.dominance_share)
            .map(|(factor, contribution)| (*factor, contribution.weighted_contribution))
            .collect();

        dominant.sort_by(|(left_factor, left), (right_factor, right)| {
            match right.total_cmp(left) {
                Ordering::Equal => left_factor.cmp(right_factor),
                other => other,
            }
        });

        dominant.into_iter().map(|(factor, _)| factor).collect()
    }
}

fn level_recommendations(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Minimal => &["Continue routine crowd monitoring"],
        RiskLevel::Low => &[
            "Continue routine crowd monitoring",
            "Brief on-site staff on escalation contacts and exit routes",
        ],
        RiskLevel::Medium => &[
            "Increase monitoring of entry gates and congestion points",
            "Deploy crowd management personnel to high-risk areas",
            "Communicate with attendees about alternative routes and timing",
            "Monitor social media for real-time sentiment changes",
        ],
        RiskLevel::High => &[
            "Deploy additional security personnel immediately",
            "Implement crowd control barriers at key entry and exit points",
            "Activate emergency response protocols",
            "Consider limiting or suspending entry to the venue",
            "Coordinate with local emergency services",
        ],
        RiskLevel::Critical => &[
            "Place evacuation routes and marshals on standby",
            "Deploy additional security personnel immediately",
            "Implement crowd control barriers at key entry and exit points",
            "Activate emergency response protocols",
            "Consider limiting or suspending entry to the venue",
            "Coordinate with local emergency services",
        ],
    }
}

fn factor_recommendation(factor: RiskFactor) -> &'static str {
    match factor {
        RiskFactor::Historical => {
            "Review past incidents at this venue and reinforce the measures that failed"
        }
        RiskFactor::SocialBuzz => "Monitor and address viral social media content",
        RiskFactor::TrafficCelebrity => {
            "Coordinate VIP arrival timing and traffic diversion with local police"
        }
        RiskFactor::EntryGate => "Add crowd barriers and staff at congested gates",
        RiskFactor::Weather => "Prepare shelter and cooling points for weather-driven crowd shifts",
        RiskFactor::EventIntelligence => {
            "Escalate live reports from on-site staff to the command post"
        }
    }
}

/// Time-critical steps for the operations team, empty below MEDIUM.
pub fn immediate_actions(level: RiskLevel) -> Vec<String> {
    let actions: &[&str] = match level {
        RiskLevel::Critical => &[
            "Initiate emergency protocols now",
            "Contact emergency services immediately",
            "Begin controlled evacuation procedures if necessary",
            "Activate all available security and crowd control resources",
        ],
        RiskLevel::High => &[
            "Increase security presence by 50%",
            "Close secondary entry points if overcrowded",
            "Begin crowd dispersal in high-density areas",
            "Prepare emergency response teams",
        ],
        RiskLevel::Medium => &[
            "Increase monitoring frequency",
            "Deploy additional crowd management staff",
            "Prepare contingency plans for activation",
        ],
        RiskLevel::Low | RiskLevel::Minimal => &[],
    };

    actions.iter().map(|action| action.to_string()).collect()
}
