//! Stampede risk assessment for crowded events.
//!
//! Analyzers score individual risk factors for an [`EventContext`], the aggregator
//! combines whichever factors reported into a weighted score and level, and the
//! selector turns that result into recommendations. The service stores each outcome
//! so dashboards can poll it through the router.

pub mod aggregate;
pub mod analyzers;
pub mod domain;
pub mod recommend;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod weights;

#[cfg(test)]
mod tests;

pub use aggregate::{AggregateRiskResult, AggregationError, FactorContribution, RiskAggregator};
pub use analyzers::{standard_analyzers, AnalyzerError, RiskAnalyzer};
pub use domain::{
    CrowdSentiment, EventContext, EventKind, LiveSignal, PartialAssessment, ReportedAssessment,
    RiskFactor, RiskLevel, SocialSignal, UnknownFactor, VenueSetting, WeatherObservation,
};
pub use recommend::{immediate_actions, RecommendationSelector, DOMINANCE_SHARE};
pub use report::{FactorView, ReportFormatter, RiskReportView};
pub use repository::{AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError};
pub use router::assessment_router;
pub use service::{AssessmentRequest, AssessmentServiceError, RiskAssessmentService};
pub use weights::{LevelThreshold, WeightConfig, WeightConfigError};
