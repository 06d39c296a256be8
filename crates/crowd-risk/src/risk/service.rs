use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregate::{AggregationError, RiskAggregator};
use super::analyzers::{standard_analyzers, RiskAnalyzer};
use super::domain::{EventContext, PartialAssessment, ReportedAssessment, RiskFactor};
use super::recommend::{immediate_actions, RecommendationSelector};
use super::repository::{AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError};
use super::weights::WeightConfig;

/// Inbound request: the event plus any scores the caller measured itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub context: EventContext,
    /// Reported scores replace analyzer output for the same factor.
    #[serde(default)]
    pub reported: Vec<ReportedAssessment>,
    #[serde(default)]
    pub skip_analyzers: bool,
}

impl AssessmentRequest {
    pub fn new(context: EventContext) -> Self {
        Self {
            context,
            reported: Vec::new(),
            skip_analyzers: false,
        }
    }
}

/// Service composing analyzers, the aggregator, the recommendation rules, and storage.
pub struct RiskAssessmentService<R> {
    config: Arc<WeightConfig>,
    analyzers: Vec<Box<dyn RiskAnalyzer>>,
    aggregator: RiskAggregator,
    selector: RecommendationSelector,
    repository: Arc<R>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("assessment-{id:06}"))
}

impl<R> RiskAssessmentService<R>
where
    R: AssessmentRepository + 'static,
{
    pub fn new(config: Arc<WeightConfig>, repository: Arc<R>) -> Self {
        Self::with_analyzers(config, standard_analyzers(), repository)
    }

    pub fn with_analyzers(
        config: Arc<WeightConfig>,
        analyzers: Vec<Box<dyn RiskAnalyzer>>,
        repository: Arc<R>,
    ) -> Self {
        Self {
            config,
            analyzers,
            aggregator: RiskAggregator::new(),
            selector: RecommendationSelector::new(),
            repository,
        }
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    /// Run analyzers, merge reported scores, aggregate, and store the outcome.
    pub fn assess(
        &self,
        request: AssessmentRequest,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let AssessmentRequest {
            context,
            reported,
            skip_analyzers,
        } = request;

        let mut ignored_factors = Vec::new();
        let mut reported_assessments = Vec::new();
        for entry in &reported {
            match entry.recognize() {
                Ok(assessment) => reported_assessments.push(assessment),
                Err(err) => {
                    debug!(factor = %err.0, "ignoring reported assessment for unknown factor");
                    ignored_factors.push(err.0);
                }
            }
        }
        let reported_factors: BTreeSet<RiskFactor> = reported_assessments
            .iter()
            .map(PartialAssessment::factor)
            .collect();

        let mut skipped_analyzers = Vec::new();
        let mut assessments = Vec::new();
        if !skip_analyzers {
            for analyzer in &self.analyzers {
                if reported_factors.contains(&analyzer.factor()) {
                    continue;
                }
                match analyzer.assess(&context) {
                    Ok(assessment) => assessments.push(assessment),
                    Err(err) => {
                        warn!(factor = %analyzer.factor(), error = %err, "analyzer skipped");
                        skipped_analyzers.push(err.to_string());
                    }
                }
            }
        }
        assessments.extend(reported_assessments);

        let result = self
            .aggregator
            .aggregate(&assessments, &self.config)
            .map_err(|err| {
                let err = match err {
                    AggregationError::InsufficientData {
                        received,
                        recognized,
                    } => AggregationError::InsufficientData {
                        received: received + ignored_factors.len(),
                        recognized,
                    },
                };
                warn!(location = %context.location, error = %err, "assessment refused");
                err
            })?;

        let record = AssessmentRecord {
            id: next_assessment_id(),
            created_at: Utc::now(),
            recommendations: self.selector.select(&result),
            immediate_actions: immediate_actions(result.level),
            missing_factors: result.missing_factors(&self.config),
            context,
            result,
            skipped_analyzers,
            ignored_factors,
        };

        info!(
            id = %record.id.0,
            level = %record.result.level,
            score = record.result.overall_score,
            confidence = record.result.confidence,
            "stampede risk assessed"
        );

        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Fetch a stored assessment for API responses.
    pub fn get(&self, id: &AssessmentId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.recent(limit)?)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
