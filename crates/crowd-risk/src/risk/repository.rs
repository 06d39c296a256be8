use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::AggregateRiskResult;
use super::domain::{EventContext, RiskFactor};

/// Identifier wrapper for stored assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Everything produced for one assessment request, kept for dashboard polling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub created_at: DateTime<Utc>,
    pub context: EventContext,
    pub result: AggregateRiskResult,
    pub recommendations: Vec<String>,
    pub immediate_actions: Vec<String>,
    pub missing_factors: Vec<RiskFactor>,
    /// Analyzer failures, one message per analyzer that did not report.
    pub skipped_analyzers: Vec<String>,
    /// Caller-reported factor names that were not recognised.
    pub ignored_factors: Vec<String>,
}

/// Storage abstraction so the service can be exercised without a database.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    /// Newest first, at most `limit` records.
    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
