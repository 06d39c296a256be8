use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::risk::domain::{
    CrowdSentiment, EventContext, EventKind, LiveSignal, ReportedAssessment, SocialSignal,
    VenueSetting, WeatherObservation,
};
use crate::risk::repository::{
    AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError,
};
use crate::risk::service::{AssessmentRequest, RiskAssessmentService};
use crate::risk::weights::WeightConfig;
use crate::risk::assessment_router;

/// Religious gathering with every signal present; aggregates to HIGH.
pub(super) fn festival_context() -> EventContext {
    EventContext {
        location: "Kumbh Mela Ground, Prayagraj".to_string(),
        event_name: "Magh Snan".to_string(),
        event_kind: EventKind::Religious,
        setting: VenueSetting::Outdoor,
        expected_attendance: 50_000,
        venue_capacity: Some(60_000),
        gate_count: Some(4),
        event_date: Some(NaiveDate::from_ymd_opt(2025, 2, 1).expect("valid date")),
        vip_appearance: true,
        social: Some(SocialSignal {
            mentions: 6_000,
            negative_share: 0.45,
            viral: true,
            urgency_keywords: 3,
        }),
        weather: Some(WeatherObservation {
            temperature_f: 98.0,
            precipitation_in: 0.0,
            wind_mph: 10.0,
            humidity_pct: 85.0,
            severe_alert: false,
        }),
        live: Some(LiveSignal {
            crowd_sentiment: CrowdSentiment::Agitated,
            observed_attendance: Some(65_000),
            security_incidents: 3,
            unexpected_developments: true,
        }),
    }
}

/// Context with no optional signals; only venue-driven analyzers can report.
pub(super) fn sparse_context() -> EventContext {
    EventContext::new("Riverside Community Hall")
}

pub(super) fn reported(factor: &str, score: f64) -> ReportedAssessment {
    ReportedAssessment {
        factor: factor.to_string(),
        score,
        rationale: format!("{factor} reported by field team"),
    }
}

/// Reported-only request: HISTORICAL and ENTRY_GATE at full score.
pub(super) fn critical_request() -> AssessmentRequest {
    AssessmentRequest {
        context: sparse_context(),
        reported: vec![reported("historical", 1.0), reported("entry_gate", 1.0)],
        skip_analyzers: true,
    }
}

pub(super) fn unrecognised_request() -> AssessmentRequest {
    AssessmentRequest {
        context: sparse_context(),
        reported: vec![reported("moon_phase", 0.9)],
        skip_analyzers: true,
    }
}

pub(super) fn build_service() -> (
    RiskAssessmentService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = RiskAssessmentService::new(Arc::new(WeightConfig::standard()), repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl AssessmentRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: RiskAssessmentService<MemoryRepository>) -> axum::Router {
    assessment_router(Arc::new(service))
}
