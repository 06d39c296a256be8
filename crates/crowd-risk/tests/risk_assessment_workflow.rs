//! Integration scenarios for stampede risk assessment.
//!
//! Scenarios drive the public service facade and HTTP router so aggregation,
//! recommendation, and storage are validated together.

mod common {
    use std::sync::{Arc, Mutex};

    use crowd_risk::risk::{
        AssessmentId, AssessmentRecord, AssessmentRepository, AssessmentRequest, EventContext,
        EventKind, ReportedAssessment, RepositoryError, RiskAssessmentService, SocialSignal,
        WeightConfig,
    };

    pub(super) fn stadium_context() -> EventContext {
        EventContext {
            event_name: "Cup Final".to_string(),
            event_kind: EventKind::Sports,
            expected_attendance: 40_000,
            venue_capacity: Some(45_000),
            gate_count: Some(10),
            social: Some(SocialSignal {
                mentions: 2_500,
                negative_share: 0.2,
                viral: false,
                urgency_keywords: 0,
            }),
            ..EventContext::new("City Stadium")
        }
    }

    pub(super) fn reported(factor: &str, score: f64) -> ReportedAssessment {
        ReportedAssessment {
            factor: factor.to_string(),
            score,
            rationale: String::new(),
        }
    }

    pub(super) fn reported_only(entries: Vec<ReportedAssessment>) -> AssessmentRequest {
        AssessmentRequest {
            context: EventContext::new("Test Venue"),
            reported: entries,
            skip_analyzers: true,
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRepository {
        records: Arc<Mutex<Vec<AssessmentRecord>>>,
    }

    impl AssessmentRepository for MemoryRepository {
        fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
            self.records.lock().expect("lock").push(record.clone());
            Ok(record)
        }

        fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.iter().find(|record| &record.id == id).cloned())
        }

        fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.iter().rev().take(limit).cloned().collect())
        }
    }

    pub(super) fn build_service(config: WeightConfig) -> RiskAssessmentService<MemoryRepository> {
        RiskAssessmentService::new(Arc::new(config), Arc::new(MemoryRepository::default()))
    }
}

mod aggregation {
    use super::common::*;
    use crowd_risk::risk::{
        AggregationError, AssessmentRequest, AssessmentServiceError, RiskFactor, RiskLevel,
        WeightConfig,
    };

    #[test]
    fn equal_weights_average_reported_scores() {
        let config = WeightConfig::parse(Some("historical=1,entry_gate=1"), None).expect("config");
        let service = build_service(config);

        let record = service
            .assess(reported_only(vec![
                reported("historical", 0.2),
                reported("entry_gate", 0.8),
            ]))
            .expect("assessment");

        assert!((record.result.overall_score - 0.5).abs() < 1e-9);
        assert_eq!(record.result.level, RiskLevel::Low);
        assert!((record.result.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn heavier_factor_dominates_score() {
        let config = WeightConfig::parse(Some("historical=1,entry_gate=3"), None).expect("config");
        let service = build_service(config);

        let record = service
            .assess(reported_only(vec![
                reported("historical", 1.0),
                reported("entry_gate", 0.0),
            ]))
            .expect("assessment");

        assert!((record.result.overall_score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn missing_factor_lowers_confidence_not_score() {
        let service = build_service(WeightConfig::standard());
        let full = service
            .assess(reported_only(
                RiskFactor::ALL
                    .iter()
                    .map(|factor| reported(factor.key(), 0.7))
                    .collect(),
            ))
            .expect("full assessment");
        let partial = service
            .assess(reported_only(vec![
                reported("historical", 0.7),
                reported("entry_gate", 0.7),
            ]))
            .expect("partial assessment");

        assert!((full.result.overall_score - 0.7).abs() < 1e-9);
        assert!((partial.result.overall_score - 0.7).abs() < 1e-9);
        assert!(partial.result.confidence < full.result.confidence);
        assert!((partial.result.confidence - 0.5).abs() < 1e-9);
        assert_eq!(partial.missing_factors.len(), 4);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let service = build_service(WeightConfig::standard());

        let record = service
            .assess(reported_only(vec![
                reported("historical", 7.5),
                reported("weather", -3.0),
            ]))
            .expect("assessment");

        let contributions = &record.result.contributions;
        assert_eq!(contributions[&RiskFactor::Historical].score, 1.0);
        assert_eq!(contributions[&RiskFactor::Weather].score, 0.0);
        assert!((0.0..=1.0).contains(&record.result.overall_score));
    }

    #[test]
    fn empty_evidence_is_refused() {
        let service = build_service(WeightConfig::standard());

        let err = service
            .assess(reported_only(Vec::new()))
            .expect_err("no evidence");

        assert!(matches!(
            err,
            AssessmentServiceError::Aggregation(AggregationError::InsufficientData { .. })
        ));
    }

    #[test]
    fn analyzers_fill_in_unreported_factors() {
        let service = build_service(WeightConfig::standard());
        let mut request = AssessmentRequest::new(stadium_context());
        request.reported.push(reported("event-intelligence", 0.9));

        let record = service.assess(request).expect("assessment");

        let reported_factors: Vec<RiskFactor> =
            record.result.contributions.keys().copied().collect();
        assert_eq!(
            reported_factors,
            vec![
                RiskFactor::Historical,
                RiskFactor::SocialBuzz,
                RiskFactor::TrafficCelebrity,
                RiskFactor::EntryGate,
                RiskFactor::EventIntelligence,
            ]
        );
        assert_eq!(record.missing_factors, vec![RiskFactor::Weather]);
        assert_eq!(record.skipped_analyzers.len(), 1);
    }

    #[test]
    fn identical_requests_yield_identical_advice() {
        let service = build_service(WeightConfig::standard());

        let first = service
            .assess(AssessmentRequest::new(stadium_context()))
            .expect("first");
        let second = service
            .assess(AssessmentRequest::new(stadium_context()))
            .expect("second");

        assert_eq!(first.result, second.result);
        assert_eq!(first.recommendations, second.recommendations);
        assert_ne!(first.id, second.id);
    }
}

mod routing {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use crowd_risk::risk::{assessment_router, WeightConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn dashboard_round_trip() {
        let router = assessment_router(Arc::new(build_service(WeightConfig::standard())));
        let payload = json!({
            "context": {
                "location": "Central Park Great Lawn",
                "event_kind": "concert",
                "expected_attendance": 60000,
                "gate_count": 6,
                "weather": { "temperature_f": 91.0, "precipitation_in": 0.3 }
            },
            "reported": [{ "factor": "social_buzz", "score": 0.95 }]
        });

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/risk/assessments")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let created: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(created["location"], "Central Park Great Lawn");
        assert!(created["recommendations"]
            .as_array()
            .is_some_and(|items| !items.is_empty()));

        let response = router
            .oneshot(
                Request::get("/api/v1/risk/assessments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let listed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(listed[0]["assessment_id"], created["assessment_id"]);
    }
}
