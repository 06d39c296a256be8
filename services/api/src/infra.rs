use chrono::NaiveDate;
use crowd_risk::risk::{
    AssessmentId, AssessmentRecord, AssessmentRepository, ReportedAssessment, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Store {
    records: HashMap<AssessmentId, AssessmentRecord>,
    order: Vec<AssessmentId>,
}

/// Process-local storage; assessments are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    store: Arc<Mutex<Store>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        if guard.records.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(record.id.clone());
        guard.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.records.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard
            .order
            .iter()
            .rev()
            .filter_map(|id| guard.records.get(id))
            .take(limit)
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// `name=score` as given to `--factor`. The name is checked later by the service.
pub(crate) fn parse_reported_factor(raw: &str) -> Result<ReportedAssessment, String> {
    let (name, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SCORE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing factor name in '{raw}'"));
    }
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse score in '{raw}' ({err})"))?;

    Ok(ReportedAssessment {
        factor: name.to_string(),
        score,
        rationale: "reported on the command line".to_string(),
    })
}
