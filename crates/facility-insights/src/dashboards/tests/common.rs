use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use crate::dashboards::loader::{DatasetSource, LoadFailure, LoadRequest, RetryPolicy};
use crate::dashboards::notify::{FailureNotifier, LoadFailureNotice, NoticeError};
use crate::dashboards::{DashboardService, Domain, FacilityRecord};

pub(super) fn hospital_payload() -> Value {
    json!([
        {
            "hospital_name": "Central",
            "region": "Samarkand",
            "district": "North",
            "population_score": 0.9,
            "infrastructure_score": 0.55,
            "resources_score": 0.2,
            "need_category": "GREEN",
            "latitude": 39.65,
            "longitude": 66.95,
            "medical_staff": 40,
            "has_water": true,
        },
        {
            "hospital_name": "Riverside",
            "region": "Samarkand",
            "district": "South",
            "population_score": 0.5,
            "infrastructure_score": 0.75,
            "resources_score": "n/a",
            "need_category": "YELLOW",
            "medical_staff": 12,
            "has_water": "No",
        },
        {
            "hospital_name": "Hillside",
            "region": "Samarkand",
            "district": "South",
            "population_score": 0.1,
            "infrastructure_score": 0.3,
            "resources_score": 0.8,
            "has_water": 1,
        },
        {
            "hospital_name": "Unmapped",
            "population_score": 0.45,
        },
    ])
}

pub(super) fn hospitals() -> Vec<FacilityRecord> {
    match hospital_payload() {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| FacilityRecord::from_value(Domain::Hospital, item))
            .collect(),
        _ => Vec::new(),
    }
}

pub(super) fn quick_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
    }
}

pub(super) fn build_service<S: DatasetSource + 'static>(
    source: S,
    retry: RetryPolicy,
) -> (
    DashboardService<S, MemoryNotices>,
    Arc<S>,
    Arc<MemoryNotices>,
) {
    let source = Arc::new(source);
    let notices = Arc::new(MemoryNotices::default());
    let service = DashboardService::new(source.clone(), notices.clone(), retry);
    (service, source, notices)
}

/// Replays scripted responses in order, repeating the last one once the
/// script runs out.
#[derive(Default)]
pub(super) struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, LoadFailure>>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub(super) fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<Value, LoadFailure>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicU32::new(0),
        }
    }

    pub(super) fn always(response: Result<Value, LoadFailure>) -> Self {
        Self::new([response])
    }

    pub(super) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<Value, LoadFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().expect("script mutex poisoned");
        if responses.len() > 1 {
            responses
                .pop_front()
                .unwrap_or_else(|| Err(LoadFailure::Network("script exhausted".into())))
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or_else(|| Err(LoadFailure::Network("script exhausted".into())))
        }
    }
}

impl DatasetSource for ScriptedSource {
    async fn fetch(&self, _request: &LoadRequest) -> Result<Value, LoadFailure> {
        self.next_response()
    }
}

/// Answers with one record named after the requested district, after
/// sleeping for the district's configured delay.
pub(super) struct DelayedSource {
    pub(super) slow_district: &'static str,
    pub(super) delay: Duration,
}

impl DatasetSource for DelayedSource {
    async fn fetch(&self, request: &LoadRequest) -> Result<Value, LoadFailure> {
        let district = request.district.clone().unwrap_or_default();
        if district == self.slow_district {
            tokio::time::sleep(self.delay).await;
        }
        Ok(json!([{ "hospital_name": district, "district": district }]))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<LoadFailureNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<LoadFailureNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl FailureNotifier for MemoryNotices {
    fn publish(&self, notice: LoadFailureNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotices;

impl FailureNotifier for OfflineNotices {
    fn publish(&self, _notice: LoadFailureNotice) -> Result<(), NoticeError> {
        Err(NoticeError::Transport("banner feed offline".to_string()))
    }
}
