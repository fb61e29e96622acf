use std::future::Future;

use serde::Serialize;
use serde_json::Value;

use crate::dashboards::domain::Domain;
use crate::dashboards::record::FacilityRecord;

/// Parameters for one dataset fetch. The optional fields are forwarded to
/// the backend as server-side pre-filters; the pipeline still filters
/// whatever comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub domain: Domain,
    pub region: Option<String>,
    pub district: Option<String>,
    pub entity_name: Option<String>,
}

impl LoadRequest {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            region: None,
            district: None,
            entity_name: None,
        }
    }

    /// Query pairs in the backend's naming (`region`, `district`, `{domain}_name`).
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(region) = non_blank(&self.region) {
            pairs.push(("region".to_string(), region.to_string()));
        }
        if let Some(district) = non_blank(&self.district) {
            pairs.push(("district".to_string(), district.to_string()));
        }
        if let Some(name) = non_blank(&self.entity_name) {
            pairs.push((self.domain.name_query_param(), name.to_string()));
        }
        pairs
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailureKind {
    NetworkError,
    BackendError,
}

impl LoadFailureKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NetworkError => "Network Error",
            Self::BackendError => "Backend Error",
        }
    }
}

/// Why a dataset could not be loaded. Transport problems are `Network` and
/// may be retried; anything the backend said or sent wrong is `Backend`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl LoadFailure {
    pub fn kind(&self) -> LoadFailureKind {
        match self {
            Self::Network(_) => LoadFailureKind::NetworkError,
            Self::Backend(_) => LoadFailureKind::BackendError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Where raw dataset payloads come from.
pub trait DatasetSource: Send + Sync {
    /// Fetch the raw JSON payload for `request`. Validation of the payload
    /// shape happens in [`decode_payload`].
    fn fetch(
        &self,
        request: &LoadRequest,
    ) -> impl Future<Output = Result<Value, LoadFailure>> + Send;
}

/// Turn a backend payload into records: an array of objects is a dataset, an
/// object with an `error` member is a backend failure, anything else is
/// malformed. A single bad element rejects the whole payload.
pub fn decode_payload(domain: Domain, payload: Value) -> Result<Vec<FacilityRecord>, LoadFailure> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                FacilityRecord::from_value(domain, item).ok_or_else(|| {
                    LoadFailure::Backend(format!("record {index} is not a JSON object"))
                })
            })
            .collect(),
        Value::Object(object) => match object.get("error") {
            Some(Value::String(message)) => Err(LoadFailure::Backend(message.clone())),
            Some(other) => Err(LoadFailure::Backend(other.to_string())),
            None => Err(LoadFailure::Backend(
                "expected a JSON array of records".to_string(),
            )),
        },
        other => Err(LoadFailure::Backend(format!(
            "expected a JSON array of records, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
