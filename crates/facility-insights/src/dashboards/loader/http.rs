use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::source::{DatasetSource, LoadFailure, LoadRequest};
use crate::dashboards::domain::Domain;

/// Reads datasets from the survey backend's `GET /api/{domain}-data` routes.
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    client: Client,
    base_url: String,
}

impl HttpDatasetSource {
    /// Build a source whose every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, domain: Domain) -> String {
        format!("{}/api/{}-data", self.base_url, domain.slug())
    }
}

impl DatasetSource for HttpDatasetSource {
    fn fetch(
        &self,
        request: &LoadRequest,
    ) -> impl Future<Output = Result<Value, LoadFailure>> + Send {
        let url = self.endpoint(request.domain);
        let query = request.query_pairs();
        let client = self.client.clone();

        async move {
            debug!(%url, ?query, "requesting dataset");
            let response = client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|err| LoadFailure::Network(err.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|err| LoadFailure::Network(err.to_string()))?;
            let payload = serde_json::from_str::<Value>(&body);

            if !status.is_success() {
                let detail = payload
                    .ok()
                    .and_then(|value| {
                        value.get("error").and_then(Value::as_str).map(str::to_string)
                    })
                    .unwrap_or_else(|| format!("backend returned {status}"));
                return Err(LoadFailure::Backend(detail));
            }

            payload.map_err(|err| LoadFailure::Backend(format!("invalid JSON payload: {err}")))
        }
    }
}
