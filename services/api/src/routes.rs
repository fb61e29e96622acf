use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use facility_insights::dashboards::{
    dashboard_router, DashboardService, DatasetSource, FailureNotifier, LoadFailureNotice,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct NoticeFeed {
    pub(crate) count: usize,
    pub(crate) notices: Vec<NoticeEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NoticeEntry {
    pub(crate) headline: String,
    #[serde(flatten)]
    pub(crate) notice: LoadFailureNotice,
}

pub(crate) fn with_dashboard_routes<S, N>(service: Arc<DashboardService<S, N>>) -> axum::Router
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    dashboard_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/notices", axum::routing::get(notices_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn notices_endpoint(Extension(state): Extension<AppState>) -> Json<NoticeFeed> {
    let notices: Vec<NoticeEntry> = state
        .notices
        .recent()
        .into_iter()
        .map(|notice| NoticeEntry {
            headline: notice.headline(),
            notice,
        })
        .collect();
    Json(NoticeFeed {
        count: notices.len(),
        notices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryFailureNotifier;
    use axum::body::Body;
    use axum::http::Request;
    use facility_insights::dashboards::{
        CsvDatasetSource, Domain, LoadFailure, LoadRequest, RetryPolicy,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    struct StaticSource(Value);

    impl DatasetSource for StaticSource {
        async fn fetch(&self, _request: &LoadRequest) -> Result<Value, LoadFailure> {
            Ok(self.0.clone())
        }
    }

    fn app_state(ready: bool, notices: InMemoryFailureNotifier) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            notices,
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn static_app(ready: bool) -> (axum::Router, AppState) {
        let notices = InMemoryFailureNotifier::default();
        let service = Arc::new(DashboardService::new(
            Arc::new(StaticSource(json!([
                { "school_name": "No. 7", "district": "East", "population_score": 0.72 }
            ]))),
            Arc::new(notices.clone()),
            RetryPolicy::none(),
        ));
        let state = app_state(ready, notices);
        let app = with_dashboard_routes(service).layer(Extension(state.clone()));
        (app, state)
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (app, _state) = static_app(false);
        let response = app.oneshot(get("/health")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let (app, state) = static_app(false);
        let response = app
            .clone()
            .oneshot(get("/ready"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = app.oneshot(get("/ready")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], json!("ready"));
    }

    #[tokio::test]
    async fn metrics_render_prometheus_text() {
        let (app, _state) = static_app(true);
        let response = app.oneshot(get("/metrics")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }

    #[tokio::test]
    async fn dashboards_are_served_next_to_operational_routes() {
        let (app, _state) = static_app(true);
        let refresh = Request::builder()
            .method("POST")
            .uri("/api/v1/dashboards/school/refresh")
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(refresh).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get("/api/v1/dashboards/school?district=East"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["population_score"], json!("72%"));
    }

    #[tokio::test]
    async fn failed_loads_appear_in_notice_feed() {
        let notices = InMemoryFailureNotifier::default();
        let service = Arc::new(DashboardService::new(
            Arc::new(CsvDatasetSource::new("/nonexistent/facility-data")),
            Arc::new(notices.clone()),
            RetryPolicy::none(),
        ));
        let result = service.refresh(Domain::Preschool).await;
        assert!(result.is_err());

        let app = with_dashboard_routes(service).layer(Extension(app_state(true, notices)));
        let response = app
            .oneshot(get("/api/v1/notices"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["notices"][0]["domain"], json!("preschool"));
        assert_eq!(body["notices"][0]["kind"], json!("network_error"));
        assert_eq!(
            body["notices"][0]["headline"],
            json!("Failed to load preschool data (Network Error)")
        );
    }
}
