use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{Domain, ScoreAxis};
use super::filter::FilterSelection;
use super::loader::DatasetSource;
use super::notify::FailureNotifier;
use super::service::{DashboardError, DashboardService};

/// Router builder exposing the dashboards over HTTP.
pub fn dashboard_router<S, N>(service: Arc<DashboardService<S, N>>) -> Router
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    Router::new()
        .route("/api/v1/dashboards/:domain", get(dashboard_handler::<S, N>))
        .route(
            "/api/v1/dashboards/:domain/options",
            get(options_handler::<S, N>),
        )
        .route(
            "/api/v1/dashboards/:domain/refresh",
            post(refresh_handler::<S, N>),
        )
        .route(
            "/api/v1/dashboards/:domain/export/:topic",
            get(export_handler::<S, N>),
        )
        .with_state(service)
}

/// Build a selection from repeated `district` / `entity` query pairs. The
/// backend's `{domain}_name` key is accepted for entity names as well.
pub(crate) fn selection_from_query(domain: Domain, pairs: &[(String, String)]) -> FilterSelection {
    let name_key = domain.name_query_param();
    let mut selection = FilterSelection::default();
    for (key, value) in pairs {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if key == "district" {
            selection.districts.insert(value.to_string());
        } else if key == "entity" || *key == name_key {
            selection.entity_names.insert(value.to_string());
        }
    }
    selection
}

fn parse_domain(raw: &str) -> Result<Domain, Response> {
    raw.parse::<Domain>().map_err(|err| not_found(err.to_string()))
}

fn not_found(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

pub(crate) fn error_response(error: DashboardError) -> Response {
    match error {
        DashboardError::Load(failure) => {
            let payload = json!({
                "error": failure.to_string(),
                "kind": failure.kind(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        DashboardError::NotLoaded(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        DashboardError::Export(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn dashboard_handler<S, N>(
    State(service): State<Arc<DashboardService<S, N>>>,
    Path(domain): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    let domain = match parse_domain(&domain) {
        Ok(domain) => domain,
        Err(response) => return response,
    };
    let selection = selection_from_query(domain, &pairs);
    match service.dashboard(domain, &selection) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn options_handler<S, N>(
    State(service): State<Arc<DashboardService<S, N>>>,
    Path(domain): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    let domain = match parse_domain(&domain) {
        Ok(domain) => domain,
        Err(response) => return response,
    };
    let districts: BTreeSet<String> = selection_from_query(domain, &pairs).districts;
    match service.options(domain, &districts) {
        Ok(options) => (StatusCode::OK, axum::Json(options)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn refresh_handler<S, N>(
    State(service): State<Arc<DashboardService<S, N>>>,
    Path(domain): Path<String>,
) -> Response
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    let domain = match parse_domain(&domain) {
        Ok(domain) => domain,
        Err(response) => return response,
    };
    match service.refresh(domain).await {
        Ok(snapshot) => {
            let payload = json!({
                "domain": domain,
                "records": snapshot.records.len(),
                "loaded_at": snapshot.loaded_at,
                "sequence": snapshot.sequence,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<S, N>(
    State(service): State<Arc<DashboardService<S, N>>>,
    Path((domain, topic)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    let domain = match parse_domain(&domain) {
        Ok(domain) => domain,
        Err(response) => return response,
    };
    let axis = match topic.parse::<ScoreAxis>() {
        Ok(axis) => axis,
        Err(err) => return not_found(err.to_string()),
    };
    let selection = selection_from_query(domain, &pairs);

    match service.export_csv(domain, axis, &selection) {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}-{}.csv\"",
                domain.slug(),
                axis.score_field().trim_end_matches("_score")
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}
