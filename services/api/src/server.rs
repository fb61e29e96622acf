use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryFailureNotifier};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use facility_insights::config::AppConfig;
use facility_insights::dashboards::{
    BackendSource, DashboardService, DatasetSource, Domain, FailureNotifier,
};
use facility_insights::error::AppError;
use facility_insights::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    args.source.apply(&mut config.backend);

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let notices = InMemoryFailureNotifier::default();
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        notices: notices.clone(),
    };

    let source = BackendSource::from_config(&config.backend)?;
    info!(source = %source.describe(), "dataset source configured");
    let dashboard_service = Arc::new(DashboardService::new(
        Arc::new(source),
        Arc::new(notices),
        config.backend.retry_policy(),
    ));

    let app = with_dashboard_routes(dashboard_service.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::spawn(warm_up(dashboard_service, readiness_flag));

    info!(?config.environment, %addr, "facility dashboards listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Load every domain once so the first dashboard request has data. The
/// service turns ready on the first loaded domain, or once the pass ends with
/// every domain failed so operators can still trigger a refresh. Failures are
/// already logged and published by the service.
async fn warm_up<S, N>(service: Arc<DashboardService<S, N>>, readiness: Arc<AtomicBool>)
where
    S: DatasetSource + 'static,
    N: FailureNotifier + 'static,
{
    for domain in Domain::ordered() {
        match service.refresh(domain).await {
            Ok(_) => {
                if !readiness.swap(true, Ordering::AcqRel) {
                    info!(%domain, "facility dashboards ready");
                }
            }
            Err(_) => warn!(%domain, "initial dataset load failed; refresh to retry"),
        }
    }
    if !readiness.swap(true, Ordering::AcqRel) {
        warn!("no dataset could be loaded; serving without data");
    }
}
