use crate::cli::ServeArgs;
use crate::infra::{build_service, load_definition, AppState};
use crate::routes::with_credit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_ahp::config::AppConfig;
use credit_ahp::error::AppError;
use credit_ahp::telemetry;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let definition = load_definition(None, &config.scoring)?;
    let scoring_service = Arc::new(build_service(&definition, &config.scoring)?);
    if !scoring_service.current().is_usable() {
        warn!(
            hierarchy = %definition.name,
            "serving with scoring disabled until a consistent hierarchy is loaded"
        );
    }

    let app = with_credit_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, hierarchy = %definition.name, "credit scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
