use crate::cli::ServeArgs;
use crate::infra::{http_gateway, AppState};
use crate::routes::with_invoice_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use invoice_insight::config::AppConfig;
use invoice_insight::error::AppError;
use invoice_insight::telemetry;
use invoice_insight::views::{InFlightGuard, ReachabilityProbe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let gateway = http_gateway(&config);
    let probe = ReachabilityProbe::new();
    let reachability = probe.handle();

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        gateway: Arc::clone(&gateway),
        reachability,
        processing: InFlightGuard::new(),
    };

    let app = with_invoice_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    // Views never wait on the probe; they read `pending` until it lands.
    tokio::spawn(async move {
        probe.run(gateway.as_ref()).await;
    });

    info!(?config.environment, %addr, base_url = %config.gateway.base_url, "invoice insight ready");

    axum::serve(listener, app).await?;
    Ok(())
}
