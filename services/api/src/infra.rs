use invoice_insight::config::AppConfig;
use invoice_insight::gateway::{HttpInvoiceGateway, InvoiceGateway};
use invoice_insight::views::{InFlightGuard, ReachabilityHandle};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) gateway: Arc<dyn InvoiceGateway>,
    pub(crate) reachability: ReachabilityHandle,
    /// Shared across requests so only one processing run is outstanding.
    pub(crate) processing: InFlightGuard,
}

pub(crate) fn http_gateway(config: &AppConfig) -> Arc<dyn InvoiceGateway> {
    tracing::debug!(base_url = %config.gateway.base_url, "using invoice service");
    Arc::new(HttpInvoiceGateway::new(&config.gateway))
}
