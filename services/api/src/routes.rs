use crate::infra::AppState;
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use invoice_insight::error::AppError;
use invoice_insight::invoices::InvoiceId;
use invoice_insight::views::{
    BackendNotice, DashboardSnapshot, DashboardView, InFlightGuard, InvoiceCardView,
    InvoiceDetailPage, InvoiceDetailView, InvoiceListView, ProcessingFeedback, Reachability,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InvoiceSearchQuery {
    #[serde(default)]
    pub(crate) search: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusResponse {
    pub(crate) reachability: Reachability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notice: Option<BackendNotice>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InvoiceListResponse {
    pub(crate) count: usize,
    pub(crate) invoices: Vec<InvoiceCardView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProcessResponse {
    pub(crate) feedback: ProcessingFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dashboard: Option<DashboardSnapshot>,
}

pub(crate) fn with_invoice_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/status", axum::routing::get(status_endpoint))
        .route("/api/dashboard", axum::routing::get(dashboard_endpoint))
        .route("/api/invoices", axum::routing::get(invoice_list_endpoint))
        .route("/api/invoices/:id", axum::routing::get(invoice_detail_endpoint))
        .route("/api/process", axum::routing::post(process_endpoint))
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

pub(crate) async fn status_endpoint(Extension(state): Extension<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        reachability: state.reachability.status(),
        notice: state.reachability.notice(),
    })
}

pub(crate) async fn dashboard_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let mut view = DashboardView::new(state.gateway, InFlightGuard::new());
    let snapshot = view.load().await?.clone();
    Ok(Json(snapshot))
}

pub(crate) async fn invoice_list_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<InvoiceSearchQuery>,
) -> Result<Json<InvoiceListResponse>, AppError> {
    let mut view = InvoiceListView::new(state.gateway, InFlightGuard::new());
    view.load().await?;

    let invoices = view.visible(query.search.as_deref().unwrap_or_default());
    Ok(Json(InvoiceListResponse {
        count: invoices.len(),
        invoices,
    }))
}

pub(crate) async fn invoice_detail_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceDetailPage>, AppError> {
    let mut view = InvoiceDetailView::new(state.gateway, InFlightGuard::new());
    let record = view.load(&InvoiceId::from(id)).await?;
    Ok(Json(InvoiceDetailPage::from_record(record)))
}

pub(crate) async fn process_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<ProcessResponse>, AppError> {
    let mut view = DashboardView::new(state.gateway, state.processing);
    let feedback = view.process().await;
    if let Some(failure) = feedback.failure {
        return Err(failure.into());
    }

    Ok(Json(ProcessResponse {
        feedback,
        dashboard: view.snapshot().cloned(),
    }))
}
