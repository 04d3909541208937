//! Boundary to the external invoice service.
//!
//! The presentation model only needs the four operations on
//! [`InvoiceGateway`]. [`HttpInvoiceGateway`] talks to the upstream REST API;
//! tests substitute in-memory fakes.

mod http;

pub use http::HttpInvoiceGateway;

use crate::invoices::{InvoiceId, InvoiceRecord, ValidationError};
use async_trait::async_trait;
use serde::Serialize;

/// Failure taxonomy shared by every gateway implementation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invoice service unreachable: {0}")]
    Unreachable(String),
    #[error("invoice service error{}: {message}", status_suffix(.status))]
    ServerError {
        status: Option<u16>,
        message: String,
    },
    #[error("invoice {0} not found")]
    NotFound(InvoiceId),
    #[error("malformed invoice payload: {0}")]
    Validation(#[from] ValidationError),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

impl GatewayError {
    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            message: message.into(),
        }
    }
}

/// Per-document result reported by a processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub blob_name: Option<String>,
    pub invoice_id: Option<String>,
    pub invoice_number: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    pub processed_count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<ProcessedDocument>,
}

impl ProcessingOutcome {
    pub fn failed_documents(&self) -> usize {
        self.results.iter().filter(|result| !result.success).count()
    }
}

/// Operations the presentation model requires from the invoice service.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError>;

    async fn get_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError>;

    /// Ingests and scores new documents upstream. Side effects are opaque here;
    /// callers re-fetch afterwards.
    async fn trigger_processing(&self) -> Result<ProcessingOutcome, GatewayError>;

    async fn check_health(&self) -> Result<(), GatewayError>;
}
