use super::{GatewayError, InvoiceGateway, ProcessedDocument, ProcessingOutcome};
use crate::config::GatewayConfig;
use crate::invoices::{keep_valid, InvoiceId, InvoiceRecord, WireInvoice};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Gateway backed by the upstream REST API (`/invoices`, `/process`, `/health`).
#[derive(Clone)]
pub struct HttpInvoiceGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpInvoiceGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends path segments to the base URL. Each segment is percent-encoded,
    /// so an id holding `/`, `?` or `#` stays a single segment.
    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| GatewayError::Unreachable(format!("invalid base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::Unreachable("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
struct ListPayload {
    #[serde(default)]
    invoices: Option<Vec<WireInvoice>>,
}

#[derive(Debug, Deserialize)]
struct DetailPayload {
    #[serde(default)]
    invoice: Option<WireInvoice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProcessedDocument {
    #[serde(default)]
    blob_name: Option<String>,
    #[serde(default)]
    invoice_id: Option<String>,
    #[serde(default)]
    invoice_number: Option<String>,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProcessPayload {
    #[serde(default)]
    processed: Option<u64>,
    #[serde(default)]
    results: Option<Vec<WireProcessedDocument>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_decode() {
        GatewayError::server(
            err.status().map(|status| status.as_u16()),
            format!("undecodable response: {err}"),
        )
    } else {
        GatewayError::Unreachable(err.to_string())
    }
}

async fn error_from_response(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "unexpected response".to_string());
    GatewayError::server(Some(status.as_u16()), message)
}

/// Non-2xx responses and `{"status": "error"}` envelopes both become `ServerError`.
async fn read_envelope<T>(response: reqwest::Response) -> Result<T, GatewayError>
where
    T: DeserializeOwned,
{
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let status = response.status().as_u16();
    let envelope: Envelope<T> = response.json().await.map_err(transport_error)?;
    if envelope.status.as_deref() == Some("error") {
        return Err(GatewayError::server(
            Some(status),
            envelope
                .message
                .unwrap_or_else(|| "service reported an error".to_string()),
        ));
    }

    Ok(envelope.payload)
}

#[async_trait]
impl InvoiceGateway for HttpInvoiceGateway {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError> {
        let response = self.send(self.client.get(self.url(&["invoices"])?)).await?;
        let payload: ListPayload = read_envelope(response).await?;
        let records = keep_valid(payload.invoices.unwrap_or_default());
        tracing::debug!(count = records.len(), "invoices fetched");
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url, invoice_id = %id))]
    async fn get_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError> {
        // Dot segments are dropped by URL normalization and would address the collection.
        if matches!(id.as_str(), "" | "." | "..") {
            return Err(GatewayError::NotFound(id.clone()));
        }

        let url = self.url(&["invoices", id.as_str()])?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(id.clone()));
        }

        let payload: DetailPayload = read_envelope(response).await?;
        let invoice = payload
            .invoice
            .ok_or_else(|| GatewayError::server(None, "response did not include an invoice"))?;
        Ok(invoice.validate()?)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn trigger_processing(&self) -> Result<ProcessingOutcome, GatewayError> {
        let response = self.send(self.client.post(self.url(&["process"])?)).await?;
        let payload: ProcessPayload = read_envelope(response).await?;

        let results: Vec<ProcessedDocument> = payload
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|result| ProcessedDocument {
                blob_name: result.blob_name,
                invoice_id: result.invoice_id,
                invoice_number: result.invoice_number,
                success: result.success,
                error: result.error,
            })
            .collect();
        let processed_count = payload.processed.unwrap_or(results.len() as u64);

        tracing::info!(processed_count, "processing run completed");
        Ok(ProcessingOutcome {
            processed_count,
            results,
        })
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn check_health(&self) -> Result<(), GatewayError> {
        let response = self.send(self.client.get(self.url(&["health"])?)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}
