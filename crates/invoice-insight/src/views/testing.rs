use crate::gateway::{GatewayError, InvoiceGateway, ProcessedDocument, ProcessingOutcome};
use crate::invoices::{InvoiceId, InvoiceRecord, QualityMetrics};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory gateway for controller tests. `offline` fails every call.
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub(crate) invoices: Mutex<Vec<InvoiceRecord>>,
    pub(crate) pending: Mutex<Vec<InvoiceRecord>>,
    pub(crate) offline: bool,
    pub(crate) list_calls: AtomicUsize,
}

impl FakeGateway {
    pub(crate) fn with_invoices(invoices: Vec<InvoiceRecord>) -> Self {
        Self {
            invoices: Mutex::new(invoices),
            ..Self::default()
        }
    }

    pub(crate) fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn unreachable() -> GatewayError {
        GatewayError::Unreachable("tcp connect error: Connection refused".to_string())
    }
}

#[async_trait]
impl InvoiceGateway for FakeGateway {
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(self.invoices.lock().expect("invoices lock").clone())
    }

    async fn get_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError> {
        if self.offline {
            return Err(Self::unreachable());
        }
        self.invoices
            .lock()
            .expect("invoices lock")
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    async fn trigger_processing(&self) -> Result<ProcessingOutcome, GatewayError> {
        if self.offline {
            return Err(Self::unreachable());
        }
        let pending: Vec<InvoiceRecord> = self.pending.lock().expect("pending lock").drain(..).collect();
        let results = pending
            .iter()
            .map(|record| ProcessedDocument {
                blob_name: Some(format!("{}.pdf", record.id)),
                invoice_id: Some(record.id.to_string()),
                invoice_number: record.invoice_number.clone(),
                success: true,
                error: None,
            })
            .collect();
        let processed_count = pending.len() as u64;
        self.invoices.lock().expect("invoices lock").extend(pending);
        Ok(ProcessingOutcome {
            processed_count,
            results,
        })
    }

    async fn check_health(&self) -> Result<(), GatewayError> {
        if self.offline {
            Err(Self::unreachable())
        } else {
            Ok(())
        }
    }
}

pub(crate) fn invoice(id: &str, number: &str, score: Option<&str>, amount: Option<&str>) -> InvoiceRecord {
    let mut record = InvoiceRecord::new(id);
    record.invoice_number = Some(number.to_string());
    record.total_amount = amount.map(|raw| raw.parse().expect("decimal amount"));
    record.quality_metrics = score.map(|raw| QualityMetrics {
        overall_score: raw.parse().expect("decimal score"),
        completeness: Decimal::ONE,
        consistency: Decimal::ONE,
    });
    record
}
