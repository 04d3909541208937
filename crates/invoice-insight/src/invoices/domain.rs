use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the external invoice store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub String);

impl InvoiceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvoiceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InvoiceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Extraction quality scores, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    #[serde(with = "rust_decimal::serde::float")]
    pub overall_score: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub completeness: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub consistency: Decimal,
}

/// One extracted invoice line. `amount` is not reconciled against
/// `quantity * unit_price`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub quantity: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub unit_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
}

impl LineItem {
    /// Quantity shown to users; a missing quantity reads as a single unit.
    pub fn display_quantity(&self) -> Decimal {
        self.quantity.unwrap_or(Decimal::ONE)
    }
}

/// A processed invoice as delivered by the gateway, after ingestion checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: InvoiceId,
    pub invoice_number: Option<String>,
    pub recipient: Option<String>,
    pub address: Option<String>,
    pub date: Option<DateTime<Utc>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    pub currency: Option<String>,
    pub processing_date: Option<DateTime<Utc>>,
    pub raw_text: Option<String>,
    pub items: Vec<LineItem>,
    pub quality_metrics: Option<QualityMetrics>,
    pub source_blob: Option<String>,
    pub source_url: Option<String>,
}

impl InvoiceRecord {
    /// Record with only an identifier; every extracted field is absent.
    pub fn new(id: impl Into<InvoiceId>) -> Self {
        Self {
            id: id.into(),
            invoice_number: None,
            recipient: None,
            address: None,
            date: None,
            total_amount: None,
            currency: None,
            processing_date: None,
            raw_text: None,
            items: Vec::new(),
            quality_metrics: None,
            source_blob: None,
            source_url: None,
        }
    }

    pub fn overall_score(&self) -> Option<Decimal> {
        self.quality_metrics.map(|metrics| metrics.overall_score)
    }
}
