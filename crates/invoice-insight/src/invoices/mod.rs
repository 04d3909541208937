//! Invoice records, their ingestion checks, and the read-side report engines.

pub mod domain;
pub mod export;
pub mod ingest;
pub mod quality;
pub mod report;

pub use domain::{InvoiceId, InvoiceRecord, LineItem, QualityMetrics};
pub use ingest::{keep_valid, ValidationError, WireInvoice};
pub use quality::{
    classify, classify_detail, Classification, DisplayColor, QualityTier, TierPolicy,
    LOW_QUALITY_THRESHOLD,
};
pub use report::{aggregate, filter, recent, FleetStats, RECENT_INVOICE_LIMIT};
pub use rust_decimal::Decimal;
