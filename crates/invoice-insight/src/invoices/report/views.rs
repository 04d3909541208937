use super::super::domain::{InvoiceId, InvoiceRecord, LineItem};
use super::super::quality::{
    classify, format_score, score_percent, Classification, DisplayColor, TierPolicy,
};
use super::recency::{recent, RECENT_INVOICE_LIMIT};
use super::stats::{aggregate, FleetStats};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";

pub(crate) fn format_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub(crate) fn format_money(value: Option<Decimal>, currency: Option<&str>) -> String {
    match (value, currency) {
        (Some(value), Some(currency)) => format!("{value:.2} {currency}"),
        (Some(value), None) => format!("{value:.2}"),
        (None, _) => NOT_AVAILABLE.to_string(),
    }
}

/// Compact card used by the invoice list and the dashboard's recent panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCardView {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub recipient: String,
    pub date: String,
    pub total: String,
    pub quality_label: String,
    pub badge: Classification,
    pub processed_on: String,
}

impl InvoiceCardView {
    pub fn from_record(record: &InvoiceRecord) -> Self {
        let score = record.overall_score();
        Self {
            id: record.id.clone(),
            invoice_number: record
                .invoice_number
                .clone()
                .unwrap_or_else(|| "Unknown number".to_string()),
            recipient: record
                .recipient
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            date: format_date(record.date),
            total: format_money(record.total_amount, record.currency.as_deref()),
            quality_label: format!("Quality: {}", format_score(score)),
            badge: classify(score, &TierPolicy::summary()),
            processed_on: format_date(record.processing_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRow {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub amount: String,
}

impl LineItemRow {
    fn from_item(item: &LineItem, currency: Option<&str>) -> Self {
        Self {
            description: item
                .description
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            quantity: item.display_quantity().normalize().to_string(),
            unit_price: format_money(item.unit_price, currency),
            amount: format_money(item.amount, currency),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityBreakdown {
    pub overall_percent: u32,
    pub classification: Classification,
    pub completeness_percent: u32,
    pub consistency_percent: u32,
    pub completeness_note: String,
    pub consistency_note: String,
}

/// Everything the single-invoice page shows, graded with the detail policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailPage {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub recipient: String,
    pub address: String,
    pub date: String,
    pub total: String,
    pub currency: String,
    pub processed_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityBreakdown>,
    pub items: Vec<LineItemRow>,
    pub raw_text: String,
}

impl InvoiceDetailPage {
    pub fn from_record(record: &InvoiceRecord) -> Self {
        let currency = record.currency.as_deref();
        let quality = record.quality_metrics.map(|metrics| {
            let completeness_percent = score_percent(metrics.completeness);
            let consistency_percent = score_percent(metrics.consistency);
            QualityBreakdown {
                overall_percent: score_percent(metrics.overall_score),
                classification: classify(Some(metrics.overall_score), &TierPolicy::detail()),
                completeness_percent,
                consistency_percent,
                completeness_note: format!(
                    "{completeness_percent}% of required fields were extracted"
                ),
                consistency_note: format!(
                    "{consistency_percent}% consistency across extracted values"
                ),
            }
        });

        Self {
            id: record.id.clone(),
            invoice_number: record
                .invoice_number
                .clone()
                .unwrap_or_else(|| "Unknown number".to_string()),
            recipient: record
                .recipient
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            address: record
                .address
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            date: format_date(record.date),
            total: format_money(record.total_amount, currency),
            currency: currency.unwrap_or(NOT_AVAILABLE).to_string(),
            processed_on: format_date(record.processing_date),
            source: record.source_blob.clone(),
            quality,
            items: record
                .items
                .iter()
                .map(|item| LineItemRow::from_item(item, currency))
                .collect(),
            raw_text: record
                .raw_text
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| "No OCR text available".to_string()),
        }
    }
}

/// Dashboard render model. Only built from a successfully fetched collection,
/// so the stats never describe a failed or partial fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: FleetStats,
    pub total_amount: String,
    pub average_quality: String,
    pub average_quality_color: DisplayColor,
    pub recent: Vec<InvoiceCardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<&'static str>,
    #[serde(skip)]
    pub invoices: Vec<InvoiceRecord>,
}

impl DashboardSnapshot {
    pub fn build(invoices: Vec<InvoiceRecord>) -> Self {
        let stats = aggregate(&invoices);
        let recent = recent(&invoices, RECENT_INVOICE_LIMIT)
            .into_iter()
            .map(InvoiceCardView::from_record)
            .collect();

        Self {
            stats,
            total_amount: stats.total_amount_label(),
            average_quality: format!("{}%", stats.average_quality_percent()),
            average_quality_color: stats.average_quality_color(),
            recent,
            empty_notice: invoices.is_empty().then_some(
                "No invoices have been processed yet. Run processing to get started.",
            ),
            invoices,
        }
    }
}
