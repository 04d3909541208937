use super::domain::InvoiceRecord;
use super::quality::{classify, TierPolicy};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    invoice_number: Option<&'a str>,
    recipient: Option<&'a str>,
    date: Option<String>,
    total_amount: Option<String>,
    currency: Option<&'a str>,
    processing_date: Option<String>,
    overall_score: Option<String>,
    quality_tier: &'static str,
    line_items: usize,
}

impl<'a> ExportRow<'a> {
    fn from_record(record: &'a InvoiceRecord) -> Self {
        let score = record.overall_score();
        Self {
            id: record.id.as_str(),
            invoice_number: record.invoice_number.as_deref(),
            recipient: record.recipient.as_deref(),
            date: record.date.map(|value| value.to_rfc3339()),
            total_amount: record.total_amount.map(|value| value.normalize().to_string()),
            currency: record.currency.as_deref(),
            processing_date: record.processing_date.map(|value| value.to_rfc3339()),
            overall_score: score.map(|value| value.normalize().to_string()),
            quality_tier: classify(score, &TierPolicy::detail()).label(),
            line_items: record.items.len(),
        }
    }
}

/// Writes the given records as CSV with a header row. Absent values are empty cells.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> Result<usize, csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut written = 0;
    for record in records {
        csv_writer.serialize(ExportRow::from_record(record))?;
        written += 1;
    }
    csv_writer.flush()?;
    Ok(written)
}
