use super::super::domain::InvoiceRecord;

/// Free-text match used by the invoice list search box.
///
/// Invoice number and recipient compare case-insensitively. The amount
/// compares against its plain decimal rendering (`100`, `100.5`) with the
/// term as typed. The term is not trimmed.
pub fn matches(record: &InvoiceRecord, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    let text_match = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|value| value.to_lowercase().contains(&needle))
    };

    text_match(&record.invoice_number)
        || text_match(&record.recipient)
        || record
            .total_amount
            .is_some_and(|amount| amount.normalize().to_string().contains(term))
}

/// Stable filter: matching records keep their relative order.
pub fn filter<'a>(records: &'a [InvoiceRecord], term: &str) -> Vec<&'a InvoiceRecord> {
    records
        .iter()
        .filter(|record| matches(record, term))
        .collect()
}
