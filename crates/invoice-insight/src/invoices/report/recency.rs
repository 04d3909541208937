use super::super::domain::InvoiceRecord;

/// Size of the "recent invoices" panel on the dashboard.
pub const RECENT_INVOICE_LIMIT: usize = 5;

/// Up to `limit` records, newest processing date first.
///
/// Records without a processing date sort as the oldest possible value and
/// therefore come last. Equal dates keep their input order.
pub fn recent(records: &[InvoiceRecord], limit: usize) -> Vec<&InvoiceRecord> {
    let mut ordered: Vec<&InvoiceRecord> = records.iter().collect();
    ordered.sort_by(|left, right| right.processing_date.cmp(&left.processing_date));
    ordered.truncate(limit);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn processed(id: &str, day: Option<u32>) -> InvoiceRecord {
        let mut record = InvoiceRecord::new(id);
        record.processing_date =
            day.map(|day| Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap());
        record
    }

    fn ids(records: &[&InvoiceRecord]) -> Vec<String> {
        records.iter().map(|record| record.id.to_string()).collect()
    }

    #[test]
    fn newest_first_with_undated_last() {
        let records = vec![
            processed("old", Some(1)),
            processed("undated", None),
            processed("new", Some(18)),
            processed("mid", Some(9)),
        ];
        assert_eq!(
            ids(&recent(&records, 10)),
            vec!["new", "mid", "old", "undated"]
        );
    }

    #[test]
    fn limit_truncates_and_ties_keep_input_order() {
        let records = vec![
            processed("first", Some(3)),
            processed("second", Some(3)),
            processed("third", Some(3)),
            processed("latest", Some(4)),
        ];
        assert_eq!(ids(&recent(&records, 3)), vec!["latest", "first", "second"]);
        assert_eq!(recent(&records, 0).len(), 0);
    }

    #[test]
    fn length_is_min_of_limit_and_collection() {
        let records: Vec<InvoiceRecord> = (1..=3).map(|day| processed("x", Some(day))).collect();
        assert_eq!(recent(&records, RECENT_INVOICE_LIMIT).len(), 3);
        assert_eq!(recent(&records, 2).len(), 2);
    }
}
