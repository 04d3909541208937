use super::super::domain::InvoiceRecord;
use super::super::quality::{score_percent, DisplayColor, LOW_QUALITY_THRESHOLD};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fleet-wide figures shown on the dashboard. Derived, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStats {
    pub total_invoices: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_quality: Decimal,
    pub low_quality_count: usize,
}

impl FleetStats {
    pub fn average_quality_percent(&self) -> u32 {
        score_percent(self.average_quality)
    }

    /// Gauge color for the average: meeting the low-quality threshold reads as
    /// success, anything below it as a warning.
    pub fn average_quality_color(&self) -> DisplayColor {
        if self.average_quality >= LOW_QUALITY_THRESHOLD {
            DisplayColor::Success
        } else {
            DisplayColor::Warning
        }
    }

    pub fn total_amount_label(&self) -> String {
        format!("{:.2}", self.total_amount)
    }
}

/// Reduces a collection to [`FleetStats`] in a single pass.
///
/// Decimal sums are exact, so the result does not depend on input order.
/// Records without quality metrics count towards `total_invoices` only;
/// records without an amount contribute nothing to `total_amount`.
pub fn aggregate<'a, I>(records: I) -> FleetStats
where
    I: IntoIterator<Item = &'a InvoiceRecord>,
{
    let mut total_invoices = 0usize;
    let mut total_amount = Decimal::ZERO;
    let mut score_sum = Decimal::ZERO;
    let mut scored = 0usize;
    let mut low_quality_count = 0usize;

    for record in records {
        total_invoices += 1;

        if let Some(amount) = record.total_amount {
            total_amount = total_amount.saturating_add(amount);
        }

        if let Some(score) = record.overall_score() {
            score_sum += score;
            scored += 1;
            if score < LOW_QUALITY_THRESHOLD {
                low_quality_count += 1;
            }
        }
    }

    let average_quality = if scored == 0 {
        Decimal::ZERO
    } else {
        (score_sum / Decimal::from(scored)).normalize()
    };

    FleetStats {
        total_invoices,
        total_amount: total_amount.normalize(),
        average_quality,
        low_quality_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoices::domain::QualityMetrics;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("valid decimal")
    }

    fn record(id: &str, score: Option<&str>, amount: Option<&str>) -> InvoiceRecord {
        let mut record = InvoiceRecord::new(id);
        record.total_amount = amount.map(dec);
        record.quality_metrics = score.map(|score| QualityMetrics {
            overall_score: dec(score),
            completeness: Decimal::ONE,
            consistency: Decimal::ONE,
        });
        record
    }

    #[test]
    fn empty_collection_yields_zeroes() {
        let records: Vec<InvoiceRecord> = Vec::new();
        let stats = aggregate(&records);
        assert_eq!(stats, FleetStats::default());
        assert_eq!(stats.average_quality_percent(), 0);
    }

    #[test]
    fn unscored_records_only_count_towards_totals() {
        let records = vec![
            record("a", Some("0.9"), Some("100")),
            record("b", Some("0.4"), Some("50")),
            record("c", None, Some("25")),
        ];

        let stats = aggregate(&records);

        assert_eq!(stats.total_invoices, 3);
        assert_eq!(stats.total_amount, dec("175"));
        assert_eq!(stats.average_quality, dec("0.65"));
        assert_eq!(stats.low_quality_count, 1);
        assert_eq!(stats.total_amount_label(), "175.00");
        assert_eq!(stats.average_quality_color(), DisplayColor::Warning);
    }

    #[test]
    fn missing_amount_keeps_the_record_in_the_count() {
        let records = vec![record("a", None, None), record("b", None, Some("12.5"))];
        let stats = aggregate(&records);
        assert_eq!(stats.total_invoices, 2);
        assert_eq!(stats.total_amount, dec("12.5"));
        assert_eq!(stats.average_quality, Decimal::ZERO);
        assert_eq!(stats.low_quality_count, 0);
    }

    #[test]
    fn threshold_score_is_not_low_quality() {
        let records = vec![record("a", Some("0.7"), None), record("b", Some("0.6999"), None)];
        let stats = aggregate(&records);
        assert_eq!(stats.low_quality_count, 1);
    }

    #[test]
    fn shuffling_never_changes_the_result() {
        let mut records: Vec<InvoiceRecord> = (0..40)
            .map(|index| {
                let score = (index % 3 != 0).then(|| format!("0.{:02}", (index * 37) % 100));
                let amount = (index % 5 != 0).then(|| format!("{}.{:02}", index * 13, index % 100));
                record(
                    &format!("inv-{index}"),
                    score.as_deref(),
                    amount.as_deref(),
                )
            })
            .collect();
        let expected = aggregate(&records);
        assert_eq!(expected.total_invoices, records.len());

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..25 {
            records.shuffle(&mut rng);
            assert_eq!(aggregate(&records), expected);
        }
    }
}
