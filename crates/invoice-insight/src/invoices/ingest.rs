//! Ingestion of upstream invoice payloads.
//!
//! The upstream API hands out loosely-typed JSON documents. Everything that
//! reaches the aggregation, search, and classification code has passed
//! through [`WireInvoice::validate`], so those layers can assume scores are
//! within `[0, 1]` and amounts are non-negative.

use super::domain::{InvoiceId, InvoiceRecord, LineItem, QualityMetrics};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Reasons a payload is rejected before it reaches the presentation model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invoice is missing an identifier")]
    MissingId,
    #[error("invoice {id}: {metric} score {value} is outside [0, 1]")]
    ScoreOutOfRange {
        id: String,
        metric: &'static str,
        value: f64,
    },
    #[error("invoice {id}: {field} must not be negative (got {value})")]
    NegativeAmount {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("invoice {id}: line item {index} has non-positive quantity {value}")]
    NonPositiveQuantity { id: String, index: usize, value: f64 },
    #[error("invoice {id}: {field} '{value}' is not a recognised timestamp")]
    InvalidTimestamp {
        id: String,
        field: &'static str,
        value: String,
    },
    #[error("invoice {id}: {field} value {value} cannot be represented as a decimal")]
    UnrepresentableNumber {
        id: String,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQualityMetrics {
    pub overall_score: f64,
    pub completeness: f64,
    pub consistency: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLineItem {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Invoice document exactly as the upstream API serialises it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInvoice {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub invoice_number: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub recipient: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub processing_date: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<WireLineItem>,
    #[serde(default)]
    pub quality_metrics: Option<WireQualityMetrics>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub source_blob: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub source_url: Option<String>,
}

impl WireInvoice {
    pub fn validate(self) -> Result<InvoiceRecord, ValidationError> {
        let id = self
            .id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::MissingId)?;

        let date = parse_timestamp_field(&id, "date", self.date.as_deref())?;
        let processing_date =
            parse_timestamp_field(&id, "processingDate", self.processing_date.as_deref())?;
        let total_amount = non_negative(&id, "totalAmount", self.total_amount)?;

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| validate_item(&id, index, item))
            .collect::<Result<Vec<_>, _>>()?;

        let quality_metrics = self
            .quality_metrics
            .map(|metrics| validate_metrics(&id, metrics))
            .transpose()?;

        Ok(InvoiceRecord {
            id: InvoiceId(id),
            invoice_number: self.invoice_number,
            recipient: self.recipient,
            address: self.address,
            date,
            total_amount,
            currency: self.currency,
            processing_date,
            raw_text: self.raw_text,
            items,
            quality_metrics,
            source_blob: self.source_blob,
            source_url: self.source_url,
        })
    }
}

/// Validates a batch record by record. Malformed records are logged and left
/// out so one bad document cannot hide the rest of the collection.
pub fn keep_valid(invoices: impl IntoIterator<Item = WireInvoice>) -> Vec<InvoiceRecord> {
    invoices
        .into_iter()
        .filter_map(|invoice| match invoice.validate() {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed invoice record");
                None
            }
        })
        .collect()
}

fn validate_item(
    id: &str,
    index: usize,
    item: WireLineItem,
) -> Result<LineItem, ValidationError> {
    let quantity = match item.quantity {
        Some(value) if value <= 0.0 || !value.is_finite() => {
            return Err(ValidationError::NonPositiveQuantity {
                id: id.to_string(),
                index,
                value,
            })
        }
        Some(value) => Some(to_decimal(id, "quantity", value)?),
        None => None,
    };

    Ok(LineItem {
        description: item.description,
        quantity,
        unit_price: non_negative(id, "unitPrice", item.unit_price)?,
        amount: non_negative(id, "amount", item.amount)?,
    })
}

fn validate_metrics(
    id: &str,
    metrics: WireQualityMetrics,
) -> Result<QualityMetrics, ValidationError> {
    Ok(QualityMetrics {
        overall_score: unit_interval(id, "overallScore", metrics.overall_score)?,
        completeness: unit_interval(id, "completeness", metrics.completeness)?,
        consistency: unit_interval(id, "consistency", metrics.consistency)?,
    })
}

fn unit_interval(id: &str, metric: &'static str, value: f64) -> Result<Decimal, ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::ScoreOutOfRange {
            id: id.to_string(),
            metric,
            value,
        });
    }
    to_decimal(id, metric, value)
}

fn non_negative(
    id: &str,
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<Decimal>, ValidationError> {
    match value {
        None => Ok(None),
        Some(value) if value < 0.0 || value.is_nan() => Err(ValidationError::NegativeAmount {
            id: id.to_string(),
            field,
            value,
        }),
        Some(value) => to_decimal(id, field, value).map(Some),
    }
}

/// Goes through the shortest round-trip string so `0.9` stays `0.9`
/// instead of carrying the binary expansion of the float.
fn to_decimal(id: &str, field: &'static str, value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::UnrepresentableNumber {
            id: id.to_string(),
            field,
            value,
        });
    }
    Decimal::from_str(&value.to_string())
        .map(|decimal| decimal.normalize())
        .map_err(|_| ValidationError::UnrepresentableNumber {
            id: id.to_string(),
            field,
            value,
        })
}

fn parse_timestamp_field(
    id: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                id: id.to_string(),
                field,
                value: raw.to_string(),
            }),
    }
}

/// Accepts RFC 3339, RFC 2822 (the HTTP-date form upstream emits for
/// datetimes), naive ISO datetimes, and bare dates at midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<WireLineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<WireLineItem>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn wire(value: serde_json::Value) -> WireInvoice {
        serde_json::from_value(value).expect("wire invoice deserializes")
    }

    #[test]
    fn upstream_document_maps_to_record() {
        let record = wire(json!({
            "_id": "65f0c1",
            "invoiceNumber": "FAC/2019/0042",
            "recipient": "Acme Corp",
            "date": "2019-03-14",
            "totalAmount": 120.5,
            "currency": "Euro",
            "processingDate": "Mon, 19 Oct 2026 10:15:00 GMT",
            "items": [
                { "description": "Desk lamp", "quantity": 2, "unitPrice": 40.25, "amount": 80.5 },
                { "description": "Cable" }
            ],
            "qualityMetrics": { "overallScore": 0.9, "completeness": 1.0, "consistency": 0.6666 },
            "sourceBlob": "invoice_0042.png"
        }))
        .validate()
        .expect("record validates");

        assert_eq!(record.id.as_str(), "65f0c1");
        assert_eq!(record.total_amount, Some(Decimal::new(1205, 1)));
        assert_eq!(
            record.date,
            Some(Utc.with_ymd_and_hms(2019, 3, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(
            record.processing_date,
            Some(Utc.with_ymd_and_hms(2026, 10, 19, 10, 15, 0).unwrap())
        );
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[1].display_quantity(), Decimal::ONE);
        assert_eq!(record.overall_score(), Some(Decimal::new(9, 1)));
        assert_eq!(record.source_blob.as_deref(), Some("invoice_0042.png"));
    }

    #[test]
    fn null_and_blank_fields_are_absent() {
        let record = wire(json!({
            "id": "abc",
            "invoiceNumber": null,
            "recipient": "   ",
            "totalAmount": null,
            "items": null,
            "qualityMetrics": null
        }))
        .validate()
        .expect("record validates");

        assert!(record.invoice_number.is_none());
        assert!(record.recipient.is_none());
        assert!(record.total_amount.is_none());
        assert!(record.items.is_empty());
        assert!(record.quality_metrics.is_none());
    }

    #[test]
    fn score_outside_unit_interval_is_rejected() {
        let err = wire(json!({
            "_id": "x1",
            "qualityMetrics": { "overallScore": 1.2, "completeness": 1.0, "consistency": 1.0 }
        }))
        .validate()
        .expect_err("score must be rejected");

        assert_eq!(
            err,
            ValidationError::ScoreOutOfRange {
                id: "x1".to_string(),
                metric: "overallScore",
                value: 1.2,
            }
        );
    }

    #[test]
    fn negative_amounts_and_quantities_are_rejected() {
        let err = wire(json!({ "_id": "x2", "totalAmount": -3.0 }))
            .validate()
            .expect_err("negative total");
        assert!(matches!(
            err,
            ValidationError::NegativeAmount { field: "totalAmount", .. }
        ));

        let err = wire(json!({ "_id": "x3", "items": [{ "quantity": 0 }] }))
            .validate()
            .expect_err("zero quantity");
        assert!(matches!(
            err,
            ValidationError::NonPositiveQuantity { index: 0, .. }
        ));
    }

    #[test]
    fn missing_id_and_bad_timestamp_are_rejected() {
        assert_eq!(
            wire(json!({ "invoiceNumber": "INV-1" })).validate(),
            Err(ValidationError::MissingId)
        );

        let err = wire(json!({ "_id": "x4", "processingDate": "last tuesday" }))
            .validate()
            .expect_err("timestamp must parse");
        assert!(matches!(
            err,
            ValidationError::InvalidTimestamp { field: "processingDate", .. }
        ));
    }

    #[test]
    fn malformed_records_are_left_out_of_a_batch() {
        let records = keep_valid(vec![
            wire(json!({ "_id": "ok", "totalAmount": 10 })),
            wire(json!({ "_id": "bad", "totalAmount": -1 })),
            wire(json!({ "invoiceNumber": "no-id" })),
            wire(json!({ "_id": "also-ok" })),
        ]);

        let ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "also-ok"]);
    }

    #[test]
    fn parse_timestamp_supports_known_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-02T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-02T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("Thu, 02 May 2024 08:30:00 GMT"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-02T08:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-02 08:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-02"),
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap())
        );
        assert!(parse_timestamp("  ").is_none());
        assert!(parse_timestamp("not-a-date").is_none());
    }
}
