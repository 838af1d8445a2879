use serde_json::Value;

use crate::core::models::quota::{QuotaSnapshot, ServiceUsageDetail};

const TOKENS_LIMIT: &str = "TOKENS_LIMIT";
const TIME_LIMIT: &str = "TIME_LIMIT";

/// Overall outcome flag of a quota document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    Failure { message: Option<String> },
}

/// Reads the `success` flag. A document without one, or one that is not an
/// object, is treated as a failure.
pub fn response_status(document: &Value) -> ResponseStatus {
    match document.get("success").and_then(Value::as_bool) {
        Some(true) => ResponseStatus::Success,
        _ => ResponseStatus::Failure {
            message: document.get("msg").and_then(Value::as_str).map(str::to_string),
        },
    }
}

/// A non-negative integral JSON number. `450.0` counts; `450.5`, `-1` and
/// `"450"` do not.
pub fn json_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn limit_type(entry: &Value) -> Option<&str> {
    entry
        .get("type")
        .or_else(|| entry.get("limitType"))
        .and_then(Value::as_str)
}

/// The first limit record of `kind`. Later records of the same kind are
/// ignored even when the first one has mistyped fields.
fn find_limit<'a>(document: &'a Value, kind: &str) -> Option<&'a Value> {
    document
        .get("data")
        .and_then(|d| d.get("limits"))
        .and_then(Value::as_array)?
        .iter()
        .find(|entry| limit_type(entry) == Some(kind))
}

fn count_field(entry: &Value, field: &str) -> u64 {
    entry.get(field).and_then(json_count).unwrap_or(0)
}

/// The first `TOKENS_LIMIT` record, with missing or mistyped fields
/// defaulted to zero.
pub fn extract_snapshot(document: &Value) -> Option<QuotaSnapshot> {
    let entry = find_limit(document, TOKENS_LIMIT)?;
    Some(QuotaSnapshot {
        percentage: entry
            .get("percentage")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        current_value: count_field(entry, "currentValue"),
        usage_ceiling: count_field(entry, "usage"),
        remaining: count_field(entry, "remaining"),
        next_reset_epoch_millis: count_field(entry, "nextResetTime"),
    })
}

/// Per-model usage listed under the first `TIME_LIMIT` record, in API order.
/// Non-object details are skipped.
pub fn extract_usage_details(document: &Value) -> Vec<ServiceUsageDetail> {
    let Some(details) = find_limit(document, TIME_LIMIT)
        .and_then(|e| e.get("usageDetails"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    details
        .iter()
        .filter(|detail| detail.is_object())
        .map(|detail| ServiceUsageDetail {
            model_code: detail
                .get("modelCode")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            tokens: count_field(detail, "usage"),
        })
        .collect()
}
