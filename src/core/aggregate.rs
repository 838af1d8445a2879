use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::core::models::usage::{AggregatedUsage, DailyUsageMap, UsageSample};
use crate::core::quota::json_count;
use crate::core::window::{TimestampZone, DATE_FORMAT, LABEL_FORMAT};

#[derive(Deserialize)]
struct SeriesData {
    x_time: Option<Vec<String>>,
    #[serde(rename = "tokensUsage")]
    tokens_usage: Option<Vec<Value>>,
    #[serde(rename = "totalUsage")]
    total_usage: Option<Value>,
}

#[derive(Deserialize)]
struct SeriesResponse {
    success: Option<bool>,
    data: Option<SeriesData>,
}

/// A token slot: `null` is a gap, anything else must be a whole
/// non-negative number.
fn token_slot(value: &Value) -> Option<Option<u64>> {
    if value.is_null() {
        Some(None)
    } else {
        json_count(value).map(Some)
    }
}

/// Pairs time labels with token counts. Returns `None` when the document
/// reports failure, the arrays are missing, or a token slot is not a count.
/// Arrays of unequal length are paired up to the shorter one. An unusable
/// grand total reads as 0.
pub fn parse_samples(document: &Value) -> Option<(Vec<UsageSample>, u64)> {
    let response = SeriesResponse::deserialize(document).ok()?;
    if response.success == Some(false) {
        return None;
    }
    let data = response.data?;
    let labels = data.x_time?;
    let tokens = data
        .tokens_usage?
        .iter()
        .map(token_slot)
        .collect::<Option<Vec<_>>>()?;
    let grand_total = data
        .total_usage
        .as_ref()
        .and_then(|t| t.get("totalTokensUsage"))
        .and_then(json_count)
        .unwrap_or(0);

    let samples = labels
        .into_iter()
        .zip(tokens)
        .map(|(time_label, tokens)| UsageSample { time_label, tokens })
        .collect();

    Some((samples, grand_total))
}

/// Calendar date a sample label belongs to, in `local`'s calendar.
///
/// Local labels are already in the caller's calendar, so the date is the part
/// before the first space. UTC labels are shifted into `local` first; a label
/// that does not parse falls back to its prefix.
pub fn date_key<Tz: TimeZone>(label: &str, zone: TimestampZone, local: &Tz) -> String {
    let prefix = || label.split(' ').next().unwrap_or(label).to_string();
    match zone {
        TimestampZone::Local => prefix(),
        TimestampZone::Utc => NaiveDateTime::parse_from_str(label, LABEL_FORMAT)
            .map(|naive| {
                Utc.from_utc_datetime(&naive)
                    .with_timezone(local)
                    .date_naive()
                    .format(DATE_FORMAT)
                    .to_string()
            })
            .unwrap_or_else(|_| prefix()),
    }
}

/// Sums present samples per date. Gaps neither contribute nor create a bucket.
pub fn bucket<Tz: TimeZone>(
    samples: &[UsageSample],
    zone: TimestampZone,
    local: &Tz,
) -> DailyUsageMap {
    let mut daily = DailyUsageMap::new();
    for sample in samples {
        let Some(tokens) = sample.tokens else {
            continue;
        };
        let entry = daily
            .entry(date_key(&sample.time_label, zone, local))
            .or_insert(0);
        *entry = entry.saturating_add(tokens);
    }
    daily
}

/// Aggregates a usage-series document into daily totals in `local`'s calendar.
/// `None` means no usage data is available, which is distinct from a series
/// with no samples.
pub fn aggregate<Tz: TimeZone>(
    document: &Value,
    zone: TimestampZone,
    local: &Tz,
) -> Option<AggregatedUsage> {
    let (samples, grand_total) = parse_samples(document)?;
    Some(AggregatedUsage {
        daily: bucket(&samples, zone, local),
        grand_total,
    })
}
