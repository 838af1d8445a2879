use chrono::{DateTime, Utc};

/// Current state of the token limit.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaSnapshot {
    /// Share of the ceiling already used, 0–100.
    pub percentage: f64,
    pub current_value: u64,
    pub usage_ceiling: u64,
    pub remaining: u64,
    /// Epoch milliseconds of the next reset; 0 when the API reports none.
    pub next_reset_epoch_millis: u64,
}

impl QuotaSnapshot {
    /// The API only reports a percentage when both absolute figures are zero.
    pub fn is_percentage_only(&self) -> bool {
        self.current_value == 0 && self.usage_ceiling == 0
    }

    pub fn next_reset(&self) -> Option<DateTime<Utc>> {
        if self.next_reset_epoch_millis == 0 {
            return None;
        }
        i64::try_from(self.next_reset_epoch_millis)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}

/// Tokens consumed by one metered model, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUsageDetail {
    pub model_code: String,
    pub tokens: u64,
}
