use std::collections::BTreeMap;

/// Calendar date ("YYYY-MM-DD") to summed tokens. Only dates with at least
/// one reported sample have an entry.
pub type DailyUsageMap = BTreeMap<String, u64>;

/// One point of the usage series as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSample {
    /// "YYYY-MM-DD HH:MM:SS"
    pub time_label: String,
    /// `None` marks a gap in the series, not a zero.
    pub tokens: Option<u64>,
}

/// Daily buckets plus the API's own grand total.
///
/// `grand_total` may cover a longer horizon than the fetched window, so it is
/// not expected to equal the sum of `daily`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedUsage {
    pub daily: DailyUsageMap,
    pub grand_total: u64,
}

impl AggregatedUsage {
    /// Tokens for `date`, or 0 when that date has no bucket.
    pub fn tokens_on(&self, date: &str) -> u64 {
        self.daily.get(date).copied().unwrap_or(0)
    }

    /// Largest bucket in the whole map, floored at 1 for bar scaling.
    pub fn max_daily(&self) -> u64 {
        self.daily.values().copied().max().unwrap_or(0).max(1)
    }
}
