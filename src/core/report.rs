use chrono::{Local, TimeZone};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::aggregate::aggregate;
use crate::core::api::{FetchError, UsageApi};
use crate::core::models::quota::{QuotaSnapshot, ServiceUsageDetail};
use crate::core::models::usage::AggregatedUsage;
use crate::core::quota::{extract_snapshot, extract_usage_details, response_status, ResponseStatus};
use crate::core::window::{DateWindow, TimestampZone};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to fetch quota")]
    Quota(#[source] FetchError),
    #[error("API returned failure{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    ApiFailure { message: Option<String> },
}

/// Everything one report run shows.
#[derive(Debug, Clone)]
pub struct Report {
    pub quota: Option<QuotaSnapshot>,
    pub services: Vec<ServiceUsageDetail>,
    /// `None` when the usage series could not be fetched or understood.
    pub usage: Option<AggregatedUsage>,
    pub window: DateWindow,
}

impl Report {
    /// Tokens used today; 0 when today has no bucket.
    pub fn today_tokens(&self) -> Option<u64> {
        self.usage
            .as_ref()
            .map(|u| u.tokens_on(self.window.today_key()))
    }
}

/// Fetches the quota snapshot, then the usage series for `window`.
///
/// Quota failures abort. Usage-series failures only drop the usage section.
pub async fn collect<A: UsageApi>(
    api: &A,
    window: DateWindow,
    zone: TimestampZone,
) -> Result<Report, ReportError> {
    collect_in(api, window, zone, &Local).await
}

pub async fn collect_in<A: UsageApi, Tz: TimeZone>(
    api: &A,
    window: DateWindow,
    zone: TimestampZone,
    local: &Tz,
) -> Result<Report, ReportError> {
    let quota_doc = api.quota().await.map_err(ReportError::Quota)?;
    if let ResponseStatus::Failure { message } = response_status(&quota_doc) {
        return Err(ReportError::ApiFailure { message });
    }

    let quota = extract_snapshot(&quota_doc);
    let services = extract_usage_details(&quota_doc);
    debug!(has_quota = quota.is_some(), services = services.len(), "quota parsed");

    let (start, end) = window.query_labels(zone, local);
    let usage = match api.usage_series(&start, &end).await {
        Ok(doc) => {
            let usage = aggregate(&doc, zone, local);
            if usage.is_none() {
                warn!("usage series response was not usable");
            }
            usage
        }
        Err(e) => {
            warn!(error = %e, "failed to fetch usage series");
            None
        }
    };

    Ok(Report {
        quota,
        services,
        usage,
        window,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::{json, Value};
    use std::cell::RefCell;

    /// Canned `UsageApi`. `None` replies fail with HTTP 503.
    pub(crate) struct MockApi {
        pub quota: Option<Value>,
        pub series: Option<Value>,
        pub queried: RefCell<Vec<(String, String)>>,
    }

    impl MockApi {
        pub(crate) fn new(quota: Option<Value>, series: Option<Value>) -> Self {
            Self {
                quota,
                series,
                queried: RefCell::new(Vec::new()),
            }
        }
    }

    fn unavailable() -> FetchError {
        FetchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    impl UsageApi for MockApi {
        async fn quota(&self) -> Result<Value, FetchError> {
            self.quota.clone().ok_or_else(unavailable)
        }

        async fn usage_series(&self, start_label: &str, end_label: &str) -> Result<Value, FetchError> {
            self.queried
                .borrow_mut()
                .push((start_label.to_string(), end_label.to_string()));
            self.series.clone().ok_or_else(unavailable)
        }
    }

    pub(crate) fn quota_doc() -> Value {
        json!({
            "success": true,
            "data": {"limits": [
                {"type": "TOKENS_LIMIT", "percentage": 45, "currentValue": 450,
                 "usage": 1000, "remaining": 550, "nextResetTime": 0},
                {"type": "TIME_LIMIT", "usageDetails": [{"modelCode": "search-prime", "usage": 3}]}
            ]}
        })
    }

    pub(crate) fn series_doc() -> Value {
        json!({
            "success": true,
            "data": {
                "x_time": ["2024-03-09 10:00:00", "2024-03-10 09:00:00", "2024-03-10 10:00:00"],
                "tokensUsage": [100, 20, null],
                "totalUsage": {"totalTokensUsage": 5000}
            }
        })
    }

    pub(crate) fn window() -> DateWindow {
        DateWindow::ending(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 7)
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn collects_both_documents() {
        let api = MockApi::new(Some(quota_doc()), Some(series_doc()));
        let report = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap();

        assert!((report.quota.as_ref().unwrap().percentage - 45.0).abs() < 1e-10);
        assert_eq!(report.services.len(), 1);
        let usage = report.usage.as_ref().unwrap();
        assert_eq!(usage.grand_total, 5000);
        assert_eq!(report.today_tokens(), Some(20));
        assert_eq!(
            api.queried.borrow().as_slice(),
            &[("2024-03-04 00:00:00".to_string(), "2024-03-10 23:59:59".to_string())]
        );
    }

    #[tokio::test]
    async fn quota_transport_failure_aborts() {
        let api = MockApi::new(None, Some(series_doc()));
        let err = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Quota(_)));
        // the usage series is never requested
        assert!(api.queried.borrow().is_empty());
    }

    #[tokio::test]
    async fn quota_failure_flag_aborts() {
        let api = MockApi::new(
            Some(json!({"success": false, "msg": "token expired"})),
            Some(series_doc()),
        );
        let err = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API returned failure: token expired");
        assert!(api.queried.borrow().is_empty());
    }

    #[tokio::test]
    async fn failure_flag_without_message() {
        let api = MockApi::new(Some(json!({"success": false})), None);
        let err = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API returned failure");
    }

    #[tokio::test]
    async fn usage_failure_degrades() {
        let api = MockApi::new(Some(quota_doc()), None);
        let report = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap();
        assert!(report.quota.is_some());
        assert!(report.usage.is_none());
        assert_eq!(report.today_tokens(), None);
    }

    #[tokio::test]
    async fn usage_failure_flag_degrades() {
        let api = MockApi::new(Some(quota_doc()), Some(json!({"success": false})));
        let report = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap();
        assert!(report.usage.is_none());
    }

    #[tokio::test]
    async fn missing_today_bucket_is_zero() {
        let series = json!({
            "success": true,
            "data": {"x_time": ["2024-03-08 10:00:00"], "tokensUsage": [7]}
        });
        let api = MockApi::new(Some(quota_doc()), Some(series));
        let report = collect_in(&api, window(), TimestampZone::Local, &utc())
            .await
            .unwrap();
        assert_eq!(report.today_tokens(), Some(0));
    }

    #[tokio::test]
    async fn utc_zone_shifts_query_and_buckets() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let series = json!({
            "success": true,
            "data": {"x_time": ["2024-03-09 20:00:00"], "tokensUsage": [11]}
        });
        let api = MockApi::new(Some(quota_doc()), Some(series));
        let report = collect_in(&api, window(), TimestampZone::Utc, &tokyo)
            .await
            .unwrap();
        assert_eq!(
            api.queried.borrow()[0],
            ("2024-03-03 15:00:00".to_string(), "2024-03-10 14:59:59".to_string())
        );
        // 20:00 UTC on the 9th is the 10th in Tokyo
        assert_eq!(report.today_tokens(), Some(11));
    }
}
