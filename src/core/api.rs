use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HOST: &str = "api.z.ai";
const QUOTA_PATH: &str = "/api/monitor/usage/quota/limit";
const USAGE_PATH: &str = "/api/monitor/usage/model-usage";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("Failed to send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unauthorized, check ZAI_TOKEN")]
    Unauthorized,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The two documents the report is built from.
pub trait UsageApi {
    /// Current quota and limit records.
    fn quota(&self) -> impl Future<Output = Result<Value, FetchError>>;

    /// Usage samples between two `YYYY-MM-DD HH:MM:SS` labels.
    fn usage_series(
        &self,
        start_label: &str,
        end_label: &str,
    ) -> impl Future<Output = Result<Value, FetchError>>;
}

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Must be called before sending the bearer token to a configured host, to
/// prevent leaking it over plain HTTP or other schemes.
pub fn validate_endpoint(url: &str) -> anyhow::Result<()> {
    if !url.starts_with("https://") {
        anyhow::bail!("endpoint must use HTTPS, got: {}", url);
    }
    Ok(())
}

/// Z.AI monitor API over HTTP.
pub struct ZaiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ZaiClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Client for `https://{host}`, refusing anything that is not HTTPS.
    pub fn for_host(host: &str, token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = format!("https://{}", host);
        validate_endpoint(&base_url)?;
        Ok(Self::new(&base_url, token, timeout)?)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "requesting");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "response");
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| FetchError::Parse { url, source })
    }
}

impl UsageApi for ZaiClient {
    async fn quota(&self) -> Result<Value, FetchError> {
        self.get_json(QUOTA_PATH, &[]).await
    }

    async fn usage_series(&self, start_label: &str, end_label: &str) -> Result<Value, FetchError> {
        self.get_json(
            USAGE_PATH,
            &[("startTime", start_label), ("endTime", end_label)],
        )
        .await
    }
}
