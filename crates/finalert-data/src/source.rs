//! Per-source request settings: URL, timeout, jitter, and browser headers.

use crate::transport::{HttpRequest, Transport, TransportError};
use finalert_core::{AssetClass, FetchError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7";
const ACCEPT_LANGUAGE: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// Desktop user agents rotated across requests.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Random delay applied before each upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    pub min: Duration,
    pub max: Duration,
}

impl Jitter {
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub const fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    /// No delay at all. Used by tests.
    pub const fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Draw a delay uniformly from `[min, max]`.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let span = (self.max - self.min).as_millis() as u64;
        self.min + Duration::from_millis(fastrand::u64(0..=span))
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::from_millis(300, 800)
    }
}

/// Everything a fetcher needs to talk to one upstream source.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Source label used in logs and provenance
    pub label: String,
    /// Asset class the source serves
    pub asset_class: AssetClass,
    /// Endpoint. Per-symbol sources use a `{symbol}` placeholder.
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay before each request
    pub jitter: Jitter,
    user_agents: Arc<[String]>,
}

impl SourceSpec {
    pub fn new(label: impl Into<String>, asset_class: AssetClass, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            asset_class,
            url: url.into(),
            timeout: Duration::from_secs(10),
            jitter: Jitter::default(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replace the user agent pool. An empty pool keeps the current one.
    pub fn with_user_agents(mut self, user_agents: &[String]) -> Self {
        if !user_agents.is_empty() {
            self.user_agents = user_agents.iter().cloned().collect();
        }
        self
    }

    /// Longest one request can take: the worst jitter delay plus the
    /// request timeout.
    pub fn time_limit(&self) -> Duration {
        self.jitter.max.max(self.jitter.min) + self.timeout
    }

    /// Endpoint for one symbol of a per-symbol source.
    pub fn url_for(&self, symbol: &str) -> String {
        self.url.replace("{symbol}", symbol)
    }

    fn user_agent(&self) -> &str {
        if self.user_agents.is_empty() {
            return DEFAULT_USER_AGENTS[0];
        }
        &self.user_agents[fastrand::usize(..self.user_agents.len())]
    }

    /// Sleep for the jitter delay, then GET `url` and return the body of a
    /// 2xx response.
    pub async fn get_text(&self, transport: &dyn Transport, url: &str) -> Result<String, FetchError> {
        let delay = self.jitter.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let request = HttpRequest::get(url)
            .with_timeout(self.timeout)
            .with_header("user-agent", self.user_agent())
            .with_header("accept", ACCEPT)
            .with_header("accept-language", ACCEPT_LANGUAGE);

        debug!(source = %self.label, url, delay_ms = delay.as_millis() as u64, "Requesting");

        let response = transport
            .execute(request)
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.is_success() {
            return Err(FetchError::Status {
                origin: self.label.clone(),
                status: response.status,
            });
        }

        Ok(response.body)
    }

    fn map_transport_error(&self, error: TransportError) -> FetchError {
        match error {
            TransportError::Timeout => FetchError::Timeout {
                origin: self.label.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            },
            TransportError::Connect(message) | TransportError::Request(message) => {
                FetchError::network(&self.label, message)
            }
        }
    }
}
