//! Test doubles for transports and fetchers.

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use finalert_core::{AssetClass, AssetQuote, FetchError, Fetcher, QuoteMap};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Transport answering from a URL table. Unknown URLs get a 404.
#[derive(Default)]
pub struct CannedTransport {
    responses: HashMap<String, Result<HttpResponse, TransportError>>,
    stalls: HashSet<String>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, response: HttpResponse) -> Self {
        self.responses.insert(url.to_string(), Ok(response));
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.responses
            .insert(url.to_string(), Err(TransportError::Timeout));
        self
    }

    /// Hold the request for its full timeout, then report a timeout.
    pub fn with_stall(mut self, url: &str) -> Self {
        self.stalls.insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for CannedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.stalls.contains(&request.url) {
            tokio::time::sleep(request.timeout).await;
            return Err(TransportError::Timeout);
        }
        self.responses
            .get(&request.url)
            .cloned()
            .unwrap_or(Ok(HttpResponse {
                status: 404,
                body: String::new(),
            }))
    }
}

/// What a scripted fetcher returns on every call.
#[derive(Clone)]
pub enum Script {
    Quotes(Vec<(&'static str, Decimal)>),
    Empty,
    Fail,
    /// Never completes
    Stall,
}

/// Fetcher returning a fixed outcome and counting calls.
pub struct ScriptedFetcher {
    label: &'static str,
    asset_class: AssetClass,
    script: Script,
    time_limit: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(label: &'static str, asset_class: AssetClass, script: Script) -> Self {
        Self {
            label,
            asset_class,
            script,
            time_limit: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<QuoteMap, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Quotes(prices) => Ok(prices
                .iter()
                .map(|(symbol, price)| {
                    let quote = AssetQuote::new(self.asset_class, symbol, None, *price).unwrap();
                    (quote.symbol.clone(), quote)
                })
                .collect()),
            Script::Empty => Ok(QuoteMap::new()),
            Script::Fail => Err(FetchError::network(self.label, "connection reset")),
            Script::Stall => std::future::pending().await,
        }
    }

    fn source(&self) -> &str {
        self.label
    }

    fn asset_class(&self) -> AssetClass {
        self.asset_class
    }

    fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}
