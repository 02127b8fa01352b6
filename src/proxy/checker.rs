//! Proxy checker for validating proxies concurrently

use crate::proxy::models::Proxy;
use crate::Result;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::time::Duration;

/// Default timeout for each proxy check in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default URL to test proxies against
const DEFAULT_TEST_URL: &str = "http://httpbin.org/ip";

/// Number of concurrent checks: twice the available parallelism
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        * 2
}

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each proxy check
    pub timeout: Duration,
    /// Number of concurrent checks
    pub concurrency: usize,
    /// URL to test proxies against
    pub test_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: default_concurrency(),
            test_url: DEFAULT_TEST_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }
}

/// Proxy checker for validating proxies
#[derive(Debug, Clone)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self {
            config: CheckerConfig::default(),
        }
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Check a single proxy.
    ///
    /// Issues one GET to the configured test URL, routing both http and
    /// https traffic through the proxy. Returns true iff the response
    /// status is exactly 200; every failure (client build, connect, DNS,
    /// TLS, timeout) maps to false. No error escapes this call.
    pub async fn check_proxy(&self, proxy: &Proxy) -> bool {
        let client = match self.create_client(proxy) {
            Ok(client) => client,
            Err(_) => return false,
        };

        match tokio::time::timeout(
            self.config.timeout,
            client.get(&self.config.test_url).send(),
        )
        .await
        {
            Ok(Ok(response)) => response.status() == StatusCode::OK,
            _ => false,
        }
    }

    /// Check proxies concurrently, yielding one `(proxy, passed)` pair per
    /// input in completion order.
    ///
    /// Every input yields exactly one completion; the stream never
    /// short-circuits on failures.
    pub fn check_stream(&self, proxies: Vec<Proxy>) -> impl Stream<Item = (Proxy, bool)> + '_ {
        stream::iter(proxies)
            .map(move |proxy| async move {
                let passed = self.check_proxy(&proxy).await;
                (proxy, passed)
            })
            .buffer_unordered(self.config.concurrency)
    }

    /// Create a reqwest client routed through the proxy. Each check gets
    /// its own client; connections are never shared across proxies.
    fn create_client(&self, proxy: &Proxy) -> Result<Client> {
        let reqwest_proxy = ReqwestProxy::all(proxy.url())?;

        let client = Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.config.timeout)
            .build()?;

        Ok(client)
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}
