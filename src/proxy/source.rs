//! Proxy source resolver for acquiring candidate proxy lists
//!
//! Acquisition runs in two stages:
//! 1. A plain-text proxy list API, fetched with bounded retry on transient
//!    HTTP statuses.
//! 2. On any API failure, an HTML listing page scraped for its proxy table.

use crate::proxy::models::{Proxy, ProxyType};
use crate::proxy::parser::ProxyParser;
use crate::Result;
use anyhow::{anyhow, bail};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;

/// Default timeout for acquisition requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of attempts for the API request
const MAX_ATTEMPTS: u32 = 3;

/// Plain-text proxy list API
const API_URL: &str =
    "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout=10000&country=all";

/// HTML listing page used when the API fails
const FALLBACK_URL: &str = "https://free-proxy-list.net/";

/// Browser-like user agent for the fallback page
const FALLBACK_USER_AGENT: &str = "Mozilla/5.0";

/// HTTP statuses worth retrying on the API path
fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Configuration for the proxy fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Timeout for each acquisition request
    pub timeout: Duration,
    /// URL of the plain-text list API
    pub api_url: String,
    /// URL of the HTML fallback page
    pub fallback_url: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_url: API_URL.to_string(),
            fallback_url: FALLBACK_URL.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = url;
        self
    }

    pub fn with_fallback_url(mut self, url: String) -> Self {
        self.fallback_url = url;
        self
    }
}

/// Proxy fetcher resolving the candidate proxy list
pub struct ProxyFetcher {
    config: FetcherConfig,
    client: Client,
}

impl ProxyFetcher {
    /// Create a new proxy fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    /// Create a new proxy fetcher with custom configuration
    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, client })
    }

    /// Resolve the candidate proxy list.
    ///
    /// Tries the list API first; any API failure (including an empty body)
    /// falls through to the HTML scrape. Fallback failures propagate.
    pub async fn fetch_proxies(&self) -> Result<Vec<Proxy>> {
        match self.fetch_from_api().await {
            Ok(proxies) => Ok(proxies),
            Err(e) => {
                eprintln!("Proxy API failed ({e}), falling back to HTML scrape...");
                self.fetch_from_fallback().await
            }
        }
    }

    /// Fetch and parse the plain-text API list
    async fn fetch_from_api(&self) -> Result<Vec<Proxy>> {
        let body = self.get_with_retry(&self.config.api_url).await?;
        parse_api_body(&body)
    }

    /// GET with retry on transient statuses, exponential backoff between
    /// attempts (1s, 2s).
    async fn get_with_retry(&self, url: &str) -> Result<String> {
        let mut attempt = 1;
        loop {
            let response = self.client.get(url).send().await?;

            if is_transient(response.status()) && attempt < MAX_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(1 << (attempt - 1))).await;
                attempt += 1;
                continue;
            }

            return Ok(response.error_for_status()?.text().await?);
        }
    }

    /// Fetch the fallback page and scrape its proxy table
    async fn fetch_from_fallback(&self) -> Result<Vec<Proxy>> {
        let response = self
            .client
            .get(&self.config.fallback_url)
            .header(reqwest::header::USER_AGENT, FALLBACK_USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parse_fallback_html(&body)
    }
}

/// Parse the API body: one proxy per non-empty line, scheme `http`.
///
/// An empty body is treated as a failure so the caller falls back to the
/// scrape path. This mirrors upstream behavior on throttling and is
/// best-effort, not a documented contract of the API. A malformed line is
/// also a failure: the list must never silently shrink, so a body the
/// parser cannot fully represent sends the caller to the fallback instead.
fn parse_api_body(body: &str) -> Result<Vec<Proxy>> {
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        bail!("empty proxy list from API");
    }

    let mut proxies = Vec::with_capacity(lines.len());
    for line in lines {
        match ProxyParser::parse_line(line, ProxyType::Http) {
            Some(proxy) => proxies.push(proxy),
            None => bail!("malformed proxy line from API: {line}"),
        }
    }

    Ok(proxies)
}

/// Scrape the fallback page's proxy table.
///
/// Rows carry (ip, port, ..., https flag) columns; the scheme is `https`
/// when the flag equals "yes" (case-insensitive), otherwise `http`.
fn parse_fallback_html(html: &str) -> Result<Vec<Proxy>> {
    let document = Html::parse_document(html);
    let row_selector =
        Selector::parse("table#proxylisttable tbody tr").expect("Invalid row selector");
    let td_selector = Selector::parse("td").expect("Invalid cell selector");

    let rows: Vec<_> = document.select(&row_selector).collect();
    if rows.is_empty() {
        return Err(anyhow!("fallback scrape failed: proxy table not found"));
    }

    let mut proxies = Vec::new();
    for row in rows {
        let cols: Vec<_> = row.select(&td_selector).collect();
        if cols.len() < 7 {
            continue;
        }

        let ip = cols[0].text().collect::<String>();
        let port: u16 = match cols[1].text().collect::<String>().trim().parse() {
            Ok(port) => port,
            Err(_) => continue,
        };
        let https_flag = cols[6].text().collect::<String>();

        let proxy_type = if https_flag.trim().eq_ignore_ascii_case("yes") {
            ProxyType::Https
        } else {
            ProxyType::Http
        };

        proxies.push(Proxy::new(ip.trim().to_string(), port, proxy_type));
    }

    if proxies.is_empty() {
        return Err(anyhow!("fallback scrape failed: no proxy rows parsed"));
    }

    Ok(proxies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one HTTP 200 response with the given body, then exit.
    fn spawn_one_shot_server(body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{addr}/")
    }

    fn table_fixture(rows: &str) -> String {
        format!(
            "<html><body>\
             <table id=\"proxylisttable\"><thead><tr><th>IP</th></tr></thead>\
             <tbody>{rows}</tbody></table>\
             </body></html>"
        )
    }

    fn row_fixture(ip: &str, port: &str, https: &str) -> String {
        format!(
            "<tr><td>{ip}</td><td>{port}</td><td>US</td><td>United States</td>\
             <td>anonymous</td><td>no</td><td>{https}</td><td>1 min ago</td></tr>"
        )
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.api_url, API_URL);
        assert_eq!(config.fallback_url, FALLBACK_URL);
    }

    #[test]
    fn test_fetcher_config_builder() {
        let config = FetcherConfig::new()
            .with_timeout(Duration::from_secs(3))
            .with_api_url("http://example.com/list".to_string())
            .with_fallback_url("http://example.com/html".to_string());

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.api_url, "http://example.com/list");
        assert_eq!(config.fallback_url, "http://example.com/html");
    }

    #[test]
    fn test_is_transient() {
        for code in [429u16, 500, 502, 503, 504] {
            assert!(is_transient(StatusCode::from_u16(code).unwrap()));
        }
        assert!(!is_transient(StatusCode::OK));
        assert!(!is_transient(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_parse_api_body() {
        let proxies = parse_api_body("1.2.3.4:8080\n5.6.7.8:3128\n").unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0].url(), "http://1.2.3.4:8080");
        assert_eq!(proxies[1].url(), "http://5.6.7.8:3128");
    }

    #[test]
    fn test_parse_api_body_strips_whitespace() {
        let proxies = parse_api_body("  1.2.3.4:8080  \r\n\n5.6.7.8:3128\n\n").unwrap();
        assert_eq!(proxies.len(), 2);
    }

    #[test]
    fn test_parse_api_body_empty_is_error() {
        assert!(parse_api_body("").is_err());
        assert!(parse_api_body("\n  \n\t\n").is_err());
    }

    #[test]
    fn test_parse_api_body_malformed_line_is_error() {
        assert!(parse_api_body("1.2.3.4:8080\ngarbage\n").is_err());
        assert!(parse_api_body("1.2.3.4:8080\n5.6.7.8:99999\n").is_err());
    }

    #[test]
    fn test_parse_api_body_count_matches_nonempty_lines() {
        let body = "1.2.3.4:8080\n\n5.6.7.8:3128\n  \n10.0.0.1:80\n";
        let nonempty = body.lines().filter(|l| !l.trim().is_empty()).count();
        let proxies = parse_api_body(body).unwrap();
        assert_eq!(proxies.len(), nonempty);
    }

    #[test]
    fn test_parse_fallback_html_single_row() {
        let html = table_fixture(&row_fixture("9.9.9.9", "80", "yes"));
        let proxies = parse_fallback_html(&html).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].url(), "https://9.9.9.9:80");
    }

    #[test]
    fn test_parse_fallback_html_scheme_flag() {
        let rows = format!(
            "{}{}{}",
            row_fixture("1.1.1.1", "80", "yes"),
            row_fixture("2.2.2.2", "8080", "no"),
            row_fixture("3.3.3.3", "3128", "YES"),
        );
        let proxies = parse_fallback_html(&table_fixture(&rows)).unwrap();
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[0].proxy_type, ProxyType::Https);
        assert_eq!(proxies[1].proxy_type, ProxyType::Http);
        assert_eq!(proxies[2].proxy_type, ProxyType::Https);
    }

    #[test]
    fn test_parse_fallback_html_nested_cell_markup() {
        let row = "<tr><td><span>1.1.1.1</span></td><td><b>8080</b></td><td>US</td>\
                   <td>United States</td><td>anonymous</td><td>no</td>\
                   <td><span>yes</span></td><td>1 min ago</td></tr>";
        let proxies = parse_fallback_html(&table_fixture(row)).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].url(), "https://1.1.1.1:8080");
    }

    #[test]
    fn test_parse_fallback_html_missing_table() {
        let html = "<html><body><p>no table here</p></body></html>";
        assert!(parse_fallback_html(html).is_err());
    }

    #[test]
    fn test_parse_fallback_html_skips_short_rows() {
        let rows = format!(
            "<tr><td>only</td><td>two</td></tr>{}",
            row_fixture("4.4.4.4", "8000", "no")
        );
        let proxies = parse_fallback_html(&table_fixture(&rows)).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].host, "4.4.4.4");
    }

    #[tokio::test]
    async fn test_fetch_proxies_empty_body_invokes_fallback() {
        let api_url = spawn_one_shot_server(String::new());
        let fallback_url =
            spawn_one_shot_server(table_fixture(&row_fixture("9.9.9.9", "80", "yes")));

        let fetcher = ProxyFetcher::with_config(
            FetcherConfig::new()
                .with_timeout(Duration::from_secs(5))
                .with_api_url(api_url)
                .with_fallback_url(fallback_url),
        )
        .unwrap();

        let proxies = fetcher.fetch_proxies().await.unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].url(), "https://9.9.9.9:80");
    }

    #[tokio::test]
    async fn test_fetch_proxies_prefers_primary() {
        let api_url = spawn_one_shot_server("1.2.3.4:8080\n5.6.7.8:3128\n".to_string());
        let fallback_url = spawn_one_shot_server(String::new());

        let fetcher = ProxyFetcher::with_config(
            FetcherConfig::new()
                .with_timeout(Duration::from_secs(5))
                .with_api_url(api_url)
                .with_fallback_url(fallback_url),
        )
        .unwrap();

        let proxies = fetcher.fetch_proxies().await.unwrap();
        assert_eq!(proxies.len(), 2);
        assert_eq!(proxies[0].url(), "http://1.2.3.4:8080");
        assert_eq!(proxies[1].url(), "http://5.6.7.8:3128");
    }
}
