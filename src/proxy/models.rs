//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Proxy scheme enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProxyType {
    #[default]
    Http,
    Https,
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyType::Http => write!(f, "http"),
            ProxyType::Https => write!(f, "https"),
        }
    }
}

/// Proxy model representing a single proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
    pub proxy_type: ProxyType,
}

impl Proxy {
    pub fn new(host: String, port: u16, proxy_type: ProxyType) -> Self {
        Self {
            host,
            port,
            proxy_type,
        }
    }

    /// Get the proxy URL string, e.g. `http://203.0.113.5:8080`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.proxy_type, self.host, self.port)
    }

    /// Get the proxy string in IP:PORT format
    pub fn to_simple_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_creation() {
        let proxy = Proxy::new("127.0.0.1".to_string(), 8080, ProxyType::Http);
        assert_eq!(proxy.host, "127.0.0.1");
        assert_eq!(proxy.port, 8080);
        assert_eq!(proxy.proxy_type, ProxyType::Http);
    }

    #[test]
    fn test_proxy_url() {
        let proxy = Proxy::new("203.0.113.5".to_string(), 8080, ProxyType::Http);
        assert_eq!(proxy.url(), "http://203.0.113.5:8080");

        let proxy = Proxy::new("9.9.9.9".to_string(), 80, ProxyType::Https);
        assert_eq!(proxy.url(), "https://9.9.9.9:80");
    }

    #[test]
    fn test_proxy_simple_string() {
        let proxy = Proxy::new("127.0.0.1".to_string(), 8080, ProxyType::Http);
        assert_eq!(proxy.to_simple_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_proxy_display_matches_url() {
        let proxy = Proxy::new("10.0.0.1".to_string(), 3128, ProxyType::Http);
        assert_eq!(proxy.to_string(), proxy.url());
    }
}
