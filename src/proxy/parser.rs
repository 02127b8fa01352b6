//! Proxy parser module for parsing proxy lines and persisting results

use crate::proxy::models::{Proxy, ProxyType};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Matches `scheme://host:port` lines
static URL_FORMAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?)://([^:/\s]+):(\d{1,5})/?$").expect("Invalid proxy URL regex")
});

/// Proxy parser for parsing proxies from strings and writing them back out
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Supports formats:
    /// - IP:PORT
    /// - scheme://IP:PORT
    pub fn parse_line(line: &str, default_type: ProxyType) -> Option<Proxy> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(proxy) = Self::parse_url_format(line) {
            return Some(proxy);
        }

        Self::parse_host_port(line, default_type)
    }

    /// Parse URL format (e.g., http://1.2.3.4:8080)
    fn parse_url_format(line: &str) -> Option<Proxy> {
        let caps = URL_FORMAT_REGEX.captures(line)?;

        let proxy_type = match &caps[1] {
            "http" => ProxyType::Http,
            "https" => ProxyType::Https,
            _ => return None,
        };

        let host = caps[2].to_string();
        let port: u16 = caps[3].parse().ok()?;

        Some(Proxy::new(host, port, proxy_type))
    }

    /// Parse bare IP:PORT format
    fn parse_host_port(line: &str, default_type: ProxyType) -> Option<Proxy> {
        let (host, port) = line.rsplit_once(':')?;
        if host.is_empty() || host.contains(':') || host.contains('/') {
            return None;
        }
        let port: u16 = port.parse().ok()?;

        Some(Proxy::new(host.to_string(), port, default_type))
    }

    /// Parse proxies from a string (multiple lines)
    pub fn parse_string(content: &str, default_type: ProxyType) -> Vec<Proxy> {
        content
            .lines()
            .filter_map(|line| Self::parse_line(line, default_type))
            .collect()
    }

    /// Save proxies to a file, one URL per line, newline-terminated.
    /// Truncates any prior contents.
    pub fn save_to_file<P: AsRef<Path>>(proxies: &[Proxy], path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for proxy in proxies {
            writeln!(writer, "{proxy}")?;
        }

        writer.flush()?;
        Ok(())
    }
}
