//! Proxy Sweep - Proxy List Fetcher and Checker
//!
//! Fetches candidate proxies from a remote list provider (with an HTML
//! scrape fallback), checks each one concurrently by requesting a test URL
//! through it, and saves the working subset to a flat file.

pub mod console;
pub mod proxy;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
