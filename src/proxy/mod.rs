//! Proxy module for resolving and checking proxies
//!
//! This module provides functionality for:
//! - Resolving candidate proxy lists from remote sources
//! - Checking proxy validity with bounded concurrency
//! - Parsing proxy lines and saving working proxies to a file

pub mod checker;
pub mod models;
pub mod parser;
pub mod source;

pub use checker::{default_concurrency, CheckerConfig, ProxyChecker};
pub use models::{Proxy, ProxyType};
pub use parser::ProxyParser;
pub use source::{FetcherConfig, ProxyFetcher};
