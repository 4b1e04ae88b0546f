// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Architecture
//
// Asks an external lookup service for the caller's public address once per
// reconciliation pass. Two response shapes are understood:
//
// - JSON with an `ip` field (e.g., `https://ipinfo.io/json`, the default)
// - Plain text holding just the address (e.g., `https://api.ipify.org`)
//
// Only IPv4 is accepted: the managed record is an "A" record.
//
// No caching and no polling: every call is one fresh request, so a changed
// address is seen on the next pass.

use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};
use serde::Deserialize;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Default lookup service
pub const DEFAULT_LOOKUP_URL: &str = "https://ipinfo.io/json";

/// Default HTTP timeout for lookups (10 seconds)
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON body of the lookup service; every other field is ignored
#[derive(Debug, Deserialize)]
struct LookupResponse {
    ip: String,
}

/// HTTP-based IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Lookup service URL (e.g., "https://ipinfo.io/json")
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Lookup service URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the response body from the lookup service
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolution(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("Failed to read response: {}", e)))
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let body = self.fetch().await?;
        let ip = parse_lookup_body(&body)?;
        tracing::debug!("Lookup service {} reported {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Extract the IPv4 address from a lookup response body
///
/// # Returns
///
/// - `Ok(Ipv4Addr)`: The reported address
/// - `Err(Error::Resolution)`: No address, an unparsable one, or IPv6
pub fn parse_lookup_body(body: &str) -> Result<Ipv4Addr> {
    let body = body.trim();

    let text = match serde_json::from_str::<LookupResponse>(body) {
        Ok(response) => response.ip,
        Err(_) => body.to_string(),
    };
    let text = text.trim();

    if text.is_empty() {
        return Err(Error::resolution("Lookup service returned no address"));
    }

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::resolution(format!("Invalid IP address: {}", text)))?;

    match ip {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(v6) => Err(Error::resolution(format!("Expected IPv4, got: {}", v6))),
    }
}
