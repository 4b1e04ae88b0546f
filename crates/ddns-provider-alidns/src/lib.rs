// # Alibaba Cloud DNS Provider
//
// This crate provides the Alibaba Cloud DNS (alidns) provider for the DDNS
// system. Every call is a signed HTTPS GET against the RPC-style API.
//
// ## Behavior
//
// - One HTTP request per trait method call
// - Errors are propagated to the reconciler, which decides what a failure means
// - HTTP timeout configured (30 seconds by default)
// - Specific error handling for HTTP status codes (401/403, 429, 5xx)
// - Provider-reported failures on create/update come back as a
//   `MutationOutcome` with the provider's code and message
// - Dry-run mode: listings are real, create/update are only logged
// - No retry, backoff or scheduling (owned by `Scheduler`)
// - No caching across calls
//
// ## Security Requirements
//
// - The access key secret is only used as the HMAC key and is never sent or logged
// - Credentials are passed per call and never stored in the provider
//
// ## API Reference
//
// - Endpoint: `https://alidns.aliyuncs.com/`, API version `2015-01-09`
// - List records: `Action=DescribeDomainRecords&DomainName=..&PageNumber=..&PageSize=..`
// - Create record: `Action=AddDomainRecord&DomainName=..&RR=..&Type=..&Value=..&TTL=..`
// - Update record: `Action=UpdateDomainRecord&RecordId=..&RR=..&Type=..&Value=..&TTL=..`

pub mod sign;
pub mod types;

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, MutationOutcome, RecordChange, RecordPage};
use ddns_core::{Credentials, Error, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use sign::Signer;
use types::{DescribeDomainRecordsResponse, ErrorResponse, MutationResponse};

/// Alibaba Cloud DNS API endpoint
pub const ALIDNS_API_ENDPOINT: &str = "https://alidns.aliyuncs.com/";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Alibaba Cloud DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform `DescribeDomainRecords` requests as usual
/// - Log the intended create/update parameters
/// - **NOT** actually modify DNS records
#[derive(Debug)]
pub struct AlidnsProvider {
    /// API endpoint (overridable for testing)
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform listings but skip create/update
    dry_run: bool,
}

impl AlidnsProvider {
    /// Create a new provider against the public endpoint
    ///
    /// # Parameters
    ///
    /// - `dry_run`: If true, perform listings but skip create/update
    ///
    /// # Returns
    ///
    /// - `Ok(AlidnsProvider)`: Ready to use
    /// - `Err(Error)`: If the HTTP client could not be built
    pub fn new(dry_run: bool) -> Result<Self> {
        Ok(Self {
            endpoint: ALIDNS_API_ENDPOINT.to_string(),
            client: build_client(DEFAULT_HTTP_TIMEOUT)?,
            dry_run,
        })
    }

    /// Create a new provider in live mode
    pub fn new_live() -> Result<Self> {
        Self::new(false)
    }

    /// Create a new provider in dry-run mode
    pub fn new_dry_run() -> Result<Self> {
        Self::new(true)
    }

    /// Use a different API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a different request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Whether create/update calls are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// API endpoint in use
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one signed API call and decode the JSON response
    ///
    /// # Parameters
    ///
    /// - `credentials`: Access key pair used to sign the request
    /// - `params`: Action-specific parameters, in the order they should be sent
    ///
    /// # Returns
    ///
    /// - `Ok(T)`: Decoded 2xx response body
    /// - `Err(Error::Api)`: Non-2xx status with a provider error body
    /// - `Err(Error::Http)`: Transport failure or non-2xx status without one
    /// - `Err(Error::Json)`: 2xx body that does not decode into `T`
    pub async fn call<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let action = params
            .iter()
            .find(|(key, _)| key == "Action")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();

        let query = Signer::new(credentials).sign(params);
        let url = format!("{}?{}", self.endpoint.trim_end_matches('?'), query);

        tracing::debug!("Calling alidns API: {}", action);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{} response could not be read: {}", action, e)))?;

        if !status.is_success() {
            // Provider error bodies carry a code worth surfacing as-is
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                tracing::debug!(
                    "alidns {} failed: {} (request id: {})",
                    action,
                    error.code,
                    error.request_id.as_deref().unwrap_or("-")
                );
                return Err(Error::api(error.code, error.message));
            }

            return Err(match status.as_u16() {
                401 | 403 => Error::http(format!(
                    "Authentication failed: Invalid access key or insufficient permissions. Status: {}",
                    status
                )),
                429 => Error::http(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                )),
                500..=599 => Error::http(format!(
                    "alidns server error (transient): {} - {}",
                    status, body
                )),
                _ => Error::http(format!("{} failed: {} - {}", action, status, body)),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Send a create/update call, folding provider-reported failures into the outcome
    async fn mutate(
        &self,
        credentials: &Credentials,
        params: Vec<(String, String)>,
    ) -> Result<MutationOutcome> {
        match self.call::<MutationResponse>(credentials, params).await {
            Ok(response) => Ok(MutationOutcome::from(response)),
            Err(Error::Api { code, message }) => Ok(MutationOutcome {
                code,
                message,
                record_id: None,
            }),
            Err(e) => Err(e),
        }
    }

    /// Log the parameters a mutation would have sent
    fn dry_run_outcome(&self, params: &[(String, String)]) -> MutationOutcome {
        let rendered = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!("[DRY-RUN] Would call alidns API with: {}", rendered);
        MutationOutcome::success(None)
    }
}

#[async_trait]
impl DnsProvider for AlidnsProvider {
    async fn describe_records(
        &self,
        credentials: &Credentials,
        domain: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<RecordPage> {
        let response: DescribeDomainRecordsResponse = self
            .call(credentials, describe_params(domain, page_number, page_size))
            .await?;

        tracing::debug!(
            "Listed page {} of {} ({} records, {} total)",
            response.page_number,
            domain,
            response.domain_records.record.len(),
            response.total_count
        );
        Ok(RecordPage::from(response))
    }

    async fn add_record(
        &self,
        credentials: &Credentials,
        change: &RecordChange,
    ) -> Result<MutationOutcome> {
        let params = add_params(change);

        if self.dry_run {
            return Ok(self.dry_run_outcome(&params));
        }

        self.mutate(credentials, params).await
    }

    async fn update_record(
        &self,
        credentials: &Credentials,
        record_id: &str,
        change: &RecordChange,
    ) -> Result<MutationOutcome> {
        let params = update_params(record_id, change);

        if self.dry_run {
            return Ok(self.dry_run_outcome(&params));
        }

        self.mutate(credentials, params).await
    }

    fn provider_name(&self) -> &'static str {
        "alidns"
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn describe_params(domain: &str, page_number: u32, page_size: u32) -> Vec<(String, String)> {
    vec![
        param("Action", "DescribeDomainRecords"),
        param("DomainName", domain),
        param("PageNumber", page_number),
        param("PageSize", page_size),
    ]
}

fn add_params(change: &RecordChange) -> Vec<(String, String)> {
    vec![
        param("Action", "AddDomainRecord"),
        param("DomainName", &change.domain),
        param("RR", &change.rr),
        param("Type", &change.record_type),
        param("Value", &change.value),
        param("TTL", change.ttl),
    ]
}

fn update_params(record_id: &str, change: &RecordChange) -> Vec<(String, String)> {
    vec![
        param("Action", "UpdateDomainRecord"),
        param("RecordId", record_id),
        param("RR", &change.rr),
        param("Type", &change.record_type),
        param("Value", &change.value),
        param("TTL", change.ttl),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> RecordChange {
        RecordChange {
            domain: "example.com".to_string(),
            rr: "home".to_string(),
            record_type: "A".to_string(),
            value: "5.6.7.8".to_string(),
            ttl: 600,
        }
    }

    fn keys(params: &[(String, String)]) -> Vec<&str> {
        params.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_dry_run_mode() {
        let provider_dry = AlidnsProvider::new_dry_run().unwrap();
        let provider_live = AlidnsProvider::new_live().unwrap();

        assert!(provider_dry.is_dry_run(), "Dry-run provider should have dry_run=true");
        assert!(!provider_live.is_dry_run(), "Live provider should have dry_run=false");
    }

    #[test]
    fn test_provider_name() {
        let provider = AlidnsProvider::new(false).unwrap();
        assert_eq!(provider.provider_name(), "alidns");
    }

    #[test]
    fn test_default_and_custom_endpoint() {
        let provider = AlidnsProvider::new(false).unwrap();
        assert_eq!(provider.endpoint(), ALIDNS_API_ENDPOINT);

        let provider = provider.with_endpoint("http://127.0.0.1:9000/");
        assert_eq!(provider.endpoint(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_custom_timeout_builds_client() {
        let provider = AlidnsProvider::new(false)
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert!(provider.is_ok());
    }

    #[test]
    fn test_describe_params() {
        let params = describe_params("example.com", 3, 500);
        assert_eq!(keys(&params), vec!["Action", "DomainName", "PageNumber", "PageSize"]);
        assert_eq!(params[2].1, "3");
        assert_eq!(params[3].1, "500");
    }

    #[test]
    fn test_add_params() {
        let params = add_params(&change());
        assert_eq!(params[0].1, "AddDomainRecord");
        assert_eq!(keys(&params), vec!["Action", "DomainName", "RR", "Type", "Value", "TTL"]);
        assert_eq!(params[5].1, "600");
    }

    #[test]
    fn test_update_params_use_record_id_not_domain() {
        let params = update_params("9999985", &change());
        assert_eq!(params[0].1, "UpdateDomainRecord");
        assert_eq!(keys(&params), vec!["Action", "RecordId", "RR", "Type", "Value", "TTL"]);
        assert_eq!(params[1].1, "9999985");
    }

    #[tokio::test]
    async fn test_dry_run_mutations_succeed_without_network() {
        // Unroutable endpoint: any request would fail
        let provider = AlidnsProvider::new_dry_run()
            .unwrap()
            .with_endpoint("http://127.0.0.1:1/");
        let credentials = Credentials::new("id", "secret");

        let added = provider.add_record(&credentials, &change()).await.unwrap();
        assert!(added.is_success());

        let updated = provider
            .update_record(&credentials, "9999985", &change())
            .await
            .unwrap();
        assert!(updated.is_success());
    }
}
