// # DNS Provider Trait
//
// Defines the interface for the provider-side record operations a
// reconciliation pass needs: list one page of a domain's records, create a
// record, update a record.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `ddns-provider-alidns` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{Credentials, DnsProvider};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let credentials = Credentials::new("id", "secret");
//
//     let page = provider.describe_records(&credentials, "example.com", 1, 500).await?;
//     for record in page.records {
//         println!("{} {} {}", record.rr, record.record_type, record.value);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::Credentials;

/// One provider-side DNS entry
///
/// A snapshot read during a pass; it has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsRecord {
    /// Resource record label (e.g., "home", "@")
    pub rr: String,
    /// Record value (the address for A records)
    pub value: String,
    /// Provider record id
    pub record_id: String,
    /// Record type (e.g., "A", "CNAME")
    pub record_type: String,
    /// Zone the record belongs to
    pub domain_name: String,
}

/// One page of a paginated record listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordPage {
    /// Total number of records across all pages
    pub total_count: u64,
    /// 1-based page number of this page
    pub page_number: u32,
    /// Page size the provider applied
    pub page_size: u32,
    /// Records on this page, in provider order
    pub records: Vec<DnsRecord>,
}

/// Outcome reported by a create/update call
///
/// An empty `code` means success. Anything else is a provider-reported
/// failure carried as-is for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationOutcome {
    /// Provider error code (empty on success)
    pub code: String,
    /// Provider message
    pub message: String,
    /// Id of the created/updated record, when reported
    pub record_id: Option<String>,
}

impl MutationOutcome {
    /// A successful outcome
    pub fn success(record_id: Option<String>) -> Self {
        Self {
            code: String::new(),
            message: String::new(),
            record_id,
        }
    }

    /// Whether the provider reported success
    pub fn is_success(&self) -> bool {
        self.code.is_empty()
    }
}

/// Desired content of the managed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    /// Zone the record lives in (used by create)
    pub domain: String,
    /// Resource record label
    pub rr: String,
    /// Record type
    pub record_type: String,
    /// New value
    pub value: String,
    /// TTL in seconds
    pub ttl: u32,
}

/// Trait for DNS provider implementations
///
/// # Constraints
///
/// - One API request per method call
/// - No retry or backoff logic (owned by the scheduler)
/// - No decision about whether a change is needed (owned by the reconciler)
/// - Credentials are passed per call; providers hold no key material
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch one page of the records of `domain`
    ///
    /// # Parameters
    ///
    /// - `credentials`: Signing credentials
    /// - `domain`: Zone to list
    /// - `page_number`: 1-based page to fetch
    /// - `page_size`: Records per page
    async fn describe_records(
        &self,
        credentials: &Credentials,
        domain: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<RecordPage, crate::Error>;

    /// Create a new record
    ///
    /// # Returns
    ///
    /// - `Ok(MutationOutcome)`: The call completed; inspect `is_success()`
    /// - `Err(Error)`: Transport or decode failure
    async fn add_record(
        &self,
        credentials: &Credentials,
        change: &RecordChange,
    ) -> Result<MutationOutcome, crate::Error>;

    /// Update an existing record in place
    ///
    /// # Returns
    ///
    /// - `Ok(MutationOutcome)`: The call completed; inspect `is_success()`
    /// - `Err(Error)`: Transport or decode failure
    async fn update_record(
        &self,
        credentials: &Credentials,
        record_id: &str,
        change: &RecordChange,
    ) -> Result<MutationOutcome, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
