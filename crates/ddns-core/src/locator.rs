//! Record lookup
//!
//! Finds the provider-side record matching the configured
//! domain/subdomain/type by walking the domain's record listing page by page.
//!
//! The provider is assumed to keep (domain, RR, type) unique for address
//! records. If several records match anyway, the first one in listing order
//! wins.

use tracing::debug;

use crate::config::{Credentials, DdnsConfig, DEFAULT_PAGE_SIZE, RECORD_TYPE_A};
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord};

/// Paginated lookup of the managed record
pub struct RecordLocator<'a> {
    provider: &'a dyn DnsProvider,
    page_size: u32,
}

impl<'a> RecordLocator<'a> {
    /// Create a locator using the default page size (500)
    pub fn new(provider: &'a dyn DnsProvider) -> Self {
        Self {
            provider,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Find the A record for `config.sub_domain` in `config.domain`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: First matching record
    /// - `Ok(None)`: The listing holds no matching record
    /// - `Err(Error::Lookup)`: A page request failed
    pub async fn find(
        &self,
        config: &DdnsConfig,
        credentials: &Credentials,
    ) -> Result<Option<DnsRecord>> {
        let mut page_number: u32 = 1;

        loop {
            let page = self
                .provider
                .describe_records(credentials, &config.domain, page_number, self.page_size)
                .await
                .map_err(|e| Error::lookup(format!("page {}: {}", page_number, e)))?;

            debug!(
                "Fetched record page {} ({} records, total {})",
                page_number,
                page.records.len(),
                page.total_count
            );

            if page.total_count == 0 || page.records.is_empty() {
                return Ok(None);
            }

            if let Some(record) = page.records.into_iter().find(|r| is_managed_record(r, config)) {
                return Ok(Some(record));
            }

            let seen = u64::from(page_number) * u64::from(self.page_size);
            if seen >= page.total_count {
                return Ok(None);
            }

            page_number += 1;
        }
    }
}

fn is_managed_record(record: &DnsRecord, config: &DdnsConfig) -> bool {
    record.domain_name == config.domain
        && record.rr == config.sub_domain
        && record.record_type == RECORD_TYPE_A
}
