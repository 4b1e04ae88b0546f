//! Reconciliation engine
//!
//! The Reconciler runs one pass of the IP check → record lookup → DNS
//! mutation flow.
//!
//! ## Event Flow
//!
//! ```text
//! ┌─────────────┐   current IP    ┌──────────────┐
//! │  IpSource   │────────────────▶│  Reconciler  │◀── ReconciliationState
//! └─────────────┘                 └──────────────┘
//!                                         │
//!                          same as last?  │  changed
//!                        ┌────────────────┴──────────────┐
//!                        ▼                               ▼
//!                   (no calls)                  ┌────────────────┐
//!                                               │ RecordLocator  │
//!                                               └────────────────┘
//!                                                        │
//!                              value == IP?  ┌───────────┼───────────┐
//!                                            ▼           ▼           ▼
//!                                       (no call)   add_record  update_record
//! ```
//!
//! 1. Resolve the current public IP
//! 2. If it equals the last observed IP, stop (no provider calls)
//! 3. Locate the managed record
//! 4. Create it if absent, update it if its value differs
//! 5. On success, remember the IP as last observed

use std::net::Ipv4Addr;

use tracing::{debug, info};

use crate::config::{DdnsConfig, RECORD_TYPE_A};
use crate::error::{Error, Result};
use crate::locator::RecordLocator;
use crate::traits::{DnsProvider, IpSource, RecordChange};

/// State carried from one pass to the next
///
/// Starts empty at process start, is replaced only after a successful pass
/// that observed a new address, and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationState {
    /// Address recorded by the last successful pass
    pub last_observed_ip: Option<Ipv4Addr>,
}

impl ReconciliationState {
    /// Fresh state with no observed address
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a successful pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// IP unchanged since the last pass, no provider calls made
    Unchanged {
        /// The current IP address
        ip: Ipv4Addr,
    },

    /// Record already held the current IP (updated by someone else)
    AlreadyCurrent {
        /// The current IP address
        ip: Ipv4Addr,
        /// Provider record id
        record_id: String,
    },

    /// Record did not exist and was created
    Created {
        /// The new IP address
        ip: Ipv4Addr,
        /// Id reported by the provider, when available
        record_id: Option<String>,
    },

    /// Record existed with another value and was updated
    Updated {
        /// The new IP address
        ip: Ipv4Addr,
        /// Provider record id
        record_id: String,
        /// Value the record held before
        previous_value: String,
    },
}

impl PassOutcome {
    /// The IP address observed by the pass
    pub fn ip(&self) -> Ipv4Addr {
        match self {
            PassOutcome::Unchanged { ip }
            | PassOutcome::AlreadyCurrent { ip, .. }
            | PassOutcome::Created { ip, .. }
            | PassOutcome::Updated { ip, .. } => *ip,
        }
    }

    /// Whether the pass issued a create or update call
    pub fn mutated(&self) -> bool {
        matches!(self, PassOutcome::Created { .. } | PassOutcome::Updated { .. })
    }
}

/// Drives one reconciliation pass
///
/// The reconciler owns the IP source and the provider; the pass state is
/// threaded through [`Reconciler::reconcile`] by the caller.
pub struct Reconciler {
    /// IP source for the current address
    ip_source: Box<dyn IpSource>,

    /// DNS provider for listing and mutating records
    provider: Box<dyn DnsProvider>,

    /// Page size used by the record lookup
    page_size: u32,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    pub fn new(ip_source: Box<dyn IpSource>, provider: Box<dyn DnsProvider>) -> Self {
        Self {
            ip_source,
            provider,
            page_size: crate::config::DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the record listing page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run one pass
    ///
    /// `state` is written only when the pass succeeds. On error it is left
    /// exactly as it was, so the next pass retries the same change.
    ///
    /// # Returns
    ///
    /// - `Ok(PassOutcome)`: What the pass did
    /// - `Err(Error)`: Config, Resolution, Lookup, Mutation or Rejected
    pub async fn reconcile(
        &self,
        config: &DdnsConfig,
        state: &mut ReconciliationState,
    ) -> Result<PassOutcome> {
        config.validate()?;

        let ip = self
            .ip_source
            .current()
            .await
            .map_err(|e| {
                if matches!(e, Error::Resolution(_)) {
                    e
                } else {
                    Error::resolution(e.to_string())
                }
            })?;

        info!(
            "Current IP: {}, last IP: {}",
            ip,
            state
                .last_observed_ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "None".to_string())
        );

        if state.last_observed_ip == Some(ip) {
            info!("Already up-to-date");
            return Ok(PassOutcome::Unchanged { ip });
        }

        let outcome = self.apply(config, ip).await?;
        state.last_observed_ip = Some(ip);
        Ok(outcome)
    }

    /// Bring the provider record in line with `ip`
    async fn apply(&self, config: &DdnsConfig, ip: Ipv4Addr) -> Result<PassOutcome> {
        let credentials = config.credentials();
        let value = ip.to_string();

        debug!("Looking for existing record {}", config.record_name());
        let existing = RecordLocator::new(&*self.provider)
            .with_page_size(self.page_size)
            .find(config, &credentials)
            .await?;

        let change = RecordChange {
            domain: config.domain.clone(),
            rr: config.sub_domain.clone(),
            record_type: RECORD_TYPE_A.to_string(),
            value: value.clone(),
            ttl: config.ttl,
        };

        match existing {
            Some(record) if record.value == value => {
                info!(
                    "Record {} already points at {}, no update needed",
                    config.record_name(),
                    ip
                );
                Ok(PassOutcome::AlreadyCurrent {
                    ip,
                    record_id: record.record_id,
                })
            }
            Some(record) => {
                info!(
                    "Updating record {} ({}): {} -> {}",
                    config.record_name(),
                    record.record_id,
                    record.value,
                    ip
                );
                let outcome = self
                    .provider
                    .update_record(&credentials, &record.record_id, &change)
                    .await
                    .map_err(|e| Error::mutation(e.to_string()))?;
                if !outcome.is_success() {
                    return Err(Error::rejected(outcome.code, outcome.message));
                }
                info!("Update succeeded");
                Ok(PassOutcome::Updated {
                    ip,
                    record_id: record.record_id,
                    previous_value: record.value,
                })
            }
            None => {
                info!(
                    "No existing record found, creating {} -> {}",
                    config.record_name(),
                    ip
                );
                let outcome = self
                    .provider
                    .add_record(&credentials, &change)
                    .await
                    .map_err(|e| Error::mutation(e.to_string()))?;
                if !outcome.is_success() {
                    return Err(Error::rejected(outcome.code, outcome.message));
                }
                info!("Create succeeded");
                Ok(PassOutcome::Created {
                    ip,
                    record_id: outcome.record_id,
                })
            }
        }
    }

    /// Name of the configured provider (for logging)
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Name of the configured IP source (for logging)
    pub fn source_name(&self) -> &'static str {
        self.ip_source.source_name()
    }
}
