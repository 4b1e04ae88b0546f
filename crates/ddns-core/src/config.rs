//! Configuration types for the DDNS system
//!
//! [`DdnsConfig`] is the runtime configuration of one managed record. It is
//! read with the same key spelling as the `config.json` file users already
//! have:
//!
//! ```json
//! {
//!   "AccessKeyId": "LTAI...",
//!   "AccessKeySecret": "...",
//!   "Domain": "example.com",
//!   "SubDomain": "home",
//!   "TTL": 600,
//!   "Interval": 300
//! }
//! ```
//!
//! `Duration` is accepted as an alias of `Interval`. Missing fields
//! deserialize to their empty value and are reported by [`DdnsConfig::validate`].

use serde::{Deserialize, Serialize};

/// Record type managed by this system (IPv4 address record)
pub const RECORD_TYPE_A: &str = "A";

/// Page size used when listing a domain's records
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Delay before the next pass after any failure (in seconds)
pub const DEFAULT_FALLBACK_INTERVAL_SECS: u64 = 60;

/// Runtime configuration for one managed record
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider access key id
    #[serde(rename = "AccessKeyId", default)]
    pub access_key_id: String,

    /// Provider access key secret
    /// ⚠️ NEVER log this value
    #[serde(rename = "AccessKeySecret", default)]
    pub access_key_secret: String,

    /// Zone the record lives in (e.g., "example.com")
    #[serde(rename = "Domain", default)]
    pub domain: String,

    /// Record label within the zone (e.g., "home", "@")
    #[serde(rename = "SubDomain", default)]
    pub sub_domain: String,

    /// Record TTL in seconds
    #[serde(rename = "TTL", default)]
    pub ttl: u32,

    /// Seconds between checks after a successful pass
    #[serde(rename = "Interval", alias = "Duration", default)]
    pub interval: u64,
}

// Custom Debug implementation that hides the access key secret
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("domain", &self.domain)
            .field("sub_domain", &self.sub_domain)
            .field("ttl", &self.ttl)
            .field("interval", &self.interval)
            .finish()
    }
}

impl DdnsConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(text)
            .map_err(|e| crate::Error::config(format!("Invalid configuration JSON: {}", e)))
    }

    /// Validate the configuration
    ///
    /// All six fields must be non-empty/non-zero before any network call
    /// is made on behalf of this configuration.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.access_key_id.is_empty() {
            return Err(crate::Error::config("AccessKeyId cannot be empty"));
        }
        if self.access_key_secret.is_empty() {
            return Err(crate::Error::config("AccessKeySecret cannot be empty"));
        }
        if self.domain.is_empty() {
            return Err(crate::Error::config("Domain cannot be empty"));
        }
        if self.sub_domain.is_empty() {
            return Err(crate::Error::config("SubDomain cannot be empty"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }
        if self.interval == 0 {
            return Err(crate::Error::config("Interval must be > 0"));
        }
        Ok(())
    }

    /// Credential pair used to sign provider requests
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.access_key_id.clone(), self.access_key_secret.clone())
    }

    /// Fully qualified name of the managed record (for logging)
    pub fn record_name(&self) -> String {
        if self.sub_domain == "@" {
            self.domain.clone()
        } else {
            format!("{}.{}", self.sub_domain, self.domain)
        }
    }
}

/// Access key pair for the DNS provider API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access key id (sent in clear as a request parameter)
    pub access_key_id: String,

    /// Access key secret (signing key only, never sent)
    pub access_key_secret: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(access_key_id: impl Into<String>, access_key_secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .finish()
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay before the next pass after a failure (in seconds)
    #[serde(default = "default_fallback_interval_secs")]
    pub fallback_interval_secs: u64,

    /// Upper bound for the failure delay (in seconds)
    ///
    /// Consecutive failures double the fallback delay up to this ceiling.
    /// When equal to `fallback_interval_secs` every failure waits the same
    /// fixed delay.
    #[serde(default = "default_fallback_interval_secs")]
    pub max_backoff_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fallback_interval_secs: default_fallback_interval_secs(),
            max_backoff_secs: default_fallback_interval_secs(),
        }
    }
}

impl SchedulerConfig {
    /// Validate the scheduler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.fallback_interval_secs == 0 {
            return Err(crate::Error::config("Fallback interval must be > 0"));
        }
        if self.max_backoff_secs < self.fallback_interval_secs {
            return Err(crate::Error::config(
                "Maximum backoff cannot be shorter than the fallback interval",
            ));
        }
        Ok(())
    }

    /// Delay after the given number of consecutive failures (1-based)
    pub fn failure_delay_secs(&self, consecutive_failures: u32) -> u64 {
        let shift = consecutive_failures.saturating_sub(1).min(32);
        self.fallback_interval_secs
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_secs.max(self.fallback_interval_secs))
    }
}

fn default_fallback_interval_secs() -> u64 {
    DEFAULT_FALLBACK_INTERVAL_SECS
}
