// # Config Source Trait
//
// Supplies the runtime configuration. The scheduler loads it at the start
// of every pass, so a file-backed source picks up edits without a restart.

use async_trait::async_trait;

use crate::config::DdnsConfig;

/// Trait for configuration sources
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Load the current configuration
    ///
    /// Only reading and parsing happens here. Field validation is done by
    /// the reconciler so that it also guards configurations that did not
    /// come through a source.
    async fn load(&self) -> Result<DdnsConfig, crate::Error>;

    /// Human-readable description of where the configuration comes from
    fn describe(&self) -> String;
}
