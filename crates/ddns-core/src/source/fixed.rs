// # Fixed Config Source
//
// In-memory implementation of ConfigSource.
//
// Every load returns a clone of the configuration given at construction.
// Useful for embedding the library and for tests.

use async_trait::async_trait;

use crate::config::DdnsConfig;
use crate::traits::ConfigSource;
use crate::Error;

/// Config source returning a fixed configuration
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::config::DdnsConfig;
/// use ddns_core::source::FixedConfigSource;
/// use ddns_core::traits::ConfigSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = FixedConfigSource::new(DdnsConfig::default());
///     let config = source.load().await?;
///     assert_eq!(config.ttl, 0);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FixedConfigSource {
    config: DdnsConfig,
}

impl FixedConfigSource {
    /// Create a source that always yields `config`
    pub fn new(config: DdnsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigSource for FixedConfigSource {
    async fn load(&self) -> Result<DdnsConfig, Error> {
        Ok(self.config.clone())
    }

    fn describe(&self) -> String {
        "in-memory configuration".to_string()
    }
}
