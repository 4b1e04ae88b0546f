// # File Config Source
//
// File-based implementation of ConfigSource.
//
// ## Behavior
//
// - The file is read and parsed on every `load()`, so edits take effect on
//   the next pass without restarting the daemon
// - A missing or unreadable file is a configuration error for that pass
//   only; the scheduler retries after its fallback delay
// - Field validation happens in the reconciler, not here
//
// ## File Format
//
// ```json
// {
//   "AccessKeyId": "LTAI...",
//   "AccessKeySecret": "...",
//   "Domain": "example.com",
//   "SubDomain": "home",
//   "TTL": 600,
//   "Interval": 300
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::DdnsConfig;
use crate::traits::ConfigSource;
use crate::Error;

/// Default configuration file name, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Config source backed by a JSON file
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::source::FileConfigSource;
/// use ddns_core::traits::ConfigSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = FileConfigSource::new("/etc/ddns/config.json");
///     let config = source.load().await?;
///     config.validate()?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    /// Create a source reading `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigSource {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn load(&self) -> Result<DdnsConfig, Error> {
        let text = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let config = DdnsConfig::from_json(&text)?;
        tracing::debug!("Loaded configuration from {}", self.path.display());
        Ok(config)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
