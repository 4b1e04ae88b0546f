// # IP Source Trait
//
// Defines the interface for resolving the machine's current public IPv4
// address.
//
// ## Implementations
//
// - HTTP lookup service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let current_ip = source.current().await?;
//     println!("Public IP: {}", current_ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// Called once at the start of every reconciliation pass.
///
/// # Constraints
///
/// - One lookup per call, no retries (the scheduler owns retry timing)
/// - No caching across calls: every pass must observe the live address
/// - Failures are reported as [`crate::Error::Resolution`]
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current address
    /// - `Err(Error)`: If the lookup failed or returned something unusable
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
