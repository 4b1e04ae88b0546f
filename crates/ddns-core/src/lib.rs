// # ddns-core
//
// Core library for keeping one DNS "A" record pointed at the machine's
// current public IPv4 address.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for resolving the current public IPv4 address
// - **DnsProvider**: Trait for listing, creating and updating records via a provider API
// - **ConfigSource**: Trait for loading the runtime configuration before each pass
// - **RecordLocator**: Paginated lookup of the managed record
// - **Reconciler**: One pass of the IP check → lookup → create/update flow
// - **Scheduler**: Repeats passes at the configured interval, falling back on failure
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Single Flow**: Exactly one pass runs at a time; calls inside a pass are sequential
// 3. **Explicit State**: The last observed IP is threaded through passes, never global
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Never Fatal**: Every pass failure becomes a delayed retry

pub mod traits;
pub mod engine;
pub mod locator;
pub mod scheduler;
pub mod config;
pub mod error;
pub mod source;

// Re-export core types for convenience
pub use traits::{ConfigSource, DnsProvider, DnsRecord, IpSource, MutationOutcome, RecordChange, RecordPage};
pub use engine::{PassOutcome, ReconciliationState, Reconciler};
pub use locator::RecordLocator;
pub use scheduler::Scheduler;
pub use config::{Credentials, DdnsConfig, SchedulerConfig};
pub use error::{Error, Result};
pub use source::{FileConfigSource, FixedConfigSource};
