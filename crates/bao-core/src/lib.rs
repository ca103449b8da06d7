// # bao-core
//
// Core library for the BAO dynamic DNS updater.
//
// ## Architecture Overview
//
// One invocation performs one reconcile pass:
// - **IpSource**: Trait for looking up the caller's public IP
// - **DnsProvider**: Trait for reading and writing one DNS record
// - **Reconciler**: Resolves the IP, fetches the record, writes it if they differ
// - **retry**: Linear-backoff retry shared by the lookup and the read
//
// ## Design Principles
//
// 1. **Single pass**: No daemon loop, no persisted state; scheduling is external
// 2. **Reconciler-owned retry**: Implementations make one attempt per call
// 3. **Reads retry, writes do not**: A write is attempted exactly once
// 4. **Library-first**: The binary only loads configuration and wires parts

pub mod config;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod retry;
pub mod traits;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource};
pub use reconciler::{IpResolver, ReconcileOutcome, Reconciler, RecordReader, RecordWriter};
pub use record::{DnsRecord, ResolvedIp};
pub use retry::{RetryPolicy, retry};
pub use config::{BaoConfig, EngineConfig, IpLookupConfig, IpVersion, ProviderConfig, RunMode};
pub use error::{Error, Result};
