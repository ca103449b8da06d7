//! Capability traits at the network boundary
//!
//! - [`IpSource`]: one lookup of the caller's public IP
//! - [`DnsProvider`]: describe and update a single record
//!
//! Implementations make exactly one attempt per call. Retry policy belongs to
//! the reconciler.

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::DnsProvider;
