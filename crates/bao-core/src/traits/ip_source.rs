// # IP Source Trait
//
// Defines the interface for looking up the caller's current public IP.
//
// ## Implementations
//
// - HTTP lookup service: `bao-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use bao_core::IpSource;
//
// let source = /* IpSource implementation */;
// let ip = source.current().await?;
// println!("public IP: {}", ip);
// ```

use async_trait::async_trait;

use crate::record::ResolvedIp;

/// Trait for IP source implementations
///
/// # Contract
///
/// - One lookup per call, no internal retry or sleep
/// - Anything that is not a syntactically valid address is an error
/// - No side effects beyond the lookup itself
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Look up the current public IP
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedIp)`: A validated address
    /// - `Err(Error)`: Transport failure, unexpected status or unparseable answer
    async fn current(&self) -> Result<ResolvedIp, crate::Error>;

    /// Short name for log lines (e.g. "http")
    fn source_name(&self) -> &'static str;
}
