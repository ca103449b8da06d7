// # DNS Provider Trait
//
// Defines the narrow provider surface the reconciler needs: read one record
// by ID and overwrite it.
//
// ## Implementations
//
// - Alibaba Cloud DNS: `bao-provider-alidns` crate
//
// ## Usage
//
// ```rust,ignore
// use bao_core::DnsProvider;
//
// let provider = /* DnsProvider implementation */;
// let record = provider.describe_record("1234567890").await?;
// provider.update_record(&record.with_value("203.0.113.9")).await?;
// ```

use async_trait::async_trait;

use crate::record::DnsRecord;

/// Trait for DNS provider implementations
///
/// # Contract
///
/// - Single-shot: one API call per method invocation
/// - No retry or backoff; `describe_record` is retried by the reconciler,
///   `update_record` never is
/// - Stateless between calls
/// - Credentials never appear in errors or logs
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the current state of a record
    ///
    /// # Parameters
    ///
    /// - `record_id`: Provider-assigned record ID
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The record as the provider currently publishes it
    /// - `Err(Error)`: API, transport or decoding failure
    async fn describe_record(&self, record_id: &str) -> Result<DnsRecord, crate::Error>;

    /// Overwrite a record
    ///
    /// Every field of `record` is sent as given; callers build it with
    /// [`DnsRecord::with_value`] to change only the value.
    async fn update_record(&self, record: &DnsRecord) -> Result<(), crate::Error>;

    /// Provider name for log lines (e.g. "alidns")
    fn provider_name(&self) -> &'static str;
}
