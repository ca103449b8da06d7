//! One reconcile pass
//!
//! The [`Reconciler`] drives a single straight-line pass:
//!
//! ```text
//! Start ──resolve──▶ IpResolved ──fetch──▶ RecordFetched ──compare──┬──▶ Unchanged ──▶ Done
//!                                                                   └──update──▶ Updated ──▶ Done
//! ```
//!
//! Each arrow is a stage built on one capability:
//!
//! - [`IpResolver`]: [`IpSource`] lookup, retried under the policy
//! - [`RecordReader`]: [`DnsProvider::describe_record`], retried under the policy
//! - [`RecordWriter`]: [`DnsProvider::update_record`], single attempt
//!
//! Any stage error ends the pass. Nothing is rolled back: the only mutation is
//! the final write, and a failed write leaves the record at its prior value.

use tracing::{debug, info};

use crate::config::{BaoConfig, RunMode};
use crate::error::Result;
use crate::record::{DnsRecord, ResolvedIp};
use crate::retry::{RetryPolicy, retry};
use crate::traits::{DnsProvider, IpSource};

/// How a completed pass ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record already carried the current IP; nothing was written
    Unchanged {
        /// The current IP
        ip: String,
    },

    /// Record was rewritten with the current IP
    Updated {
        /// Value the record had before the pass
        previous: String,
        /// Value written
        current: String,
    },

    /// Dry-run: the record differs but was left alone
    WouldUpdate {
        /// Value the record has
        previous: String,
        /// Value that would have been written
        current: String,
    },
}

impl ReconcileOutcome {
    /// Whether the provider-side record was modified
    pub fn changed_record(&self) -> bool {
        matches!(self, ReconcileOutcome::Updated { .. })
    }
}

/// Resolves the public IP with retry
pub struct IpResolver<'a> {
    source: &'a dyn IpSource,
    policy: RetryPolicy,
}

impl<'a> IpResolver<'a> {
    /// Create a resolver over `source`
    pub fn new(source: &'a dyn IpSource, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Look up the public IP, retrying transport, status and parse failures
    pub async fn resolve(&self) -> Result<ResolvedIp> {
        debug!("Resolving public IP via {}", self.source.source_name());
        retry(&self.policy, "resolve public IP", |_| self.source.current()).await
    }
}

/// Reads the configured record with retry
pub struct RecordReader<'a> {
    provider: &'a dyn DnsProvider,
    policy: RetryPolicy,
}

impl<'a> RecordReader<'a> {
    /// Create a reader over `provider`
    pub fn new(provider: &'a dyn DnsProvider, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Describe the record, retrying any provider error
    pub async fn fetch(&self, record_id: &str) -> Result<DnsRecord> {
        debug!(
            "Describing record {} via {}",
            record_id,
            self.provider.provider_name()
        );
        retry(&self.policy, "describe DNS record", |_| {
            self.provider.describe_record(record_id)
        })
        .await
    }
}

/// Writes a new value into an existing record, once
pub struct RecordWriter<'a> {
    provider: &'a dyn DnsProvider,
    mode: RunMode,
}

impl<'a> RecordWriter<'a> {
    /// Create a writer over `provider`
    pub fn new(provider: &'a dyn DnsProvider, mode: RunMode) -> Self {
        Self { provider, mode }
    }

    /// Push `new_ip` into `record`, keeping its ID, type, label and TTL
    ///
    /// A failure is returned as-is and never retried.
    pub async fn update(&self, record: &DnsRecord, new_ip: &ResolvedIp) -> Result<()> {
        let updated = record.with_value(new_ip.as_str());

        if self.mode == RunMode::DryRun {
            info!(
                "[DRY-RUN] Would update record {} ({} {}) to {} with TTL {}",
                updated.record_id, updated.record_type, updated.rr, updated.value, updated.ttl
            );
            return Ok(());
        }

        self.provider.update_record(&updated).await
    }
}

/// Orchestrates one reconcile pass
pub struct Reconciler {
    /// Public IP lookup
    ip_source: Box<dyn IpSource>,

    /// DNS provider holding the record
    provider: Box<dyn DnsProvider>,

    /// Record to reconcile
    record_id: String,

    /// Retry policy for the lookup and the read
    policy: RetryPolicy,

    /// Live or dry-run
    mode: RunMode,
}

impl Reconciler {
    /// Create a reconciler
    ///
    /// The configuration is validated here, before anything touches the
    /// network.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &BaoConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            record_id: config.record_id.clone(),
            policy: config.engine.retry_policy(),
            mode: config.engine.mode,
        })
    }

    /// Run the pass
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileOutcome)`: The pass completed, whether or not it wrote
    /// - `Err(Error)`: A stage failed; the pass stopped there
    pub async fn run(&self) -> Result<ReconcileOutcome> {
        let real_ip = IpResolver::new(self.ip_source.as_ref(), self.policy)
            .resolve()
            .await?;
        info!("Real IP: {}", real_ip);

        let record = RecordReader::new(self.provider.as_ref(), self.policy)
            .fetch(&self.record_id)
            .await?;
        info!("DNS record {} IP: {}", record.fqdn(), record.value);

        if real_ip.matches(&record) {
            info!("IP has not changed");
            return Ok(ReconcileOutcome::Unchanged {
                ip: real_ip.as_str().to_string(),
            });
        }

        info!(
            "IP has changed ({} -> {}), updating record",
            record.value, real_ip
        );
        RecordWriter::new(self.provider.as_ref(), self.mode)
            .update(&record, &real_ip)
            .await?;

        let previous = record.value;
        let current = real_ip.as_str().to_string();

        Ok(match self.mode {
            RunMode::Live => {
                info!("Record updated");
                ReconcileOutcome::Updated { previous, current }
            }
            RunMode::DryRun => ReconcileOutcome::WouldUpdate { previous, current },
        })
    }
}
