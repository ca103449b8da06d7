//! Test doubles and common utilities for reconcile contract tests
//!
//! The doubles record every call so tests can assert exact call counts.
//! They are `Clone` and share their counters, so a test keeps one handle
//! while the reconciler owns a boxed copy.

#![allow(dead_code)]

use bao_core::config::{BaoConfig, EngineConfig, IpLookupConfig, ProviderConfig, RunMode};
use bao_core::error::{Error, Result};
use bao_core::traits::{DnsProvider, IpSource};
use bao_core::{DnsRecord, ResolvedIp};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that replays scripted answers
///
/// Each call consumes the next answer; the last one repeats forever.
#[derive(Clone)]
pub struct ScriptedIpSource {
    answers: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    last: Arc<Mutex<Option<std::result::Result<String, String>>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(answers: Vec<std::result::Result<&str, &str>>) -> Self {
        let answers = answers
            .into_iter()
            .map(|a| a.map(str::to_string).map_err(str::to_string))
            .collect();

        Self {
            answers: Arc::new(Mutex::new(answers)),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answers with `ip`
    pub fn answering(ip: &str) -> Self {
        Self::new(vec![Ok(ip)])
    }

    /// Always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message)])
    }

    /// Number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<ResolvedIp> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let answer = {
            let mut answers = self.answers.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(next) = answers.pop_front() {
                *last = Some(next);
            }
            last.clone().expect("ScriptedIpSource needs at least one answer")
        };

        match answer {
            Ok(text) => text.parse(),
            Err(message) => Err(Error::ip_source(message)),
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// An in-memory DnsProvider holding one record
#[derive(Clone)]
pub struct StubDnsProvider {
    record: Arc<Mutex<DnsRecord>>,
    describe_failures_left: Arc<AtomicUsize>,
    fail_updates: bool,
    describe_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<DnsRecord>>>,
}

impl StubDnsProvider {
    pub fn new(record: DnsRecord) -> Self {
        Self {
            record: Arc::new(Mutex::new(record)),
            describe_failures_left: Arc::new(AtomicUsize::new(0)),
            fail_updates: false,
            describe_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The first `n` describe calls fail
    pub fn failing_describes(self, n: usize) -> Self {
        self.describe_failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Every update call fails
    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn describe_call_count(&self) -> usize {
        self.describe_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Total calls of any kind
    pub fn call_count(&self) -> usize {
        self.describe_call_count() + self.update_call_count()
    }

    /// Records received by update_record(), in order
    pub fn updates(&self) -> Vec<DnsRecord> {
        self.updates.lock().unwrap().clone()
    }

    /// Current stored record
    pub fn stored(&self) -> DnsRecord {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for StubDnsProvider {
    async fn describe_record(&self, record_id: &str) -> Result<DnsRecord> {
        self.describe_call_count.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .describe_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::provider("stub", "ServiceUnavailable"));
        }

        let record = self.record.lock().unwrap().clone();
        if record.record_id != record_id {
            return Err(Error::not_found(format!("record {}", record_id)));
        }
        Ok(record)
    }

    async fn update_record(&self, record: &DnsRecord) -> Result<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(record.clone());

        if self.fail_updates {
            return Err(Error::provider("stub", "InternalError"));
        }

        *self.record.lock().unwrap() = record.clone();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// A record with the given value
pub fn record_with_value(value: &str) -> DnsRecord {
    DnsRecord {
        record_id: "1234567890".to_string(),
        record_type: "A".to_string(),
        rr: "home".to_string(),
        value: value.to_string(),
        ttl: 600,
        domain_name: Some("example.com".to_string()),
    }
}

/// Helper to create a minimal BaoConfig for testing
pub fn minimal_config() -> BaoConfig {
    BaoConfig {
        provider: ProviderConfig {
            access_key_id: "test-key-id".to_string(),
            access_key_secret: "test-key-secret".to_string(),
            endpoint: "alidns.test.invalid".to_string(),
        },
        ip_lookup: IpLookupConfig::new("https://ip.test.invalid"),
        record_id: "1234567890".to_string(),
        engine: EngineConfig {
            max_attempts: 3,
            retry_delay_secs: 0, // No delay for faster tests
            mode: RunMode::Live,
        },
    }
}
