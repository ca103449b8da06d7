//! Record and address types passed between the reconcile stages

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A DNS resource record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Opaque provider-assigned record ID
    pub record_id: String,
    /// Record type, e.g. "A" or "AAAA"
    pub record_type: String,
    /// Host label relative to the domain ("www", "@", ...)
    pub rr: String,
    /// Current record value
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Owning domain, when the provider reports it
    pub domain_name: Option<String>,
}

impl DnsRecord {
    /// Copy of this record with only the value replaced
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }

    /// Fully qualified name for log lines, falls back to the bare label
    pub fn fqdn(&self) -> String {
        match self.domain_name.as_deref() {
            Some(domain) if self.rr == "@" => domain.to_string(),
            Some(domain) => format!("{}.{}", self.rr, domain),
            None => self.rr.clone(),
        }
    }
}

/// A public IP address obtained from a lookup service
///
/// The original text (after trimming) is kept verbatim; it is what gets
/// compared against and written to the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIp {
    addr: IpAddr,
    text: String,
}

impl ResolvedIp {
    /// Parsed address
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Address text as returned by the lookup service
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the record value already equals this address
    pub fn matches(&self, record: &DnsRecord) -> bool {
        self.text == record.value
    }
}

impl FromStr for ResolvedIp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let addr = text
            .parse::<IpAddr>()
            .map_err(|_| Error::ip_source(format!("Invalid IP address: {:?}", text)))?;

        Ok(Self {
            addr,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for ResolvedIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
