// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the BAO updater.
//
// ## Architecture
//
// Fetches the current IP from an external "what is my IP" service (e.g.
// ifconfig.me, icanhazip.com) that answers with the address as plain text.
// One request per call; retries are applied by the reconciler.
//
// ## Validation
//
// An answer is accepted only when:
// - the status is exactly 200
// - the body, trimmed of whitespace, parses as an IP address
// - the address belongs to the configured family

use bao_core::config::{IpLookupConfig, IpVersion};
use bao_core::traits::IpSource;
use bao_core::{Error, ResolvedIp, Result};

use reqwest::StatusCode;
use reqwest::header::USER_AGENT;

/// HTTP-based IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// Client identifier sent with every request
    user_agent: String,

    /// Address family to accept
    version: IpVersion,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://ifconfig.me/ip")
    /// - `user_agent`: Value of the `User-Agent` header
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
            version: IpVersion::Any,
            client: reqwest::Client::new(),
        }
    }

    /// Create from the lookup section of the configuration
    pub fn from_config(config: &IpLookupConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.url.clone(), config.user_agent.clone()).with_version(config.version))
    }

    /// Only accept addresses of the given family
    pub fn with_version(mut self, version: IpVersion) -> Self {
        self.version = version;
        self
    }

    /// URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Turn a raw response into a validated address
    fn parse_answer(&self, status: StatusCode, body: &str) -> Result<ResolvedIp> {
        if status != StatusCode::OK {
            return Err(Error::ip_source(format!(
                "Unexpected status code: {}, body: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let ip: ResolvedIp = body.parse()?;

        if !self.version.accepts(ip.addr()) {
            return Err(Error::ip_source(format!(
                "Expected {:?} address, got: {}",
                self.version, ip
            )));
        }

        Ok(ip)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<ResolvedIp> {
        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip = self.parse_answer(status, &body)?;
        tracing::debug!("Lookup service {} answered {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
