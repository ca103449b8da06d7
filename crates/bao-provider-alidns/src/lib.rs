// # Alibaba Cloud DNS Provider
//
// This crate provides the Alibaba Cloud DNS (Alidns) provider for the BAO
// updater.
//
// ## Behavior
//
// - One signed HTTP request per trait call
// - No retry or backoff; the reconciler retries reads and never retries writes
// - No caching between calls
// - Dry-run is handled by the reconciler, so this provider always talks to the API
//
// ## Security Requirements
//
// - The access key secret NEVER appears in logs, errors or `Debug` output
// - Credentials come from the configuration only
// - Construction fails fast if a credential is empty
//
// ## API Reference
//
// - Alidns OpenAPI, version 2015-01-09, RPC style
// - Read a record: `DescribeDomainRecordInfo` (GET, `RecordId`)
// - Update a record: `UpdateDomainRecord` (POST, `RecordId`, `RR`, `Type`, `Value`, `TTL`)

mod signature;

use async_trait::async_trait;
use bao_core::config::ProviderConfig;
use bao_core::traits::DnsProvider;
use bao_core::{DnsRecord, Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use signature::{API_VERSION, RequestStamp, Signer, canonical_query};

const PROVIDER_NAME: &str = "alidns";

/// Successful `DescribeDomainRecordInfo` body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecordInfo {
    record_id: String,
    #[serde(rename = "Type")]
    record_type: String,
    #[serde(rename = "RR")]
    rr: String,
    value: String,
    #[serde(rename = "TTL")]
    ttl: u32,
    #[serde(default)]
    domain_name: Option<String>,
}

impl From<RecordInfo> for DnsRecord {
    fn from(info: RecordInfo) -> Self {
        DnsRecord {
            record_id: info.record_id,
            record_type: info.record_type,
            rr: info.rr,
            value: info.value,
            ttl: info.ttl,
            domain_name: info.domain_name,
        }
    }
}

/// Error body returned with any non-2xx status
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: String,
}

/// Alibaba Cloud DNS provider
///
/// Stateless and single-shot: every trait call is exactly one signed request.
pub struct AlidnsProvider {
    access_key_id: String,

    /// ⚠️ NEVER log this value
    access_key_secret: String,

    /// Base URL requests are sent to
    endpoint: Url,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the access key secret
impl std::fmt::Debug for AlidnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlidnsProvider")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl AlidnsProvider {
    /// Create a new Alidns provider
    ///
    /// # Parameters
    ///
    /// - `access_key_id`: Access key ID
    /// - `access_key_secret`: Access key secret
    /// - `endpoint`: Bare host (e.g. "alidns.cn-hangzhou.aliyuncs.com", HTTPS
    ///   implied) or a full `http(s)://` URL
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential is empty or the endpoint
    /// does not form a valid URL.
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        endpoint: &str,
    ) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let access_key_secret = access_key_secret.into();

        if access_key_id.is_empty() {
            return Err(Error::config("Alidns access key ID cannot be empty"));
        }
        if access_key_secret.is_empty() {
            return Err(Error::config("Alidns access key secret cannot be empty"));
        }

        Ok(Self {
            access_key_id,
            access_key_secret,
            endpoint: parse_endpoint(endpoint)?,
            client: reqwest::Client::new(),
        })
    }

    /// Create from the provider section of the configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.access_key_id.clone(),
            config.access_key_secret.clone(),
            &config.endpoint,
        )
    }

    /// Base URL requests are sent to
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// `host[:port]` as sent in the `Host` header
    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Send one signed RPC call and return the raw success body
    async fn call(
        &self,
        method: reqwest::Method,
        action: &str,
        params: &[(&str, String)],
    ) -> Result<String> {
        let query = canonical_query(params);
        let headers = Signer::new(&self.access_key_id, &self.access_key_secret).sign(
            method.as_str(),
            &self.host(),
            action,
            API_VERSION,
            &query,
            &RequestStamp::now(),
        )?;

        let mut url = self.endpoint.clone();
        url.set_path("/");
        url.set_query(if query.is_empty() {
            None
        } else {
            Some(query.as_str())
        });

        tracing::debug!("Alidns {} {}", method, action);

        let mut request = self.client.request(method, url);
        for (name, value) in &headers {
            // reqwest derives Host from the URL
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", action, e)))?;

        if !status.is_success() {
            return Err(map_api_error(action, status, &body));
        }

        Ok(body)
    }
}

/// Normalize the configured endpoint into a base URL
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.is_empty() {
        return Err(Error::config("Alidns endpoint cannot be empty"));
    }

    let raw = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };

    let url = Url::parse(&raw)
        .map_err(|e| Error::config(format!("Invalid Alidns endpoint {:?}: {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::config(format!(
            "Alidns endpoint must be an HTTP(S) host. Got: {}",
            endpoint
        )));
    }

    Ok(url)
}

/// Map a non-2xx response to the shared error taxonomy
fn map_api_error(action: &str, status: StatusCode, body: &str) -> Error {
    let api: ApiError = serde_json::from_str(body).unwrap_or_default();
    let detail = if api.code.is_empty() {
        format!("{} returned {}: {}", action, status.as_u16(), body.trim())
    } else {
        format!(
            "{} returned {}: {}: {} (RequestId: {})",
            action,
            status.as_u16(),
            api.code,
            api.message,
            api.request_id
        )
    };

    match status.as_u16() {
        401 | 403 => Error::auth(detail),
        404 => Error::not_found(detail),
        429 => Error::rate_limited(detail),
        _ if api.code.starts_with("Throttling") => Error::rate_limited(detail),
        _ => Error::provider(PROVIDER_NAME, detail),
    }
}

#[async_trait]
impl DnsProvider for AlidnsProvider {
    async fn describe_record(&self, record_id: &str) -> Result<DnsRecord> {
        let body = self
            .call(
                reqwest::Method::GET,
                "DescribeDomainRecordInfo",
                &[("RecordId", record_id.to_string())],
            )
            .await?;

        let info: RecordInfo = serde_json::from_str(&body)?;

        Ok(info.into())
    }

    async fn update_record(&self, record: &DnsRecord) -> Result<()> {
        self.call(
            reqwest::Method::POST,
            "UpdateDomainRecord",
            &[
                ("RecordId", record.record_id.clone()),
                ("RR", record.rr.clone()),
                ("Type", record.record_type.clone()),
                ("Value", record.value.clone()),
                ("TTL", record.ttl.to_string()),
            ],
        )
        .await?;

        tracing::debug!("Alidns accepted update of record {}", record.record_id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
