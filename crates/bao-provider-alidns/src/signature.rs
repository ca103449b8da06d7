// # ACS3-HMAC-SHA256 Request Signing
//
// Alibaba Cloud OpenAPI requests carry an `Authorization` header computed
// over a canonical form of the request:
//
// ```text
// CanonicalRequest = METHOD \n "/" \n CanonicalQuery \n CanonicalHeaders \n SignedHeaders \n HexSha256(body)
// StringToSign     = "ACS3-HMAC-SHA256" \n HexSha256(CanonicalRequest)
// Signature        = HexHmacSha256(secret, StringToSign)
// ```
//
// Everything here is a pure function of its inputs; the caller supplies the
// timestamp and nonce so signatures can be checked against fixed vectors.

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use bao_core::{Error, Result};

/// Signature algorithm name
pub(crate) const ALGORITHM: &str = "ACS3-HMAC-SHA256";

/// Alidns API version
pub(crate) const API_VERSION: &str = "2015-01-09";

/// Percent-encode a query key or value per RFC 3986
pub(crate) fn percent_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Build the canonical query string: encoded pairs sorted by key
pub(crate) fn canonical_query(params: &[(&str, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    encoded
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256_hex(key: &str, message: &str) -> Result<String> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| Error::invalid_input(format!("Invalid signing key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Per-request values that vary between calls
#[derive(Debug, Clone)]
pub(crate) struct RequestStamp {
    /// UTC time formatted as `%Y-%m-%dT%H:%M:%SZ`
    pub date: String,
    /// Unique nonce
    pub nonce: String,
}

impl RequestStamp {
    /// Stamp for a request sent now
    pub(crate) fn now() -> Self {
        Self {
            date: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            nonce: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Signs requests with one access key pair
pub(crate) struct Signer<'a> {
    access_key_id: &'a str,
    access_key_secret: &'a str,
}

impl<'a> Signer<'a> {
    pub(crate) fn new(access_key_id: &'a str, access_key_secret: &'a str) -> Self {
        Self {
            access_key_id,
            access_key_secret,
        }
    }

    /// Compute the headers for an empty-body request, `authorization` included
    ///
    /// `query` must already be canonical (see [`canonical_query`]). The
    /// returned map is keyed by lowercase header name.
    pub(crate) fn sign(
        &self,
        method: &str,
        host: &str,
        action: &str,
        version: &str,
        query: &str,
        stamp: &RequestStamp,
    ) -> Result<BTreeMap<String, String>> {
        let payload_hash = sha256_hex(b"");

        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), host.to_string());
        headers.insert("x-acs-action".to_string(), action.to_string());
        headers.insert("x-acs-content-sha256".to_string(), payload_hash.clone());
        headers.insert("x-acs-date".to_string(), stamp.date.clone());
        headers.insert("x-acs-signature-nonce".to_string(), stamp.nonce.clone());
        headers.insert("x-acs-version".to_string(), version.to_string());

        let canonical_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{}:{}\n", k, v.trim()))
            .collect();
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        let canonical_request = format!(
            "{}\n/\n{}\n{}\n{}\n{}",
            method, query, canonical_headers, signed_headers, payload_hash
        );
        let string_to_sign = format!(
            "{}\n{}",
            ALGORITHM,
            sha256_hex(canonical_request.as_bytes())
        );
        let signature = hmac_sha256_hex(self.access_key_secret, &string_to_sign)?;

        headers.insert(
            "authorization".to_string(),
            format!(
                "{} Credential={},SignedHeaders={},Signature={}",
                ALGORITHM, self.access_key_id, signed_headers, signature
            ),
        );

        Ok(headers)
    }
}
