//! Contract Test: Alidns OpenAPI wire behavior
//!
//! Constraints verified:
//! - Each trait call sends exactly one signed request
//! - Describe reads the record by ID and decodes every field
//! - Update sends the full record with the new value
//! - API errors map onto the shared error taxonomy and are never retried here

use bao_core::traits::DnsProvider;
use bao_core::{DnsRecord, Error};
use bao_provider_alidns::AlidnsProvider;
use mockito::Matcher;

const AUTH_PREFIX: &str =
    r"^ACS3-HMAC-SHA256 Credential=test-key-id,SignedHeaders=host;x-acs-action;x-acs-content-sha256;x-acs-date;x-acs-signature-nonce;x-acs-version,Signature=[0-9a-f]{64}$";

fn provider(server: &mockito::Server) -> AlidnsProvider {
    AlidnsProvider::new("test-key-id", "test-key-secret", &server.url()).unwrap()
}

fn record(value: &str) -> DnsRecord {
    DnsRecord {
        record_id: "1234567890".to_string(),
        record_type: "A".to_string(),
        rr: "home".to_string(),
        value: value.to_string(),
        ttl: 600,
        domain_name: Some("example.com".to_string()),
    }
}

#[tokio::test]
async fn describe_sends_one_signed_get() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "RecordId".to_string(),
            "1234567890".to_string(),
        ))
        .match_header("x-acs-action", "DescribeDomainRecordInfo")
        .match_header("x-acs-version", "2015-01-09")
        .match_header(
            "x-acs-content-sha256",
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        )
        .match_header("x-acs-signature-nonce", Matcher::Any)
        .match_header(
            "x-acs-date",
            Matcher::Regex(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$".to_string()),
        )
        .match_header("authorization", Matcher::Regex(AUTH_PREFIX.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"RequestId":"536E9CAD","DomainName":"example.com","RecordId":"1234567890","RR":"home","Type":"A","Value":"203.0.113.5","TTL":600,"Line":"default","Status":"ENABLE"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let fetched = provider(&server).describe_record("1234567890").await.unwrap();

    assert_eq!(fetched, record("203.0.113.5"));
    mock.assert_async().await;
}

#[tokio::test]
async fn update_sends_full_record_with_new_value() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("RecordId".to_string(), "1234567890".to_string()),
            Matcher::UrlEncoded("RR".to_string(), "home".to_string()),
            Matcher::UrlEncoded("Type".to_string(), "A".to_string()),
            Matcher::UrlEncoded("Value".to_string(), "203.0.113.9".to_string()),
            Matcher::UrlEncoded("TTL".to_string(), "600".to_string()),
        ]))
        .match_header("x-acs-action", "UpdateDomainRecord")
        .match_header("authorization", Matcher::Regex(AUTH_PREFIX.to_string()))
        .with_status(200)
        .with_body(r#"{"RequestId":"9A1B2C3D","RecordId":"1234567890"}"#)
        .expect(1)
        .create_async()
        .await;

    provider(&server)
        .update_record(&record("203.0.113.5").with_value("203.0.113.9"))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn forbidden_maps_to_authentication_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"Code":"IncompleteSignature","Message":"The request signature does not conform to Aliyun standards.","RequestId":"E5F6"}"#)
        .create_async()
        .await;

    let err = provider(&server)
        .describe_record("1234567890")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Authentication(_)));
    assert!(err.to_string().contains("IncompleteSignature"));
    assert!(!err.to_string().contains("test-key-secret"));
}

#[tokio::test]
async fn throttling_code_maps_to_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"Code":"Throttling.User","Message":"Request was denied due to user flow control.","RequestId":"A7B8"}"#)
        .create_async()
        .await;

    let err = provider(&server)
        .update_record(&record("203.0.113.9"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited(_)));
}

#[tokio::test]
async fn unknown_record_maps_to_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"Code":"DomainRecordNotBelongToUser","Message":"The DNS record does not belong to you.","RequestId":"C9D0"}"#)
        .create_async()
        .await;

    let err = provider(&server)
        .describe_record("0000000000")
        .await
        .unwrap_err();

    match err {
        Error::Provider { provider, message } => {
            assert_eq!(provider, "alidns");
            assert!(message.contains("DomainRecordNotBelongToUser"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_returned_after_one_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(1)
        .create_async()
        .await;

    let result = provider(&server).update_record(&record("203.0.113.9")).await;

    assert!(result.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_success_body_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"RequestId":"F1E2"}"#)
        .create_async()
        .await;

    let err = provider(&server)
        .describe_record("1234567890")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Json(_)));
}
