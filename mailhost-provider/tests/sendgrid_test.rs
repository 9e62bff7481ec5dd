//! SendGrid adapter against a mock sender authentication API

#![cfg(feature = "sendgrid")]

mod common;

use mailhost_provider::{DeliverabilityAdapter, DnsRecordType, ProviderError};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn domain_auth(id: u64, valid: bool) -> Value {
    json!({
        "id": id,
        "domain": "example.com",
        "subdomain": "em1234",
        "valid": valid,
        "dns": {
            "mail_cname": {"host": "em1234.example.com", "type": "cname", "data": "u99.wl.sendgrid.net", "valid": valid},
            "dkim1": {"host": "s1._domainkey.example.com", "type": "cname", "data": "s1.domainkey.u99.wl.sendgrid.net", "valid": valid},
            "dkim2": {"host": "s2._domainkey.example.com", "type": "cname", "data": "s2.domainkey.u99.wl.sendgrid.net", "valid": valid}
        }
    })
}

#[tokio::test]
async fn get_sending_domain_auth_filters_by_domain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/whitelabel/domains"))
        .and(query_param("domain", "example.com"))
        .and(header("Authorization", "Bearer SG.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([domain_auth(42, true)])))
        .mount(&server)
        .await;

    let auth = common::sendgrid(&server)
        .get_sending_domain_auth("example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(auth.id, "42");
    assert!(auth.valid);
    assert_eq!(auth.records.len(), 3);
    assert!(
        auth.records
            .iter()
            .all(|r| r.record_type == DnsRecordType::Cname && !r.name.ends_with("example.com"))
    );
}

#[tokio::test]
async fn missing_auth_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/whitelabel/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let auth = common::sendgrid(&server)
        .get_sending_domain_auth("example.com")
        .await
        .unwrap();
    assert!(auth.is_none());
}

#[tokio::test]
async fn create_sending_domain_auth_requests_automatic_security() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/whitelabel/domains"))
        .and(body_json(json!({"domain": "example.com", "automatic_security": true})))
        .respond_with(ResponseTemplate::new(201).set_body_json(domain_auth(7, false)))
        .expect(1)
        .mount(&server)
        .await;

    let auth = common::sendgrid(&server)
        .create_sending_domain_auth("example.com")
        .await
        .unwrap();
    assert_eq!(auth.id, "7");
    assert!(!auth.valid);
}

#[tokio::test]
async fn validation_collects_reasons() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/whitelabel/domains/7/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "valid": false,
            "validation_results": {
                "mail_cname": {"valid": false, "reason": "Expected CNAME record to match \"u99.wl.sendgrid.net\"."},
                "dkim1": {"valid": true, "reason": null},
                "dkim2": {"valid": true, "reason": null}
            }
        })))
        .mount(&server)
        .await;

    let outcome = common::sendgrid(&server)
        .validate_sending_domain_auth("7")
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert_eq!(outcome.reasons.len(), 1);
    assert!(outcome.reasons[0].starts_with("mail_cname: "));
}

#[tokio::test]
async fn link_branding_create_and_lookup() {
    let server = MockServer::start().await;
    let link = json!({
        "id": 55,
        "domain": "example.com",
        "subdomain": "url",
        "valid": false,
        "dns": {
            "domain_cname": {"host": "url.example.com", "type": "cname", "data": "sendgrid.net", "valid": false},
            "owner_cname": {"host": "1234.example.com", "type": "cname", "data": "sendgrid.net", "valid": false}
        }
    });
    Mock::given(method("POST"))
        .and(path("/v3/whitelabel/links"))
        .and(body_json(json!({"domain": "example.com", "subdomain": "url"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(link.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/whitelabel/links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "domain": "other.com", "subdomain": "url", "valid": true, "dns": {}},
            link
        ])))
        .mount(&server)
        .await;

    let adapter = common::sendgrid(&server);
    let created = adapter
        .create_link_branding("example.com", "url")
        .await
        .unwrap();
    assert_eq!(created.subdomain, "url");
    assert!(created.records.iter().any(|r| r.name == "url"));

    let found = adapter
        .get_link_branding("example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, "55");
    assert_eq!(found.records.len(), 2);
}

#[tokio::test]
async fn duplicate_creation_is_already_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"field": "domain", "message": "A domain authentication for this domain already exists."}]
        })))
        .mount(&server)
        .await;

    let err = common::sendgrid(&server)
        .create_sending_domain_auth("example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::AlreadyExists { .. }));
}
