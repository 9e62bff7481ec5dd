//! Shared helpers for adapter tests against a local mock server

#![allow(dead_code)]

use mailhost_provider::{GoDaddyRegistrar, SendGridDeliverability, ZohoMailProvider};
use wiremock::MockServer;

pub const ZOHO_ORG: &str = "60001234";

/// GoDaddy registrar pointed at the mock server, with one retry.
pub fn godaddy(server: &MockServer) -> GoDaddyRegistrar {
    GoDaddyRegistrar::builder("test-key".to_string(), "test-secret".to_string())
        .api_base(server.uri())
        .max_retries(1)
        .build()
        .unwrap()
}

/// Zoho Mail provider pointed at the mock server, retries disabled.
pub fn zoho(server: &MockServer) -> ZohoMailProvider {
    ZohoMailProvider::builder("test-token".to_string(), ZOHO_ORG.to_string())
        .api_base(server.uri())
        .max_retries(0)
        .build()
        .unwrap()
}

/// SendGrid adapter pointed at the mock server, retries disabled.
pub fn sendgrid(server: &MockServer) -> SendGridDeliverability {
    SendGridDeliverability::builder("SG.test".to_string())
        .api_base(server.uri())
        .max_retries(0)
        .build()
        .unwrap()
}

/// Path of a Zoho domain resource.
pub fn zoho_domain_path(domain: &str) -> String {
    format!("/api/organization/{ZOHO_ORG}/domains/{domain}")
}

/// Zoho success envelope.
pub fn zoho_ok(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "status": { "code": 200, "description": "success" },
        "data": data,
    })
}
