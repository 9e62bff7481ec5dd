//! SendGrid API type definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One DNS entry the customer must publish (`dns.mail_cname`, `dns.dkim1`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridDnsEntry {
    pub host: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
    #[serde(default)]
    pub valid: bool,
}

/// Authenticated domain (`/v3/whitelabel/domains`).
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridDomainAuth {
    pub id: u64,
    pub domain: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub dns: BTreeMap<String, SendGridDnsEntry>,
}

/// Branded link (`/v3/whitelabel/links`).
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridLinkBranding {
    pub id: u64,
    pub domain: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub dns: BTreeMap<String, SendGridDnsEntry>,
}

#[derive(Debug, Serialize)]
pub struct CreateDomainAuthRequest<'a> {
    pub domain: &'a str,
    pub automatic_security: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateLinkBrandingRequest<'a> {
    pub domain: &'a str,
    pub subdomain: &'a str,
}

/// Response of both `/validate` endpoints.
#[derive(Debug, Deserialize)]
pub struct SendGridValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub validation_results: BTreeMap<String, SendGridValidationResult>,
}

#[derive(Debug, Deserialize)]
pub struct SendGridValidationResult {
    #[serde(default)]
    pub valid: bool,
    pub reason: Option<String>,
}

/// Error body: `{"errors": [{"message": "...", "field": "..."}]}`.
#[derive(Debug, Deserialize)]
pub struct SendGridErrorResponse {
    #[serde(default)]
    pub errors: Vec<SendGridError>,
}

#[derive(Debug, Deserialize)]
pub struct SendGridError {
    #[serde(default)]
    pub message: String,
    pub field: Option<String>,
}
