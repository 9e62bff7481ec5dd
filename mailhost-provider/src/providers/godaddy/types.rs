//! GoDaddy API type definitions

use serde::{Deserialize, Serialize};

/// Host record as exchanged with `/v1/domains/{domain}/records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoDaddyRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Subset of `GET /v1/domains/{domain}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoDaddyDomainDetail {
    #[serde(default)]
    pub name_servers: Vec<String>,
}

/// Body of `PATCH /v1/domains/{domain}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNameServers {
    pub name_servers: Vec<String>,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct GoDaddyErrorResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub fields: Vec<GoDaddyErrorField>,
}

#[derive(Debug, Deserialize)]
pub struct GoDaddyErrorField {
    pub path: Option<String>,
}
