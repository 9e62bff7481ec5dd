//! Zoho Mail API type definitions

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope of every Zoho Mail API response.
#[derive(Debug, Deserialize)]
pub struct ZohoResponse<T> {
    pub status: ZohoStatus,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct ZohoStatus {
    pub code: u16,
    #[serde(default)]
    pub description: String,
}

/// `data` of an error response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZohoErrorData {
    pub error_code: Option<String>,
    pub more_info: Option<String>,
}

/// Body of `POST .../domains`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDomainRequest<'a> {
    pub domain_name: &'a str,
}

/// Body of `PUT .../domains/{domain}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainModeRequest<'a> {
    pub mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dkim_id: Option<&'a str>,
}

impl<'a> DomainModeRequest<'a> {
    pub fn mode(mode: &'a str) -> Self {
        Self {
            mode,
            selector: None,
            is_default: None,
            key_size: None,
            dkim_id: None,
        }
    }
}

/// Domain details as returned by add and get.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZohoDomain {
    #[serde(default)]
    pub domain_name: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub verification_status: bool,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub mail_hosting_enabled: bool,
    #[serde(default, rename = "mxstatus", deserialize_with = "flexible_bool")]
    pub mx_status: bool,
    #[serde(default, rename = "spfstatus", deserialize_with = "flexible_bool")]
    pub spf_status: bool,
    #[serde(rename = "CNAMEVerificationCode")]
    pub cname_verification_code: Option<String>,
    #[serde(default)]
    pub dkim_detail_list: Vec<ZohoDkimDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZohoDkimDetail {
    #[serde(deserialize_with = "flexible_string")]
    pub dkim_id: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_verified: bool,
    pub public_key: Option<String>,
}

/// Zoho reports flags as booleans, `"true"`, or words such as `"enabled"` / `"verified"`.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(value_is_truthy(&Value::deserialize(deserializer)?))
}

pub fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(
            s.to_ascii_lowercase().as_str(),
            "true" | "enabled" | "verified" | "active" | "yes"
        ),
        _ => false,
    }
}

/// Ids arrive as numbers or strings.
fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
