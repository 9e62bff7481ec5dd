//! Shared helpers for adapter implementations

use std::time::Duration;

use reqwest::Client;

use crate::error::{ProviderError, Result};
use crate::types::DnsRecordType;

// ============ HTTP Client ============

/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build an HTTP client with the default timeouts.
pub fn create_http_client(provider: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::NetworkError {
            provider: provider.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

// ============ Record types ============

/// Parse a wire record type name.
pub fn parse_record_type(record_type: &str, provider: &str) -> Result<DnsRecordType> {
    match record_type.to_uppercase().as_str() {
        "A" => Ok(DnsRecordType::A),
        "AAAA" => Ok(DnsRecordType::Aaaa),
        "CNAME" => Ok(DnsRecordType::Cname),
        "MX" => Ok(DnsRecordType::Mx),
        "TXT" => Ok(DnsRecordType::Txt),
        "NS" => Ok(DnsRecordType::Ns),
        "SRV" => Ok(DnsRecordType::Srv),
        "CAA" => Ok(DnsRecordType::Caa),
        "URL" | "FORWARD" => Ok(DnsRecordType::Url),
        _ => Err(ProviderError::InvalidParameter {
            provider: provider.to_string(),
            param: "record_type".to_string(),
            detail: format!("Unsupported record type: {record_type}"),
        }),
    }
}

// ============ Domain names ============

/// Strip the trailing dot and lowercase.
pub fn normalize_domain_name(name: &str) -> String {
    name.trim_end_matches('.').to_lowercase()
}

/// Convert a fully qualified name into one relative to the zone.
/// `"www.example.com"` + `"example.com"` -> `"www"`,
/// `"example.com"` + `"example.com"` -> `"@"`.
pub fn full_name_to_relative(full_name: &str, zone_name: &str) -> String {
    let full = normalize_domain_name(full_name);
    let zone = normalize_domain_name(zone_name);

    if full == zone {
        "@".to_string()
    } else if let Some(subdomain) = full.strip_suffix(&format!(".{zone}")) {
        subdomain.to_string()
    } else {
        full
    }
}

/// Convert a zone-relative name into a fully qualified one.
/// `"www"` + `"example.com"` -> `"www.example.com"`,
/// `"@"` + `"example.com"` -> `"example.com"`.
pub fn relative_to_full_name(relative_name: &str, zone_name: &str) -> String {
    let zone = normalize_domain_name(zone_name);

    if relative_name == "@" || relative_name.is_empty() {
        zone
    } else {
        format!("{relative_name}.{zone}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_names() {
        assert_eq!(full_name_to_relative("em123.Example.com.", "example.com"), "em123");
        assert_eq!(full_name_to_relative("example.com", "example.com"), "@");
        assert_eq!(full_name_to_relative("other.org", "example.com"), "other.org");
        assert_eq!(
            full_name_to_relative("s1._domainkey.example.com", "example.com"),
            "s1._domainkey"
        );
    }

    #[test]
    fn full_names() {
        assert_eq!(relative_to_full_name("@", "example.com."), "example.com");
        assert_eq!(relative_to_full_name("url", "example.com"), "url.example.com");
    }

    #[test]
    fn record_type_names() {
        assert_eq!(parse_record_type("cname", "t").unwrap(), DnsRecordType::Cname);
        assert_eq!(parse_record_type("URL", "t").unwrap(), DnsRecordType::Url);
        assert!(matches!(
            parse_record_type("PTR", "t"),
            Err(ProviderError::InvalidParameter { .. })
        ));
    }
}
