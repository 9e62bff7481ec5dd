//! Mail-hosting profile: the fixed records every provisioned domain receives

use mailhost_provider::{DEFAULT_TTL, DnsHostRecord};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::DomainName;

/// One MX exchanger of the mailbox provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxExchanger {
    pub host: String,
    pub priority: u16,
}

impl MxExchanger {
    pub fn new(host: impl Into<String>, priority: u16) -> Self {
        Self {
            host: host.into(),
            priority,
        }
    }
}

/// Records and settings injected for mail hosting.
///
/// Defaults match Zoho Mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailHostingProfile {
    /// SPF `TXT` value published at the apex
    pub spf_value: String,
    /// MX exchangers, written in ascending priority order
    pub mx: Vec<MxExchanger>,
    /// Selector used when adding the mailbox DKIM key
    pub dkim_selector: String,
    /// Link-branding subdomain requested from the deliverability service
    pub branding_subdomain: String,
    pub ttl: u32,
    /// TLDs accepted for mail hosting; empty accepts any
    pub supported_tlds: Vec<String>,
}

impl Default for MailHostingProfile {
    fn default() -> Self {
        Self {
            spf_value: "v=spf1 include:zoho.com ~all".to_string(),
            mx: vec![
                MxExchanger::new("mx.zoho.com", 10),
                MxExchanger::new("mx2.zoho.com", 20),
                MxExchanger::new("mx3.zoho.com", 50),
            ],
            dkim_selector: "zmail".to_string(),
            branding_subdomain: "url".to_string(),
            ttl: DEFAULT_TTL,
            supported_tlds: ["com", "net", "org", "io", "co", "biz", "info", "us"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl MailHostingProfile {
    /// SPF `TXT` plus the MX set, all at the apex
    pub fn mail_records(&self) -> Vec<DnsHostRecord> {
        let mut mx = self.mx.clone();
        mx.sort_by_key(|m| m.priority);

        let mut records = Vec::with_capacity(mx.len() + 1);
        records.push(DnsHostRecord::txt("@", &self.spf_value).with_ttl(self.ttl));
        records.extend(
            mx.iter()
                .map(|m| DnsHostRecord::mx("@", &m.host, m.priority).with_ttl(self.ttl)),
        );
        records
    }

    /// Ownership-verification `TXT` at the apex
    pub fn ownership_record(&self, token: &str) -> DnsHostRecord {
        DnsHostRecord::txt("@", token).with_ttl(self.ttl)
    }

    /// Exchanger with the lowest priority value
    pub fn primary_exchanger(&self) -> Option<&MxExchanger> {
        self.mx.iter().min_by_key(|m| m.priority)
    }

    /// Reject domains whose TLD is outside the allow-list
    pub fn check_tld(&self, domain: &DomainName) -> CoreResult<()> {
        if self.supported_tlds.is_empty() {
            return Ok(());
        }
        let tld = domain.tld();
        let supported = self
            .supported_tlds
            .iter()
            .any(|t| t.trim_start_matches('.').eq_ignore_ascii_case(tld));
        if supported {
            Ok(())
        } else {
            Err(CoreError::UnsupportedTld(tld.to_string()))
        }
    }

    /// Reject an unusable profile
    pub fn validate(&self) -> CoreResult<()> {
        if self.mx.is_empty() {
            return Err(CoreError::ValidationError(
                "profile needs at least one MX exchanger".to_string(),
            ));
        }
        if !self.spf_value.trim().to_lowercase().starts_with("v=spf1") {
            return Err(CoreError::ValidationError(format!(
                "invalid SPF value: {}",
                self.spf_value
            )));
        }
        if self.dkim_selector.trim().is_empty() || self.branding_subdomain.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "DKIM selector and branding subdomain must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailhost_provider::DnsRecordType;

    #[test]
    fn default_mail_records() {
        let records = MailHostingProfile::default().mail_records();
        assert_eq!(records.len(), 4);
        assert!(records[0].is_spf());
        let priorities: Vec<_> = records[1..].iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![Some(10), Some(20), Some(50)]);
        assert!(records[1..].iter().all(|r| r.record_type == DnsRecordType::Mx));
    }

    #[test]
    fn mx_sorted_by_priority() {
        let profile = MailHostingProfile {
            mx: vec![MxExchanger::new("b.mx", 20), MxExchanger::new("a.mx", 5)],
            ..Default::default()
        };
        let records = profile.mail_records();
        assert_eq!(records[1].value, "a.mx");
        assert_eq!(profile.primary_exchanger().unwrap().host, "a.mx");
    }

    #[test]
    fn tld_allow_list() {
        let profile = MailHostingProfile::default();
        assert!(profile.check_tld(&DomainName::parse("shop.io").unwrap()).is_ok());
        assert!(matches!(
            profile.check_tld(&DomainName::parse("shop.xyz").unwrap()),
            Err(CoreError::UnsupportedTld(t)) if t == "xyz"
        ));

        let open = MailHostingProfile {
            supported_tlds: vec![],
            ..Default::default()
        };
        assert!(open.check_tld(&DomainName::parse("shop.xyz").unwrap()).is_ok());
    }

    #[test]
    fn validate_rejects_empty_mx() {
        let profile = MailHostingProfile {
            mx: vec![],
            ..Default::default()
        };
        assert!(profile.validate().is_err());
        assert!(MailHostingProfile::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_style_deserialize_keeps_defaults() {
        let profile: MailHostingProfile =
            serde_json::from_str(r#"{"dkim_selector": "mail"}"#).unwrap();
        assert_eq!(profile.dkim_selector, "mail");
        assert_eq!(profile.mx.len(), 3);
    }
}
