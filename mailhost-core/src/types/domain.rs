//! Domain identity and the persisted domain record

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

static LABELS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]([a-z0-9-]{0,61}[a-z0-9])?$").ok()
});

/// Maximum length of a domain name without the trailing dot
const MAX_DOMAIN_LEN: usize = 253;

/// A validated, case-normalized domain name.
///
/// Lowercase, no trailing dot, at least two labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Parse and normalize a domain name
    pub fn parse(input: &str) -> CoreResult<Self> {
        let name = input.trim().trim_end_matches('.').to_lowercase();
        if name.is_empty() || name.len() > MAX_DOMAIN_LEN {
            return Err(CoreError::InvalidDomainName(input.to_string()));
        }
        let valid = LABELS.as_ref().is_some_and(|re| re.is_match(&name));
        if !valid {
            return Err(CoreError::InvalidDomainName(input.to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last label, e.g. `com`
    pub fn tld(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(&value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}

/// Workspace-scoped record of a purchased domain's provisioning state.
///
/// The boolean flags only ever move from `false` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// Stable identifier (UUID v4)
    pub id: String,
    pub domain_name: DomainName,
    /// Owning purchase order; legacy rows may have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub mail_hosting_configured: bool,
    pub web_forwarding_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_forwarding_url: Option<String>,
    /// All verification steps have succeeded at least once
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainRecord {
    /// New record for a purchased domain
    #[must_use]
    pub fn new(domain_name: DomainName, order_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            domain_name,
            order_id,
            mail_hosting_configured: false,
            web_forwarding_configured: false,
            web_forwarding_url: None,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set `mail_hosting_configured`; returns whether the flag changed
    pub fn mark_mail_hosting_configured(&mut self) -> bool {
        if self.mail_hosting_configured {
            return false;
        }
        self.mail_hosting_configured = true;
        self.touch();
        true
    }

    /// Set `verified`; returns whether the flag changed.
    ///
    /// A record cannot be verified before mail hosting is configured.
    pub fn mark_verified(&mut self) -> CoreResult<bool> {
        if !self.mail_hosting_configured {
            return Err(CoreError::NotProvisioned(self.domain_name.to_string()));
        }
        if self.verified {
            return Ok(false);
        }
        self.verified = true;
        self.touch();
        Ok(true)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
