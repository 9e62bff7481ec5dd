use serde::{Deserialize, Serialize};

// ============ DNS Host Records ============

/// DNS record type of a registrar host record.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Name server record.
    Ns,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
    /// Registrar forwarding / parking pseudo-record.
    Url,
}

impl DnsRecordType {
    /// Uppercase wire name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Ns => "NS",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Url => "URL",
        }
    }

    /// Whether the value of this type is a hostname that compares case-insensitively.
    pub fn has_hostname_value(self) -> bool {
        matches!(self, Self::Cname | Self::Mx | Self::Ns)
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default TTL applied to records built with [`DnsHostRecord::new`].
pub const DEFAULT_TTL: u32 = 3600;

/// One host record as held by the registrar.
///
/// `name` is relative to the zone, `@` for the apex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsHostRecord {
    /// Host name relative to the zone.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Record value (target host, address or text).
    pub value: String,
    /// TTL in seconds.
    pub ttl: u32,
    /// MX/SRV priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

/// Identity of a record by content. TTL is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    /// Lowercased host name.
    pub name: String,
    /// Record type.
    pub record_type: DnsRecordType,
    /// Normalized value.
    pub value: String,
    /// Priority, if any.
    pub priority: Option<u16>,
}

impl DnsHostRecord {
    /// Creates a record with the default TTL and no priority.
    pub fn new(
        name: impl Into<String>,
        record_type: DnsRecordType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
            ttl: DEFAULT_TTL,
            priority: None,
        }
    }

    /// Shorthand for an `MX` record.
    pub fn mx(name: impl Into<String>, exchanger: impl Into<String>, priority: u16) -> Self {
        Self::new(name, DnsRecordType::Mx, exchanger).with_priority(priority)
    }

    /// Shorthand for a `TXT` record.
    pub fn txt(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, DnsRecordType::Txt, text)
    }

    /// Shorthand for a `CNAME` record.
    pub fn cname(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, DnsRecordType::Cname, target)
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Host name lowercased, trailing dot removed, empty mapped to `@`.
    pub fn normalized_name(&self) -> String {
        let name = self.name.trim().trim_end_matches('.').to_lowercase();
        if name.is_empty() { "@".to_string() } else { name }
    }

    /// Value normalized for comparison: hostname targets are lowercased with the
    /// trailing dot removed, text values are kept verbatim.
    pub fn normalized_value(&self) -> String {
        if self.record_type.has_hostname_value() {
            self.value.trim().trim_end_matches('.').to_lowercase()
        } else {
            self.value.clone()
        }
    }

    /// Content identity of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            name: self.normalized_name(),
            record_type: self.record_type,
            value: self.normalized_value(),
            priority: self.priority,
        }
    }

    /// Whether two records are equal by content (TTL ignored).
    pub fn content_eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Whether both records sit at the same host.
    pub fn same_host(&self, other: &Self) -> bool {
        self.normalized_name() == other.normalized_name()
    }

    /// Whether the record is at the apex (`@`) or `www`.
    pub fn is_apex_or_www(&self) -> bool {
        matches!(self.normalized_name().as_str(), "@" | "www")
    }

    /// Whether this is an SPF `TXT` record.
    pub fn is_spf(&self) -> bool {
        self.record_type == DnsRecordType::Txt
            && self.value.trim().to_lowercase().starts_with("v=spf1")
    }

    /// The `key=` tag of a `TXT` value, e.g. `zoho-verification` for
    /// `zoho-verification=zb123.zmverify.zoho.com`. Versioned values (`v=...`)
    /// return the whole version token, e.g. `v=dmarc1`.
    pub fn txt_tag(&self) -> Option<String> {
        if self.record_type != DnsRecordType::Txt {
            return None;
        }
        let value = self.value.trim().trim_matches('"').to_lowercase();
        if value.starts_with("v=") {
            let end = value
                .find(|c: char| c.is_whitespace() || c == ';')
                .unwrap_or(value.len());
            return Some(value[..end].to_string());
        }
        let (tag, _) = value.split_once('=')?;
        if tag.is_empty() || tag.contains(char::is_whitespace) {
            None
        } else {
            Some(tag.to_string())
        }
    }
}

impl std::fmt::Display for DnsHostRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.priority {
            Some(p) => write!(
                f,
                "{} {} {} {}",
                self.name, self.record_type, p, self.value
            ),
            None => write!(f, "{} {} {}", self.name, self.record_type, self.value),
        }
    }
}

// ============ Mailbox Provider ============

/// Result of registering a domain with the mailbox provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDomain {
    /// Domain name as registered.
    pub domain: String,
    /// Token that must be published as a TXT record to prove ownership.
    pub ownership_token: String,
}

/// A DKIM key held by the mailbox provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimKey {
    /// Provider-side key identifier.
    pub id: String,
    /// DNS selector the key is published under.
    pub selector: String,
    /// Public key material, if the provider returns it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Whether the provider has verified the published key.
    pub verified: bool,
}

/// Snapshot of the mailbox provider's view of a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxDomainInfo {
    /// Domain name.
    pub domain: String,
    /// Ownership TXT record verified.
    pub ownership_verified: bool,
    /// Mail hosting enabled for the domain.
    pub hosting_enabled: bool,
    /// MX records verified.
    pub mx_verified: bool,
    /// SPF record verified.
    pub spf_verified: bool,
    /// Ownership token, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    /// DKIM keys configured for the domain.
    #[serde(default)]
    pub dkim_keys: Vec<DkimKey>,
}

impl MailboxDomainInfo {
    /// The DKIM key published under `selector`, if any.
    pub fn dkim_key(&self, selector: &str) -> Option<&DkimKey> {
        self.dkim_keys
            .iter()
            .find(|k| k.selector.eq_ignore_ascii_case(selector))
    }
}

// ============ Deliverability ============

/// Sending-domain authentication record set (mail CNAME plus two DKIM CNAMEs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecordSet {
    /// Provider-side identifier.
    pub id: String,
    /// Authenticated domain.
    pub domain: String,
    /// Records the registrar must publish, names relative to the domain.
    pub records: Vec<DnsHostRecord>,
    /// Whether the provider considers the set validated.
    pub valid: bool,
}

/// Link-branding record set (branding CNAME plus owner CNAME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingRecordSet {
    /// Provider-side identifier.
    pub id: String,
    /// Branded domain.
    pub domain: String,
    /// Branding subdomain, e.g. `url`.
    pub subdomain: String,
    /// Records the registrar must publish, names relative to the domain.
    pub records: Vec<DnsHostRecord>,
    /// Whether the provider considers the set validated.
    pub valid: bool,
}

/// Result of a deliverability validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Whether validation passed.
    pub valid: bool,
    /// Failure reasons reported per record, empty when valid.
    #[serde(default)]
    pub reasons: Vec<String>,
}

// ============ Credentials ============

/// Validation error for adapter credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A credential field is empty or whitespace-only.
    EmptyField {
        /// Which provider the error relates to.
        provider: String,
        /// Machine-readable field key.
        field: String,
    },
}

impl std::fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { provider, field } => {
                write!(f, "[{provider}] Field must not be empty: {field}")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

fn require(
    provider: &str,
    field: &str,
    value: &str,
) -> std::result::Result<(), CredentialValidationError> {
    if value.trim().is_empty() {
        Err(CredentialValidationError::EmptyField {
            provider: provider.to_string(),
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Registrar credentials.
///
/// Serialized as `{ "provider": "godaddy", "credentials": { ... } }`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum RegistrarCredentials {
    /// GoDaddy API key pair. Requires feature `godaddy`.
    #[cfg(feature = "godaddy")]
    #[serde(rename = "godaddy")]
    GoDaddy {
        /// API key.
        api_key: String,
        /// API secret.
        api_secret: String,
    },
}

/// Mailbox provider credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum MailboxCredentials {
    /// Zoho Mail organization access. Requires feature `zoho`.
    #[cfg(feature = "zoho")]
    #[serde(rename = "zoho")]
    Zoho {
        /// OAuth access token.
        oauth_token: String,
        /// Organization id (`zoid`).
        organization_id: String,
    },
}

/// Deliverability service credentials.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum DeliverabilityCredentials {
    /// SendGrid API key. Requires feature `sendgrid`.
    #[cfg(feature = "sendgrid")]
    #[serde(rename = "sendgrid")]
    SendGrid {
        /// API key.
        api_key: String,
    },
}

// Secrets are never printed.
impl std::fmt::Debug for RegistrarCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RegistrarCredentials(..)")
    }
}

impl std::fmt::Debug for MailboxCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MailboxCredentials(..)")
    }
}

impl std::fmt::Debug for DeliverabilityCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeliverabilityCredentials(..)")
    }
}

impl RegistrarCredentials {
    /// Checks that no field is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError::EmptyField`] naming the first empty field.
    pub fn validate(&self) -> std::result::Result<(), CredentialValidationError> {
        match self {
            #[cfg(feature = "godaddy")]
            Self::GoDaddy {
                api_key,
                api_secret,
            } => {
                require("godaddy", "api_key", api_key)?;
                require("godaddy", "api_secret", api_secret)
            }
            #[allow(unreachable_patterns)]
            _ => Ok(()),
        }
    }
}

impl MailboxCredentials {
    /// Checks that no field is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError::EmptyField`] naming the first empty field.
    pub fn validate(&self) -> std::result::Result<(), CredentialValidationError> {
        match self {
            #[cfg(feature = "zoho")]
            Self::Zoho {
                oauth_token,
                organization_id,
            } => {
                require("zoho", "oauth_token", oauth_token)?;
                require("zoho", "organization_id", organization_id)
            }
            #[allow(unreachable_patterns)]
            _ => Ok(()),
        }
    }
}

impl DeliverabilityCredentials {
    /// Checks that no field is empty.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialValidationError::EmptyField`] naming the first empty field.
    pub fn validate(&self) -> std::result::Result<(), CredentialValidationError> {
        match self {
            #[cfg(feature = "sendgrid")]
            Self::SendGrid { api_key } => require("sendgrid", "api_key", api_key),
            #[allow(unreachable_patterns)]
            _ => Ok(()),
        }
    }
}
