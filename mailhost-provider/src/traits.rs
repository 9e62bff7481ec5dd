use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    AuthRecordSet, BrandingRecordSet, DkimKey, DnsHostRecord, MailboxDomainInfo,
    RegisteredDomain, ValidationOutcome,
};

/// Raw API error as returned by a provider (internal).
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code, format differs per provider.
    pub code: Option<String>,
    /// Original error message.
    pub message: String,
    /// HTTP status, when the error came from a non-2xx response.
    pub status: Option<u16>,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Extra context used while mapping errors (internal).
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Domain the call was about (for `DomainNotFound`).
    pub domain: Option<String>,
    /// Resource being created or looked up (for `AlreadyExists` / `ResourceNotFound`).
    pub resource: Option<String>,
    /// Provider action requested (for `AlreadyConfigured`).
    pub action: Option<String>,
    /// Creation or enable call whose duplicate answer means the end state holds.
    /// Only such calls may read a free-text "already" message as success.
    pub repeatable: bool,
}

impl ErrorContext {
    pub fn domain(domain: &str) -> Self {
        Self {
            domain: Some(domain.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// A conflict-style answer (HTTP 400/409) to a repeatable call that says "already".
    pub fn is_duplicate_answer(&self, raw: &RawApiError) -> bool {
        self.repeatable
            && matches!(raw.status, Some(400 | 409))
            && raw.message.to_lowercase().contains("already")
    }
}

/// Maps raw API errors onto [`ProviderError`] (internal).
pub(crate) trait ProviderErrorMapper {
    /// Provider identifier.
    fn provider_name(&self) -> &'static str;

    /// Translate a raw API error into the unified error type.
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// Shortcut: response parsing failed.
    fn parse_error(&self, detail: impl ToString) -> ProviderError {
        ProviderError::ParseError {
            provider: self.provider_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Shortcut: fallback for unmapped errors.
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }

    /// Shortcut: the resource already exists.
    fn already_exists(&self, raw: RawApiError, context: &ErrorContext) -> ProviderError {
        ProviderError::AlreadyExists {
            provider: self.provider_name().to_string(),
            resource: context
                .resource
                .clone()
                .or_else(|| context.domain.clone())
                .unwrap_or_else(|| "<unknown>".to_string()),
            raw_message: Some(raw.message),
        }
    }

    /// Shortcut: the requested action has already been performed.
    fn already_configured(&self, raw: RawApiError, context: &ErrorContext) -> ProviderError {
        ProviderError::AlreadyConfigured {
            provider: self.provider_name().to_string(),
            action: context
                .action
                .clone()
                .unwrap_or_else(|| "<unknown>".to_string()),
            raw_message: Some(raw.message),
        }
    }
}

/// Registrar holding the domain's host records and nameserver delegation.
#[async_trait]
pub trait RegistrarAdapter: Send + Sync {
    /// Adapter identifier.
    fn id(&self) -> &'static str;

    /// Current host records of the domain.
    async fn get_host_records(&self, domain: &str) -> Result<Vec<DnsHostRecord>>;

    /// Replace the domain's host records with `records` in one call.
    async fn set_host_records(&self, domain: &str, records: &[DnsHostRecord]) -> Result<()>;

    /// Point the domain at the registrar's default nameservers.
    ///
    /// Succeeds when the nameservers are already the defaults.
    async fn set_default_nameservers(&self, domain: &str) -> Result<()>;
}

/// Mailbox hosting provider.
///
/// Verification calls report an unmet condition as an error; a condition that
/// already holds is reported as success or as
/// [`ProviderError::AlreadyConfigured`].
#[async_trait]
pub trait MailboxProviderAdapter: Send + Sync {
    /// Adapter identifier.
    fn id(&self) -> &'static str;

    /// Add the domain to the mailbox organization.
    ///
    /// Returns [`ProviderError::AlreadyExists`] when it was added before.
    async fn register_domain(&self, domain: &str) -> Result<RegisteredDomain>;

    /// Enable mail hosting for the domain.
    async fn enable_hosting(&self, domain: &str) -> Result<()>;

    /// Verify domain ownership through the published TXT record.
    async fn verify_ownership(&self, domain: &str) -> Result<()>;

    /// Verify that the domain's MX records point at the provider.
    async fn verify_mx(&self, domain: &str) -> Result<()>;

    /// Verify the domain's SPF record.
    async fn verify_spf(&self, domain: &str) -> Result<()>;

    /// Current provider-side state of the domain.
    async fn get_domain_info(&self, domain: &str) -> Result<MailboxDomainInfo>;

    /// Create a DKIM key under `selector`.
    async fn add_dkim_key(&self, domain: &str, selector: &str) -> Result<DkimKey>;

    /// Verify a previously created DKIM key.
    async fn verify_dkim_key(&self, domain: &str, key_id: &str) -> Result<()>;
}

/// Email deliverability service (sending-domain authentication and link branding).
#[async_trait]
pub trait DeliverabilityAdapter: Send + Sync {
    /// Adapter identifier.
    fn id(&self) -> &'static str;

    /// Existing sending-domain authentication for `domain`.
    async fn get_sending_domain_auth(&self, domain: &str) -> Result<Option<AuthRecordSet>>;

    /// Create sending-domain authentication for `domain`.
    async fn create_sending_domain_auth(&self, domain: &str) -> Result<AuthRecordSet>;

    /// Ask the service to validate a sending-domain authentication.
    async fn validate_sending_domain_auth(&self, id: &str) -> Result<ValidationOutcome>;

    /// Existing link branding for `domain`.
    async fn get_link_branding(&self, domain: &str) -> Result<Option<BrandingRecordSet>>;

    /// Create link branding for `domain` under `subdomain`.
    async fn create_link_branding(
        &self,
        domain: &str,
        subdomain: &str,
    ) -> Result<BrandingRecordSet>;

    /// Ask the service to validate a link branding.
    async fn validate_link_branding(&self, id: &str) -> Result<ValidationOutcome>;
}
