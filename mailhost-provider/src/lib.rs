//! # mailhost-provider
//!
//! Adapters for the three external systems involved in bringing a purchased domain to a
//! mail-ready state: the registrar holding its DNS host records, the mailbox hosting
//! provider, and the email deliverability service.
//!
//! ## Supported Adapters
//!
//! | Role | Service | Feature Flag | Auth Method |
//! |------|---------|-------------|-------------|
//! | [`RegistrarAdapter`] | [GoDaddy](https://developer.godaddy.com/) | `godaddy` | `sso-key` |
//! | [`MailboxProviderAdapter`] | [Zoho Mail](https://www.zoho.com/mail/help/api/) | `zoho` | `Zoho-oauthtoken` |
//! | [`DeliverabilityAdapter`] | [SendGrid](https://www.twilio.com/docs/sendgrid/api-reference) | `sendgrid` | Bearer |
//!
//! ## Feature Flags
//!
//! - **`all-providers`** *(default)*: enable every adapter listed above.
//! - **`godaddy`**, **`zoho`**, **`sendgrid`**: enable a single adapter.
//! - **`rustls`** *(default)* / **`native-tls`**: TLS backend for `reqwest`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mailhost_provider::{
//!     create_registrar, AdapterOptions, DnsHostRecord, RegistrarCredentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registrar = create_registrar(
//!         RegistrarCredentials::GoDaddy {
//!             api_key: "key".to_string(),
//!             api_secret: "secret".to_string(),
//!         },
//!         &AdapterOptions::default(),
//!     )?;
//!
//!     let mut records = registrar.get_host_records("example.com").await?;
//!     records.push(DnsHostRecord::txt("@", "v=spf1 include:zoho.com ~all"));
//!     registrar.set_host_records("example.com", &records).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All adapter operations return [`Result<T, ProviderError>`](ProviderError).
//!
//! - [`ProviderError::AlreadyExists`] / [`ProviderError::AlreadyConfigured`]: the requested
//!   end state already holds ([`ProviderError::is_already_satisfied`])
//! - [`ProviderError::InvalidCredentials`]: authentication failed
//! - [`ProviderError::RateLimited`], [`ProviderError::NetworkError`]: transient, retried
//!   automatically with exponential backoff

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::{
    AdapterOptions, create_deliverability, create_mailbox_provider, create_registrar,
};
pub use http_client::RetryPolicy;

// Re-export adapter traits (internal mapping traits are not exported)
pub use traits::{DeliverabilityAdapter, MailboxProviderAdapter, RegistrarAdapter};

// Re-export types
pub use types::{
    AuthRecordSet, BrandingRecordSet, CredentialValidationError, DEFAULT_TTL,
    DeliverabilityCredentials, DkimKey, DnsHostRecord, DnsRecordType, MailboxCredentials,
    MailboxDomainInfo, RecordKey, RegisteredDomain, RegistrarCredentials, ValidationOutcome,
};

// Re-export helpers shared with callers
pub use providers::common::{full_name_to_relative, normalize_domain_name};
pub use utils::log_sanitizer;

// Re-export concrete adapters (behind feature flags)
#[cfg(feature = "godaddy")]
pub use providers::{GoDaddyRegistrar, GoDaddyRegistrarBuilder};

#[cfg(feature = "zoho")]
pub use providers::{ZohoMailProvider, ZohoMailProviderBuilder};

#[cfg(feature = "sendgrid")]
pub use providers::{SendGridDeliverability, SendGridDeliverabilityBuilder};
