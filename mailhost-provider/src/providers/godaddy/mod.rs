//! GoDaddy registrar adapter

mod error;
mod http;
mod registrar;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::http_client::RetryPolicy;
use crate::providers::common::create_http_client;

pub(crate) const GODADDY_API_BASE: &str = "https://api.godaddy.com";
/// Nameservers GoDaddy assigns to domains using its own DNS.
pub(crate) const DEFAULT_NAMESERVERS: [&str; 2] =
    ["ns1.domaincontrol.com", "ns2.domaincontrol.com"];

/// GoDaddy Domains API v1 registrar.
///
/// Authenticates with an `sso-key` API key pair.
///
/// # Construction
///
/// ```rust,no_run
/// use mailhost_provider::GoDaddyRegistrar;
///
/// # fn main() -> mailhost_provider::Result<()> {
/// let registrar = GoDaddyRegistrar::builder("key".to_string(), "secret".to_string())
///     .max_retries(3)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct GoDaddyRegistrar {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    pub(crate) api_base: String,
    pub(crate) retry: RetryPolicy,
}

/// Builder for [`GoDaddyRegistrar`].
pub struct GoDaddyRegistrarBuilder {
    api_key: String,
    api_secret: String,
    api_base: String,
    retry: RetryPolicy,
}

impl GoDaddyRegistrarBuilder {
    fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
            api_base: GODADDY_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL (OTE environment, mock servers).
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.retry = self.retry.with_max_retries(retries);
        self
    }

    /// Replace the whole retry policy (backoff delays included).
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Build the [`GoDaddyRegistrar`] instance.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<GoDaddyRegistrar> {
        Ok(GoDaddyRegistrar {
            client: create_http_client("godaddy")?,
            api_key: self.api_key,
            api_secret: self.api_secret,
            api_base: self.api_base,
            retry: self.retry,
        })
    }
}

impl GoDaddyRegistrar {
    /// Creates a registrar with default settings (production API, 2 retries).
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(api_key: String, api_secret: String) -> Result<Self> {
        Self::builder(api_key, api_secret).build()
    }

    /// Returns a builder for customizing the registrar configuration.
    pub fn builder(api_key: String, api_secret: String) -> GoDaddyRegistrarBuilder {
        GoDaddyRegistrarBuilder::new(api_key, api_secret)
    }

    pub(crate) fn auth_header(&self) -> String {
        format!("sso-key {}:{}", self.api_key, self.api_secret)
    }
}
