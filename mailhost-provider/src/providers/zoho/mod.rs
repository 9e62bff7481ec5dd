//! Zoho Mail mailbox provider adapter

mod error;
mod http;
mod mailbox;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::http_client::RetryPolicy;
use crate::providers::common::create_http_client;

pub(crate) const ZOHO_API_BASE: &str = "https://mail.zoho.com";
/// Suffix Zoho appends to the ownership code in the TXT record value.
pub(crate) const VERIFICATION_SUFFIX: &str = ".zmverify.zoho.com";
/// DKIM key size requested for new keys.
pub(crate) const DKIM_KEY_SIZE: u32 = 1024;

/// Zoho Mail organization domain API.
///
/// Authenticates with a `Zoho-oauthtoken` and operates on one organization (`zoid`).
pub struct ZohoMailProvider {
    pub(crate) client: Client,
    pub(crate) oauth_token: String,
    pub(crate) organization_id: String,
    pub(crate) api_base: String,
    pub(crate) retry: RetryPolicy,
}

/// Builder for [`ZohoMailProvider`].
pub struct ZohoMailProviderBuilder {
    oauth_token: String,
    organization_id: String,
    api_base: String,
    retry: RetryPolicy,
}

impl ZohoMailProviderBuilder {
    fn new(oauth_token: String, organization_id: String) -> Self {
        Self {
            oauth_token,
            organization_id,
            api_base: ZOHO_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL (regional data centers such as `mail.zoho.eu`, mock servers).
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

    /// Build the [`ZohoMailProvider`] instance.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ZohoMailProvider> {
        Ok(ZohoMailProvider {
            client: create_http_client("zoho")?,
            oauth_token: self.oauth_token,
            organization_id: self.organization_id,
            api_base: self.api_base,
            retry: self.retry,
        })
    }
}

impl ZohoMailProvider {
    /// Creates a provider with default settings (`mail.zoho.com`, 2 retries).
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(oauth_token: String, organization_id: String) -> Result<Self> {
        Self::builder(oauth_token, organization_id).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(oauth_token: String, organization_id: String) -> ZohoMailProviderBuilder {
        ZohoMailProviderBuilder::new(oauth_token, organization_id)
    }

    pub(crate) fn domains_path(&self) -> String {
        format!(
            "/api/organization/{}/domains",
            urlencoding::encode(&self.organization_id)
        )
    }

    pub(crate) fn domain_path(&self, domain: &str) -> String {
        format!("{}/{}", self.domains_path(), urlencoding::encode(domain))
    }
}
