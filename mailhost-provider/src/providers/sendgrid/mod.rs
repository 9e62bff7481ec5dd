//! SendGrid deliverability adapter

mod deliverability;
mod error;
mod http;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::http_client::RetryPolicy;
use crate::providers::common::create_http_client;

pub(crate) const SENDGRID_API_BASE: &str = "https://api.sendgrid.com";

/// SendGrid v3 sender authentication (domain authentication and link branding).
pub struct SendGridDeliverability {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) api_base: String,
    pub(crate) retry: RetryPolicy,
}

/// Builder for [`SendGridDeliverability`].
pub struct SendGridDeliverabilityBuilder {
    api_key: String,
    api_base: String,
    retry: RetryPolicy,
}

impl SendGridDeliverabilityBuilder {
    fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_base: SENDGRID_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL (EU region, mock servers).
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

    /// Build the [`SendGridDeliverability`] instance.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<SendGridDeliverability> {
        Ok(SendGridDeliverability {
            client: create_http_client("sendgrid")?,
            api_key: self.api_key,
            api_base: self.api_base,
            retry: self.retry,
        })
    }
}

impl SendGridDeliverability {
    /// Creates an adapter with default settings (2 retries).
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(api_key: String) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Returns a builder for customizing the adapter configuration.
    pub fn builder(api_key: String) -> SendGridDeliverabilityBuilder {
        SendGridDeliverabilityBuilder::new(api_key)
    }
}
