//! Adapter factory functions.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ProviderError, Result};
use crate::http_client::RetryPolicy;
use crate::traits::{DeliverabilityAdapter, MailboxProviderAdapter, RegistrarAdapter};
use crate::types::{
    CredentialValidationError, DeliverabilityCredentials, MailboxCredentials,
    RegistrarCredentials,
};

#[cfg(feature = "godaddy")]
use crate::providers::GoDaddyRegistrar;
#[cfg(feature = "sendgrid")]
use crate::providers::SendGridDeliverability;
#[cfg(feature = "zoho")]
use crate::providers::ZohoMailProvider;

/// Retry and endpoint overrides shared by all factory functions.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    /// API base URL override; `None` uses the provider's production endpoint.
    pub api_base: Option<String>,
    /// Retry override; `None` keeps the adapter default (2).
    pub max_retries: Option<u32>,
    /// First backoff delay override; `None` keeps 100 ms.
    pub retry_base_delay: Option<Duration>,
}

impl AdapterOptions {
    /// Default [`RetryPolicy`] with the overrides applied.
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::default();
        if let Some(retries) = self.max_retries {
            policy = policy.with_max_retries(retries);
        }
        if let Some(delay) = self.retry_base_delay {
            policy = policy.with_base_delay(delay);
        }
        policy
    }
}

fn invalid_credentials(err: &CredentialValidationError) -> ProviderError {
    let CredentialValidationError::EmptyField { provider, field } = err;
    ProviderError::InvalidParameter {
        provider: provider.clone(),
        param: field.clone(),
        detail: err.to_string(),
    }
}

/// Creates a [`RegistrarAdapter`] from the given credentials.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidParameter`] for empty credential fields and
/// [`ProviderError::NetworkError`] if the HTTP client cannot be built.
///
/// # Examples
///
/// ```rust,no_run
/// use mailhost_provider::{create_registrar, AdapterOptions, RegistrarCredentials};
///
/// let registrar = create_registrar(
///     RegistrarCredentials::GoDaddy {
///         api_key: "key".to_string(),
///         api_secret: "secret".to_string(),
///     },
///     &AdapterOptions::default(),
/// )
/// .unwrap();
/// ```
pub fn create_registrar(
    credentials: RegistrarCredentials,
    options: &AdapterOptions,
) -> Result<Arc<dyn RegistrarAdapter>> {
    credentials.validate().map_err(|e| invalid_credentials(&e))?;
    match credentials {
        #[cfg(feature = "godaddy")]
        RegistrarCredentials::GoDaddy {
            api_key,
            api_secret,
        } => {
            let mut builder = GoDaddyRegistrar::builder(api_key, api_secret);
            if let Some(base) = &options.api_base {
                builder = builder.api_base(base.clone());
            }
            Ok(Arc::new(builder.retry_policy(options.retry_policy()).build()?))
        }
    }
}

/// Creates a [`MailboxProviderAdapter`] from the given credentials.
///
/// # Errors
///
/// See [`create_registrar`].
pub fn create_mailbox_provider(
    credentials: MailboxCredentials,
    options: &AdapterOptions,
) -> Result<Arc<dyn MailboxProviderAdapter>> {
    credentials.validate().map_err(|e| invalid_credentials(&e))?;
    match credentials {
        #[cfg(feature = "zoho")]
        MailboxCredentials::Zoho {
            oauth_token,
            organization_id,
        } => {
            let mut builder = ZohoMailProvider::builder(oauth_token, organization_id);
            if let Some(base) = &options.api_base {
                builder = builder.api_base(base.clone());
            }
            Ok(Arc::new(builder.retry_policy(options.retry_policy()).build()?))
        }
    }
}

/// Creates a [`DeliverabilityAdapter`] from the given credentials.
///
/// # Errors
///
/// See [`create_registrar`].
pub fn create_deliverability(
    credentials: DeliverabilityCredentials,
    options: &AdapterOptions,
) -> Result<Arc<dyn DeliverabilityAdapter>> {
    credentials.validate().map_err(|e| invalid_credentials(&e))?;
    match credentials {
        #[cfg(feature = "sendgrid")]
        DeliverabilityCredentials::SendGrid { api_key } => {
            let mut builder = SendGridDeliverability::builder(api_key);
            if let Some(base) = &options.api_base {
                builder = builder.api_base(base.clone());
            }
            Ok(Arc::new(builder.retry_policy(options.retry_policy()).build()?))
        }
    }
}
