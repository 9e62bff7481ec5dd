//! Application bootstrap for the mail-hosting orchestrator.
//!
//! Provides `AppConfig` (TOML + environment), logging initialization, in-memory
//! repositories, `AppState` (service container) and `AppStateBuilder` (adapter injection).

pub mod adapters;
pub mod config;
pub mod logging;

use std::sync::Arc;

use mailhost_core::PreservePolicy;
use mailhost_core::error::{CoreError, CoreResult};
use mailhost_core::services::{
    DomainService, ProvisioningService, ServiceContext, VerificationService,
};
use mailhost_core::traits::{DomainRepository, OrderRepository};
use mailhost_core::types::{MailHostingProfile, ProvisioningOutcome};
use mailhost_provider::{
    DeliverabilityAdapter, MailboxProviderAdapter, RegistrarAdapter, create_deliverability,
    create_mailbox_provider, create_registrar,
};

pub use config::{AppConfig, ConfigError};

use adapters::{InMemoryDomainRepository, InMemoryOrderRepository};

/// Application state.
///
/// Holds the `ServiceContext` and the services built on it. Constructed once at startup
/// via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds repositories and adapters)
    pub ctx: Arc<ServiceContext>,
    /// Domain service
    pub domain_service: DomainService,
    /// Provisioning service
    pub provisioning_service: ProvisioningService,
    /// Verification service
    pub verification_service: VerificationService,
    /// Flows run at once by `provision_many`
    pub provisioning_concurrency: usize,
}

impl AppState {
    /// Provision several domains with the configured concurrency limit
    pub async fn provision_many(
        &self,
        workspace_id: &str,
        domains: &[String],
    ) -> Vec<(String, CoreResult<ProvisioningOutcome>)> {
        self.provisioning_service
            .provision_many(workspace_id, domains, self.provisioning_concurrency)
            .await
    }
}

/// Builder for constructing `AppState`.
///
/// # Required adapters
/// - `registrar`, `mailbox`, `deliverability` (or [`from_config`](Self::from_config))
///
/// # Optional
/// - `domain_repository` / `order_repository`: default to the in-memory repositories
/// - `profile`, `preserve_policy`: default to the Zoho profile and the standard policy
pub struct AppStateBuilder {
    domain_repository: Option<Arc<dyn DomainRepository>>,
    order_repository: Option<Arc<dyn OrderRepository>>,
    registrar: Option<Arc<dyn RegistrarAdapter>>,
    mailbox: Option<Arc<dyn MailboxProviderAdapter>>,
    deliverability: Option<Arc<dyn DeliverabilityAdapter>>,
    profile: MailHostingProfile,
    preserve_policy: PreservePolicy,
    provisioning_concurrency: usize,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            domain_repository: None,
            order_repository: None,
            registrar: None,
            mailbox: None,
            deliverability: None,
            profile: MailHostingProfile::default(),
            preserve_policy: PreservePolicy::default(),
            provisioning_concurrency: 4,
        }
    }

    /// Builder with adapters, profile and policy taken from `config`
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let adapter_error =
            |e: mailhost_provider::ProviderError| ConfigError::Invalid(e.to_string());

        let registrar = create_registrar(
            config.registrar_credentials()?,
            &config.registrar.endpoint.adapter_options(),
        )
        .map_err(adapter_error)?;
        let mailbox = create_mailbox_provider(
            config.mailbox_credentials()?,
            &config.mailbox.endpoint.adapter_options(),
        )
        .map_err(adapter_error)?;
        let deliverability = create_deliverability(
            config.deliverability_credentials()?,
            &config.deliverability.endpoint.adapter_options(),
        )
        .map_err(adapter_error)?;

        log::info!(
            "Adapters ready: registrar={}, mailbox={}, deliverability={}",
            registrar.id(),
            mailbox.id(),
            deliverability.id()
        );

        Ok(Self::new()
            .registrar(registrar)
            .mailbox(mailbox)
            .deliverability(deliverability)
            .profile(config.profile.clone())
            .preserve_policy(config.provisioning.preserve.clone())
            .provisioning_concurrency(config.provisioning.concurrency))
    }

    #[must_use]
    pub fn domain_repository(mut self, repo: Arc<dyn DomainRepository>) -> Self {
        self.domain_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn order_repository(mut self, repo: Arc<dyn OrderRepository>) -> Self {
        self.order_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn registrar(mut self, registrar: Arc<dyn RegistrarAdapter>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    #[must_use]
    pub fn mailbox(mut self, mailbox: Arc<dyn MailboxProviderAdapter>) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    #[must_use]
    pub fn deliverability(mut self, deliverability: Arc<dyn DeliverabilityAdapter>) -> Self {
        self.deliverability = Some(deliverability);
        self
    }

    #[must_use]
    pub fn profile(mut self, profile: MailHostingProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn preserve_policy(mut self, policy: PreservePolicy) -> Self {
        self.preserve_policy = policy;
        self
    }

    #[must_use]
    pub fn provisioning_concurrency(mut self, limit: usize) -> Self {
        self.provisioning_concurrency = limit;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if an adapter is missing or the profile is unusable.
    pub fn build(self) -> CoreResult<AppState> {
        let registrar = self
            .registrar
            .ok_or_else(|| CoreError::ValidationError("registrar is required".to_string()))?;
        let mailbox = self
            .mailbox
            .ok_or_else(|| CoreError::ValidationError("mailbox is required".to_string()))?;
        let deliverability = self.deliverability.ok_or_else(|| {
            CoreError::ValidationError("deliverability is required".to_string())
        })?;
        self.profile.validate()?;

        let domain_repository = self
            .domain_repository
            .unwrap_or_else(|| Arc::new(InMemoryDomainRepository::new()));
        let order_repository = self
            .order_repository
            .unwrap_or_else(|| Arc::new(InMemoryOrderRepository::new()));

        let ctx = Arc::new(
            ServiceContext::new(
                domain_repository,
                order_repository,
                registrar,
                mailbox,
                deliverability,
            )
            .with_profile(self.profile)
            .with_preserve_policy(self.preserve_policy),
        );

        Ok(AppState {
            domain_service: DomainService::new(Arc::clone(&ctx)),
            provisioning_service: ProvisioningService::new(Arc::clone(&ctx)),
            verification_service: VerificationService::new(Arc::clone(&ctx)),
            provisioning_concurrency: self.provisioning_concurrency.max(1),
            ctx,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
