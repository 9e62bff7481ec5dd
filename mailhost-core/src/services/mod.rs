//! Business logic service layer

mod domain_service;
mod provisioning_service;
mod verification_service;

pub use domain_service::DomainService;
pub use provisioning_service::ProvisioningService;
pub use verification_service::VerificationService;

use std::sync::Arc;

use mailhost_provider::{DeliverabilityAdapter, MailboxProviderAdapter, RegistrarAdapter};

use crate::error::{CoreError, CoreResult};
use crate::reconciler::PreservePolicy;
use crate::traits::{DomainRepository, OrderRepository};
use crate::types::{DomainName, DomainRecord, MailHostingProfile, Order};

/// Service context - holds all dependencies
///
/// The application layer creates this context and injects the storage and adapter
/// implementations.
pub struct ServiceContext {
    /// Domain record repository
    pub domain_repository: Arc<dyn DomainRepository>,
    /// Order lookup
    pub order_repository: Arc<dyn OrderRepository>,
    /// Registrar holding the host records
    pub registrar: Arc<dyn RegistrarAdapter>,
    /// Mailbox hosting provider
    pub mailbox: Arc<dyn MailboxProviderAdapter>,
    /// Email deliverability service
    pub deliverability: Arc<dyn DeliverabilityAdapter>,
    /// Records injected for mail hosting
    pub profile: MailHostingProfile,
    /// Rules deciding which existing records survive a write
    pub preserve_policy: PreservePolicy,
}

impl ServiceContext {
    /// Create a service context with the default profile and preserve policy
    #[must_use]
    pub fn new(
        domain_repository: Arc<dyn DomainRepository>,
        order_repository: Arc<dyn OrderRepository>,
        registrar: Arc<dyn RegistrarAdapter>,
        mailbox: Arc<dyn MailboxProviderAdapter>,
        deliverability: Arc<dyn DeliverabilityAdapter>,
    ) -> Self {
        Self {
            domain_repository,
            order_repository,
            registrar,
            mailbox,
            deliverability,
            profile: MailHostingProfile::default(),
            preserve_policy: PreservePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: MailHostingProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn with_preserve_policy(mut self, policy: PreservePolicy) -> Self {
        self.preserve_policy = policy;
        self
    }

    /// Load a domain record and check that `workspace_id` owns it through a settled order.
    ///
    /// Runs before any adapter call.
    pub async fn authorize(
        &self,
        workspace_id: &str,
        domain: &DomainName,
    ) -> CoreResult<(DomainRecord, Order)> {
        let record = self
            .domain_repository
            .find_by_name(domain)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain.to_string()))?;

        let order = self.owning_order(workspace_id, &record).await?;
        if !order.is_settled() {
            return Err(CoreError::OrderNotSettled(order.id));
        }
        Ok((record, order))
    }

    /// Resolve the record's order and compare its workspace to `workspace_id`
    pub async fn owning_order(&self, workspace_id: &str, record: &DomainRecord) -> CoreResult<Order> {
        let denied = || CoreError::PermissionDenied(record.domain_name.to_string());

        let order_id = record.order_id.as_deref().ok_or_else(denied)?;
        let order = self
            .order_repository
            .find_by_id(order_id)
            .await?
            .ok_or_else(denied)?;

        if order.workspace_id != workspace_id {
            log::warn!(
                "Workspace {workspace_id} denied access to {}",
                record.domain_name
            );
            return Err(denied());
        }
        Ok(order)
    }
}
