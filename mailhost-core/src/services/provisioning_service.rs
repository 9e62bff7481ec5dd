//! One-time mail-hosting setup for a purchased domain

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use mailhost_provider::{AuthRecordSet, BrandingRecordSet, ProviderError};
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::reconciler;
use crate::services::ServiceContext;
use crate::types::{DomainName, DomainRecord, ProvisioningOutcome, ProvisioningStep};

/// Provisioning service
///
/// Every run re-derives its additions from the current external state, so re-running
/// after a failure or a success converges to the same record set.
pub struct ProvisioningService {
    ctx: Arc<ServiceContext>,
}

impl ProvisioningService {
    /// Create a provisioning service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Provision mail hosting for a domain owned by `workspace_id`
    pub async fn provision_mail_hosting(
        &self,
        workspace_id: &str,
        domain: &str,
    ) -> CoreResult<ProvisioningOutcome> {
        self.provision_mail_hosting_with_cancel(workspace_id, domain, &CancellationToken::new())
            .await
    }

    /// Provision mail hosting, stopping before the DNS write if `cancel` fires
    pub async fn provision_mail_hosting_with_cancel(
        &self,
        workspace_id: &str,
        domain: &str,
        cancel: &CancellationToken,
    ) -> CoreResult<ProvisioningOutcome> {
        let name = DomainName::parse(domain)?;
        self.ctx.profile.check_tld(&name)?;
        let (record, _) = self.ctx.authorize(workspace_id, &name).await?;

        let result = self.run(&record, cancel).await;
        match &result {
            Ok(outcome) => log::info!(
                "Provisioned mail hosting for {name}: {} records written, {} discarded",
                outcome.records_written.len(),
                outcome.discarded_records.len()
            ),
            Err(e) if e.is_expected() => log::warn!("Provisioning {name} stopped: {e}"),
            Err(e) => log::error!("Provisioning {name} failed: {e}"),
        }
        result
    }

    /// Provision several domains, running at most `limit` flows at once.
    ///
    /// Returns one result per entry of `domains`. Names are compared after normalization;
    /// only the first spelling of a domain runs, later ones are reported as
    /// `ValidationError`. Rejected names come first, the rest in completion order.
    pub async fn provision_many(
        &self,
        workspace_id: &str,
        domains: &[String],
        limit: usize,
    ) -> Vec<(String, CoreResult<ProvisioningOutcome>)> {
        self.provision_many_with_cancel(workspace_id, domains, limit, &CancellationToken::new())
            .await
    }

    /// [`provision_many`](Self::provision_many) sharing one cancellation token
    pub async fn provision_many_with_cancel(
        &self,
        workspace_id: &str,
        domains: &[String],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<(String, CoreResult<ProvisioningOutcome>)> {
        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(domains.len());
        let mut queued = Vec::with_capacity(domains.len());
        for domain in domains {
            match DomainName::parse(domain) {
                Err(e) => results.push((domain.clone(), Err(e))),
                Ok(name) if !seen.insert(name.clone()) => {
                    log::warn!("Skipping {domain}: {name} is already in this batch");
                    results.push((
                        domain.clone(),
                        Err(CoreError::ValidationError(format!(
                            "{domain} duplicates {name} in the same batch"
                        ))),
                    ));
                }
                Ok(_) => queued.push(domain.clone()),
            }
        }

        let completed: Vec<_> = stream::iter(queued)
            .map(|domain| async move {
                let result = self
                    .provision_mail_hosting_with_cancel(workspace_id, &domain, cancel)
                    .await;
                (domain, result)
            })
            .buffer_unordered(limit.max(1))
            .collect()
            .await;
        results.extend(completed);
        results
    }

    async fn run(
        &self,
        record: &DomainRecord,
        cancel: &CancellationToken,
    ) -> CoreResult<ProvisioningOutcome> {
        let domain = record.domain_name.as_str();
        let registrar = &self.ctx.registrar;

        step(cancel, domain, ProvisioningStep::SetNameservers, async {
            match registrar.set_default_nameservers(domain).await {
                Err(e) if e.is_already_satisfied() => Ok(()),
                other => other,
            }
        })
        .await?;

        let current = step(
            cancel,
            domain,
            ProvisioningStep::FetchRecords,
            registrar.get_host_records(domain),
        )
        .await?;

        log::debug!("[{domain}] {}", ProvisioningStep::MailRecords);
        let mut additions = self.ctx.profile.mail_records();

        let auth = step(
            cancel,
            domain,
            ProvisioningStep::SendingDomainAuth,
            self.sending_domain_auth(domain),
        )
        .await?;
        additions.extend(auth.records);

        let branding = step(
            cancel,
            domain,
            ProvisioningStep::LinkBranding,
            self.link_branding(domain),
        )
        .await?;
        additions.extend(branding.records);

        let token = step(
            cancel,
            domain,
            ProvisioningStep::RegisterMailboxDomain,
            self.register_mailbox_domain(domain),
        )
        .await?;

        log::debug!("[{domain}] {}", ProvisioningStep::OwnershipRecord);
        match token {
            Some(token) => additions.push(self.ctx.profile.ownership_record(&token)),
            None => log::debug!("[{domain}] ownership already verified, no token to publish"),
        }

        let reconciliation =
            reconciler::reconcile(&current, &additions, &self.ctx.preserve_policy);

        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        log::debug!(
            "[{domain}] {}: {} records",
            ProvisioningStep::WriteRecords,
            reconciliation.records.len()
        );
        registrar
            .set_host_records(domain, &reconciliation.records)
            .await
            .map_err(|source| CoreError::ProvisioningFailed {
                step: ProvisioningStep::WriteRecords,
                source,
            })?;

        self.ctx
            .domain_repository
            .mark_mail_hosting_configured(&record.id)
            .await?;

        Ok(ProvisioningOutcome {
            domain: record.domain_name.clone(),
            records_written: reconciliation.records,
            discarded_records: reconciliation.discarded,
        })
    }

    /// Existing sending-domain authentication, created when missing
    async fn sending_domain_auth(&self, domain: &str) -> Result<AuthRecordSet, ProviderError> {
        let deliverability = &self.ctx.deliverability;
        if let Some(auth) = deliverability.get_sending_domain_auth(domain).await? {
            return Ok(auth);
        }
        match deliverability.create_sending_domain_auth(domain).await {
            Err(e) if e.is_already_satisfied() => deliverability
                .get_sending_domain_auth(domain)
                .await?
                .ok_or(e),
            other => other,
        }
    }

    /// Existing link branding, created when missing
    async fn link_branding(&self, domain: &str) -> Result<BrandingRecordSet, ProviderError> {
        let deliverability = &self.ctx.deliverability;
        if let Some(branding) = deliverability.get_link_branding(domain).await? {
            return Ok(branding);
        }
        let subdomain = &self.ctx.profile.branding_subdomain;
        match deliverability.create_link_branding(domain, subdomain).await {
            Err(e) if e.is_already_satisfied() => {
                deliverability.get_link_branding(domain).await?.ok_or(e)
            }
            other => other,
        }
    }

    /// Register the domain with the mailbox provider and return its ownership token.
    ///
    /// `None` when the domain was already registered and verified without a token.
    async fn register_mailbox_domain(&self, domain: &str) -> Result<Option<String>, ProviderError> {
        let mailbox = &self.ctx.mailbox;
        match mailbox.register_domain(domain).await {
            Ok(registered) => Ok(Some(registered.ownership_token)),
            Err(e) if e.is_already_satisfied() => {
                log::warn!("[{domain}] already registered with {}, reading token", e.provider());
                let info = mailbox.get_domain_info(domain).await?;
                match info.verification_token {
                    Some(token) => Ok(Some(token)),
                    None if info.ownership_verified => Ok(None),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// Run one adapter-backed step, racing it against `cancel`
async fn step<T>(
    cancel: &CancellationToken,
    domain: &str,
    step: ProvisioningStep,
    fut: impl Future<Output = Result<T, ProviderError>>,
) -> CoreResult<T> {
    log::debug!("[{domain}] {step}");
    match cancel.run_until_cancelled(fut).await {
        None => Err(CoreError::Cancelled),
        Some(Ok(value)) => Ok(value),
        Some(Err(source)) => Err(CoreError::ProvisioningFailed { step, source }),
    }
}
