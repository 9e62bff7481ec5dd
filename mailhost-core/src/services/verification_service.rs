//! Mail-hosting verification flow

use std::sync::Arc;

use mailhost_provider::{DkimKey, MailboxDomainInfo, ProviderError, ValidationOutcome};
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    DomainName, DomainRecord, VerificationProgress, VerificationReport, VerificationStep,
};

/// Outcome of one step: success message or failure message
type StepResult = Result<String, String>;

/// State carried between steps of one run
#[derive(Default)]
struct RunState {
    /// Mailbox snapshot taken during the ownership step
    snapshot: Option<MailboxDomainInfo>,
    /// DKIM key for the configured selector
    dkim_key: Option<DkimKey>,
}

/// Verification service
///
/// Steps run in [`VerificationStep::ALL`] order and stop at the first failure. Checks the
/// provider already reports as satisfied are recorded as succeeded without calling it.
pub struct VerificationService {
    ctx: Arc<ServiceContext>,
}

impl VerificationService {
    /// Create a verification service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Verify mail hosting for a provisioned domain owned by `workspace_id`
    pub async fn verify_mail_hosting(
        &self,
        workspace_id: &str,
        domain: &str,
    ) -> CoreResult<VerificationReport> {
        self.verify_mail_hosting_with_cancel(workspace_id, domain, &CancellationToken::new())
            .await
    }

    /// Verify mail hosting; a fired `cancel` ends the run with a partial report
    pub async fn verify_mail_hosting_with_cancel(
        &self,
        workspace_id: &str,
        domain: &str,
        cancel: &CancellationToken,
    ) -> CoreResult<VerificationReport> {
        let name = DomainName::parse(domain)?;
        let (record, _) = self.ctx.authorize(workspace_id, &name).await?;
        if !record.mail_hosting_configured {
            return Err(CoreError::NotProvisioned(name.to_string()));
        }

        let report = self.run(&record, cancel).await;

        if report.success {
            self.ctx.domain_repository.mark_verified(&record.id).await?;
            log::info!("Mail hosting verified for {name}");
        } else if report.cancelled {
            log::warn!("Verification of {name} cancelled after {} steps", report.steps.len());
        } else if let Some(failed) = report.failure() {
            log::warn!("Verification of {name} failed at {}: {}", failed.name, failed.message);
        }
        Ok(report)
    }

    async fn run(&self, record: &DomainRecord, cancel: &CancellationToken) -> VerificationReport {
        let domain = record.domain_name.as_str();
        let mut report = VerificationReport::new(record.domain_name.clone());
        let mut state = RunState::default();

        for step in VerificationStep::ALL {
            log::debug!("[{domain}] {step}");
            let Some(result) = cancel
                .run_until_cancelled(self.execute(step, domain, &mut state))
                .await
            else {
                report.cancelled = true;
                return report;
            };

            match result {
                Ok(message) => report.steps.push(VerificationProgress::succeeded(step, message)),
                Err(message) => {
                    report.steps.push(VerificationProgress::failed(step, message));
                    return report;
                }
            }
        }

        report.success = true;
        report
    }

    async fn execute(
        &self,
        step: VerificationStep,
        domain: &str,
        state: &mut RunState,
    ) -> StepResult {
        let mailbox = &self.ctx.mailbox;
        match step {
            VerificationStep::Ownership => {
                let info = mailbox
                    .get_domain_info(domain)
                    .await
                    .map_err(|e| format!("could not read mailbox domain: {}", e.provider_message()))?;
                let verified = info.ownership_verified;
                state.snapshot = Some(info);
                if verified {
                    return Ok("ownership already verified".to_string());
                }
                settle(mailbox.verify_ownership(domain).await, "ownership verified")
            }
            VerificationStep::EmailHostingEnabled => {
                if snapshot(state)?.hosting_enabled {
                    return Ok("mail hosting already enabled".to_string());
                }
                settle(mailbox.enable_hosting(domain).await, "mail hosting enabled")
            }
            VerificationStep::MxVerified => {
                if snapshot(state)?.mx_verified {
                    return Ok("MX already verified".to_string());
                }
                settle(mailbox.verify_mx(domain).await, "MX verified")
            }
            VerificationStep::SpfVerified => {
                if snapshot(state)?.spf_verified {
                    return Ok("SPF already verified".to_string());
                }
                settle(mailbox.verify_spf(domain).await, "SPF verified")
            }
            VerificationStep::DkimAdded => self.add_dkim(domain, state).await,
            VerificationStep::DkimVerified => {
                let key = state
                    .dkim_key
                    .as_ref()
                    .ok_or_else(|| "no DKIM key to verify".to_string())?;
                if key.verified {
                    return Ok(format!("DKIM key {} already verified", key.selector));
                }
                settle(
                    mailbox.verify_dkim_key(domain, &key.id).await,
                    "DKIM key verified",
                )
            }
            VerificationStep::DeliverabilityDomainValidated => {
                let deliverability = &self.ctx.deliverability;
                let auth = deliverability
                    .get_sending_domain_auth(domain)
                    .await
                    .map_err(|e| e.provider_message())?
                    .ok_or_else(|| format!("no sending domain authentication for {domain}"))?;
                if auth.valid {
                    return Ok("sending domain already authenticated".to_string());
                }
                validated(
                    deliverability.validate_sending_domain_auth(&auth.id).await,
                    "sending domain authenticated",
                )
            }
            VerificationStep::LinkBrandingValidated => {
                let deliverability = &self.ctx.deliverability;
                let branding = deliverability
                    .get_link_branding(domain)
                    .await
                    .map_err(|e| e.provider_message())?
                    .ok_or_else(|| format!("no link branding for {domain}"))?;
                if branding.valid {
                    return Ok("link branding already valid".to_string());
                }
                validated(
                    deliverability.validate_link_branding(&branding.id).await,
                    "link branding validated",
                )
            }
        }
    }

    /// Reuse the snapshot's key for the selector, or create one
    async fn add_dkim(&self, domain: &str, state: &mut RunState) -> StepResult {
        let selector = &self.ctx.profile.dkim_selector;
        if let Some(key) = snapshot(state)?.dkim_key(selector) {
            state.dkim_key = Some(key.clone());
            return Ok(format!("DKIM key {selector} already present"));
        }

        let mailbox = &self.ctx.mailbox;
        match mailbox.add_dkim_key(domain, selector).await {
            Ok(key) => {
                state.dkim_key = Some(key);
                Ok(format!("DKIM key {selector} added"))
            }
            Err(e) if e.is_already_satisfied() => {
                log::warn!("[{domain}] DKIM key {selector} exists, re-reading domain info");
                let info = mailbox
                    .get_domain_info(domain)
                    .await
                    .map_err(|e| e.provider_message())?;
                let key = info
                    .dkim_key(selector)
                    .cloned()
                    .ok_or_else(|| format!("DKIM key {selector} reported as existing but not found"))?;
                state.dkim_key = Some(key);
                state.snapshot = Some(info);
                Ok(format!("DKIM key {selector} already present"))
            }
            Err(e) => Err(e.provider_message()),
        }
    }
}

fn snapshot(state: &RunState) -> Result<&MailboxDomainInfo, String> {
    state
        .snapshot
        .as_ref()
        .ok_or_else(|| "mailbox domain snapshot unavailable".to_string())
}

/// Map a mutating call; "already satisfied" counts as success
fn settle(result: Result<(), ProviderError>, done: &str) -> StepResult {
    match result {
        Ok(()) => Ok(done.to_string()),
        Err(e) if e.is_already_satisfied() => Ok(format!("{done} (already satisfied)")),
        Err(e) => Err(e.provider_message()),
    }
}

fn validated(result: Result<ValidationOutcome, ProviderError>, done: &str) -> StepResult {
    match result {
        Ok(outcome) if outcome.valid => Ok(done.to_string()),
        Ok(outcome) if outcome.reasons.is_empty() => Err("validation failed".to_string()),
        Ok(outcome) => Err(outcome.reasons.join("; ")),
        Err(e) if e.is_already_satisfied() => Ok(format!("{done} (already satisfied)")),
        Err(e) => Err(e.provider_message()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_utils::{Harness, network_error};
    use crate::types::StepState;

    async fn provisioned(h: &Harness) {
        h.seed_domain("example.com", "ws-1", false).await;
        h.provisioning()
            .provision_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_domain_verifies_all_steps() {
        let h = Harness::new();
        provisioned(&h).await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();

        assert!(report.success, "{report:?}");
        assert!(!report.cancelled);
        assert_eq!(report.steps.len(), 8);
        let names: Vec<_> = report.steps.iter().map(|p| p.name).collect();
        assert_eq!(names, VerificationStep::ALL.to_vec());
        assert!(h.domains.get("example.com").await.unwrap().verified);
        assert_eq!(h.mailbox.script.calls("add_dkim_key").await, 1);
        assert_eq!(h.mailbox.script.calls("verify_dkim_key").await, 1);
    }

    #[tokio::test]
    async fn mx_failure_stops_after_three_entries() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox.script.fail("verify_mx", network_error()).await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();

        assert!(!report.success);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.state(VerificationStep::MxVerified), StepState::Failed);
        assert_eq!(report.state(VerificationStep::SpfVerified), StepState::NotAttempted);
        assert!(!report.steps[2].message.is_empty());
        assert_eq!(h.mailbox.script.calls("verify_spf").await, 0);
        assert!(!h.domains.get("example.com").await.unwrap().verified);
    }

    #[tokio::test]
    async fn verified_ownership_is_not_rechecked() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox
            .update("example.com", |info| info.ownership_verified = true)
            .await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();

        assert_eq!(h.mailbox.script.calls("verify_ownership").await, 0);
        assert_eq!(report.state(VerificationStep::Ownership), StepState::Succeeded);
        assert!(report.steps[0].message.contains("already"));
    }

    #[tokio::test]
    async fn already_configured_error_counts_as_success() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox
            .script
            .fail(
                "enable_hosting",
                ProviderError::AlreadyConfigured {
                    provider: "fake".to_string(),
                    action: "enableMailHosting".to_string(),
                    raw_message: None,
                },
            )
            .await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
        assert!(report.success);
        assert_eq!(
            report.state(VerificationStep::EmailHostingEnabled),
            StepState::Succeeded
        );
    }

    #[tokio::test]
    async fn existing_dkim_key_is_reused() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox
            .update("example.com", |info| {
                info.dkim_keys.push(DkimKey {
                    id: "k-1".to_string(),
                    selector: "zmail".to_string(),
                    public_key: None,
                    verified: true,
                });
            })
            .await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
        assert!(report.success);
        assert_eq!(h.mailbox.script.calls("add_dkim_key").await, 0);
        assert_eq!(h.mailbox.script.calls("verify_dkim_key").await, 0);
    }

    #[tokio::test]
    async fn dkim_already_exists_rereads_info() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox.hide_next_dkim_key("example.com").await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
        assert!(report.success, "{report:?}");
        // snapshot plus the re-read after AlreadyExists
        assert_eq!(h.mailbox.script.calls("get_domain_info").await, 2);
        assert_eq!(h.mailbox.script.calls("verify_dkim_key").await, 1);
    }

    #[tokio::test]
    async fn deliverability_validation_reasons_reported() {
        let h = Harness::new();
        provisioned(&h).await;
        h.deliverability
            .reject_validation(vec!["mail_cname: record not found".to_string()])
            .await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
        let failed = report.failure().unwrap();
        assert_eq!(failed.name, VerificationStep::DeliverabilityDomainValidated);
        assert_eq!(failed.message, "mail_cname: record not found");
        assert_eq!(report.steps.len(), 7);
    }

    #[tokio::test]
    async fn missing_branding_fails_last_step() {
        let h = Harness::new();
        provisioned(&h).await;
        h.deliverability.forget_branding("example.com").await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
        assert_eq!(
            report.state(VerificationStep::LinkBrandingValidated),
            StepState::Failed
        );
        assert!(!h.domains.get("example.com").await.unwrap().verified);
    }

    #[tokio::test]
    async fn snapshot_failure_fails_ownership() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox.script.fail("get_domain_info", network_error()).await;

        let report = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.state(VerificationStep::Ownership), StepState::Failed);
    }

    #[tokio::test]
    async fn unprovisioned_domain_is_rejected_without_calls() {
        let h = Harness::new();
        h.seed_domain("example.com", "ws-1", false).await;

        let err = h
            .verification()
            .verify_mail_hosting("ws-1", "example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotProvisioned(_)));
        assert_eq!(h.total_adapter_calls().await, 0);
    }

    #[tokio::test]
    async fn foreign_workspace_is_rejected() {
        let h = Harness::new();
        h.seed_domain("example.com", "ws-1", true).await;

        let err = h
            .verification()
            .verify_mail_hosting("ws-2", "example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PermissionDenied(_)));
        assert_eq!(h.total_adapter_calls().await, 0);
    }

    #[tokio::test]
    async fn cancelled_run_returns_partial_report() {
        let h = Harness::new();
        provisioned(&h).await;
        h.mailbox
            .script
            .delay("verify_mx", Duration::from_millis(200))
            .await;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let report = h
            .verification()
            .verify_mail_hosting_with_cancel("ws-1", "example.com", &cancel)
            .await
            .unwrap();
        assert!(report.cancelled);
        assert!(!report.success);
        assert_eq!(report.steps.len(), 2);
        assert!(!h.domains.get("example.com").await.unwrap().verified);
    }

    #[tokio::test]
    async fn rerun_after_success_stays_verified() {
        let h = Harness::new();
        provisioned(&h).await;
        let svc = h.verification();
        assert!(svc.verify_mail_hosting("ws-1", "example.com").await.unwrap().success);

        let second = svc.verify_mail_hosting("ws-1", "example.com").await.unwrap();
        assert!(second.success);
        assert!(second.steps.iter().all(|p| p.message.contains("already")));
    }
}
