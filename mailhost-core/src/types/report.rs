//! Step identifiers and the reports returned by the provisioning and verification flows

use std::fmt;

use mailhost_provider::DnsHostRecord;
use serde::{Deserialize, Serialize};

use crate::types::DomainName;

/// Steps of the one-time mail-hosting setup, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningStep {
    SetNameservers,
    FetchRecords,
    MailRecords,
    SendingDomainAuth,
    LinkBranding,
    RegisterMailboxDomain,
    OwnershipRecord,
    WriteRecords,
    MarkConfigured,
}

impl ProvisioningStep {
    pub const ALL: [Self; 9] = [
        Self::SetNameservers,
        Self::FetchRecords,
        Self::MailRecords,
        Self::SendingDomainAuth,
        Self::LinkBranding,
        Self::RegisterMailboxDomain,
        Self::OwnershipRecord,
        Self::WriteRecords,
        Self::MarkConfigured,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetNameservers => "set_nameservers",
            Self::FetchRecords => "fetch_records",
            Self::MailRecords => "mail_records",
            Self::SendingDomainAuth => "sending_domain_auth",
            Self::LinkBranding => "link_branding",
            Self::RegisterMailboxDomain => "register_mailbox_domain",
            Self::OwnershipRecord => "ownership_record",
            Self::WriteRecords => "write_records",
            Self::MarkConfigured => "mark_configured",
        }
    }
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningOutcome {
    pub domain: DomainName,
    /// Full record set written to the registrar
    pub records_written: Vec<DnsHostRecord>,
    /// Pre-existing records no longer present after the write
    pub discarded_records: Vec<DnsHostRecord>,
}

/// Verification steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStep {
    Ownership,
    EmailHostingEnabled,
    #[serde(rename = "MXVerified")]
    MxVerified,
    #[serde(rename = "SPFVerified")]
    SpfVerified,
    #[serde(rename = "DKIMAdded")]
    DkimAdded,
    #[serde(rename = "DKIMVerified")]
    DkimVerified,
    DeliverabilityDomainValidated,
    LinkBrandingValidated,
}

impl VerificationStep {
    pub const ALL: [Self; 8] = [
        Self::Ownership,
        Self::EmailHostingEnabled,
        Self::MxVerified,
        Self::SpfVerified,
        Self::DkimAdded,
        Self::DkimVerified,
        Self::DeliverabilityDomainValidated,
        Self::LinkBrandingValidated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ownership => "Ownership",
            Self::EmailHostingEnabled => "EmailHostingEnabled",
            Self::MxVerified => "MXVerified",
            Self::SpfVerified => "SPFVerified",
            Self::DkimAdded => "DKIMAdded",
            Self::DkimVerified => "DKIMVerified",
            Self::DeliverabilityDomainValidated => "DeliverabilityDomainValidated",
            Self::LinkBrandingValidated => "LinkBrandingValidated",
        }
    }
}

impl fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracked state of a verification step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    NotAttempted,
    Succeeded,
    Failed,
}

/// One entry of the verification report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationProgress {
    pub name: VerificationStep,
    pub success: bool,
    pub message: String,
}

impl VerificationProgress {
    pub fn succeeded(name: VerificationStep, message: impl Into<String>) -> Self {
        Self {
            name,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(name: VerificationStep, message: impl Into<String>) -> Self {
        Self {
            name,
            success: false,
            message: message.into(),
        }
    }
}

/// Ordered outcome of a verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub domain: DomainName,
    pub steps: Vec<VerificationProgress>,
    /// Every step succeeded
    pub success: bool,
    /// The run stopped because its cancellation token fired
    pub cancelled: bool,
}

impl VerificationReport {
    pub(crate) fn new(domain: DomainName) -> Self {
        Self {
            domain,
            steps: Vec::with_capacity(VerificationStep::ALL.len()),
            success: false,
            cancelled: false,
        }
    }

    /// State of `step` in this run
    pub fn state(&self, step: VerificationStep) -> StepState {
        match self.steps.iter().find(|p| p.name == step) {
            Some(p) if p.success => StepState::Succeeded,
            Some(_) => StepState::Failed,
            None => StepState::NotAttempted,
        }
    }

    /// First failed entry, if any
    pub fn failure(&self) -> Option<&VerificationProgress> {
        self.steps.iter().find(|p| !p.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_state_lookup() {
        let mut report = VerificationReport::new(DomainName::parse("example.com").unwrap());
        report.steps.push(VerificationProgress::succeeded(
            VerificationStep::Ownership,
            "already verified",
        ));
        report.steps.push(VerificationProgress::failed(
            VerificationStep::EmailHostingEnabled,
            "boom",
        ));

        assert_eq!(report.state(VerificationStep::Ownership), StepState::Succeeded);
        assert_eq!(report.state(VerificationStep::EmailHostingEnabled), StepState::Failed);
        assert_eq!(report.state(VerificationStep::MxVerified), StepState::NotAttempted);
        assert_eq!(report.failure().unwrap().message, "boom");
    }

    #[test]
    fn step_names_serialize_like_display() {
        for step in VerificationStep::ALL {
            let json = serde_json::to_value(step).unwrap();
            assert_eq!(json, step.as_str());
        }
        assert_eq!(
            serde_json::to_value(ProvisioningStep::WriteRecords).unwrap(),
            "write_records"
        );
    }
}
