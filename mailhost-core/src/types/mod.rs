//! Type definitions

mod domain;
mod order;
mod profile;
mod record_set;
mod report;

pub use domain::{DomainName, DomainRecord};
pub use order::{Order, OrderStatus};
pub use profile::{MailHostingProfile, MxExchanger};
pub use record_set::{DnsRecordSet, RecordDiff};
pub use report::{
    ProvisioningOutcome, ProvisioningStep, StepState, VerificationProgress, VerificationReport,
    VerificationStep,
};

// Re-export provider value types used across the core API
pub use mailhost_provider::{
    AuthRecordSet, BrandingRecordSet, DkimKey, DnsHostRecord, DnsRecordType, MailboxDomainInfo,
    ValidationOutcome,
};
