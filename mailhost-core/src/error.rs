//! Unified error type for the mail-hosting workflows

use serde::Serialize;
use thiserror::Error;

pub use mailhost_provider::{CredentialValidationError, ProviderError};

use crate::types::ProvisioningStep;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// No domain record with this name or id
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// The requesting workspace does not own the domain's order
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Payment or domain purchase of the owning order has not succeeded
    #[error("Order not settled: {0}")]
    OrderNotSettled(String),

    /// Malformed domain name
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    /// TLD outside the mail-hosting allow-list
    #[error("Unsupported TLD: {0}")]
    UnsupportedTld(String),

    /// Verification requested before provisioning completed
    #[error("Mail hosting is not provisioned for {0}")]
    NotProvisioned(String),

    /// A domain record with this name already exists
    #[error("Domain already exists: {0}")]
    DomainAlreadyExists(String),

    /// A provisioning step failed; remaining steps were not run
    #[error("Provisioning failed at {step}: {source}")]
    ProvisioningFailed {
        step: ProvisioningStep,
        source: ProviderError,
    },

    /// The run was cancelled before committing
    #[error("Operation cancelled")]
    Cancelled,

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Provider error outside a step-tracked flow
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether the error is expected behavior (user input, missing resource, ...).
    ///
    /// Log with `warn` when this returns `true` and `error` otherwise.
    /// Update this method when new variants are added.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::DomainNotFound(_)
            | Self::PermissionDenied(_)
            | Self::OrderNotSettled(_)
            | Self::InvalidDomainName(_)
            | Self::UnsupportedTld(_)
            | Self::NotProvisioned(_)
            | Self::DomainAlreadyExists(_)
            | Self::ValidationError(_)
            | Self::Cancelled => true,
            Self::ProvisioningFailed { source, .. } | Self::Provider(source) => source.is_expected(),
            Self::StorageError(_) => false,
        }
    }

    /// Failed provisioning step, if any
    #[must_use]
    pub fn failed_step(&self) -> Option<ProvisioningStep> {
        match self {
            Self::ProvisioningFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
