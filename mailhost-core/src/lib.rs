//! Mail-Hosting Core Library
//!
//! Brings a purchased domain to a mail-ready state by coordinating the registrar, the
//! mailbox hosting provider and the deliverability service:
//! - Provisioning Service (one-time DNS and mailbox-domain setup)
//! - Verification Service (ordered checks with a structured progress report)
//! - Domain Service (domain records, status lookup, DNS pass-through)
//!
//! Storage is abstracted through the repository traits and external systems through the
//! adapter traits of `mailhost-provider`, so the application layer injects both.

pub mod error;
pub mod reconciler;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use reconciler::{PreservePolicy, Reconciliation, reconcile};
pub use services::{DomainService, ProvisioningService, ServiceContext, VerificationService};
pub use traits::{DomainRepository, OrderRepository};
