//! Concrete adapter implementations

/// Shared utilities used by adapter implementations.
pub mod common;

#[cfg(feature = "godaddy")]
mod godaddy;
#[cfg(feature = "sendgrid")]
mod sendgrid;
#[cfg(feature = "zoho")]
mod zoho;

#[cfg(feature = "godaddy")]
pub use godaddy::{GoDaddyRegistrar, GoDaddyRegistrarBuilder};
#[cfg(feature = "sendgrid")]
pub use sendgrid::{SendGridDeliverability, SendGridDeliverabilityBuilder};
#[cfg(feature = "zoho")]
pub use zoho::{ZohoMailProvider, ZohoMailProviderBuilder};
