//! Domain record persistence abstraction trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{DomainName, DomainRecord};

/// Domain record repository trait.
///
/// Implementations must keep `domain_name` unique. The `mark_*` methods only ever set
/// a flag to `true`.
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Get domain record based on ID
    ///
    /// # Arguments
    /// * `id` - Record ID
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<DomainRecord>>;

    /// Get domain record by its normalized name
    ///
    /// # Arguments
    /// * `name` - Domain name
    async fn find_by_name(&self, name: &DomainName) -> CoreResult<Option<DomainRecord>>;

    /// Get all domain records belonging to any of the given orders
    ///
    /// # Arguments
    /// * `order_ids` - Order ID list
    async fn find_by_order_ids(&self, order_ids: &[String]) -> CoreResult<Vec<DomainRecord>>;

    /// Save domain record (create or update)
    async fn save(&self, record: &DomainRecord) -> CoreResult<()>;

    /// Set `mail_hosting_configured` for a record
    ///
    /// # Arguments
    /// * `id` - Record ID
    async fn mark_mail_hosting_configured(&self, id: &str) -> CoreResult<()>;

    /// Set `verified` for a record
    ///
    /// # Arguments
    /// * `id` - Record ID
    async fn mark_verified(&self, id: &str) -> CoreResult<()>;
}
