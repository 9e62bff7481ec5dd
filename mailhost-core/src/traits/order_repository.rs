//! Order lookup abstraction trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::Order;

/// Read-only view of purchase orders.
///
/// Orders are owned by the billing side; this subsystem only resolves ownership and
/// settlement through them.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Get order based on ID
    ///
    /// # Arguments
    /// * `id` - Order ID
    ///
    /// # Returns
    /// * `Some(order)` - order found
    /// * `None` - no such order
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>>;

    /// All orders placed by a workspace
    async fn list_by_workspace(&self, workspace_id: &str) -> CoreResult<Vec<Order>>;
}
