//! Purchase orders (read-only here)

use serde::{Deserialize, Serialize};

/// Status of a payment or domain purchase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Purchase order that owns a domain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Workspace that placed the order
    pub workspace_id: String,
    pub payment_status: OrderStatus,
    pub domain_purchase_status: OrderStatus,
}

impl Order {
    /// Both the payment and the domain purchase succeeded
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.payment_status == OrderStatus::Succeeded
            && self.domain_purchase_status == OrderStatus::Succeeded
    }
}
