//! In-memory repositories
//!
//! Process-local storage for embedding and tests. Orders are pushed in by the caller
//! (the billing side owns them).

use std::collections::HashMap;

use async_trait::async_trait;
use mailhost_core::error::{CoreError, CoreResult};
use mailhost_core::traits::{DomainRepository, OrderRepository};
use mailhost_core::types::{DomainName, DomainRecord, Order};
use tokio::sync::RwLock;

/// Domain records keyed by id, with a unique name index
#[derive(Default)]
pub struct InMemoryDomainRepository {
    records: RwLock<HashMap<String, DomainRecord>>,
    by_name: RwLock<HashMap<DomainName, String>>,
}

impl InMemoryDomainRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn update(
        &self,
        id: &str,
        f: impl FnOnce(&mut DomainRecord) -> CoreResult<()>,
    ) -> CoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        f(record)
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<DomainRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &DomainName) -> CoreResult<Option<DomainRecord>> {
        let Some(id) = self.by_name.read().await.get(name).cloned() else {
            return Ok(None);
        };
        self.find_by_id(&id).await
    }

    async fn find_by_order_ids(&self, order_ids: &[String]) -> CoreResult<Vec<DomainRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.order_id.as_ref().is_some_and(|id| order_ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn save(&self, record: &DomainRecord) -> CoreResult<()> {
        let mut by_name = self.by_name.write().await;
        if let Some(existing) = by_name.get(&record.domain_name)
            && existing != &record.id
        {
            return Err(CoreError::DomainAlreadyExists(record.domain_name.to_string()));
        }

        let mut records = self.records.write().await;
        if let Some(previous) = records.get(&record.id)
            && previous.domain_name != record.domain_name
        {
            by_name.remove(&previous.domain_name);
        }
        by_name.insert(record.domain_name.clone(), record.id.clone());
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn mark_mail_hosting_configured(&self, id: &str) -> CoreResult<()> {
        self.update(id, |record| {
            record.mark_mail_hosting_configured();
            Ok(())
        })
        .await
    }

    async fn mark_verified(&self, id: &str) -> CoreResult<()> {
        self.update(id, |record| record.mark_verified().map(|_| ())).await
    }
}

/// Orders keyed by id
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an order
    pub async fn upsert(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn list_by_workspace(&self, workspace_id: &str) -> CoreResult<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.workspace_id == workspace_id)
            .cloned()
            .collect())
    }
}
