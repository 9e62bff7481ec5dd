//! Domain record management service

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{DnsRecordSet, DomainName, DomainRecord};

/// Domain record management service
pub struct DomainService {
    ctx: Arc<ServiceContext>,
}

impl DomainService {
    /// Create a domain service instance
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Create the record for a domain bought through `order_id`.
    ///
    /// The order must be settled and the name must not be taken.
    pub async fn register_purchased_domain(
        &self,
        domain: &str,
        order_id: &str,
    ) -> CoreResult<DomainRecord> {
        let name = DomainName::parse(domain)?;
        self.ctx.profile.check_tld(&name)?;

        let order = self
            .ctx
            .order_repository
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::ValidationError(format!("unknown order {order_id}")))?;
        if !order.is_settled() {
            return Err(CoreError::OrderNotSettled(order.id));
        }

        if self.ctx.domain_repository.find_by_name(&name).await?.is_some() {
            return Err(CoreError::DomainAlreadyExists(name.to_string()));
        }

        let record = DomainRecord::new(name, Some(order.id));
        self.ctx.domain_repository.save(&record).await?;
        log::info!(
            "Registered purchased domain {} for workspace {}",
            record.domain_name,
            order.workspace_id
        );
        Ok(record)
    }

    /// Get a domain record by id, checking workspace ownership
    pub async fn get_domain_status(
        &self,
        workspace_id: &str,
        domain_id: &str,
    ) -> CoreResult<DomainRecord> {
        let record = self
            .ctx
            .domain_repository
            .find_by_id(domain_id)
            .await?
            .ok_or_else(|| CoreError::DomainNotFound(domain_id.to_string()))?;
        self.ctx.owning_order(workspace_id, &record).await?;
        Ok(record)
    }

    /// Domains of the workspace that have mail hosting configured, sorted by name
    pub async fn list_mail_hosting_domains(&self, workspace_id: &str) -> CoreResult<Vec<DomainRecord>> {
        let order_ids: Vec<String> = self
            .ctx
            .order_repository
            .list_by_workspace(workspace_id)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut records: Vec<DomainRecord> = self
            .ctx
            .domain_repository
            .find_by_order_ids(&order_ids)
            .await?
            .into_iter()
            .filter(|r| r.mail_hosting_configured)
            .collect();
        records.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        Ok(records)
    }

    /// Current host records of a domain owned by the workspace
    pub async fn get_dns_records(&self, workspace_id: &str, domain: &str) -> CoreResult<DnsRecordSet> {
        let name = DomainName::parse(domain)?;
        self.ctx.authorize(workspace_id, &name).await?;
        let records = self.ctx.registrar.get_host_records(name.as_str()).await?;
        Ok(DnsRecordSet::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Harness, settled_order};
    use crate::types::OrderStatus;
    use mailhost_provider::DnsHostRecord;

    #[tokio::test]
    async fn register_purchased_domain_creates_record() {
        let h = Harness::new();
        h.orders.insert(settled_order("o-1", "ws-1")).await;

        let record = h
            .domain_service()
            .register_purchased_domain("Shop.COM.", "o-1")
            .await
            .unwrap();

        assert_eq!(record.domain_name.as_str(), "shop.com");
        assert_eq!(record.order_id.as_deref(), Some("o-1"));
        assert!(!record.mail_hosting_configured && !record.verified);
        assert!(h.domains.get("shop.com").await.is_some());
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let h = Harness::new();
        h.orders.insert(settled_order("o-1", "ws-1")).await;
        let svc = h.domain_service();
        svc.register_purchased_domain("shop.com", "o-1").await.unwrap();

        let err = svc
            .register_purchased_domain("SHOP.com", "o-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DomainAlreadyExists(_)));
    }

    #[tokio::test]
    async fn register_requires_settled_order() {
        let h = Harness::new();
        let mut order = settled_order("o-2", "ws-1");
        order.payment_status = OrderStatus::Pending;
        h.orders.insert(order).await;

        let svc = h.domain_service();
        assert!(matches!(
            svc.register_purchased_domain("shop.com", "o-2").await,
            Err(CoreError::OrderNotSettled(_))
        ));
        assert!(matches!(
            svc.register_purchased_domain("shop.com", "o-404").await,
            Err(CoreError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn domain_status_is_workspace_scoped() {
        let h = Harness::new();
        let record = h.seed_domain("example.com", "ws-1", true).await;
        let svc = h.domain_service();

        let found = svc.get_domain_status("ws-1", &record.id).await.unwrap();
        assert!(found.mail_hosting_configured);
        assert!(matches!(
            svc.get_domain_status("ws-2", &record.id).await,
            Err(CoreError::PermissionDenied(_))
        ));
        assert!(matches!(
            svc.get_domain_status("ws-1", "missing-id").await,
            Err(CoreError::DomainNotFound(_))
        ));
    }

    #[tokio::test]
    async fn lists_only_configured_domains_of_workspace() {
        let h = Harness::new();
        h.seed_domain("b-shop.com", "ws-1", true).await;
        h.seed_domain("a-shop.com", "ws-1", true).await;
        h.seed_domain("pending.com", "ws-1", false).await;
        h.seed_domain("other.com", "ws-2", true).await;

        let names: Vec<String> = h
            .domain_service()
            .list_mail_hosting_domains("ws-1")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.domain_name.to_string())
            .collect();
        assert_eq!(names, vec!["a-shop.com", "b-shop.com"]);
        assert!(
            h.domain_service()
                .list_mail_hosting_domains("ws-empty")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn dns_records_pass_through_after_guard() {
        let h = Harness::new();
        h.seed_domain("example.com", "ws-1", false).await;
        h.registrar
            .set_records("example.com", vec![DnsHostRecord::cname("blog", "x.net")])
            .await;
        let svc = h.domain_service();

        let records = svc.get_dns_records("ws-1", "example.com").await.unwrap();
        assert_eq!(records.len(), 1);

        assert!(matches!(
            svc.get_dns_records("ws-2", "example.com").await,
            Err(CoreError::PermissionDenied(_))
        ));
        assert_eq!(h.registrar.script.calls("get_host_records").await, 1);
    }
}
