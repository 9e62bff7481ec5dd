//! Test helpers
//!
//! In-memory repositories, scripted fake adapters and a harness wiring them into a
//! [`ServiceContext`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mailhost_provider::{
    AuthRecordSet, BrandingRecordSet, DeliverabilityAdapter, DkimKey, DnsHostRecord,
    MailboxDomainInfo, MailboxProviderAdapter, ProviderError, RegisteredDomain, RegistrarAdapter,
    ValidationOutcome,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::{DomainService, ProvisioningService, ServiceContext, VerificationService};
use crate::traits::{DomainRepository, OrderRepository};
use crate::types::{DomainName, DomainRecord, Order, OrderStatus};

type ProviderResult<T> = Result<T, ProviderError>;

pub fn settled_order(id: &str, workspace_id: &str) -> Order {
    Order {
        id: id.to_string(),
        workspace_id: workspace_id.to_string(),
        payment_status: OrderStatus::Succeeded,
        domain_purchase_status: OrderStatus::Succeeded,
    }
}

pub fn network_error() -> ProviderError {
    ProviderError::NetworkError {
        provider: "fake".to_string(),
        detail: "connection reset".to_string(),
    }
}

fn already_exists(resource: &str) -> ProviderError {
    ProviderError::AlreadyExists {
        provider: "fake".to_string(),
        resource: resource.to_string(),
        raw_message: None,
    }
}

// ===== Script =====

/// Per-operation call counters, scripted failures and delays
#[derive(Default)]
pub struct Script {
    calls: RwLock<HashMap<&'static str, usize>>,
    failures: RwLock<HashMap<&'static str, ProviderError>>,
    delays: RwLock<HashMap<&'static str, Duration>>,
    in_flight: RwLock<HashMap<&'static str, Arc<AtomicUsize>>>,
    peaks: RwLock<HashMap<&'static str, usize>>,
}

impl Script {
    /// Make every following call of `op` fail with `err`
    pub async fn fail(&self, op: &'static str, err: ProviderError) {
        self.failures.write().await.insert(op, err);
    }

    /// Delay every following call of `op`
    pub async fn delay(&self, op: &'static str, delay: Duration) {
        self.delays.write().await.insert(op, delay);
    }

    pub async fn calls(&self, op: &str) -> usize {
        self.calls.read().await.get(op).copied().unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        self.calls.read().await.values().sum()
    }

    /// Highest number of concurrent calls of `op` observed
    pub async fn peak(&self, op: &str) -> usize {
        self.peaks.read().await.get(op).copied().unwrap_or(0)
    }

    async fn hit(&self, op: &'static str) -> ProviderResult<()> {
        *self.calls.write().await.entry(op).or_insert(0) += 1;

        let delay = self.delays.read().await.get(op).copied();
        if let Some(delay) = delay {
            let gauge = Arc::clone(
                self.in_flight
                    .write()
                    .await
                    .entry(op)
                    .or_insert_with(|| Arc::new(AtomicUsize::new(0))),
            );
            let now = gauge.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut peaks = self.peaks.write().await;
                let peak = peaks.entry(op).or_insert(0);
                *peak = (*peak).max(now);
            }
            tokio::time::sleep(delay).await;
            gauge.fetch_sub(1, Ordering::SeqCst);
        }

        match self.failures.read().await.get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

// ===== InMemoryDomainRepository =====

#[derive(Default)]
pub struct InMemoryDomainRepository {
    records: RwLock<HashMap<String, DomainRecord>>,
}

impl InMemoryDomainRepository {
    pub async fn insert(&self, record: DomainRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn get(&self, name: &str) -> Option<DomainRecord> {
        self.records
            .read()
            .await
            .values()
            .find(|r| r.domain_name.as_str() == name)
            .cloned()
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<DomainRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &DomainName) -> CoreResult<Option<DomainRecord>> {
        Ok(self.get(name.as_str()).await)
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
        let mut store = self.records.write().await;
        let taken = store
            .values()
            .any(|r| r.domain_name == record.domain_name && r.id != record.id);
        if taken {
            return Err(CoreError::DomainAlreadyExists(record.domain_name.to_string()));
        }
        store.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn mark_mail_hosting_configured(&self, id: &str) -> CoreResult<()> {
        let mut store = self.records.write().await;
        let record = store
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        record.mark_mail_hosting_configured();
        Ok(())
    }

    async fn mark_verified(&self, id: &str) -> CoreResult<()> {
        let mut store = self.records.write().await;
        let record = store
            .get_mut(id)
            .ok_or_else(|| CoreError::DomainNotFound(id.to_string()))?;
        record.mark_verified()?;
        Ok(())
    }
}

// ===== InMemoryOrderRepository =====

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    pub async fn insert(&self, order: Order) {
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

// ===== FakeRegistrar =====

#[derive(Default)]
pub struct FakeRegistrar {
    pub script: Script,
    zones: RwLock<HashMap<String, Vec<DnsHostRecord>>>,
}

impl FakeRegistrar {
    pub async fn set_records(&self, domain: &str, records: Vec<DnsHostRecord>) {
        self.zones.write().await.insert(domain.to_string(), records);
    }

    pub async fn records(&self, domain: &str) -> Vec<DnsHostRecord> {
        self.zones
            .read()
            .await
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RegistrarAdapter for FakeRegistrar {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn get_host_records(&self, domain: &str) -> ProviderResult<Vec<DnsHostRecord>> {
        self.script.hit("get_host_records").await?;
        Ok(self.records(domain).await)
    }

    async fn set_host_records(&self, domain: &str, records: &[DnsHostRecord]) -> ProviderResult<()> {
        self.script.hit("set_host_records").await?;
        self.set_records(domain, records.to_vec()).await;
        Ok(())
    }

    async fn set_default_nameservers(&self, _domain: &str) -> ProviderResult<()> {
        self.script.hit("set_default_nameservers").await
    }
}

// ===== FakeMailbox =====

#[derive(Default)]
pub struct FakeMailbox {
    pub script: Script,
    domains: RwLock<HashMap<String, MailboxDomainInfo>>,
    hide_dkim_once: RwLock<HashSet<String>>,
}

impl FakeMailbox {
    fn token(domain: &str) -> String {
        format!(
            "zoho-verification=zb-{}.zmverify.zoho.com",
            domain.replace('.', "-")
        )
    }

    /// Register `domain` out of band, as a previous run would have
    pub async fn preregister(&self, domain: &str) {
        self.domains.write().await.insert(
            domain.to_string(),
            MailboxDomainInfo {
                domain: domain.to_string(),
                verification_token: Some(Self::token(domain)),
                ..Default::default()
            },
        );
    }

    pub async fn update(&self, domain: &str, f: impl FnOnce(&mut MailboxDomainInfo)) {
        if let Some(info) = self.domains.write().await.get_mut(domain) {
            f(info);
        }
    }

    /// Create a DKIM key that the next `get_domain_info` does not show
    pub async fn hide_next_dkim_key(&self, domain: &str) {
        self.update(domain, |info| {
            info.dkim_keys.push(DkimKey {
                id: "k-hidden".to_string(),
                selector: "zmail".to_string(),
                public_key: None,
                verified: false,
            });
        })
        .await;
        self.hide_dkim_once.write().await.insert(domain.to_string());
    }

    async fn with_domain<T>(
        &self,
        domain: &str,
        f: impl FnOnce(&mut MailboxDomainInfo) -> T,
    ) -> ProviderResult<T> {
        let mut domains = self.domains.write().await;
        let info = domains
            .get_mut(domain)
            .ok_or_else(|| ProviderError::DomainNotFound {
                provider: "fake".to_string(),
                domain: domain.to_string(),
                raw_message: None,
            })?;
        Ok(f(info))
    }
}

#[async_trait]
impl MailboxProviderAdapter for FakeMailbox {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn register_domain(&self, domain: &str) -> ProviderResult<RegisteredDomain> {
        self.script.hit("register_domain").await?;
        if self.domains.read().await.contains_key(domain) {
            return Err(already_exists(domain));
        }
        self.preregister(domain).await;
        Ok(RegisteredDomain {
            domain: domain.to_string(),
            ownership_token: Self::token(domain),
        })
    }

    async fn enable_hosting(&self, domain: &str) -> ProviderResult<()> {
        self.script.hit("enable_hosting").await?;
        self.with_domain(domain, |i| i.hosting_enabled = true).await
    }

    async fn verify_ownership(&self, domain: &str) -> ProviderResult<()> {
        self.script.hit("verify_ownership").await?;
        self.with_domain(domain, |i| i.ownership_verified = true).await
    }

    async fn verify_mx(&self, domain: &str) -> ProviderResult<()> {
        self.script.hit("verify_mx").await?;
        self.with_domain(domain, |i| i.mx_verified = true).await
    }

    async fn verify_spf(&self, domain: &str) -> ProviderResult<()> {
        self.script.hit("verify_spf").await?;
        self.with_domain(domain, |i| i.spf_verified = true).await
    }

    async fn get_domain_info(&self, domain: &str) -> ProviderResult<MailboxDomainInfo> {
        self.script.hit("get_domain_info").await?;
        let mut info = self.with_domain(domain, |i| i.clone()).await?;
        if self.hide_dkim_once.write().await.remove(domain) {
            info.dkim_keys.clear();
        }
        Ok(info)
    }

    async fn add_dkim_key(&self, domain: &str, selector: &str) -> ProviderResult<DkimKey> {
        self.script.hit("add_dkim_key").await?;
        self.with_domain(domain, |i| {
            if i.dkim_key(selector).is_some() {
                return Err(already_exists(selector));
            }
            let key = DkimKey {
                id: format!("k-{}", i.dkim_keys.len() + 1),
                selector: selector.to_string(),
                public_key: Some("v=DKIM1; k=rsa; p=MIGf".to_string()),
                verified: false,
            };
            i.dkim_keys.push(key.clone());
            Ok(key)
        })
        .await?
    }

    async fn verify_dkim_key(&self, domain: &str, key_id: &str) -> ProviderResult<()> {
        self.script.hit("verify_dkim_key").await?;
        self.with_domain(domain, |i| {
            for key in i.dkim_keys.iter_mut().filter(|k| k.id == key_id) {
                key.verified = true;
            }
        })
        .await
    }
}

// ===== FakeDeliverability =====

#[derive(Default)]
pub struct FakeDeliverability {
    pub script: Script,
    auth: RwLock<HashMap<String, AuthRecordSet>>,
    branding: RwLock<HashMap<String, BrandingRecordSet>>,
    rejection: RwLock<Option<Vec<String>>>,
}

impl FakeDeliverability {
    /// Make sending-domain validation report `reasons`
    pub async fn reject_validation(&self, reasons: Vec<String>) {
        *self.rejection.write().await = Some(reasons);
    }

    pub async fn forget_branding(&self, domain: &str) {
        self.branding.write().await.remove(domain);
    }
}

#[async_trait]
impl DeliverabilityAdapter for FakeDeliverability {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn get_sending_domain_auth(&self, domain: &str) -> ProviderResult<Option<AuthRecordSet>> {
        self.script.hit("get_sending_domain_auth").await?;
        Ok(self.auth.read().await.get(domain).cloned())
    }

    async fn create_sending_domain_auth(&self, domain: &str) -> ProviderResult<AuthRecordSet> {
        self.script.hit("create_sending_domain_auth").await?;
        let mut auth = self.auth.write().await;
        if auth.contains_key(domain) {
            return Err(already_exists(domain));
        }
        let set = AuthRecordSet {
            id: format!("auth-{domain}"),
            domain: domain.to_string(),
            records: vec![
                DnsHostRecord::cname("em1234", "u99.wl.sendgrid.net"),
                DnsHostRecord::cname("s1._domainkey", "s1.domainkey.u99.wl.sendgrid.net"),
                DnsHostRecord::cname("s2._domainkey", "s2.domainkey.u99.wl.sendgrid.net"),
            ],
            valid: false,
        };
        auth.insert(domain.to_string(), set.clone());
        Ok(set)
    }

    async fn validate_sending_domain_auth(&self, id: &str) -> ProviderResult<ValidationOutcome> {
        self.script.hit("validate_sending_domain_auth").await?;
        if let Some(reasons) = self.rejection.read().await.clone() {
            return Ok(ValidationOutcome {
                valid: false,
                reasons,
            });
        }
        for set in self.auth.write().await.values_mut().filter(|s| s.id == id) {
            set.valid = true;
        }
        Ok(ValidationOutcome {
            valid: true,
            reasons: vec![],
        })
    }

    async fn get_link_branding(&self, domain: &str) -> ProviderResult<Option<BrandingRecordSet>> {
        self.script.hit("get_link_branding").await?;
        Ok(self.branding.read().await.get(domain).cloned())
    }

    async fn create_link_branding(
        &self,
        domain: &str,
        subdomain: &str,
    ) -> ProviderResult<BrandingRecordSet> {
        self.script.hit("create_link_branding").await?;
        let mut branding = self.branding.write().await;
        if branding.contains_key(domain) {
            return Err(already_exists(domain));
        }
        let set = BrandingRecordSet {
            id: format!("link-{domain}"),
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            records: vec![
                DnsHostRecord::cname(subdomain, "sendgrid.net"),
                DnsHostRecord::cname("9876", "sendgrid.net"),
            ],
            valid: false,
        };
        branding.insert(domain.to_string(), set.clone());
        Ok(set)
    }

    async fn validate_link_branding(&self, id: &str) -> ProviderResult<ValidationOutcome> {
        self.script.hit("validate_link_branding").await?;
        for set in self.branding.write().await.values_mut().filter(|s| s.id == id) {
            set.valid = true;
        }
        Ok(ValidationOutcome {
            valid: true,
            reasons: vec![],
        })
    }
}

// ===== Harness =====

/// Services wired to in-memory repositories and fake adapters
pub struct Harness {
    pub ctx: Arc<ServiceContext>,
    pub domains: Arc<InMemoryDomainRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub registrar: Arc<FakeRegistrar>,
    pub mailbox: Arc<FakeMailbox>,
    pub deliverability: Arc<FakeDeliverability>,
}

impl Harness {
    pub fn new() -> Self {
        let domains = Arc::new(InMemoryDomainRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());
        let registrar = Arc::new(FakeRegistrar::default());
        let mailbox = Arc::new(FakeMailbox::default());
        let deliverability = Arc::new(FakeDeliverability::default());

        let ctx = Arc::new(ServiceContext::new(
            Arc::clone(&domains) as Arc<dyn DomainRepository>,
            Arc::clone(&orders) as Arc<dyn OrderRepository>,
            Arc::clone(&registrar) as Arc<dyn RegistrarAdapter>,
            Arc::clone(&mailbox) as Arc<dyn MailboxProviderAdapter>,
            Arc::clone(&deliverability) as Arc<dyn DeliverabilityAdapter>,
        ));

        Self {
            ctx,
            domains,
            orders,
            registrar,
            mailbox,
            deliverability,
        }
    }

    /// Insert a settled order for `workspace_id` and a domain record owned by it
    pub async fn seed_domain(
        &self,
        name: &str,
        workspace_id: &str,
        configured: bool,
    ) -> DomainRecord {
        let order_id = format!("order-{name}");
        self.orders
            .insert(settled_order(&order_id, workspace_id))
            .await;

        let mut record = DomainRecord::new(DomainName::parse(name).unwrap(), Some(order_id));
        if configured {
            record.mark_mail_hosting_configured();
        }
        self.domains.insert(record.clone()).await;
        record
    }

    pub fn provisioning(&self) -> ProvisioningService {
        ProvisioningService::new(Arc::clone(&self.ctx))
    }

    pub fn verification(&self) -> VerificationService {
        VerificationService::new(Arc::clone(&self.ctx))
    }

    pub fn domain_service(&self) -> DomainService {
        DomainService::new(Arc::clone(&self.ctx))
    }

    pub async fn total_adapter_calls(&self) -> usize {
        self.registrar.script.total_calls().await
            + self.mailbox.script.total_calls().await
            + self.deliverability.script.total_calls().await
    }
}
