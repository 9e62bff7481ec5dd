//! GoDaddy `RegistrarAdapter` implementation

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::common::{normalize_domain_name, parse_record_type};
use crate::traits::{ErrorContext, ProviderErrorMapper, RegistrarAdapter};
use crate::types::{DnsHostRecord, DnsRecordType};

use super::types::{GoDaddyDomainDetail, GoDaddyRecord, UpdateNameServers};
use super::{DEFAULT_NAMESERVERS, GoDaddyRegistrar};

/// GoDaddy's minimum accepted TTL.
const MIN_TTL: u32 = 600;

impl GoDaddyRegistrar {
    /// Convert a GoDaddy record into a host record.
    ///
    /// `SOA` is registrar-managed and cannot be written back, so it yields `None`.
    /// `SRV` folds service and protocol into the name and weight and port into the
    /// value (`_sip._tcp` / `"10 5060 sip.example.com"`).
    pub(crate) fn parse_record(&self, record: GoDaddyRecord) -> Result<Option<DnsHostRecord>> {
        if record.record_type.eq_ignore_ascii_case("SOA") {
            return Ok(None);
        }
        let record_type = parse_record_type(&record.record_type, self.provider_name())?;

        let (name, value) = if record_type == DnsRecordType::Srv {
            let mut labels: Vec<&str> = [record.service.as_deref(), record.protocol.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if record.name != "@" {
                labels.push(&record.name);
            }
            (
                labels.join("."),
                format!(
                    "{} {} {}",
                    record.weight.unwrap_or(0),
                    record.port.unwrap_or(0),
                    record.data
                ),
            )
        } else {
            (record.name, record.data)
        };

        Ok(Some(DnsHostRecord {
            name,
            record_type,
            value,
            ttl: record.ttl.unwrap_or(MIN_TTL),
            priority: record.priority,
        }))
    }

    /// Convert a host record into GoDaddy's wire format.
    pub(crate) fn wire_record(record: &DnsHostRecord) -> GoDaddyRecord {
        let mut out = GoDaddyRecord {
            record_type: record.record_type.as_str().to_string(),
            name: record.normalized_name(),
            data: record.value.clone(),
            ttl: Some(record.ttl.max(MIN_TTL)),
            priority: record.priority,
            port: None,
            weight: None,
            service: None,
            protocol: None,
        };

        if record.record_type == DnsRecordType::Srv {
            let mut labels = record.name.splitn(3, '.');
            out.service = labels.next().map(str::to_string);
            out.protocol = labels.next().map(str::to_string);
            out.name = labels.next().unwrap_or("@").to_string();

            let mut parts = record.value.split_whitespace();
            out.weight = parts.next().and_then(|p| p.parse().ok());
            out.port = parts.next().and_then(|p| p.parse().ok());
            out.data = parts.next().unwrap_or_default().to_string();
        }

        out
    }
}

#[async_trait]
impl RegistrarAdapter for GoDaddyRegistrar {
    fn id(&self) -> &'static str {
        "godaddy"
    }

    async fn get_host_records(&self, domain: &str) -> Result<Vec<DnsHostRecord>> {
        let domain = normalize_domain_name(domain);
        let path = format!("/v1/domains/{}/records", urlencoding::encode(&domain));
        let records: Vec<GoDaddyRecord> = self.get(&path, ErrorContext::domain(&domain)).await?;

        let mut out = Vec::with_capacity(records.len());
        for record in records {
            if let Some(r) = self.parse_record(record)? {
                out.push(r);
            }
        }
        log::debug!("[godaddy] {domain}: {} host records", out.len());
        Ok(out)
    }

    async fn set_host_records(&self, domain: &str, records: &[DnsHostRecord]) -> Result<()> {
        let domain = normalize_domain_name(domain);
        let path = format!("/v1/domains/{}/records", urlencoding::encode(&domain));
        let body: Vec<GoDaddyRecord> = records.iter().map(Self::wire_record).collect();

        self.send("PUT", &path, &body, ErrorContext::domain(&domain))
            .await?;
        log::info!("[godaddy] {domain}: replaced host records ({} records)", body.len());
        Ok(())
    }

    async fn set_default_nameservers(&self, domain: &str) -> Result<()> {
        let domain = normalize_domain_name(domain);
        let path = format!("/v1/domains/{}", urlencoding::encode(&domain));

        let detail: GoDaddyDomainDetail = self.get(&path, ErrorContext::domain(&domain)).await?;
        let current: BTreeSet<String> = detail
            .name_servers
            .iter()
            .map(|ns| normalize_domain_name(ns))
            .collect();
        let wanted: BTreeSet<String> = DEFAULT_NAMESERVERS.iter().map(|ns| (*ns).to_string()).collect();

        if current == wanted {
            log::debug!("[godaddy] {domain}: nameservers already default");
            return Ok(());
        }

        let body = UpdateNameServers {
            name_servers: DEFAULT_NAMESERVERS.iter().map(|ns| (*ns).to_string()).collect(),
        };
        self.send(
            "PATCH",
            &path,
            &body,
            ErrorContext::domain(&domain).with_action("setDefaultNameservers"),
        )
        .await?;
        log::info!("[godaddy] {domain}: nameservers set to default");
        Ok(())
    }
}
