//! SendGrid `DeliverabilityAdapter` implementation

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::providers::common::{full_name_to_relative, normalize_domain_name, parse_record_type};
use crate::traits::{DeliverabilityAdapter, ErrorContext, ProviderErrorMapper};
use crate::types::{
    AuthRecordSet, BrandingRecordSet, DnsHostRecord, ValidationOutcome,
};

use super::SendGridDeliverability;
use super::types::{
    CreateDomainAuthRequest, CreateLinkBrandingRequest, SendGridDnsEntry, SendGridDomainAuth,
    SendGridLinkBranding, SendGridValidation,
};

impl SendGridDeliverability {
    /// Convert SendGrid's `dns` map into zone-relative host records.
    fn convert_dns(
        &self,
        domain: &str,
        dns: BTreeMap<String, SendGridDnsEntry>,
    ) -> Result<Vec<DnsHostRecord>> {
        dns.into_values()
            .map(|entry| {
                Ok(DnsHostRecord::new(
                    full_name_to_relative(&entry.host, domain),
                    parse_record_type(&entry.record_type, self.provider_name())?,
                    normalize_domain_name(&entry.data),
                ))
            })
            .collect()
    }

    fn convert_auth(&self, auth: SendGridDomainAuth) -> Result<AuthRecordSet> {
        let domain = normalize_domain_name(&auth.domain);
        Ok(AuthRecordSet {
            id: auth.id.to_string(),
            records: self.convert_dns(&domain, auth.dns)?,
            domain,
            valid: auth.valid,
        })
    }

    fn convert_branding(&self, link: SendGridLinkBranding) -> Result<BrandingRecordSet> {
        let domain = normalize_domain_name(&link.domain);
        Ok(BrandingRecordSet {
            id: link.id.to_string(),
            records: self.convert_dns(&domain, link.dns)?,
            domain,
            subdomain: link.subdomain,
            valid: link.valid,
        })
    }

    fn convert_validation(validation: SendGridValidation) -> ValidationOutcome {
        let reasons = validation
            .validation_results
            .into_iter()
            .filter(|(_, result)| !result.valid)
            .map(|(name, result)| match result.reason {
                Some(reason) => format!("{name}: {reason}"),
                None => format!("{name}: not valid"),
            })
            .collect();
        ValidationOutcome {
            valid: validation.valid,
            reasons,
        }
    }
}

#[async_trait]
impl DeliverabilityAdapter for SendGridDeliverability {
    fn id(&self) -> &'static str {
        "sendgrid"
    }

    async fn get_sending_domain_auth(&self, domain: &str) -> Result<Option<AuthRecordSet>> {
        let domain = normalize_domain_name(domain);
        let path = format!("/v3/whitelabel/domains?domain={}", urlencoding::encode(&domain));
        let found: Vec<SendGridDomainAuth> =
            self.get(&path, ErrorContext::domain(&domain)).await?;

        found
            .into_iter()
            .find(|auth| normalize_domain_name(&auth.domain) == domain)
            .map(|auth| self.convert_auth(auth))
            .transpose()
    }

    async fn create_sending_domain_auth(&self, domain: &str) -> Result<AuthRecordSet> {
        let domain = normalize_domain_name(domain);
        let body = CreateDomainAuthRequest {
            domain: &domain,
            automatic_security: true,
        };
        let created: SendGridDomainAuth = self
            .post(
                "/v3/whitelabel/domains",
                Some(&body),
                ErrorContext::domain(&domain)
                    .with_resource(format!("domain authentication for {domain}"))
                    .repeatable(),
            )
            .await?;
        log::info!("[sendgrid] {domain}: domain authentication {} created", created.id);
        self.convert_auth(created)
    }

    async fn validate_sending_domain_auth(&self, id: &str) -> Result<ValidationOutcome> {
        let path = format!("/v3/whitelabel/domains/{}/validate", urlencoding::encode(id));
        let validation: SendGridValidation = self
            .post(
                &path,
                None::<&()>,
                ErrorContext::default().with_resource(format!("domain authentication {id}")),
            )
            .await?;
        Ok(Self::convert_validation(validation))
    }

    async fn get_link_branding(&self, domain: &str) -> Result<Option<BrandingRecordSet>> {
        let domain = normalize_domain_name(domain);
        let found: Vec<SendGridLinkBranding> = self
            .get("/v3/whitelabel/links", ErrorContext::domain(&domain))
            .await?;

        found
            .into_iter()
            .find(|link| normalize_domain_name(&link.domain) == domain)
            .map(|link| self.convert_branding(link))
            .transpose()
    }

    async fn create_link_branding(
        &self,
        domain: &str,
        subdomain: &str,
    ) -> Result<BrandingRecordSet> {
        let domain = normalize_domain_name(domain);
        let body = CreateLinkBrandingRequest {
            domain: &domain,
            subdomain,
        };
        let created: SendGridLinkBranding = self
            .post(
                "/v3/whitelabel/links",
                Some(&body),
                ErrorContext::domain(&domain)
                    .with_resource(format!("link branding for {domain}"))
                    .repeatable(),
            )
            .await?;
        log::info!("[sendgrid] {domain}: link branding {} created", created.id);
        self.convert_branding(created)
    }

    async fn validate_link_branding(&self, id: &str) -> Result<ValidationOutcome> {
        let path = format!("/v3/whitelabel/links/{}/validate", urlencoding::encode(id));
        let validation: SendGridValidation = self
            .post(
                &path,
                None::<&()>,
                ErrorContext::default().with_resource(format!("link branding {id}")),
            )
            .await?;
        Ok(Self::convert_validation(validation))
    }
}
