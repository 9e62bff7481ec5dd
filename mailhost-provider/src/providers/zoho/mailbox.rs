//! Zoho Mail `MailboxProviderAdapter` implementation

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::providers::common::normalize_domain_name;
use crate::traits::{ErrorContext, MailboxProviderAdapter, ProviderErrorMapper, RawApiError};
use crate::types::{DkimKey, MailboxDomainInfo, RegisteredDomain};

use super::types::{
    AddDomainRequest, DomainModeRequest, ZohoDkimDetail, ZohoDomain, value_is_truthy,
};
use super::{DKIM_KEY_SIZE, VERIFICATION_SUFFIX, ZohoMailProvider};

/// Modes whose "already" answer means the end state holds. Check modes are not listed.
const REPEATABLE_MODES: [&str; 1] = ["enableMailHosting"];

impl ZohoMailProvider {
    /// TXT value Zoho checks for during ownership verification.
    pub(crate) fn ownership_token(code: &str) -> String {
        format!("zoho-verification={code}{VERIFICATION_SUFFIX}")
    }

    fn convert_dkim(detail: ZohoDkimDetail) -> DkimKey {
        DkimKey {
            id: detail.dkim_id,
            selector: detail.selector,
            public_key: detail.public_key,
            verified: detail.is_verified,
        }
    }

    fn convert_domain(domain: &str, zoho: ZohoDomain) -> MailboxDomainInfo {
        MailboxDomainInfo {
            domain: if zoho.domain_name.is_empty() {
                domain.to_string()
            } else {
                normalize_domain_name(&zoho.domain_name)
            },
            ownership_verified: zoho.verification_status,
            hosting_enabled: zoho.mail_hosting_enabled,
            mx_verified: zoho.mx_status,
            spf_verified: zoho.spf_status,
            verification_token: zoho
                .cname_verification_code
                .as_deref()
                .map(Self::ownership_token),
            dkim_keys: zoho
                .dkim_detail_list
                .into_iter()
                .map(Self::convert_dkim)
                .collect(),
        }
    }

    /// Run a `PUT .../domains/{domain}` verification mode.
    ///
    /// A 2xx answer whose `data` carries a false `status` / `isVerified` flag is a failed check,
    /// never an idempotent repeat.
    async fn run_mode(&self, domain: &str, request: DomainModeRequest<'_>) -> Result<()> {
        let domain = normalize_domain_name(domain);
        let mode = request.mode;
        let mut ctx = ErrorContext::domain(&domain).with_action(mode);
        if REPEATABLE_MODES.contains(&mode) {
            ctx = ctx.repeatable();
        }
        let data = self
            .send("PUT", &self.domain_path(&domain), &request, ctx)
            .await?;

        let flag = ["status", "isVerified", "verificationStatus"]
            .iter()
            .find_map(|key| data.get(*key));
        if let Some(flag) = flag
            && !value_is_truthy(flag)
        {
            let message = data
                .get("moreInfo")
                .and_then(Value::as_str)
                .map_or_else(|| format!("{mode} did not pass for {domain}"), str::to_string);
            let check = ErrorContext::domain(&domain).with_action(mode);
            return Err(self.map_error(RawApiError::new(message), check));
        }

        log::debug!("[zoho] {domain}: {mode} ok");
        Ok(())
    }
}

#[async_trait]
impl MailboxProviderAdapter for ZohoMailProvider {
    fn id(&self) -> &'static str {
        "zoho"
    }

    async fn register_domain(&self, domain: &str) -> Result<RegisteredDomain> {
        let domain = normalize_domain_name(domain);
        let created: ZohoDomain = self
            .send_decode(
                "POST",
                &self.domains_path(),
                &AddDomainRequest {
                    domain_name: &domain,
                },
                ErrorContext::domain(&domain).repeatable(),
            )
            .await?;

        let code = created
            .cname_verification_code
            .ok_or_else(|| self.parse_error("response is missing CNAMEVerificationCode"))?;
        log::info!("[zoho] {domain}: added to organization");
        Ok(RegisteredDomain {
            domain,
            ownership_token: Self::ownership_token(&code),
        })
    }

    async fn enable_hosting(&self, domain: &str) -> Result<()> {
        self.run_mode(domain, DomainModeRequest::mode("enableMailHosting"))
            .await
    }

    async fn verify_ownership(&self, domain: &str) -> Result<()> {
        self.run_mode(domain, DomainModeRequest::mode("verifyDomainByTXT"))
            .await
    }

    async fn verify_mx(&self, domain: &str) -> Result<()> {
        self.run_mode(domain, DomainModeRequest::mode("verifyMxRecord"))
            .await
    }

    async fn verify_spf(&self, domain: &str) -> Result<()> {
        self.run_mode(domain, DomainModeRequest::mode("VerifySpfRecord"))
            .await
    }

    async fn get_domain_info(&self, domain: &str) -> Result<MailboxDomainInfo> {
        let domain = normalize_domain_name(domain);
        let zoho: ZohoDomain = self
            .get(&self.domain_path(&domain), ErrorContext::domain(&domain))
            .await?;
        Ok(Self::convert_domain(&domain, zoho))
    }

    async fn add_dkim_key(&self, domain: &str, selector: &str) -> Result<DkimKey> {
        let domain = normalize_domain_name(domain);
        let request = DomainModeRequest {
            selector: Some(selector),
            is_default: Some(true),
            key_size: Some(DKIM_KEY_SIZE),
            ..DomainModeRequest::mode("addDkimDetail")
        };
        let detail: ZohoDkimDetail = self
            .send_decode(
                "PUT",
                &self.domain_path(&domain),
                &request,
                ErrorContext::domain(&domain)
                    .with_resource(format!("DKIM selector '{selector}'"))
                    .repeatable(),
            )
            .await?;

        let mut key = Self::convert_dkim(detail);
        if key.selector.is_empty() {
            key.selector = selector.to_string();
        }
        log::info!("[zoho] {domain}: DKIM key {} created", key.id);
        Ok(key)
    }

    async fn verify_dkim_key(&self, domain: &str, key_id: &str) -> Result<()> {
        if key_id.is_empty() {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "dkimId".to_string(),
                detail: "DKIM key id is empty".to_string(),
            });
        }
        let request = DomainModeRequest {
            dkim_id: Some(key_id),
            ..DomainModeRequest::mode("verifyDkimKey")
        };
        self.run_mode(domain, request).await
    }
}
