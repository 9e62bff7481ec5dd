//! Zoho Mail error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::ZohoMailProvider;

/// Zoho Mail error code mapping.
/// Reference: <https://www.zoho.com/mail/help/api/error-codes.html>
impl ProviderErrorMapper for ZohoMailProvider {
    fn provider_name(&self) -> &'static str {
        "zoho"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        match raw.code.as_deref() {
            Some("INVALID_OAUTHTOKEN" | "INVALID_TICKET" | "OAUTHTOKEN_EXPIRED") => {
                ProviderError::InvalidCredentials {
                    provider,
                    raw_message: Some(raw.message),
                }
            }
            Some("OAUTH_SCOPE_MISMATCH" | "NO_PERMISSION" | "URL_RULE_NOT_CONFIGURED") => {
                ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                }
            }
            Some("DOMAIN_ALREADY_EXISTS" | "DOMAIN_ALREADY_ADDED" | "DKIM_SELECTOR_EXISTS") => {
                self.already_exists(raw, &context)
            }
            Some("DOMAIN_ALREADY_VERIFIED" | "MAILHOSTING_ALREADY_ENABLED") => {
                self.already_configured(raw, &context)
            }
            Some("DOMAIN_NOT_FOUND" | "DOMAIN_NOT_EXIST") => ProviderError::DomainNotFound {
                provider,
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            Some("DKIM_NOT_FOUND") => ProviderError::ResourceNotFound {
                provider,
                resource: context
                    .resource
                    .unwrap_or_else(|| "DKIM key".to_string()),
                raw_message: Some(raw.message),
            },
            Some("INVALID_DOMAIN" | "INVALID_INPUT" | "JSON_PARSE_ERROR") => {
                ProviderError::InvalidParameter {
                    provider,
                    param: context.resource.unwrap_or_else(|| "domain".to_string()),
                    detail: raw.message,
                }
            }
            Some("LIMIT_EXCEEDED" | "DOMAIN_LIMIT_EXCEEDED") => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },
            _ => match raw.status {
                Some(401) => ProviderError::InvalidCredentials {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(403) => ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                },
                // Repeats of add/enable calls sometimes come back as free text only
                _ if context.is_duplicate_answer(&raw) => {
                    if context.action.is_some() {
                        self.already_configured(raw, &context)
                    } else {
                        self.already_exists(raw, &context)
                    }
                }
                _ => self.unknown_error(raw),
            },
        }
    }
}
