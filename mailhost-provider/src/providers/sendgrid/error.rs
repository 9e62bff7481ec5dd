//! SendGrid error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::SendGridDeliverability;

/// SendGrid has no error codes; the HTTP status and message decide.
/// `RawApiError::code` carries the offending `field`, if any.
impl ProviderErrorMapper for SendGridDeliverability {
    fn provider_name(&self) -> &'static str {
        "sendgrid"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        match raw.status {
            Some(401) => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            Some(403) => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },
            Some(404) => ProviderError::ResourceNotFound {
                provider,
                resource: context
                    .resource
                    .or(context.domain)
                    .unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            // Repeated creates answer 400 with free text only
            _ if context.is_duplicate_answer(&raw) => self.already_exists(raw, &context),
            Some(400 | 422) => ProviderError::InvalidParameter {
                provider,
                param: raw.code.unwrap_or_else(|| "request".to_string()),
                detail: raw.message,
            },
            _ => self.unknown_error(raw),
        }
    }
}
