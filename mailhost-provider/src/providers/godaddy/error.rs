//! GoDaddy error mapping

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::GoDaddyRegistrar;

/// GoDaddy error code mapping.
/// Reference: <https://developer.godaddy.com/doc/endpoint/domains>
impl ProviderErrorMapper for GoDaddyRegistrar {
    fn provider_name(&self) -> &'static str {
        "godaddy"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();
        match raw.code.as_deref() {
            Some("UNABLE_TO_AUTHENTICATE") => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },
            Some("ACCESS_DENIED") => ProviderError::PermissionDenied {
                provider,
                raw_message: Some(raw.message),
            },
            Some("NOT_FOUND" | "UNKNOWN_DOMAIN") => ProviderError::DomainNotFound {
                provider,
                domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                raw_message: Some(raw.message),
            },
            Some("DUPLICATE_RECORD") => self.already_exists(raw, &context),
            Some("TOO_MANY_REQUESTS") => ProviderError::RateLimited {
                provider,
                retry_after: None,
                raw_message: Some(raw.message),
            },
            Some("UNSUPPORTED_TLD") => ProviderError::InvalidParameter {
                provider,
                param: "tld".to_string(),
                detail: raw.message,
            },
            Some(code) if code.starts_with("INVALID_") => ProviderError::InvalidParameter {
                provider,
                param: code["INVALID_".len()..].to_lowercase(),
                detail: raw.message,
            },
            // Unmapped code: fall back on the HTTP status
            _ => match raw.status {
                Some(401) => ProviderError::InvalidCredentials {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(403) => ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                },
                Some(404) => ProviderError::DomainNotFound {
                    provider,
                    domain: context.domain.unwrap_or_else(|| "<unknown>".to_string()),
                    raw_message: Some(raw.message),
                },
                Some(409) => self.already_exists(raw, &context),
                Some(422) => ProviderError::InvalidParameter {
                    provider,
                    param: "request".to_string(),
                    detail: raw.message,
                },
                _ => self.unknown_error(raw),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registrar() -> GoDaddyRegistrar {
        GoDaddyRegistrar::new(String::new(), String::new()).unwrap()
    }

    fn ctx() -> ErrorContext {
        ErrorContext::domain("example.com")
    }

    #[test]
    fn auth_error() {
        let err = registrar().map_error(
            RawApiError::with_code("UNABLE_TO_AUTHENTICATE", "bad key").status(401),
            ctx(),
        );
        assert!(matches!(err, ProviderError::InvalidCredentials { .. }));
    }

    #[test]
    fn access_denied() {
        let err = registrar().map_error(
            RawApiError::with_code("ACCESS_DENIED", "not your domain"),
            ctx(),
        );
        assert!(matches!(err, ProviderError::PermissionDenied { .. }));
    }

    #[test]
    fn unknown_domain_carries_domain() {
        let err = registrar().map_error(
            RawApiError::with_code("UNKNOWN_DOMAIN", "no such domain"),
            ctx(),
        );
        assert!(matches!(
            err,
            ProviderError::DomainNotFound { domain, .. } if domain == "example.com"
        ));
    }

    #[test]
    fn duplicate_record_is_already_exists() {
        let err = registrar().map_error(
            RawApiError::with_code("DUPLICATE_RECORD", "dup"),
            ctx().with_resource("MX @ mx.zoho.com"),
        );
        assert!(matches!(
            err,
            ProviderError::AlreadyExists { resource, .. } if resource == "MX @ mx.zoho.com"
        ));
    }

    #[test]
    fn invalid_codes_name_the_param() {
        let err = registrar().map_error(
            RawApiError::with_code("INVALID_BODY", "bad record"),
            ctx(),
        );
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "body"
        ));
        let err = registrar().map_error(
            RawApiError::with_code("UNSUPPORTED_TLD", "tld"),
            ctx(),
        );
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { param, .. } if param == "tld"
        ));
    }

    #[test]
    fn status_fallbacks() {
        let r = registrar();
        assert!(matches!(
            r.map_error(RawApiError::new("x").status(401), ctx()),
            ProviderError::InvalidCredentials { .. }
        ));
        assert!(matches!(
            r.map_error(RawApiError::new("x").status(403), ctx()),
            ProviderError::PermissionDenied { .. }
        ));
        assert!(matches!(
            r.map_error(RawApiError::new("x").status(404), ctx()),
            ProviderError::DomainNotFound { .. }
        ));
        assert!(matches!(
            r.map_error(RawApiError::new("x").status(422), ctx()),
            ProviderError::InvalidParameter { .. }
        ));
        assert!(matches!(
            r.map_error(RawApiError::with_code("WHATEVER", "x").status(400), ctx()),
            ProviderError::Unknown { raw_code: Some(code), .. } if code == "WHATEVER"
        ));
    }
}
