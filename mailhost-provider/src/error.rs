use serde::{Deserialize, Serialize};

/// Unified error type for all adapter operations.
///
/// Each variant carries a `provider` field naming the external system that produced it
/// (`"godaddy"`, `"zoho"`, `"sendgrid"`, or a test double), plus variant-specific context.
/// All variants are serializable for structured error reporting.
///
/// # Retryable Errors
///
/// - [`NetworkError`](Self::NetworkError): connectivity issues and HTTP 5xx
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): HTTP 429 / provider throttling
///
/// The built-in HTTP client retries these with exponential backoff.
///
/// # Idempotence
///
/// [`AlreadyExists`](Self::AlreadyExists) and [`AlreadyConfigured`](Self::AlreadyConfigured)
/// mean the requested end state already holds. Callers treat them as success, see
/// [`is_already_satisfied`](Self::is_already_satisfied).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (connection refused, DNS failure, HTTP 5xx).
    NetworkError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The request timed out.
    Timeout {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The provider throttled the request.
    RateLimited {
        /// Provider that produced the error.
        provider: String,
        /// Seconds to wait before retrying, from the `Retry-After` header.
        retry_after: Option<u64>,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The configured credentials were rejected.
    InvalidCredentials {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The credentials are valid but lack access to the resource.
    PermissionDenied {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The resource being created already exists (domain, DKIM key, DNS record).
    AlreadyExists {
        /// Provider that produced the error.
        provider: String,
        /// What already exists.
        resource: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The requested state transition has already happened (already verified, already enabled).
    AlreadyConfigured {
        /// Provider that produced the error.
        provider: String,
        /// The action that was requested.
        action: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The domain is unknown to the provider.
    DomainNotFound {
        /// Provider that produced the error.
        provider: String,
        /// The domain that was not found.
        domain: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A provider-side resource other than the domain itself was not found.
    ResourceNotFound {
        /// Provider that produced the error.
        provider: String,
        /// Identifier or description of the missing resource.
        resource: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter was rejected (invalid TLD, malformed record, etc.).
    InvalidParameter {
        /// Provider that produced the error.
        provider: String,
        /// Parameter name.
        param: String,
        /// Error details.
        detail: String,
    },

    /// An account quota was exceeded.
    QuotaExceeded {
        /// Provider that produced the error.
        provider: String,
        /// Original error message from the provider API, if available.
        raw_message: Option<String>,
    },

    /// The response could not be parsed.
    ParseError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// The request could not be serialized.
    SerializationError {
        /// Provider that produced the error.
        provider: String,
        /// Error details.
        detail: String,
    },

    /// Fallback for unmapped provider errors.
    Unknown {
        /// Provider that produced the error.
        provider: String,
        /// Raw provider error code, if any.
        raw_code: Option<String>,
        /// Raw provider error message.
        raw_message: String,
    },
}

impl ProviderError {
    /// The provider identifier carried by every variant.
    pub fn provider(&self) -> &str {
        match self {
            Self::NetworkError { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::InvalidCredentials { provider, .. }
            | Self::PermissionDenied { provider, .. }
            | Self::AlreadyExists { provider, .. }
            | Self::AlreadyConfigured { provider, .. }
            | Self::DomainNotFound { provider, .. }
            | Self::ResourceNotFound { provider, .. }
            | Self::InvalidParameter { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::ParseError { provider, .. }
            | Self::SerializationError { provider, .. }
            | Self::Unknown { provider, .. } => provider,
        }
    }

    /// Whether this is an expected failure (user input, missing resource) rather than a bug
    /// or outage. Used to pick the log level: `warn` when `true`, `error` otherwise.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::AlreadyExists { .. }
                | Self::AlreadyConfigured { .. }
                | Self::DomainNotFound { .. }
                | Self::ResourceNotFound { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
        )
    }

    /// Whether the provider reported that the requested end state already holds.
    #[must_use]
    pub fn is_already_satisfied(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. } | Self::AlreadyConfigured { .. }
        )
    }

    /// Whether the failure is transient and the request may succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// The message as reported by the provider, falling back to the formatted error.
    pub fn provider_message(&self) -> String {
        match self {
            Self::InvalidCredentials {
                raw_message: Some(msg),
                ..
            }
            | Self::PermissionDenied {
                raw_message: Some(msg),
                ..
            }
            | Self::AlreadyExists {
                raw_message: Some(msg),
                ..
            }
            | Self::AlreadyConfigured {
                raw_message: Some(msg),
                ..
            }
            | Self::DomainNotFound {
                raw_message: Some(msg),
                ..
            }
            | Self::ResourceNotFound {
                raw_message: Some(msg),
                ..
            }
            | Self::QuotaExceeded {
                raw_message: Some(msg),
                ..
            }
            | Self::Unknown {
                raw_message: msg, ..
            } => msg.clone(),
            Self::InvalidParameter { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { provider, detail } => {
                write!(f, "[{provider}] Network error: {detail}")
            }
            Self::Timeout { provider, detail } => {
                write!(f, "[{provider}] Request timeout: {detail}")
            }
            Self::RateLimited {
                provider,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{provider}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{provider}] Rate limited")
                }
            }
            Self::InvalidCredentials {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{provider}] Invalid credentials")
                }
            }
            Self::PermissionDenied {
                provider,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Permission denied: {msg}")
                } else {
                    write!(f, "[{provider}] Permission denied")
                }
            }
            Self::AlreadyExists {
                provider, resource, ..
            } => {
                write!(f, "[{provider}] {resource} already exists")
            }
            Self::AlreadyConfigured {
                provider, action, ..
            } => {
                write!(f, "[{provider}] Already done: {action}")
            }
            Self::DomainNotFound {
                provider,
                domain,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{provider}] Domain '{domain}' not found: {msg}")
                } else {
                    write!(f, "[{provider}] Domain '{domain}' not found")
                }
            }
            Self::ResourceNotFound {
                provider, resource, ..
            } => {
                write!(f, "[{provider}] {resource} not found")
            }
            Self::InvalidParameter {
                provider,
                param,
                detail,
            } => {
                write!(f, "[{provider}] Invalid parameter '{param}': {detail}")
            }
            Self::QuotaExceeded { provider, .. } => {
                write!(f, "[{provider}] Quota exceeded")
            }
            Self::ParseError { provider, detail } => {
                write!(f, "[{provider}] Parse error: {detail}")
            }
            Self::SerializationError { provider, detail } => {
                write!(f, "[{provider}] Serialization error: {detail}")
            }
            Self::Unknown {
                provider,
                raw_message,
                ..
            } => {
                write!(f, "[{provider}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
