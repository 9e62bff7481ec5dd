//! Application configuration
//!
//! Loaded from a TOML file, then overridden from the environment.
//!
//! ## File Locations
//! When no path is given, the loader looks for (in order):
//! 1. `$MAILHOST_CONFIG`
//! 2. `./mailhost.toml`
//! 3. `./config/mailhost.toml`
//!
//! A missing file is not an error; secrets can come from the environment alone.
//!
//! ## Environment Variables
//! - `MAILHOST_GODADDY_API_KEY`, `MAILHOST_GODADDY_API_SECRET`
//! - `MAILHOST_ZOHO_OAUTH_TOKEN`, `MAILHOST_ZOHO_ORGANIZATION_ID`
//! - `MAILHOST_SENDGRID_API_KEY`
//! - `MAILHOST_LOG_LEVEL`, `MAILHOST_LOG_FORMAT` (`text` or `json`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use mailhost_core::PreservePolicy;
use mailhost_core::types::MailHostingProfile;
use mailhost_provider::log_sanitizer::mask_secret;
use mailhost_provider::{
    AdapterOptions, DeliverabilityCredentials, MailboxCredentials, RegistrarCredentials,
};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable pointing at the config file
pub const CONFIG_PATH_ENV: &str = "MAILHOST_CONFIG";

const CANDIDATE_PATHS: [&str; 2] = ["mailhost.toml", "config/mailhost.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required secret is absent from both the file and the environment
    #[error("Missing {field} (set it in [{section}] or {env})")]
    Missing {
        section: &'static str,
        field: &'static str,
        env: &'static str,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Endpoint and retry overrides shared by the adapter sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub api_base: Option<String>,
    pub max_retries: Option<u32>,
    /// First retry backoff in milliseconds
    pub retry_base_delay_ms: Option<u64>,
}

impl EndpointConfig {
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            api_base: self.api_base.clone(),
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrarKind {
    #[default]
    GoDaddy,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    pub provider: RegistrarKind,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailboxKind {
    #[default]
    Zoho,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub provider: MailboxKind,
    pub oauth_token: Option<String>,
    pub organization_id: Option<String>,
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverabilityKind {
    #[default]
    SendGrid,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeliverabilityConfig {
    pub provider: DeliverabilityKind,
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Domains provisioned at once by `provision_many`
    pub concurrency: usize,
    /// Rules for existing records
    pub preserve: PreservePolicy,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            preserve: PreservePolicy::default(),
        }
    }
}

/// Top-level configuration
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub registrar: RegistrarConfig,
    pub mailbox: MailboxConfig,
    pub deliverability: DeliverabilityConfig,
    pub profile: MailHostingProfile,
    pub provisioning: ProvisioningConfig,
}

impl AppConfig {
    /// Load from `path`, or the first candidate file found, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path.map(Path::to_path_buf).or_else(find_config_path) {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from `lookup`; non-empty values win over the file
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MAILHOST_GODADDY_API_KEY") {
            self.registrar.api_key = Some(v);
        }
        if let Some(v) = get("MAILHOST_GODADDY_API_SECRET") {
            self.registrar.api_secret = Some(v);
        }
        if let Some(v) = get("MAILHOST_ZOHO_OAUTH_TOKEN") {
            self.mailbox.oauth_token = Some(v);
        }
        if let Some(v) = get("MAILHOST_ZOHO_ORGANIZATION_ID") {
            self.mailbox.organization_id = Some(v);
        }
        if let Some(v) = get("MAILHOST_SENDGRID_API_KEY") {
            self.deliverability.api_key = Some(v);
        }
        if let Some(v) = get("MAILHOST_LOG_LEVEL") {
            self.logging.level = v;
        }
        match get("MAILHOST_LOG_FORMAT").as_deref() {
            Some("json") => self.logging.format = LogFormat::Json,
            Some("text") => self.logging.format = LogFormat::Text,
            Some(other) => log::warn!("Ignoring unknown MAILHOST_LOG_FORMAT {other:?}"),
            None => {}
        }
    }

    /// Check values that deserialization cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provisioning.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "provisioning.concurrency must be at least 1".to_string(),
            ));
        }
        self.profile
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn registrar_credentials(&self) -> Result<RegistrarCredentials, ConfigError> {
        match self.registrar.provider {
            RegistrarKind::GoDaddy => Ok(RegistrarCredentials::GoDaddy {
                api_key: required(
                    self.registrar.api_key.as_ref(),
                    "registrar",
                    "api_key",
                    "MAILHOST_GODADDY_API_KEY",
                )?,
                api_secret: required(
                    self.registrar.api_secret.as_ref(),
                    "registrar",
                    "api_secret",
                    "MAILHOST_GODADDY_API_SECRET",
                )?,
            }),
        }
    }

    pub fn mailbox_credentials(&self) -> Result<MailboxCredentials, ConfigError> {
        match self.mailbox.provider {
            MailboxKind::Zoho => Ok(MailboxCredentials::Zoho {
                oauth_token: required(
                    self.mailbox.oauth_token.as_ref(),
                    "mailbox",
                    "oauth_token",
                    "MAILHOST_ZOHO_OAUTH_TOKEN",
                )?,
                organization_id: required(
                    self.mailbox.organization_id.as_ref(),
                    "mailbox",
                    "organization_id",
                    "MAILHOST_ZOHO_ORGANIZATION_ID",
                )?,
            }),
        }
    }

    pub fn deliverability_credentials(&self) -> Result<DeliverabilityCredentials, ConfigError> {
        match self.deliverability.provider {
            DeliverabilityKind::SendGrid => Ok(DeliverabilityCredentials::SendGrid {
                api_key: required(
                    self.deliverability.api_key.as_ref(),
                    "deliverability",
                    "api_key",
                    "MAILHOST_SENDGRID_API_KEY",
                )?,
            }),
        }
    }

    /// Log the effective configuration with secrets masked
    pub fn log_summary(&self) {
        let masked = |v: Option<&String>| v.map_or_else(|| "<unset>".to_string(), |s| mask_secret(s));
        log::info!(
            "registrar={:?} api_key={} api_secret={}",
            self.registrar.provider,
            masked(self.registrar.api_key.as_ref()),
            masked(self.registrar.api_secret.as_ref())
        );
        log::info!(
            "mailbox={:?} organization_id={} oauth_token={}",
            self.mailbox.provider,
            self.mailbox.organization_id.as_deref().unwrap_or("<unset>"),
            masked(self.mailbox.oauth_token.as_ref())
        );
        log::info!(
            "deliverability={:?} api_key={}",
            self.deliverability.provider,
            masked(self.deliverability.api_key.as_ref())
        );
        log::info!(
            "profile: {} MX exchangers, selector {}, branding subdomain {}, concurrency {}",
            self.profile.mx.len(),
            self.profile.dkim_selector,
            self.profile.branding_subdomain,
            self.provisioning.concurrency
        );
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("logging", &self.logging)
            .field("registrar", &self.registrar.provider)
            .field("mailbox", &self.mailbox.provider)
            .field("deliverability", &self.deliverability.provider)
            .field("profile", &self.profile)
            .field("provisioning", &self.provisioning)
            .finish_non_exhaustive()
    }
}

fn required(
    value: Option<&String>,
    section: &'static str,
    field: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::Missing {
            section,
            field,
            env,
        })
}

fn find_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
        log::warn!("{CONFIG_PATH_ENV} points at missing file {}", path.display());
    }
    let cwd = std::env::current_dir().ok()?;
    CANDIDATE_PATHS
        .iter()
        .map(|p| cwd.join(p))
        .find(|p| p.exists())
}
