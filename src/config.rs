//! Runtime configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `WEBHOOK_PORT` | `9443` |
//! | `HEALTH_PORT` | `8080` |
//! | `WEBHOOK_CERT_PATH` | `/etc/webhook/certs/tls.crt` |
//! | `WEBHOOK_KEY_PATH` | `/etc/webhook/certs/tls.key` |
//! | `PROTECTED_LABEL` | `sdewanPurpose` |
//! | `WEBHOOK_SERVICE_NAME` | `sdewan-webhook-service` |
//! | `WEBHOOK_SERVICE_NAMESPACE` | `sdewan-system` |
//! | `WEBHOOK_CERTIFICATE_NAME` | `sdewan-serving-cert` |

use std::path::PathBuf;

use thiserror::Error;

use crate::webhooks::policies::LabelPolicy;
use crate::webhooks::policies::immutability::PURPOSE_LABEL;
use crate::webhooks::registration::ServiceTarget;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Default health/metrics server port
pub const HEALTH_PORT: u16 = 8080;
/// Port the webhook Service exposes to the API server
pub const SERVICE_PORT: u16 = 443;

const DEFAULT_SERVICE_NAME: &str = "sdewan-webhook-service";
const DEFAULT_SERVICE_NAMESPACE: &str = "sdewan-system";
const DEFAULT_CERTIFICATE_NAME: &str = "sdewan-serving-cert";

/// Errors raised while reading configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A port variable did not parse as a non-zero u16
    #[error("invalid port in {var}: {value:?}")]
    InvalidPort { var: &'static str, value: String },

    /// The protected label key was set to an empty string
    #[error("PROTECTED_LABEL must not be empty")]
    EmptyLabelKey,
}

/// Process configuration for the webhook binary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub webhook_port: u16,
    pub health_port: u16,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Label whose value must not change on UPDATE
    pub label_key: String,
    pub service_name: String,
    pub service_namespace: String,
    /// cert-manager Certificate backing the serving certificate
    pub certificate_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_port: WEBHOOK_PORT,
            health_port: HEALTH_PORT,
            cert_path: PathBuf::from(WEBHOOK_CERT_PATH),
            key_path: PathBuf::from(WEBHOOK_KEY_PATH),
            label_key: PURPOSE_LABEL.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            service_namespace: DEFAULT_SERVICE_NAMESPACE.to_string(),
            certificate_name: DEFAULT_CERTIFICATE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let label_key = lookup("PROTECTED_LABEL").unwrap_or(defaults.label_key);
        if label_key.is_empty() {
            return Err(ConfigError::EmptyLabelKey);
        }

        Ok(Self {
            webhook_port: parse_port(&lookup, "WEBHOOK_PORT", defaults.webhook_port)?,
            health_port: parse_port(&lookup, "HEALTH_PORT", defaults.health_port)?,
            cert_path: lookup("WEBHOOK_CERT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cert_path),
            key_path: lookup("WEBHOOK_KEY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_path),
            label_key,
            service_name: lookup("WEBHOOK_SERVICE_NAME").unwrap_or(defaults.service_name),
            service_namespace: lookup("WEBHOOK_SERVICE_NAMESPACE")
                .unwrap_or(defaults.service_namespace),
            certificate_name: lookup("WEBHOOK_CERTIFICATE_NAME")
                .unwrap_or(defaults.certificate_name),
        })
    }

    /// Validator policy for the configured label
    pub fn label_policy(&self) -> LabelPolicy {
        LabelPolicy::default().with_label_key(self.label_key.clone())
    }

    /// Service reference used in the webhook registration
    pub fn service_target(&self) -> ServiceTarget {
        ServiceTarget {
            name: self.service_name.clone(),
            namespace: self.service_namespace.clone(),
            port: SERVICE_PORT,
            certificate: self.certificate_name.clone(),
        }
    }
}

fn parse_port<F>(lookup: &F, var: &'static str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(default);
    };

    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort { var, value }),
    }
}
