//! Configuration loading for the two upstream collaborators
//!
//! Each setting resolves in priority order:
//! 1. Explicit argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//!
//! The registry channel is client-certificate authenticated; the bundle
//! arrives base64-encoded so it can live in an environment variable.

use crate::error::ConfigError;
use base64::Engine as _;
use serde::Deserialize;
use std::path::PathBuf;

/// Settings for the degree-registry channel
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    /// Institution id included in searches and create envelopes
    pub institution_id: i64,
    /// PKCS#12 bundle + passphrase; absent in test setups that talk to an
    /// in-process mock over plain HTTP
    pub identity: Option<ClientIdentity>,
}

/// Decoded client-certificate material
#[derive(Clone)]
pub struct ClientIdentity {
    pub pkcs12_der: Vec<u8>,
    pub passphrase: String,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity").finish_non_exhaustive()
    }
}

/// Settings for the source roster channel
#[derive(Debug, Clone)]
pub struct RosterConfig {
    pub base_url: String,
}

/// File-format mirror of the resolvable settings
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    registry_base_url: Option<String>,
    registry_institution_id: Option<i64>,
    registry_pfx_base64: Option<String>,
    registry_pfx_passphrase: Option<String>,
    roster_base_url: Option<String>,
}

fn load_config_file() -> ConfigFile {
    let candidates = [
        dirs::config_dir().map(|d| d.join("gradesync").join("config.toml")),
        Some(PathBuf::from("gradesync.toml")),
    ];

    for path in candidates.into_iter().flatten() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            match toml::from_str(&content) {
                Ok(parsed) => return parsed,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config file {}: {}", path.display(), e);
                }
            }
        }
    }

    ConfigFile::default()
}

fn resolve(arg: Option<&str>, env_var: &str, file_value: Option<&str>) -> Option<String> {
    if let Some(v) = arg {
        return Some(v.to_string());
    }
    if let Ok(v) = std::env::var(env_var) {
        return Some(v);
    }
    file_value.map(|v| v.to_string())
}

impl RegistryConfig {
    /// Resolve the registry settings. `base_url` and `institution_id` are
    /// mandatory; the client identity is optional.
    pub fn resolve(base_url_arg: Option<&str>) -> Result<Self, ConfigError> {
        let file = load_config_file();

        let base_url = resolve(
            base_url_arg,
            "REGISTRY_API_BASE_URL",
            file.registry_base_url.as_deref(),
        )
        .ok_or_else(|| ConfigError("registry base URL not configured".into()))?;

        let institution_id = match std::env::var("REGISTRY_INSTITUTION_ID") {
            Ok(v) => v
                .parse()
                .map_err(|_| ConfigError(format!("invalid REGISTRY_INSTITUTION_ID: {v}")))?,
            Err(_) => file
                .registry_institution_id
                .ok_or_else(|| ConfigError("registry institution id not configured".into()))?,
        };

        let pfx = resolve(
            None,
            "REGISTRY_API_PFX_BASE64",
            file.registry_pfx_base64.as_deref(),
        );
        let passphrase = resolve(
            None,
            "REGISTRY_API_PFX_PASSPHRASE",
            file.registry_pfx_passphrase.as_deref(),
        );

        let identity = match (pfx, passphrase) {
            (Some(pfx), Some(passphrase)) => {
                let der = base64::engine::general_purpose::STANDARD
                    .decode(pfx.trim())
                    .map_err(|e| ConfigError(format!("invalid base64 PKCS#12 bundle: {e}")))?;
                Some(ClientIdentity {
                    pkcs12_der: der,
                    passphrase,
                })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError(
                    "PKCS#12 bundle and passphrase must be configured together".into(),
                ))
            }
        };

        Ok(Self {
            base_url,
            institution_id,
            identity,
        })
    }
}

impl RosterConfig {
    pub fn resolve(base_url_arg: Option<&str>) -> Result<Self, ConfigError> {
        let file = load_config_file();

        let base_url = resolve(
            base_url_arg,
            "ROSTER_API_BASE_URL",
            file.roster_base_url.as_deref(),
        )
        .ok_or_else(|| ConfigError("roster base URL not configured".into()))?;

        Ok(Self { base_url })
    }
}
