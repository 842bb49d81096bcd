//! Configuration management
//!
//! The endpoint URLs are resolved once at startup and injected into the
//! client at construction; nothing reads global state after that.

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before processing config.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    pub env_files: Vec<String>,
    /// The mytoken service endpoints
    pub endpoints: EndpointConfig,
    /// Client name embedded in minted token labels
    pub client_name: String,
    /// Annotation sent with access-token exchange requests
    pub comment: String,
    /// Timeout applied to every HTTP request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_files: Vec::new(),
            endpoints: EndpointConfig::default(),
            client_name: "mytoken-web".to_string(),
            comment: "from web interface".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The three mytoken service endpoints, fixed for the process lifetime
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Mytoken-issuance endpoint
    pub mytoken_endpoint: Option<Url>,
    /// Access-token exchange endpoint
    pub access_token_endpoint: Option<Url>,
    /// Revocation endpoint
    pub revocation_endpoint: Option<Url>,
}

impl EndpointConfig {
    /// Resolve the mytoken-issuance endpoint.
    pub fn mytoken(&self) -> Result<Url> {
        Self::require(self.mytoken_endpoint.as_ref(), "mytoken_endpoint")
    }

    /// Resolve the access-token exchange endpoint.
    pub fn access_token(&self) -> Result<Url> {
        Self::require(self.access_token_endpoint.as_ref(), "access_token_endpoint")
    }

    /// Resolve the revocation endpoint.
    pub fn revocation(&self) -> Result<Url> {
        Self::require(self.revocation_endpoint.as_ref(), "revocation_endpoint")
    }

    fn require(url: Option<&Url>, key: &str) -> Result<Url> {
        url.cloned()
            .ok_or_else(|| Error::Config(format!("Missing endpoint: {key}")))
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (MYTOKEN_ prefix)
        figment = figment.merge(Env::prefixed("MYTOKEN_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.load_env_files();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }
}
