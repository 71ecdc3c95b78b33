//! Configuration loading and management.
//!
//! Loads configuration from embedded config.toml (or a user-supplied replacement) with
//! environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::secure::SecureString;

/// Embedded configuration file content.
const CONFIG_TOML: &str = include_str!("../config.toml");

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "graphdemo";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub oauth: OAuthConfig,
    pub api: ApiConfig,
    pub flow: FlowConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    pub authority_host: String,
    pub client_id: String,
    /// Only ever read from the environment or a user config file.
    #[serde(default)]
    pub client_secret: Option<SecureString>,
    pub tenant: String,
    pub redirect_uri: String,
    /// Anti-forgery state. A random value is generated per run when unset.
    #[serde(default)]
    pub state: Option<String>,
    pub scopes: ScopesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScopesConfig {
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub graph_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    pub mode: RunMode,
    #[serde(default)]
    pub open_browser: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout. Transport defaults apply when unset.
    pub timeout_seconds: Option<u64>,
    /// Ignore proxy settings from the environment.
    #[serde(default)]
    pub no_proxy: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub reveal_access_token: bool,
    /// Print the token endpoint's JSON body verbatim before decoding it.
    #[serde(default)]
    pub raw_token_response: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// How far the flow runs after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Sign in and show the user profile.
    Profile,
    /// Sign in, show the profile, list messages and open one.
    Mail,
}

impl RunMode {
    /// Scopes requested when the config does not list any.
    pub fn default_scopes(self) -> Vec<String> {
        match self {
            Self::Profile => vec!["User.Read".into()],
            Self::Mail => vec!["User.Read".into(), "Mail.Read".into()],
        }
    }
}

impl FromStr for RunMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Ok(Self::Profile),
            "mail" => Ok(Self::Mail),
            other => anyhow::bail!("Unknown run mode '{}', expected 'profile' or 'mail'", other),
        }
    }
}

impl Config {
    /// Load configuration: embedded defaults or the user's config file, then environment
    /// variable overrides, then validation.
    pub fn load() -> Result<Self> {
        let mut config = match user_config_path() {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            None => Self::from_toml(CONFIG_TOML).context("Failed to parse embedded config.toml")?,
        };

        config.apply_overrides(|key| env::var(key).ok())?;

        // Validate required fields
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration document.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(client_id) = lookup("AZURE_CLIENT_ID") {
            self.oauth.client_id = client_id;
        }

        if let Some(secret) = lookup("AZURE_CLIENT_SECRET") {
            self.oauth.client_secret = Some(SecureString::new(secret));
        }

        if let Some(tenant) = lookup("AZURE_TENANT_ID") {
            self.oauth.tenant = tenant;
        }

        if let Some(redirect_uri) = lookup("AZURE_REDIRECT_URI") {
            self.oauth.redirect_uri = redirect_uri;
        }

        if let Some(mode) = lookup("GRAPHDEMO_MODE") {
            self.flow.mode = mode.parse().context("Invalid GRAPHDEMO_MODE")?;
        }

        if let Some(log_level) = lookup("RUST_LOG") {
            self.logging.level = log_level;
        }

        Ok(())
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.oauth.client_id.is_empty() || self.oauth.client_id == "YOUR_AZURE_AD_CLIENT_ID" {
            anyhow::bail!(
                "Azure AD client_id not configured. Set AZURE_CLIENT_ID environment variable \
                 or update config.toml"
            );
        }

        if self.oauth.tenant.is_empty() {
            anyhow::bail!(
                "Azure AD tenant not configured. Set AZURE_TENANT_ID environment variable \
                 or update config.toml"
            );
        }

        if self.oauth.client_secret.as_ref().filter(|s| !s.is_empty()).is_none() {
            anyhow::bail!(
                "Azure AD client secret not configured. Set AZURE_CLIENT_SECRET environment \
                 variable"
            );
        }

        Ok(())
    }

    /// Scopes to request, falling back to the run mode's defaults.
    pub fn scopes(&self) -> Vec<String> {
        if self.oauth.scopes.scopes.is_empty() {
            self.flow.mode.default_scopes()
        } else {
            self.oauth.scopes.scopes.clone()
        }
    }

    /// Get the authorization URL for Azure AD.
    pub fn auth_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/authorize",
            self.oauth.authority_host.trim_end_matches('/'),
            self.oauth.tenant
        )
    }

    /// Get the token URL for Azure AD.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.oauth.authority_host.trim_end_matches('/'),
            self.oauth.tenant
        )
    }

    /// Build the HTTP client shared by every component.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.http.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if self.http.no_proxy {
            builder = builder.no_proxy();
        }
        builder.build().context("Failed to create HTTP client")
    }
}

/// Path of a user config file replacing the embedded defaults, if one exists.
fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("GRAPHDEMO_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
        .filter(|path| path.exists())
}
