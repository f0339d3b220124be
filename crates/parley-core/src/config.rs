use crate::access::AccessState;
use crate::error::{ParleyError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConversationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Simulated "thinking" time between a user message and the reply.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// Untouched live sessions older than this are discarded by the server.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

fn default_reply_delay_ms() -> u64 {
    1500
}

fn default_idle_ttl_secs() -> u64 {
    1800
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

impl ConversationConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

// ---------------------------------------------------------------------------
// AccessConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default = "default_trial_user")]
    pub trial_user: bool,
}

fn default_trial_user() -> bool {
    true
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            trial_user: default_trial_user(),
        }
    }
}

impl AccessConfig {
    pub fn state(&self) -> AccessState {
        AccessState {
            is_trial_user: self.trial_user,
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityBackend {
    /// Accounts live in process memory and vanish on restart.
    Memory,
    /// Hosted auth + profile store reached over HTTP.
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_backend")]
    pub provider: IdentityBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Name of the environment variable holding the provider's API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_identity_backend() -> IdentityBackend {
    IdentityBackend::Memory
}

fn default_api_key_env() -> String {
    "PARLEY_IDENTITY_KEY".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: default_identity_backend(),
            url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl IdentityConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            conversation: ConversationConfig::default(),
            access: AccessConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ParleyError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load the project config, falling back to defaults when none exists.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(ParleyError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != 1 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("unsupported config version {}", self.version),
            });
        }

        if self.identity.provider == IdentityBackend::Rest {
            match self.identity.url.as_deref() {
                None | Some("") => warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "identity.provider is 'rest' but identity.url is not set".to_string(),
                }),
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "identity.url '{url}' must start with http:// or https://"
                        ),
                    })
                }
                Some(_) => {}
            }
            if self.identity.api_key().is_none() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "environment variable {} is not set; identity requests will be anonymous",
                        self.identity.api_key_env
                    ),
                });
            }
        }

        if self.conversation.reply_delay_ms > 30_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "conversation.reply_delay_ms is {}ms; replies will feel stuck",
                    self.conversation.reply_delay_ms
                ),
            });
        }

        if self.conversation.idle_ttl_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "conversation.idle_ttl_secs is 0; every new session discards the others"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
