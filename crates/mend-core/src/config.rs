//! Configuration management for Mend
//!
//! All settings have defaults, so an empty or missing `mend.toml` yields a
//! working service: listen on `0.0.0.0:8000`, keep checkouts under `repos/`,
//! enumerate `.py` files and talk to the OpenAI chat-completions API.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{MendError, Result};

/// File looked up in the working directory when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "mend.toml";

/// Service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MendConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub ai: AiConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Local checkout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding one checkout per repository name
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Files whose name ends with this suffix are listed as source files
    #[serde(default = "default_source_extension")]
    pub source_extension: String,

    /// Where replaced checkouts are moved when `backup_on_reclone` is set
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Move an existing checkout aside instead of deleting it on re-clone
    #[serde(default = "default_true")]
    pub backup_on_reclone: bool,

    /// Backups kept per repository name; older ones are deleted. 0 keeps all.
    #[serde(default = "default_backup_keep")]
    pub backup_keep: usize,
}

/// Git subprocess settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_git_binary")]
    pub binary: String,

    /// Upper bound for a single git invocation
    #[serde(default = "default_git_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the access token for HTTPS remotes
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// URL prefix of the forge the token belongs to. Remotes outside it are
    /// contacted without credentials.
    #[serde(default = "default_auth_host")]
    pub auth_host: String,
}

/// Text-generation API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

// Default value providers
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("repos")
}

fn default_source_extension() -> String {
    ".py".to_string()
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("repos.bak")
}

fn default_true() -> bool {
    true
}

fn default_backup_keep() -> usize {
    5
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_git_timeout_secs() -> u64 {
    300
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_auth_host() -> String {
    "https://github.com/".to_string()
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_ai_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_system_prompt() -> String {
    "You are an expert software engineer.".to_string()
}

impl MendConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `mend.toml` in the current
    /// directory is used when present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MendError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MendError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MendError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            source_extension: default_source_extension(),
            backup_dir: default_backup_dir(),
            backup_on_reclone: default_true(),
            backup_keep: default_backup_keep(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
            timeout_secs: default_git_timeout_secs(),
            token_env: default_token_env(),
            auth_host: default_auth_host(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_ai_timeout_secs(),
            api_key_env: default_api_key_env(),
            system_prompt: default_system_prompt(),
        }
    }
}
