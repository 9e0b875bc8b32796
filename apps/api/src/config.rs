//! Service configuration loaded from the environment.
//!
//! `.env` files are honoured via `dotenv` in `main`; everything here reads
//! through a lookup function so tests never touch process state.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::trigger::ProjectRegistry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Which inference backend drives the agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    Claude,
    OpenAi,
}

impl ModelBackend {
    /// Claude rejects two consecutive assistant turns, so agent nodes
    /// insert a placeholder human turn ahead of the call.
    pub fn requires_alternation(&self) -> bool {
        matches!(self, ModelBackend::Claude)
    }
}

impl FromStr for ModelBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(ModelBackend::Claude),
            "openai" => Ok(ModelBackend::OpenAi),
            other => Err(ConfigError::Invalid {
                key: "MODEL_BACKEND".to_string(),
                reason: format!("unknown backend '{}' (expected claude or openai)", other),
            }),
        }
    }
}

impl std::fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelBackend::Claude => write!(f, "claude"),
            ModelBackend::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: ModelBackend,
    pub anthropic: Option<AnthropicConfig>,
    pub openai: Option<OpenAiConfig>,
}

#[derive(Debug, Clone)]
pub struct ComposioConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
    pub composio: ComposioConfig,
    pub workspace_root: PathBuf,
    pub recursion_limit: usize,
    pub webhook_secret: Option<String>,
    pub projects: ProjectRegistry,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4-1106-preview";
const DEFAULT_COMPOSIO_URL: &str = "https://backend.composio.dev";
const DEFAULT_WORKSPACE_ROOT: &str = "/home/user";
pub const DEFAULT_RECURSION_LIMIT: usize = 50;

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", e))?;

        let backend = match var("MODEL_BACKEND") {
            Some(v) => v.parse()?,
            None => ModelBackend::Claude,
        };

        let anthropic = var("ANTHROPIC_API_KEY").map(|api_key| AnthropicConfig {
            api_key,
            model: var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            base_url: var("ANTHROPIC_BASE_URL"),
            temperature: 0.0,
            max_tokens: 8192,
        });

        let openai = var("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: var("OPENAI_BASE_URL"),
            temperature: 0.0,
            max_tokens: 4096,
        });

        match backend {
            ModelBackend::Claude if anthropic.is_none() => {
                return Err(ConfigError::Missing("ANTHROPIC_API_KEY".to_string()))
            }
            ModelBackend::OpenAi if openai.is_none() => {
                return Err(ConfigError::Missing("OPENAI_API_KEY".to_string()))
            }
            _ => {}
        }

        let composio = ComposioConfig {
            api_key: var("COMPOSIO_API_KEY")
                .ok_or_else(|| ConfigError::Missing("COMPOSIO_API_KEY".to_string()))?,
            base_url: var("COMPOSIO_BASE_URL").unwrap_or_else(|| DEFAULT_COMPOSIO_URL.to_string()),
        };

        let recursion_limit = match var("RECURSION_LIMIT") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid("RECURSION_LIMIT", e))?,
            None => DEFAULT_RECURSION_LIMIT,
        };
        if recursion_limit == 0 {
            return Err(invalid("RECURSION_LIMIT", "must be at least 1"));
        }

        let projects = match var("PROJECT_REPOS") {
            Some(v) => ProjectRegistry::parse(&v).map_err(|e| invalid("PROJECT_REPOS", e))?,
            None => ProjectRegistry::default(),
        };

        Ok(Self {
            bind_addr,
            llm: LlmConfig {
                backend,
                anthropic,
                openai,
            },
            composio,
            workspace_root: PathBuf::from(
                var("WORKSPACE_ROOT").unwrap_or_else(|| DEFAULT_WORKSPACE_ROOT.to_string()),
            ),
            recursion_limit,
            webhook_secret: var("WEBHOOK_SECRET"),
            projects,
        })
    }
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
