//! Configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::agents::{INGREDIENT_AGENT, RECIPE_AGENT};

/// Default OpenRouter base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model for the ingredient analysis agent.
pub const DEFAULT_INGREDIENT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Default model for the recipe crafting agent.
pub const DEFAULT_RECIPE_MODEL: &str = "openai/gpt-4.1-mini";

/// Default completion budget per generation call.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default bound on a single stage's generation call.
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Which backend the agents talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    OpenRouter,
    Claude,
    Fake,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Claude => "claude",
            ProviderKind::Fake => "fake",
        }
    }

    /// Environment variable holding this provider's API key, if it needs one.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenRouter => Some("OPENROUTER_API_KEY"),
            ProviderKind::Claude => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Fake => None,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "claude" | "anthropic" => Ok(ProviderKind::Claude),
            "fake" => Ok(ProviderKind::Fake),
            _ => Err(ConfigError::InvalidValue {
                var: "SOUS_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Provider and model configuration for the agents.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: ProviderKind,
    /// API key for the selected provider. Not needed for `fake`.
    pub api_key: Option<String>,
    /// Base URL for the OpenRouter API.
    pub base_url: String,
    pub ingredient_model: String,
    pub recipe_model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// If set, responses are cached on disk under this directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            ingredient_model: DEFAULT_INGREDIENT_MODEL.to_string(),
            recipe_model: DEFAULT_RECIPE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            cache_dir: None,
        }
    }
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENROUTER_API_KEY` or `ANTHROPIC_API_KEY`, matching `SOUS_PROVIDER`
    ///
    /// Optional:
    /// - `SOUS_PROVIDER`: "openrouter" | "claude" | "fake" (default: "openrouter")
    /// - `SOUS_BASE_URL`: API base URL (default: "https://openrouter.ai/api/v1")
    /// - `SOUS_INGREDIENT_MODEL`: Model for ingredient analysis
    /// - `SOUS_RECIPE_MODEL`: Model for recipe crafting
    /// - `SOUS_MAX_TOKENS`: Completion budget (default: 4096)
    /// - `SOUS_TEMPERATURE`: Sampling temperature (default: provider default)
    /// - `SOUS_CACHE`: Set to "true" to cache responses on disk
    /// - `SOUS_CACHE_DIR`: Cache directory; setting it also enables caching (default: "~/.sous/llm-cache")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("SOUS_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderKind::default(),
        };

        let api_key = match provider.api_key_var() {
            Some(var) => Some(lookup(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))?),
            None => None,
        };

        let base_url = lookup("SOUS_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let ingredient_model =
            lookup("SOUS_INGREDIENT_MODEL").unwrap_or_else(|| DEFAULT_INGREDIENT_MODEL.to_string());
        let recipe_model =
            lookup("SOUS_RECIPE_MODEL").unwrap_or_else(|| DEFAULT_RECIPE_MODEL.to_string());

        let max_tokens = parse_var(&lookup, "SOUS_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS);
        let temperature = parse_var(&lookup, "SOUS_TEMPERATURE")?;

        let cache_enabled = lookup("SOUS_CACHE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let cache_dir = match lookup("SOUS_CACHE_DIR") {
            Some(dir) => Some(PathBuf::from(dir)),
            None if cache_enabled => Some(Self::default_cache_dir()),
            None => None,
        };

        Ok(Self {
            provider,
            api_key,
            base_url,
            ingredient_model,
            recipe_model,
            max_tokens,
            temperature,
            cache_dir,
        })
    }

    /// Get the default cache directory: ~/.sous/llm-cache
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".sous").join("llm-cache"))
            .unwrap_or_else(|| PathBuf::from(".cache/llm"))
    }
}

/// Which agent each stage talks to and how long a stage may wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub ingredient_agent: String,
    pub recipe_agent: String,
    pub stage_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            ingredient_agent: INGREDIENT_AGENT.to_string(),
            recipe_agent: RECIPE_AGENT.to_string(),
            stage_timeout: Duration::from_secs(DEFAULT_STAGE_TIMEOUT_SECS),
        }
    }
}

impl WorkflowConfig {
    /// Load stage bindings from environment variables.
    ///
    /// - `SOUS_INGREDIENT_AGENT`: Agent for ingredient analysis (default: "ingredientAgent")
    /// - `SOUS_RECIPE_AGENT`: Agent for recipe crafting (default: "recipeAgent")
    /// - `SOUS_STAGE_TIMEOUT_SECS`: Per-stage timeout (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_secs = parse_var::<u64, _>(&lookup, "SOUS_STAGE_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_STAGE_TIMEOUT_SECS);

        Ok(Self {
            ingredient_agent: lookup("SOUS_INGREDIENT_AGENT").unwrap_or(defaults.ingredient_agent),
            recipe_agent: lookup("SOUS_RECIPE_AGENT").unwrap_or(defaults.recipe_agent),
            stage_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var.to_string(),
                value,
            }),
        None => Ok(None),
    }
}
