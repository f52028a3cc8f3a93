//! Configuration for the story composer.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{Result, StoryError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// LLM endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API (e.g., "https://api.openai.com")
    pub api_base: String,

    /// API key for bearer authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4o-mini")
    pub model: String,

    /// Request timeout in seconds; `None` keeps the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: None,
        }
    }
}

/// Generation parameters for outline and chapter requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Token limit for the outline request.
    pub outline_max_tokens: u32,

    /// Token limit for each chapter expansion.
    pub chapter_max_tokens: u32,

    /// Sampling temperature, in [0, 1].
    pub temperature: f32,

    /// Title given to freshly generated stories.
    pub story_title: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            outline_max_tokens: 1000,
            chapter_max_tokens: 2000,
            temperature: 0.7,
            story_title: "My Story".to_string(),
        }
    }
}

/// Where the current story lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/story.json"),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM endpoint settings
    pub llm: LlmConfig,
    /// Outline and chapter request settings
    pub generation: GenerationConfig,
    /// Story file location
    pub store: StoreConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    generation: Option<GenerationFileSection>,
    store: Option<StoreFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GenerationFileSection {
    outline_max_tokens: Option<u32>,
    chapter_max_tokens: Option<u32>,
    temperature: Option<f32>,
    story_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoreFileSection {
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_API_KEY / OPENAI_API_KEY, LLM_MODEL, ...)
    /// 2. Config file (~/.config/story-composer/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_base) = env::var("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY").or_else(|_| env::var("OPENAI_API_KEY")) {
            self.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Some(secs) = parse_env("LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = Some(secs);
        }

        if let Some(tokens) = parse_env("STORY_OUTLINE_MAX_TOKENS") {
            self.generation.outline_max_tokens = tokens;
        }

        if let Some(tokens) = parse_env("STORY_CHAPTER_MAX_TOKENS") {
            self.generation.chapter_max_tokens = tokens;
        }

        if let Some(temp) = parse_env("STORY_TEMPERATURE") {
            self.generation.temperature = temp;
        }

        if let Ok(title) = env::var("STORY_TITLE") {
            self.generation.story_title = title;
        }

        if let Ok(path) = env::var("STORY_PATH") {
            self.store.path = PathBuf::from(path);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoryError::Configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling unspecified keys with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content).map_err(|e| {
            StoryError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            config.llm.timeout_secs = llm.timeout_secs.or(config.llm.timeout_secs);
        }

        if let Some(generation) = file_config.generation {
            if let Some(tokens) = generation.outline_max_tokens {
                config.generation.outline_max_tokens = tokens;
            }
            if let Some(tokens) = generation.chapter_max_tokens {
                config.generation.chapter_max_tokens = tokens;
            }
            if let Some(temperature) = generation.temperature {
                config.generation.temperature = temperature;
            }
            if let Some(title) = generation.story_title {
                config.generation.story_title = title;
            }
        }

        if let Some(store) = file_config.store {
            if let Some(path) = store.path {
                config.store.path = path;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "story-composer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_empty() {
            return Err(StoryError::Configuration(
                "LLM API key is not set. Set LLM_API_KEY (or OPENAI_API_KEY) or add it to the config file.".to_string()
            ));
        }

        if self.llm.api_base.is_empty() {
            return Err(StoryError::Configuration(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(StoryError::Configuration(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.generation.temperature) {
            return Err(StoryError::Configuration(format!(
                "Temperature must be between 0 and 1, got {}",
                self.generation.temperature
            )));
        }

        if self.generation.outline_max_tokens == 0 || self.generation.chapter_max_tokens == 0 {
            return Err(StoryError::Configuration(
                "Token limits must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
