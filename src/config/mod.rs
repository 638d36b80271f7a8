//! Configuration: provider, credential, model, sampling and prompt overrides.
//!
//! User-level config: `~/.scribe/config.yaml` (provider, keys, model)
//! Project-level config: `.scribe/config.yaml` (field-wise override)
//!
//! Resolution: project config → user config → env var fallback. The result is
//! frozen into a [`Settings`] snapshot for each operation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default cap on generated tokens.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Which API family to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
}

impl Provider {
    /// Provider-specific env var consulted when no key is configured.
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::OpenAi => f.write_str("openai"),
        }
    }
}

/// Free-form replacements for the built-in system prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proofread: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize: Option<String>,
}

impl PromptOverrides {
    fn merge(&mut self, other: PromptOverrides) {
        merge_field(&mut self.proofread, other.proofread);
        merge_field(&mut self.improve, other.improve);
        merge_field(&mut self.complete, other.complete);
        merge_field(&mut self.translate, other.translate);
        merge_field(&mut self.summarize, other.summarize);
    }
}

/// On-disk configuration. Every field is optional so files can layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_language: Option<String>,
    #[serde(default)]
    pub prompts: PromptOverrides,
}

/// Errors reading config files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Immutable view of the configuration used for one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: Provider,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: Option<f32>,
    pub primary_language: String,
    pub secondary_language: String,
    pub prompts: PromptOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

/// Path to `~/.scribe/`.
fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(".scribe"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".scribe"))
    }
}

/// Path to the user-level config file.
pub fn user_config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.yaml"))
}

/// Project-level config path, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".scribe/config.yaml";

fn merge_field<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl Config {
    /// Load user + project config and apply env fallbacks.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(user_config_path().as_deref(), Path::new(PROJECT_CONFIG_PATH))?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Layer the project file over the user file. Missing files are skipped.
    pub fn load_from(user: Option<&Path>, project: &Path) -> Result<Self, ConfigError> {
        let mut config = match user {
            Some(path) => Self::read_optional(path)?,
            None => Self::default(),
        };
        config.merge(Self::read_optional(project)?);
        Ok(config)
    }

    /// Parse a config file; a missing file is an empty config.
    pub fn read_optional(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        debug!(path = %path.display(), "loading config");
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrite fields that `other` sets.
    pub fn merge(&mut self, other: Config) {
        merge_field(&mut self.provider, other.provider);
        merge_field(&mut self.api_key, other.api_key);
        merge_field(&mut self.model, other.model);
        merge_field(&mut self.base_url, other.base_url);
        merge_field(&mut self.max_output_tokens, other.max_output_tokens);
        merge_field(&mut self.temperature, other.temperature);
        merge_field(&mut self.primary_language, other.primary_language);
        merge_field(&mut self.secondary_language, other.secondary_language);
        self.prompts.merge(other.prompts);
    }

    /// Fill a missing credential and model from the environment.
    ///
    /// `SCRIBE_API_KEY` wins over the provider's own variable.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            let provider = self.provider.unwrap_or_default();
            self.api_key = var("SCRIBE_API_KEY").or_else(|| var(provider.env_var()));
        }
        if self.model.is_none() {
            self.model = var("SCRIBE_MODEL");
        }
    }

    /// Freeze into a snapshot with defaults applied.
    pub fn settings(&self) -> Settings {
        Settings {
            provider: self.provider.unwrap_or_default(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            max_output_tokens: self.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            temperature: self.temperature,
            primary_language: self
                .primary_language
                .clone()
                .unwrap_or_else(|| "English".into()),
            secondary_language: self
                .secondary_language
                .clone()
                .unwrap_or_else(|| "Spanish".into()),
            prompts: self.prompts.clone(),
        }
    }
}
