//! Configuration management for Telos
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/telos/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, TelosError};

/// Main configuration for Telos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ollama configuration
    pub ollama: OllamaConfig,
    /// Model configuration
    pub models: ModelConfig,
    /// Agent configuration
    pub agent: AgentConfig,
    /// Credentials for the optional tool integrations
    #[serde(default = "IntegrationsConfig::from_env")]
    pub integrations: IntegrationsConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Host address (default: localhost)
    pub host: String,
    /// Port number (default: 11434)
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used for the plan/decide/reflect calls
    /// Default: qwen3:8b
    pub default: String,
    /// Model used by tools that summarize fetched content
    /// Default: same as `default`
    pub analysis: String,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum reasoning loop iterations before stopping
    /// Default: 10
    pub max_iterations: usize,
    /// Number of recent cycles included in the planning context
    /// Default: 3
    pub history_window: usize,
    /// Whether to show debug output
    pub debug: bool,
}

/// Bearer tokens for the email and social tool integrations.
///
/// Obtaining these tokens (OAuth consent, app registration) is out of
/// scope; Telos only consumes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// OAuth access token for the Gmail REST API
    pub gmail_token: Option<String>,
    /// Bearer token for the X API v2
    pub x_bearer_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            models: ModelConfig::default(),
            agent: AgentConfig::default(),
            integrations: IntegrationsConfig::from_env(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: env::var("OLLAMA_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(11434),
            timeout_secs: 120,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let default =
            env::var("TELOS_MODEL").unwrap_or_else(|_| "qwen3:8b".to_string());
        Self {
            analysis: env::var("TELOS_ANALYSIS_MODEL").unwrap_or_else(|_| default.clone()),
            default,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            history_window: 3,
            debug: env::var("TELOS_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl IntegrationsConfig {
    /// Read integration tokens from the environment
    pub fn from_env() -> Self {
        Self {
            gmail_token: env::var("GMAIL_ACCESS_TOKEN").ok(),
            x_bearer_token: env::var("X_BEARER_TOKEN").ok(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("telos")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(TelosError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| TelosError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TelosError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| TelosError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TelosError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| TelosError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get the full Ollama API URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Update the default model
    pub fn set_model(&mut self, model: impl Into<String>) {
        self.models.default = model.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.agent.max_iterations, 10);
        assert_eq!(config.agent.history_window, 3);
    }

    #[test]
    fn test_ollama_url() {
        let config = Config::default();
        assert!(config.ollama_url().starts_with("http://"));
        assert!(config.ollama_url().ends_with(":11434"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("max_iterations"));
        assert!(toml_str.contains("[ollama]"));
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("telos"));
    }
}
