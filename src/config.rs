//! Configuration for Chatr
//!
//! Loaded from ~/.config/chatr/chatr.yml or .chatr.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Default workspace directory for the file manager tool.
pub const DEFAULT_WORKSPACE_DIR: &str = "workspace";

/// Global configuration for Chatr.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// LLM provider settings.
    pub llm: LlmConfig,

    /// Session memory settings.
    pub session: SessionConfig,

    /// Tool settings.
    pub tools: ToolsConfig,
}

impl GlobalConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .chatr.yml in current directory
    /// 3. ~/.config/chatr/chatr.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project config
        let project_config = PathBuf::from(".chatr.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .chatr.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .chatr.yml: {}", e);
                }
            }
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("chatr").join("chatr.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.llm.max_tokens == 0 {
            eyre::bail!("llm.max-tokens must be > 0");
        }
        if self.llm.timeout_secs == 0 {
            eyre::bail!("llm.timeout-secs must be > 0");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            eyre::bail!("llm.temperature must be between 0.0 and 2.0");
        }
        if self.session.max_history_turns == 0 {
            eyre::bail!("session.max-history-turns must be > 0");
        }
        Ok(())
    }
}

/// LLM provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Max output tokens per call.
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Timeout per LLM call in seconds.
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 8192,
            timeout_secs: 60,
        }
    }
}

/// Session memory settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Max prior turns spliced into a generation request.
    #[serde(rename = "max-history-turns")]
    pub max_history_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 20,
        }
    }
}

/// Tool settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Workspace directory for the file manager tool.
    #[serde(rename = "workspace-dir")]
    pub workspace_dir: PathBuf,

    /// Tools that start out disabled.
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from(DEFAULT_WORKSPACE_DIR),
            disabled: Vec::new(),
        }
    }
}
