//! Application Configuration
//! 
//! Manages all editor settings including:
//! - Editor preferences (indent unit, gutter)
//! - Offline simulation settings
//! - AI assistant settings
//! - Snapshot storage location

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use tracing::{info, debug};

use crate::error::{NexusError, Result};

/// Editor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Text inserted by Tab and added per auto-indent level
    pub indent_unit: String,
    /// Show the line-number gutter
    pub show_line_numbers: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_unit: "  ".to_string(),
            show_line_numbers: true,
        }
    }
}

/// Offline simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Artificial analysis latency before an offline debug report resolves
    pub debug_delay_ms: u64,
    /// Banner printed at the top of the canned compiler transcript
    pub compiler_banner: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            debug_delay_ms: 800,
            compiler_banner: "NexusCompiler 1.0.0".to_string(),
        }
    }
}

/// AI Assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AIConfig {
    /// Start in online mode
    pub online_by_default: bool,
    /// API key for the hosted model
    pub api_key: Option<String>,
    /// Model used by the coder persona and code analysis
    pub reasoning_model: String,
    /// Model used by search-grounded personas and run simulation
    pub fast_model: String,
    /// Thinking budget for the coder persona
    pub chat_thinking_budget: u32,
    /// Thinking budget for debug/improve analysis
    pub analysis_thinking_budget: u32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            online_by_default: false,
            api_key: None,
            reasoning_model: "gemini-3-pro-preview".to_string(),
            fast_model: "gemini-2.5-flash".to_string(),
            chat_thinking_budget: 32768,
            analysis_thinking_budget: 16384,
        }
    }
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit snapshot path; defaults to the data directory
    pub snapshot_path: Option<PathBuf>,
    /// File name used inside the data directory
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            snapshot_file: "workspace.json".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration version for migrations
    pub version: u32,
    /// Editor settings
    pub editor: EditorConfig,
    /// Offline simulation settings
    pub simulation: SimulationSettings,
    /// AI assistant settings
    pub ai: AIConfig,
    /// Snapshot storage
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            editor: EditorConfig::default(),
            simulation: SimulationSettings::default(),
            ai: AIConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "codenexus", "CodeNexus")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "codenexus", "CodeNexus")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Where the file snapshot lives
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.storage.snapshot_path.clone().or_else(|| {
            Self::data_dir().map(|dir| dir.join(&self.storage.snapshot_file))
        })
    }

    /// Load configuration from the default location
    pub async fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| NexusError::Config("Cannot determine config path".into()))?;
        Self::load_from(&config_file).await
    }

    /// Load configuration from a file, writing defaults if it does not exist
    pub async fn load_from(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            debug!("Loading config from {:?}", config_file);
            let contents = tokio::fs::read_to_string(config_file).await?;
            let config: AppConfig = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            info!("Config file not found, using defaults");
            let config = AppConfig::default();
            config.save_to(config_file).await?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let config_file = Self::config_file()
            .ok_or_else(|| NexusError::Config("Cannot determine config path".into()))?;
        self.save_to(&config_file).await
    }

    /// Save configuration to a file
    pub async fn save_to(&self, config_file: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = config_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(config_file, contents).await?;
        
        debug!("Config saved to {:?}", config_file);
        Ok(())
    }

    /// Reject settings the editor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.editor.indent_unit.is_empty()
            || !self.editor.indent_unit.chars().all(|c| c == ' ' || c == '\t')
        {
            return Err(NexusError::Config(
                "editor.indent_unit must be non-empty whitespace".into(),
            ));
        }
        Ok(())
    }
}
