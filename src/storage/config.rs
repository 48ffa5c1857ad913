//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file.
//! `REPORTDECK_ENDPOINT` and `REPORTDECK_DATA_DIR` override the stored
//! values without rewriting the file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_reportdeck_dir, reportdeck_dir};

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Create a new config service, loading existing config or creating defaults
    pub fn new() -> AppResult<Self> {
        ensure_reportdeck_dir()?;
        let mut service = Self::from_path(config_path()?)?;
        service.apply_env_overrides();
        Ok(service)
    }

    /// Create a config service backed by an explicit file path
    pub fn from_path(config_path: PathBuf) -> AppResult<Self> {
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Environment variables win over the stored file but are never
    /// written back to it.
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("REPORTDECK_ENDPOINT") {
            if !endpoint.is_empty() {
                self.config.endpoint = endpoint;
            }
        }
        if let Ok(dir) = std::env::var("REPORTDECK_DATA_DIR") {
            if !dir.is_empty() {
                self.config.data_dir = Some(PathBuf::from(dir));
            }
        }
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Update the configuration with a partial update
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        self.config.apply_update(update);
        self.save()?;
        Ok(self.config.clone())
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    /// Resolve the directory holding transcripts, reports and session state
    pub fn data_dir(&self) -> AppResult<PathBuf> {
        match &self.config.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => reportdeck_dir(),
        }
    }
}
