//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use reportdeck_agent::DEFAULT_RUN_ID_HEADER;

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent endpoint URL that receives run requests
    pub endpoint: String,
    /// Response header carrying the run id
    #[serde(default = "default_run_id_header")]
    pub run_id_header: String,
    /// Analysis mode label prefixed to ordinary chat messages
    #[serde(default = "default_mode")]
    pub default_mode: String,
    /// Data directory override; defaults to ~/.reportdeck
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_run_id_header() -> String {
    DEFAULT_RUN_ID_HEADER.to_string()
}

fn default_mode() -> String {
    "Quick".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/agents/report".to_string(),
            run_id_header: default_run_id_header(),
            default_mode: default_mode(),
            data_dir: None,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub endpoint: Option<String>,
    pub run_id_header: Option<String>,
    pub default_mode: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(endpoint) = update.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(header) = update.run_id_header {
            self.run_id_header = header;
        }
        if let Some(mode) = update.default_mode {
            self.default_mode = mode;
        }
        if let Some(dir) = update.data_dir {
            self.data_dir = Some(dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("Invalid endpoint URL: {}", e))?;
        if !["http", "https"].contains(&url.scheme()) {
            return Err(format!(
                "Invalid endpoint scheme: {}. Must be 'http' or 'https'",
                url.scheme()
            ));
        }

        if self.run_id_header.trim().is_empty() {
            return Err("run_id_header cannot be empty".to_string());
        }
        if self.run_id_header.chars().any(char::is_whitespace) {
            return Err("run_id_header cannot contain whitespace".to_string());
        }

        if self.default_mode.trim().is_empty() {
            return Err("default_mode cannot be empty".to_string());
        }

        Ok(())
    }
}
