//! Reportdeck - Streaming Business Report Client
//!
//! This library backs the reportdeck binary. It wires the agent
//! streaming crate and the report normalization crate into a CLI:
//! - CLI argument definitions and command handlers
//! - Chat service driving runs and mapping stream outcomes to messages
//! - Storage layer (config, transcripts, reports, session pointer)
//! - Data models, rendering and utilities

pub mod cli;
pub mod commands;
pub mod models;
pub mod output;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use models::message::{ChatMessage, Role};
pub use models::run::RunIndexEntry;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::chat::{ChatService, SendReport};
pub use storage::config::ConfigService;
pub use storage::store::{RunStore, SessionSnapshot};
pub use utils::error::{AppError, AppResult};
