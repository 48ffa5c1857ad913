//! Storage Layer
//!
//! Handles all data persistence: JSON config, run transcripts, stored
//! reports and the session pointer.

pub mod config;
pub mod store;

pub use config::*;
pub use store::*;
