//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod message;
pub mod run;
pub mod settings;

pub use message::*;
pub use run::*;
pub use settings::*;
