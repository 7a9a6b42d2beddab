//! # Core Module
//!
//! Configuration and shared Discord text limits.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod config;
pub mod response;

// Re-export commonly used items
pub use config::Config;
pub use response::{truncate_chars, truncate_for_message, MESSAGE_LIMIT};
