//! # Core Module
//!
//! Configuration and error handling shared by the library and the bot binary.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Add typed error, drop message chunking helpers
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
