//! Shared utilities, configuration, and error handling for the tutor chat backend
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Store connection setup
//! - Request extractors and timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod time;

pub use config::{Config, StoreProvider};
pub use error::{Error, Result};
pub use extractors::{ValidatedJson, ValidatedQuery};
