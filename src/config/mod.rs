//! Configuration module for insta-fetch.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Candidate source selection
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, OptionsConfig, RemoteConfig, SourceConfig, TargetsConfig};
pub use modes::SourceKind;
pub use validation::{normalize_handle, validate_config};
