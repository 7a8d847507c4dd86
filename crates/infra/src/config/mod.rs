//! Configuration loading
//!
//! Builds a [`cxform_domain::ProviderConfig`] from environment variables or
//! configuration files.

pub mod loader;

pub use loader::{find_config_file, load, load_from_env, load_from_file};
