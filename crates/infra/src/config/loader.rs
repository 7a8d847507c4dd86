//! Configuration loader
//!
//! Loads the provider configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Searches several paths for a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `GENESYSCLOUD_OAUTHCLIENT_ID`: OAuth client id
//! - `GENESYSCLOUD_OAUTHCLIENT_SECRET`: OAuth client secret
//! - `GENESYSCLOUD_ACCESS_TOKEN`: pre-issued token, replaces the two above
//! - `GENESYSCLOUD_REGION`: region name (default `us-east-1`)
//! - `GENESYSCLOUD_API_URL`: API base URL override
//!
//! ## File Locations
//! The loader searches `cxform.toml`, `cxform.json`, `config.toml` and
//! `config.json`, first in the current working directory and then next to
//! the executable.

use std::path::{Path, PathBuf};

use cxform_domain::{CxError, ProviderConfig, Result};

const ENV_CLIENT_ID: &str = "GENESYSCLOUD_OAUTHCLIENT_ID";
const ENV_CLIENT_SECRET: &str = "GENESYSCLOUD_OAUTHCLIENT_SECRET";
const ENV_ACCESS_TOKEN: &str = "GENESYSCLOUD_ACCESS_TOKEN";
const ENV_REGION: &str = "GENESYSCLOUD_REGION";
const ENV_API_URL: &str = "GENESYSCLOUD_API_URL";

const CONFIG_FILE_NAMES: [&str; 4] = ["cxform.toml", "cxform.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If credentials are
/// missing there, falls back to a config file.
///
/// # Errors
/// Returns `CxError::Config` if neither source yields a usable
/// configuration.
pub fn load() -> Result<ProviderConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Either `GENESYSCLOUD_ACCESS_TOKEN` or both OAuth client variables must
/// be set.
///
/// # Errors
/// Returns `CxError::Config` if credentials are missing or the region is
/// unknown.
pub fn load_from_env() -> Result<ProviderConfig> {
    let access_token = optional_env(ENV_ACCESS_TOKEN);
    let (oauth_client_id, oauth_client_secret) = if access_token.is_some() {
        (optional_env(ENV_CLIENT_ID), optional_env(ENV_CLIENT_SECRET))
    } else {
        (Some(env_var(ENV_CLIENT_ID)?), Some(env_var(ENV_CLIENT_SECRET)?))
    };

    let mut config = ProviderConfig {
        oauth_client_id,
        oauth_client_secret,
        access_token,
        api_url: optional_env(ENV_API_URL),
        ..ProviderConfig::default()
    };
    if let Some(region) = optional_env(ENV_REGION) {
        config.region = region;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CxError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Credentials are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ProviderConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CxError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_file().ok_or_else(|| {
            CxError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CxError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ProviderConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CxError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CxError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CxError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Search the standard paths for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `CxError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| {
        CxError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
