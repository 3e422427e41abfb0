//! Configuration validation

use tracing::debug;

use crate::assets::AssetPolicy;
use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_tag(config)?;
    validate_assets(&config.assets)?;
    validate_uploads(config)?;
    validate_github(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> crate::error::LiftoffError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
    .into()
}

fn validate_tag(config: &Config) -> Result<()> {
    if config.tag.ref_prefix.is_empty() {
        return Err(invalid("tag.ref_prefix", "prefix cannot be empty"));
    }
    Ok(())
}

/// Validate an asset policy on its own (CLI overrides go through this too)
pub fn validate_assets(policy: &AssetPolicy) -> Result<()> {
    match policy {
        AssetPolicy::Prefix { prefix } => {
            if prefix.is_empty() {
                return Err(invalid("assets.prefix", "prefix cannot be empty"));
            }
        }
        AssetPolicy::Extensions { extensions } => {
            if extensions.is_empty() {
                return Err(invalid("assets.extensions", "at least one extension is required"));
            }
            for (i, ext) in extensions.iter().enumerate() {
                if !ext.starts_with('.') || ext.len() < 2 {
                    return Err(invalid(
                        format!("assets.extensions[{}]", i),
                        format!("'{}' must start with '.'", ext),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn validate_uploads(config: &Config) -> Result<()> {
    if config.uploads.concurrency == 0 {
        return Err(invalid("uploads.concurrency", "must be at least 1"));
    }
    Ok(())
}

fn validate_github(config: &Config) -> Result<()> {
    let url = config.github.api_url.as_str();
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(invalid("github.api_url", "must be an http(s) URL"));
    }
    if config.github.timeout_secs == 0 {
        return Err(invalid("github.timeout_secs", "must be at least 1"));
    }
    Ok(())
}
