//! Site configuration module.
//!
//! Handles loading, validating, and merging `album-site.toml`. User values are
//! layered on top of stock defaults, so a config file only needs the keys it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! [store]
//! bucket = "my-photos"          # Required
//! region = "us-east-1"
//! endpoint_url = "https://us-east-1.linodeobjects.com"  # Omit for AWS
//! force_path_style = false
//! access_key_id = "..."         # Omit both keys to use the SDK default chain
//! secret_access_key = "..."
//!
//! [website]
//! domain = "website-us-east-1.linodeobjects.com"  # Omit for s3-website-<region>.amazonaws.com
//! title = "Photo Albums"        # Heading of the index page
//!
//! [pipeline]
//! on_album_error = "skip"       # "skip" or "abort"
//! deadline_secs = 600           # Omit for no deadline
//! staging_dir = "/tmp/albums"   # Omit for a fresh temp directory per run
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "album-site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `album-site.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Bucket location and credentials.
    pub store: StoreConfig,
    /// Public website settings.
    pub website: WebsiteConfig,
    /// Site build behavior.
    pub pipeline: PipelineConfig,
}

impl SiteConfig {
    /// Validate the config before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.bucket.trim().is_empty() {
            return Err(ConfigError::Validation("store.bucket must be set".into()));
        }
        if self.store.bucket.contains('/') {
            return Err(ConfigError::Validation(
                "store.bucket must be a bucket name, not a path".into(),
            ));
        }
        if self.store.region.trim().is_empty() {
            return Err(ConfigError::Validation("store.region must not be empty".into()));
        }
        if self.store.access_key_id.is_some() != self.store.secret_access_key.is_some() {
            return Err(ConfigError::Validation(
                "store.access_key_id and store.secret_access_key must be set together".into(),
            ));
        }
        if let Some(domain) = &self.website.domain
            && (domain.is_empty() || domain.contains("://") || domain.contains('/'))
        {
            return Err(ConfigError::Validation(
                "website.domain must be a bare host name".into(),
            ));
        }
        if self.pipeline.deadline_secs == Some(0) {
            return Err(ConfigError::Validation(
                "pipeline.deadline_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Where the bucket lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Bucket holding the albums and the published site.
    pub bucket: String,
    /// Region passed to the SDK; S3-compatible providers often ignore it.
    pub region: String,
    /// Custom endpoint for non-AWS providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Use `endpoint/bucket/key` addressing instead of virtual hosts.
    pub force_path_style: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint_url: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

/// Public website settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebsiteConfig {
    /// Provider website domain; the site is served at `https://<bucket>.<domain>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Heading and title of the index page.
    pub title: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            domain: None,
            title: "Photo Albums".to_string(),
        }
    }
}

/// What to do when one album fails to fetch, render, or publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the failure and continue with the next album.
    #[default]
    Skip,
    /// Stop the whole build at the first failed album.
    Abort,
}

/// Site build behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub on_album_error: FailurePolicy,
    /// Overall time limit for one build. Absent means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
    /// Fixed staging directory. Absent means a fresh temp directory per run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

/// Resolve the website domain, falling back to the AWS pattern for the region.
pub fn website_domain(config: &SiteConfig) -> String {
    config
        .website
        .domain
        .clone()
        .unwrap_or_else(|| format!("s3-website-{}.amazonaws.com", config.store.region))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults and deserialize.
///
/// Validation is left to the caller: command-line overrides (bucket, endpoint)
/// are applied after loading and before [`SiteConfig::validate`].
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(stock_defaults_value(), ov),
        None => stock_defaults_value(),
    };
    Ok(merged.try_into()?)
}

/// Load config from `path`, using defaults when the file doesn't exist.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `album-site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# album-site configuration
# ========================
#
# Every key is optional except store.bucket. Unknown keys are rejected.

[store]
# Bucket holding the albums. Each album is a key prefix: <album>/<photo>.jpg
bucket = ""

# Region passed to the S3 SDK.
region = "us-east-1"

# Endpoint for S3-compatible providers (Linode, MinIO, ...). Omit for AWS.
# endpoint_url = "https://us-east-1.linodeobjects.com"

# Address buckets as endpoint/bucket instead of bucket.endpoint (MinIO).
force_path_style = false

# Static credentials. Omit both to use the SDK default chain
# (AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY, profiles, instance roles).
# access_key_id = ""
# secret_access_key = ""

[website]
# Provider website domain. The site is published at https://<bucket>.<domain>
# Omit for AWS: s3-website-<region>.amazonaws.com
# domain = "website-us-east-1.linodeobjects.com"

# Title and heading of the index page.
title = "Photo Albums"

[pipeline]
# What to do when an album fails: "skip" reports it and continues,
# "abort" stops the build.
on_album_error = "skip"

# Overall time limit for one build, in seconds. Omit for no limit.
# deadline_secs = 600

# Fixed staging directory, locked for the duration of a build.
# Omit to use a fresh temporary directory per run.
# staging_dir = "/var/tmp/album-site"
"##
}

// =============================================================================
// Tests
// =============================================================================
