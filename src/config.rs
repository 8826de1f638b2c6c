//! Delivery settings.
//!
//! The host application owns the delivery configuration; this subsystem
//! only reads it. Settings are passed explicitly into every call that needs
//! them — never read from ambient global state — so each component stays
//! independently testable.
//!
//! ## Settings File
//!
//! Hosts that keep their settings in files can load a `stylecast.toml`:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! mode = "inline"        # "inline" or "file"
//! public_base = ""       # Base URL serving the cache root; required for "file"
//! ```
//!
//! A missing file yields the defaults. Unknown keys are rejected to catch
//! typos early, and the result is validated before use.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Settings filename looked up by [`load_config`].
const CONFIG_FILENAME: &str = "stylecast.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configured strategy for serving the compiled stylesheet.
///
/// `Inline` recomputes and embeds the stylesheet per request; `File`
/// references the persisted artifact kept fresh by regeneration. Editing
/// requests bypass the mode entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Inline,
    File,
}

/// Delivery settings owned by the host application.
///
/// Read-only from this subsystem's perspective: resolved once per request
/// by the host and handed in by value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Inline vs file delivery.
    pub mode: DeliveryMode,
    /// Base URL under which the cache root is publicly served, e.g.
    /// `https://example.com/uploads`. Only consulted in file mode.
    pub public_base: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::Inline,
            public_base: String::new(),
        }
    }
}

impl DeliveryConfig {
    /// Validate settings combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == DeliveryMode::File && self.public_base.trim().is_empty() {
            return Err(ConfigError::Validation(
                "public_base must be set when mode is \"file\"".into(),
            ));
        }
        Ok(())
    }

    /// Join the public base URL with a root-relative path.
    ///
    /// Tolerates a trailing slash on the base: both `…/uploads` and
    /// `…/uploads/` produce the same URL.
    pub fn artifact_url(&self, public_path: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), public_path)
    }
}

/// Load delivery settings from `stylecast.toml` in the given directory.
///
/// A missing file yields the defaults; an unreadable or invalid file is an
/// error surfaced to the host at startup, never on the request path.
pub fn load_config(dir: &Path) -> Result<DeliveryConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(DeliveryConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: DeliveryConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
