//! Shared test utilities for the stylecast test suite.
//!
//! Builds registries and settings fixtures so tests state their
//! contribution setup in one line.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut registry = registry_with(&[("theme", "body{color:red;}")]);
//! register_failing(&mut registry, "broken-plugin");
//! let config = file_config();
//! ```

use crate::collect::StyleRegistry;
use crate::config::{DeliveryConfig, DeliveryMode};

/// Build a registry whose producers return the given `(name, css)` pairs,
/// in order.
pub fn registry_with(fragments: &[(&str, &str)]) -> StyleRegistry {
    let mut registry = StyleRegistry::new();
    for (name, css) in fragments {
        let css = css.to_string();
        registry.register(*name, move || Ok(css.clone()));
    }
    registry
}

/// Register a producer that always fails.
pub fn register_failing(registry: &mut StyleRegistry, name: &str) {
    registry.register(name, || Err("producer exploded".into()));
}

/// File-mode settings with a fixed public base.
pub fn file_config() -> DeliveryConfig {
    DeliveryConfig {
        mode: DeliveryMode::File,
        public_base: "https://example.com/uploads".into(),
    }
}
