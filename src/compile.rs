//! The compile pass: collect, sanitize, minify.
//!
//! One pass turns the current contribution state into a
//! [`CompiledStylesheet`]:
//!
//! ```text
//! registry.collect()  →  aggregate (+ panel CSS)  →  strip_markup  →  minify
//! ```
//!
//! The same pass backs both delivery paths, which is what makes inline and
//! file output byte-identical for the same contribution state: file-mode
//! regeneration persists exactly what an inline request would have emitted.
//!
//! ## Sanitization policy
//!
//! Markup stripping applies to the **full aggregate**, every pass. The
//! free-text panel is the only untrusted-origin input, but sanitizing the
//! whole aggregate uniformly keeps the pipeline a single deterministic
//! function of its input, with no per-path or per-fragment variation.
//!
//! ## Regeneration
//!
//! [`regenerate`] is the one writer of the cache artifact. The host fires
//! it from its privileged admin action; it no-ops unless the configured
//! mode is [`DeliveryMode::File`], and reports a write failure back to that
//! admin caller rather than hiding it.

use crate::cache::{self, CacheError, CacheStore};
use crate::collect::{StyleContribution, StyleRegistry};
use crate::config::{DeliveryConfig, DeliveryMode};
use crate::minify::{minify, strip_markup};

/// The aggregated, minified result of one compile pass.
///
/// Transient: exists only as a value unless [`regenerate`] persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStylesheet {
    content: String,
}

impl CompiledStylesheet {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// SHA-256 hex of the content, as recorded in the cache manifest.
    pub fn content_hash(&self) -> String {
        cache::content_hash(&self.content)
    }
}

/// Run a full compile pass over the registry plus the free-text panel.
///
/// The panel, when present and non-blank, is appended after all registry
/// contributions so its rules win the cascade. Zero contributions compile
/// to an empty stylesheet.
pub fn compile(registry: &StyleRegistry, panel_css: Option<&str>) -> CompiledStylesheet {
    compile_contributions(&registry.collect(), panel_css)
}

/// Compile an already-collected contribution list. Split out from
/// [`compile`] so hosts and tests can run the pipeline on captured
/// contributions.
pub fn compile_contributions(
    contributions: &[StyleContribution],
    panel_css: Option<&str>,
) -> CompiledStylesheet {
    let mut aggregate = String::new();
    for contribution in contributions {
        push_fragment(&mut aggregate, &contribution.text);
    }
    if let Some(panel) = panel_css
        && !panel.trim().is_empty()
    {
        push_fragment(&mut aggregate, panel);
    }
    CompiledStylesheet {
        content: minify(&strip_markup(&aggregate)),
    }
}

/// Join fragments on a newline; the separator disappears in minification
/// but keeps a fragment missing its closing brace from gluing onto the
/// next selector without any boundary at all.
fn push_fragment(aggregate: &mut String, fragment: &str) {
    if !aggregate.is_empty() {
        aggregate.push('\n');
    }
    aggregate.push_str(fragment);
}

/// Outcome of firing the regeneration trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regeneration {
    /// The artifact was rebuilt and persisted.
    Written { bytes: usize },
    /// Delivery mode is Inline; nothing was compiled or touched.
    SkippedInlineMode,
}

/// Rebuild the cache artifact from the current contribution state.
///
/// Fired synchronously by the host's privileged administrative action.
/// No-ops unless the configured mode is `File`; when active it compiles
/// and overwrites the artifact unconditionally, so repeated firing with
/// unchanged contributions is idempotent down to the byte.
///
/// A write failure leaves the prior artifact (if any) untouched and is
/// returned to the caller — the admin action is the one place the failure
/// is actionable. Visitor-facing delivery degrades to inline on its own.
pub fn regenerate(
    registry: &StyleRegistry,
    panel_css: Option<&str>,
    config: &DeliveryConfig,
    store: &CacheStore,
) -> Result<Regeneration, CacheError> {
    if config.mode != DeliveryMode::File {
        return Ok(Regeneration::SkippedInlineMode);
    }

    let compiled = compile(registry, panel_css);
    if let Err(error) = store.write(compiled.content()) {
        tracing::warn!(%error, "stylesheet regeneration failed, keeping prior artifact");
        return Err(error);
    }
    Ok(Regeneration::Written {
        bytes: compiled.content().len(),
    })
}
