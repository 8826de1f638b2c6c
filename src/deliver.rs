//! Per-request delivery decision and head markup rendering.
//!
//! Every page request gets the stylesheet exactly one way: a freshly
//! compiled inline block, or a reference to the persisted artifact. Never
//! both, never neither — an empty aggregate still emits an (empty) inline
//! block so the decision stays total.
//!
//! ## Decision rules
//!
//! 1. **Editing bypass**: a live-preview request always compiles inline,
//!    ignoring the configured mode and never touching the artifact. An
//!    editor must see unsaved state immediately; a cached file cannot.
//! 2. **Inline mode**: compile inline per request; no caching involved.
//! 3. **File mode**: reference the artifact if it exists; otherwise compile
//!    inline as a self-healing fallback until the next successful
//!    regeneration. A visitor never gets an unstyled page because the
//!    artifact is missing.
//!
//! All inputs are explicit call-time parameters — configuration and the
//! request context arrive from the host, nothing is read from ambient
//! global state.

use crate::cache::CacheStore;
use crate::collect::StyleRegistry;
use crate::compile::compile;
use crate::config::{DeliveryConfig, DeliveryMode};
use maud::{Markup, PreEscaped, html};

/// Comment marker emitted immediately before the inline style block.
const INLINE_MARKER: &str = "<!-- stylecast css -->";

/// Per-request signals from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// True when the current request is a privileged live-preview session
    /// whose unsaved edits must be visible immediately.
    pub editing: bool,
}

impl RequestContext {
    /// An ordinary visitor request.
    pub fn visitor() -> Self {
        Self { editing: false }
    }

    /// A privileged live-preview request.
    pub fn editor() -> Self {
        Self { editing: true }
    }
}

/// What one request receives: exactly one of an inline block or a
/// reference to the cached artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Freshly compiled CSS to embed in the document head.
    Inline { css: String },
    /// Absolute URL of the persisted artifact.
    FileReference { href: String },
}

/// Decide how this request receives the stylesheet.
///
/// Total: every failure beneath this call (producer errors, a missing
/// artifact) degrades to inline compilation, so the page always gets its
/// styles.
pub fn resolve(
    registry: &StyleRegistry,
    panel_css: Option<&str>,
    config: &DeliveryConfig,
    ctx: RequestContext,
    store: &CacheStore,
) -> Delivery {
    if ctx.editing {
        return inline(registry, panel_css);
    }
    match config.mode {
        DeliveryMode::Inline => inline(registry, panel_css),
        DeliveryMode::File => {
            if store.exists() {
                Delivery::FileReference {
                    href: config.artifact_url(&store.public_path()),
                }
            } else {
                // Self-healing fallback until the next regeneration.
                inline(registry, panel_css)
            }
        }
    }
}

fn inline(registry: &StyleRegistry, panel_css: Option<&str>) -> Delivery {
    Delivery::Inline {
        css: compile(registry, panel_css).into_content(),
    }
}

impl Delivery {
    /// Render head markup: the marker comment plus a `<style>` block for
    /// inline delivery, a `<link>` for a file reference.
    ///
    /// Inline CSS went through the compile pass, which strips embedded
    /// markup, so it is embedded unescaped — escaping here would corrupt
    /// selectors like `a > b`.
    pub fn to_markup(&self) -> Markup {
        match self {
            Delivery::Inline { css } => html! {
                (PreEscaped(INLINE_MARKER))
                style { (PreEscaped(css)) }
            },
            Delivery::FileReference { href } => html! {
                link rel="stylesheet" href=(href);
            },
        }
    }
}
