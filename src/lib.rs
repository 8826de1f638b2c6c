//! # Stylecast
//!
//! Stylesheet compilation and delivery for multi-contributor sites. Many
//! independent components — theme settings, widgets, plugins, one free-text
//! "custom CSS" panel — each contribute a fragment of style text; stylecast
//! merges them into a single minified stylesheet and decides, per request,
//! how the page receives it.
//!
//! # Architecture: One Pipeline, Two Delivery Paths
//!
//! Every stylesheet a visitor sees comes out of the same compile pass:
//!
//! ```text
//! registry.collect()  →  aggregate (+ panel)  →  strip_markup  →  minify
//! ```
//!
//! What varies is delivery. In **inline** mode the pass runs on every
//! request and the result is embedded in the document head. In **file**
//! mode an administrative *regeneration* persists the result once, and
//! requests reference the cached artifact instead — with two carve-outs:
//!
//! - **Editing bypass**: a live-preview request always compiles inline, so
//!   an editor sees unsaved changes immediately.
//! - **Missing-artifact fallback**: if the artifact is absent (never
//!   regenerated, or the write failed), delivery self-heals by compiling
//!   inline until the next successful regeneration.
//!
//! Because both paths share the pipeline, inline output and the persisted
//! artifact are byte-identical for the same contribution state.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collect`] | Ordered registry of named style producers, failure-isolated collection |
//! | [`minify`] | Pure CSS minification and markup stripping |
//! | [`compile`] | The compile pass and the regeneration trigger |
//! | [`cache`] | Artifact persistence: atomic overwrite, read, existence, drift manifest |
//! | [`deliver`] | Per-request delivery decision and head markup rendering |
//! | [`config`] | Delivery mode and settings, TOML loading and validation |
//!
//! # Design Decisions
//!
//! ## Explicit State, No Globals
//!
//! Delivery settings and the request context are plain values passed into
//! every call. Nothing reads ambient global state, so each component is
//! independently testable and a host can resolve settings however it
//! likes — per site, per tenant, per request.
//!
//! ## Staleness Is a Feature, Not a Bug
//!
//! The artifact records the contribution state as of the last regeneration.
//! There is deliberately no automatic invalidation: visitors may see a
//! stale stylesheet until the admin action fires again, which is the
//! correct trade for never recomputing on the visitor path. The manifest
//! sidecar's hash exists for hosts that want to *detect* drift cheaply; it
//! never changes the delivery decision.
//!
//! ## Failures Never Reach the Visitor
//!
//! A broken producer is skipped; a missing or unreadable artifact falls
//! back to inline; a failed regeneration keeps the prior artifact and
//! reports to the admin caller only. The worst outcome anywhere in this
//! crate is serving a freshly compiled stylesheet instead of a cached one.
//!
//! ## Atomic Artifact Writes
//!
//! The artifact is overwritten via temp-file-plus-rename, so a reader
//! racing a regeneration sees the old complete file or the new complete
//! file, never a torn one.

pub mod cache;
pub mod collect;
pub mod compile;
pub mod config;
pub mod deliver;
pub mod minify;

#[cfg(test)]
pub(crate) mod test_helpers;
