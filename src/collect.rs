//! Style contribution collection.
//!
//! The host application lets an open set of components — theme settings,
//! widgets, plugins — each contribute a fragment of CSS to the final
//! stylesheet. This module is the registry those components register with.
//!
//! ## Ordering
//!
//! Producers run in registration order, and that order is stable for the
//! lifetime of the registry. The aggregate is order-sensitive (CSS cascade),
//! so the registry is an explicit ordered list rather than any kind of
//! broadcast dispatch.
//!
//! ## Failure isolation
//!
//! A producer is arbitrary host code and may fail. A failing producer is
//! skipped with a warning and the remaining producers still run; one broken
//! plugin must not cost the page its stylesheet. Empty output is likewise
//! skipped, silently.
//!
//! The distinguished free-text field (the custom CSS panel) is *not* a
//! registry entry: its storage belongs to the host and its value can change
//! between requests, so it is passed explicitly into each compile pass. See
//! [`compile`](crate::compile).

use std::error::Error;
use std::fmt;

/// Errors producers may return. Boxed, because producers are host code with
/// error types of their own.
pub type ProducerError = Box<dyn Error + Send + Sync>;

type Producer = Box<dyn Fn() -> Result<String, ProducerError> + Send + Sync>;

/// One producer's fragment of style text, captured during a collection pass.
///
/// Ephemeral: produced fresh on every [`StyleRegistry::collect`] call and
/// never individually persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleContribution {
    /// Registered name of the producer that supplied the text.
    pub source: String,
    /// Raw CSS-like text, neither sanitized nor minified yet.
    pub text: String,
}

/// Ordered registry of named style producers.
///
/// Producers must be `Send + Sync` so a host can share one registry across
/// request threads behind an `Arc`.
#[derive(Default)]
pub struct StyleRegistry {
    producers: Vec<(String, Producer)>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer under a display name.
    ///
    /// Registration order is collection order. Names are not required to be
    /// unique; they exist for attribution in logs and contributions.
    pub fn register<F>(&mut self, name: impl Into<String>, producer: F)
    where
        F: Fn() -> Result<String, ProducerError> + Send + Sync + 'static,
    {
        self.producers.push((name.into(), Box::new(producer)));
    }

    /// Number of registered producers.
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// Run every producer in registration order and gather the non-empty
    /// results.
    ///
    /// A producer that errors is skipped with a warning; one that returns
    /// blank text is skipped silently. Collection itself never fails, and a
    /// registry of zero producers yields an empty list.
    pub fn collect(&self) -> Vec<StyleContribution> {
        let mut contributions = Vec::with_capacity(self.producers.len());
        for (name, producer) in &self.producers {
            match producer() {
                Ok(text) if text.trim().is_empty() => {}
                Ok(text) => contributions.push(StyleContribution {
                    source: name.clone(),
                    text,
                }),
                Err(error) => {
                    tracing::warn!(source = name.as_str(), %error, "style producer failed, skipping");
                }
            }
        }
        contributions
    }
}

impl fmt::Debug for StyleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.producers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("StyleRegistry")
            .field("producers", &names)
            .finish()
    }
}
