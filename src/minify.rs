//! CSS minification and markup stripping.
//!
//! Both transforms here are pure text functions: no parsing into an AST, no
//! validation, no failure mode. Malformed input passes through best-effort —
//! the aggregate stylesheet is built from fragments supplied by arbitrary
//! host code, and a broken fragment must never take down the whole sheet.
//!
//! ## Guarantees
//!
//! - **Deterministic**: identical input always yields identical output, so
//!   two compile passes over unchanged contributions are byte-identical.
//! - **Idempotent**: `minify(minify(s)) == minify(s)`. The cached artifact
//!   stores already-minified content, and nothing breaks if it is fed back
//!   through the pipeline.
//!
//! ## What minification does
//!
//! 1. `/* ... */` comments are removed. An unterminated comment is dropped
//!    through end of input rather than leaking into the output.
//! 2. Any whitespace run collapses to a single space.
//! 3. Spaces adjacent to `:`, `;`, `{` and `}` are removed, and the result
//!    is trimmed. Single spaces between other tokens are preserved —
//!    `margin:0 auto` keeps its inner space, and combinators like `a > b`
//!    survive (as `a>b` would change nothing, `>` is left alone entirely).

/// Delimiters that never need surrounding whitespace.
fn is_delimiter(c: char) -> bool {
    matches!(c, ':' | ';' | '{' | '}')
}

/// Remove `/* ... */` comments. An unterminated comment swallows the rest
/// of the input.
fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Minify CSS-like text.
///
/// Strips comments and insignificant whitespace while leaving declarations
/// intact. Total: never fails, whatever the input looks like.
pub fn minify(css: &str) -> String {
    let stripped = strip_comments(css);
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            // A space survives only between two non-delimiter tokens.
            if !is_delimiter(c) && !out.is_empty() && !out.ends_with(is_delimiter) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Strip embedded angle-bracket markup from free-text input.
///
/// Everything from `<` through the matching `>` is removed; a `>` outside a
/// tag is kept, so CSS child combinators (`div > p`) survive. An unclosed
/// `<` swallows the rest of the input — the same trade a tag-stripping
/// regex makes, and the safe direction for untrusted text.
pub fn strip_markup(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        if in_tag {
            if c == '>' {
                in_tag = false;
            }
        } else if c == '<' {
            in_tag = true;
        } else {
            result.push(c);
        }
    }
    result
}
