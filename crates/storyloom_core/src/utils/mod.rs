//! Utility functions for identifiers, timestamps and text.
//!
//! This module consolidates small helpers used across the crate.

/// Locally generated identifiers and timestamps.
pub mod ids;
/// Lenient accessors for untrusted JSON.
pub(crate) mod json;
/// Plain-text helpers (HTML stripping, word counts, slugs).
pub mod text;

// Re-export commonly used items for convenience
pub use ids::{generate_local_id, now_timestamp};
pub use text::{count_words, slugify, strip_html};
