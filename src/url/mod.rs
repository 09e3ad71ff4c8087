//! URL handling module for Linkscout
//!
//! This module provides the canonical form used for visited-set membership and
//! page keys, plus the `www.` host toggle used by the retry policy.

mod normalize;

// Re-export main functions
pub use normalize::{canonicalize_url, toggle_www};
