//! Link relevancy classification
//!
//! This module assigns every discovered link a priority tier:
//! - Deterministic keyword matching (`KeywordClassifier`)
//! - A pluggable relevancy scorer capability (`RelevancyScorer`)
//! - LLM scorers for OpenAI-compatible and Gemini endpoints, with call spacing
//!
//! The crawl engine combines the keyword tier and the scorer tier with `max`.

mod gemini;
mod keyword;
mod openai;
mod rate_limit;
mod scorer;
mod tier;
mod verdict;

pub use gemini::{GeminiOptions, GeminiScorer};
pub use keyword::{KeywordClassifier, KeywordMatches};
pub use openai::{OpenAiOptions, OpenAiScorer};
pub use rate_limit::RateLimiter;
pub use scorer::{
    KeywordScorer, LinkCandidate, RelevancyScore, RelevancyScorer, ScorerUnavailable,
};
pub use tier::{PriorityTier, TierCounts};
