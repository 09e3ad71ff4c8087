//! Relevancy scorer capability and its keyword-only implementation

use crate::classify::{KeywordClassifier, PriorityTier};
use async_trait::async_trait;
use thiserror::Error;

/// Verdict returned by a relevancy scorer for one link
#[derive(Debug, Clone, PartialEq)]
pub struct RelevancyScore {
    /// Tier derived from the score
    pub tier: PriorityTier,

    /// Relevancy in the range 0..=1
    pub score: f64,

    /// Short explanation of the verdict
    pub rationale: String,
}

/// The scorer could not produce a verdict
///
/// Rate limits, network failures and malformed model output all end up here.
/// Callers treat it as a soft failure and fall back to keyword tiers.
#[derive(Debug, Clone, Error)]
#[error("Relevancy scorer unavailable: {reason}")]
pub struct ScorerUnavailable {
    pub reason: String,
}

impl ScorerUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A discovered link as shown to a scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCandidate<'a> {
    pub url: &'a str,
    /// Visible anchor text, possibly empty
    pub text: &'a str,
    /// Text surrounding the link on its page
    pub context: &'a str,
}

/// Anything that can rate a link's relevancy from its URL, text and context
#[async_trait]
pub trait RelevancyScorer: Send + Sync {
    /// Scores one link
    async fn score(&self, link: LinkCandidate<'_>) -> Result<RelevancyScore, ScorerUnavailable>;

    /// Scores every link of one page, returning one verdict per link in order
    ///
    /// The default scores the links one at a time. Backends that can rate
    /// several links per request override it.
    async fn score_page(
        &self,
        links: &[LinkCandidate<'_>],
    ) -> Vec<Result<RelevancyScore, ScorerUnavailable>> {
        let mut verdicts = Vec::with_capacity(links.len());
        for link in links {
            verdicts.push(self.score(*link).await);
        }
        verdicts
    }

    /// Name used in log lines
    fn name(&self) -> &str;
}

/// Network-free scorer backed by the keyword classifier
///
/// Each tier maps to a fixed score, so results are reproducible.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    classifier: KeywordClassifier,
}

impl KeywordScorer {
    pub fn new(classifier: KeywordClassifier) -> Self {
        Self { classifier }
    }

    fn score_for(tier: PriorityTier) -> f64 {
        match tier {
            PriorityTier::High => 1.0,
            PriorityTier::Medium => 0.6,
            PriorityTier::Low => 0.2,
            PriorityTier::None => 0.0,
        }
    }
}

#[async_trait]
impl RelevancyScorer for KeywordScorer {
    async fn score(&self, link: LinkCandidate<'_>) -> Result<RelevancyScore, ScorerUnavailable> {
        let tier = self.classifier.tier(link.context, link.url);
        let matches = self.classifier.matches(link.context, link.url);

        let rationale = if matches.high.is_empty() && matches.medium.is_empty() {
            "no keyword matched".to_string()
        } else {
            format!(
                "matched high [{}], medium [{}]",
                matches.high.join(", "),
                matches.medium.join(", ")
            )
        };

        Ok(RelevancyScore {
            tier,
            score: Self::score_for(tier),
            rationale,
        })
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
