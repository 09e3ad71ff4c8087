//! Parsing of relevancy verdicts returned by chat models
//!
//! Both LLM backends ask for strict JSON but models still wrap it in markdown
//! fences or answer in prose. Anything that is not a usable verdict becomes
//! [`ScorerUnavailable`].

use crate::classify::{PriorityTier, RelevancyScore, ScorerUnavailable};
use serde::Deserialize;

#[derive(Deserialize)]
struct ModelVerdict {
    relevancy: f64,
    #[serde(default)]
    relevancy_explanation: String,
}

#[derive(Deserialize)]
struct BatchReply {
    links: Vec<BatchItem>,
}

#[derive(Deserialize)]
struct BatchItem {
    #[serde(default)]
    url: Option<String>,
    #[serde(flatten)]
    verdict: ModelVerdict,
}

/// One entry of a multi-link reply
#[derive(Debug)]
pub(crate) struct BatchVerdict {
    /// URL echoed by the model, if any
    pub url: Option<String>,
    pub verdict: Result<RelevancyScore, ScorerUnavailable>,
}

/// Parses a single `{"relevancy": .., "relevancy_explanation": ..}` object
pub(crate) fn parse_verdict(content: &str) -> Result<RelevancyScore, ScorerUnavailable> {
    let cleaned = non_empty(content)?;
    let verdict: ModelVerdict = serde_json::from_str(cleaned)
        .map_err(|e| ScorerUnavailable::new(format!("malformed model output: {}", e)))?;
    into_score(verdict)
}

/// Parses a `{"links": [{"url": .., "relevancy": .., ..}, ..]}` reply
///
/// A malformed reply fails as a whole. An entry with an out-of-range score
/// fails on its own.
pub(crate) fn parse_batch_verdicts(content: &str) -> Result<Vec<BatchVerdict>, ScorerUnavailable> {
    let cleaned = non_empty(content)?;
    let reply: BatchReply = serde_json::from_str(cleaned)
        .map_err(|e| ScorerUnavailable::new(format!("malformed model output: {}", e)))?;

    Ok(reply
        .links
        .into_iter()
        .map(|item| BatchVerdict {
            url: item.url,
            verdict: into_score(item.verdict),
        })
        .collect())
}

fn non_empty(content: &str) -> Result<&str, ScorerUnavailable> {
    let cleaned = strip_code_fences(content);
    if cleaned.is_empty() {
        return Err(ScorerUnavailable::new("model returned empty output"));
    }
    Ok(cleaned)
}

fn into_score(verdict: ModelVerdict) -> Result<RelevancyScore, ScorerUnavailable> {
    if !verdict.relevancy.is_finite() || !(0.0..=1.0).contains(&verdict.relevancy) {
        return Err(ScorerUnavailable::new(format!(
            "relevancy {} outside 0..1",
            verdict.relevancy
        )));
    }

    Ok(RelevancyScore {
        tier: PriorityTier::from_score(verdict.relevancy),
        score: verdict.relevancy,
        rationale: verdict.relevancy_explanation,
    })
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = match trimmed.strip_prefix("```") {
        Some(rest) => rest.strip_prefix("json").unwrap_or(rest),
        None => trimmed,
    };
    without_open
        .trim()
        .strip_suffix("```")
        .unwrap_or(without_open.trim())
        .trim()
}
