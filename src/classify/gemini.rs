//! LLM relevancy scorer speaking the Gemini `generateContent` protocol
//!
//! Gemini's free tier allows few calls per minute, so links are rated several
//! at a time: one prompt lists a batch of links and the model answers with a
//! `{"links": [..]}` object holding one verdict per link.

use crate::classify::rate_limit::RateLimiter;
use crate::classify::verdict::{parse_batch_verdicts, BatchVerdict};
use crate::classify::{
    KeywordClassifier, LinkCandidate, RelevancyScore, RelevancyScorer, ScorerUnavailable,
};
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TITLE_CHARS: usize = 100;
const CONTEXT_CHARS: usize = 200;

/// Connection settings for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub calls_per_minute: u32,
    /// Links rated per request
    pub batch_size: usize,
}

/// Scores links in batches with a Gemini model
pub struct GeminiScorer {
    client: Client,
    generate_url: String,
    model: String,
    temperature: f32,
    batch_size: usize,
    high_keywords: Vec<String>,
    medium_keywords: Vec<String>,
    limiter: RateLimiter,
}

impl GeminiScorer {
    pub fn new(options: GeminiOptions, keywords: &KeywordClassifier) -> Result<Self, ConfigError> {
        if options.api_key.trim().is_empty() {
            return Err(ConfigError::Validation("missing scorer API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(options.api_key.trim())
                .map_err(|_| ConfigError::Validation("invalid scorer API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Validation(format!("failed to build scorer client: {}", e)))?;

        Ok(Self {
            client,
            generate_url: format!(
                "{}/models/{}:generateContent",
                options.endpoint.trim_end_matches('/'),
                options.model
            ),
            model: options.model,
            temperature: options.temperature,
            batch_size: options.batch_size.max(1),
            high_keywords: keywords.high_keywords().map(str::to_string).collect(),
            medium_keywords: keywords.medium_keywords().map(str::to_string).collect(),
            limiter: RateLimiter::per_minute(options.calls_per_minute),
        })
    }

    fn build_prompt(&self, links: &[LinkCandidate<'_>]) -> String {
        let listing: String = links
            .iter()
            .enumerate()
            .map(|(n, link)| {
                format!(
                    "Link {}: URL={} Title=\"{}\" Context=\"{}\"\n",
                    n + 1,
                    link.url,
                    quoted(link.text, TITLE_CHARS),
                    quoted(link.context, CONTEXT_CHARS)
                )
            })
            .collect();

        format!(
            "You are an analyst identifying high-priority links from a webpage to help find \
             government financial information. Output only JSON.\n\n\
             Links:\n{listing}\n\
             High Priority: {high}\n\
             Medium Priority: {medium}\n\n\
             Assess each link from its title, URL and surrounding context. Give each a \
             relevancy between 0.0 and 1.0 and a one or two sentence explanation.\n\n\
             Output this exact JSON structure with no other text, one entry per link in the \
             order given:\n\
             {{\"links\": [{{\"url\": \"string\", \"relevancy\": 0.0, \"relevancy_explanation\": \"string\"}}]}}",
            listing = listing,
            high = self.high_keywords.join(", "),
            medium = self.medium_keywords.join(", "),
        )
    }

    async fn generate(&self, prompt: &str) -> Result<String, ScorerUnavailable> {
        self.limiter.acquire().await;

        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(&self.generate_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScorerUnavailable::new(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScorerUnavailable::new("rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(ScorerUnavailable::new(format!("HTTP {}", status.as_u16())));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ScorerUnavailable::new(format!("unreadable response: {}", e)))?;

        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ScorerUnavailable::new("response had no text"))
    }

    async fn score_batch(
        &self,
        batch: &[LinkCandidate<'_>],
    ) -> Vec<Result<RelevancyScore, ScorerUnavailable>> {
        let prompt = self.build_prompt(batch);
        let reply = self
            .generate(&prompt)
            .await
            .and_then(|text| parse_batch_verdicts(&text));

        match reply {
            Ok(entries) => assign_verdicts(batch, entries),
            Err(err) => batch.iter().map(|_| Err(err.clone())).collect(),
        }
    }
}

#[async_trait]
impl RelevancyScorer for GeminiScorer {
    async fn score(&self, link: LinkCandidate<'_>) -> Result<RelevancyScore, ScorerUnavailable> {
        self.score_batch(&[link])
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| Err(ScorerUnavailable::new("no verdict returned")))
    }

    async fn score_page(
        &self,
        links: &[LinkCandidate<'_>],
    ) -> Vec<Result<RelevancyScore, ScorerUnavailable>> {
        let batches = (links.len() + self.batch_size - 1) / self.batch_size;
        let mut verdicts = Vec::with_capacity(links.len());

        for (n, batch) in links.chunks(self.batch_size).enumerate() {
            tracing::debug!("Scoring batch {} of {} ({} links)", n + 1, batches, batch.len());
            verdicts.extend(self.score_batch(batch).await);
        }

        verdicts
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Pairs each link with its entry in the reply
///
/// An entry echoing the link's URL wins; otherwise the entry at the same
/// position is used if no other link claimed it.
fn assign_verdicts(
    batch: &[LinkCandidate<'_>],
    entries: Vec<BatchVerdict>,
) -> Vec<Result<RelevancyScore, ScorerUnavailable>> {
    let mut slots: Vec<Option<BatchVerdict>> = entries.into_iter().map(Some).collect();

    batch
        .iter()
        .enumerate()
        .map(|(position, link)| {
            let by_url = slots.iter().position(|slot| {
                slot.as_ref()
                    .and_then(|entry| entry.url.as_deref())
                    .map_or(false, |url| url == link.url)
            });
            by_url
                .or(Some(position))
                .and_then(|index| slots.get_mut(index))
                .and_then(Option::take)
                .map(|entry| entry.verdict)
                .unwrap_or_else(|| Err(ScorerUnavailable::new("model skipped this link")))
        })
        .collect()
}

fn quoted(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .collect::<String>()
        .replace('"', "\\\"")
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
