//! LLM relevancy scorer speaking the OpenAI chat-completions protocol

use crate::classify::rate_limit::RateLimiter;
use crate::classify::verdict::parse_verdict;
use crate::classify::{
    KeywordClassifier, LinkCandidate, RelevancyScore, RelevancyScorer, ScorerUnavailable,
};
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are an expert web content analyst who evaluates the relevance of \
web links and their context to specific keywords. Consider synonyms, related terms, broader \
concepts and semantic relationships when assessing relevance.";

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiOptions {
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub calls_per_minute: u32,
}

/// Scores links by asking a chat model for a 0..1 relevancy value
pub struct OpenAiScorer {
    client: Client,
    completions_url: String,
    model: String,
    temperature: f32,
    high_keywords: Vec<String>,
    medium_keywords: Vec<String>,
    limiter: RateLimiter,
}

impl OpenAiScorer {
    /// Builds the HTTP client and captures the keyword sets for the prompt
    pub fn new(options: OpenAiOptions, keywords: &KeywordClassifier) -> Result<Self, ConfigError> {
        if options.api_key.trim().is_empty() {
            return Err(ConfigError::Validation("missing scorer API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", options.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
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
            completions_url: format!("{}/chat/completions", options.endpoint.trim_end_matches('/')),
            model: options.model,
            temperature: options.temperature,
            high_keywords: keywords.high_keywords().map(str::to_string).collect(),
            medium_keywords: keywords.medium_keywords().map(str::to_string).collect(),
            limiter: RateLimiter::per_minute(options.calls_per_minute),
        })
    }

    fn build_prompt(&self, link: LinkCandidate<'_>) -> String {
        format!(
            "Analyze the following link and its context to determine its relevance to the given keywords.\n\
             Assign a relevancy value between 0 and 1 based on how well the link relates to the keywords.\n\
             Think broadly: synonyms, related terms and broader concepts count.\n\n\
             High Priority Keywords: {high}\n\
             Medium Priority Keywords: {medium}\n\n\
             Link URL: {url}\n\
             Link text: {text}\n\
             Link context: {context}\n\n\
             Respond with strictly valid JSON and nothing else, in this shape:\n\
             {{\"relevancy\": 0.9, \"relevancy_explanation\": \"one sentence\"}}",
            high = self.high_keywords.join(", "),
            medium = self.medium_keywords.join(", "),
            url = link.url,
            text = link.text,
            context = link.context,
        )
    }
}

#[async_trait]
impl RelevancyScorer for OpenAiScorer {
    async fn score(&self, link: LinkCandidate<'_>) -> Result<RelevancyScore, ScorerUnavailable> {
        self.limiter.acquire().await;

        let prompt = self.build_prompt(link);
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.completions_url)
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

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScorerUnavailable::new(format!("unreadable response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ScorerUnavailable::new("response had no message content"))?;

        parse_verdict(&content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Deserialize)]
struct ChatContent {
    content: Option<String>,
}
