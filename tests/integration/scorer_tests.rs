//! LLM scorers against mock chat-completions and Gemini endpoints

use crate::common::{http_engine, mount_page, test_settings};
use linkscout::classify::{
    GeminiOptions, GeminiScorer, KeywordClassifier, LinkCandidate, OpenAiOptions, OpenAiScorer,
    RelevancyScorer,
};
use linkscout::config::ScorerKind;
use linkscout::crawler::build_scorer;
use linkscout::PriorityTier;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(server: &MockServer) -> OpenAiOptions {
    OpenAiOptions {
        endpoint: format!("{}/v1", server.uri()),
        model: "test-model".to_string(),
        api_key: "sk-test".to_string(),
        temperature: 0.3,
        timeout: Duration::from_secs(5),
        calls_per_minute: 6_000,
    }
}

fn link<'a>(url: &'a str, context: &'a str) -> LinkCandidate<'a> {
    LinkCandidate {
        url,
        text: context,
        context,
    }
}

fn keywords() -> KeywordClassifier {
    KeywordClassifier::new(["Budget"], ["Finance"])
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    }))
}

async fn mount_completion(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scorer_parses_verdict() {
    let api = MockServer::start().await;
    mount_completion(
        &api,
        completion(r#"{"relevancy": 0.85, "relevancy_explanation": "annual financial report"}"#),
    )
    .await;

    let scorer = OpenAiScorer::new(options(&api), &keywords()).unwrap();
    let verdict = scorer
        .score(link(
            "https://city.gov/acfr",
            "Annual Comprehensive Financial Report",
        ))
        .await
        .unwrap();

    assert_eq!(verdict.tier, PriorityTier::High);
    assert_eq!(verdict.score, 0.85);
    assert_eq!(verdict.rationale, "annual financial report");
    assert_eq!(scorer.name(), "test-model");
}

#[tokio::test]
async fn test_scorer_unavailable_on_server_error() {
    let api = MockServer::start().await;
    mount_completion(&api, ResponseTemplate::new(500)).await;

    let scorer = OpenAiScorer::new(options(&api), &keywords()).unwrap();
    let err = scorer.score(link("https://city.gov/x", "Budget")).await.unwrap_err();
    assert!(err.reason.contains("500"));
}

#[tokio::test]
async fn test_scorer_unavailable_when_rate_limited() {
    let api = MockServer::start().await;
    mount_completion(&api, ResponseTemplate::new(429)).await;

    let scorer = OpenAiScorer::new(options(&api), &keywords()).unwrap();
    let err = scorer.score(link("https://city.gov/x", "Budget")).await.unwrap_err();
    assert!(err.reason.contains("429"));
}

#[tokio::test]
async fn test_scorer_unavailable_on_prose_output() {
    let api = MockServer::start().await;
    mount_completion(&api, completion("This link looks fairly relevant.")).await;

    let scorer = OpenAiScorer::new(options(&api), &keywords()).unwrap();
    assert!(scorer.score(link("https://city.gov/x", "Budget")).await.is_err());
}

#[tokio::test]
async fn test_crawl_keeps_higher_of_keyword_and_scorer_tier() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<html><body>
            <p><a href="/acfr">Annual Comprehensive Financial Report</a></p>
            <p><a href="/budget">Budget book</a></p>
        </body></html>"#,
    )
    .await;

    let api = MockServer::start().await;
    mount_completion(&api, completion(r#"{"relevancy": 0.5}"#)).await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![site.uri()], &temp_dir.path().join("llm.db"), 0, None);
    let scorer: Arc<dyn RelevancyScorer> =
        Arc::new(OpenAiScorer::new(options(&api), &settings.classifier).unwrap());
    let mut engine = http_engine(settings, Some(scorer));
    let summary = engine.crawl(&[site.uri()]).await.unwrap();

    assert_eq!(summary.scorer_fallbacks, 0);
    let links = engine.storage().links_from(&site.uri()).unwrap();
    assert_eq!(links.len(), 2);

    // No keyword match, scorer says medium
    assert_eq!(links[0].priority_tier, PriorityTier::Medium);
    assert_eq!(links[0].relevancy_score, Some(0.5));

    // Keyword high beats the scorer's medium
    assert_eq!(links[1].priority_tier, PriorityTier::High);
    assert_eq!(links[1].relevancy_score, Some(0.5));
}

#[tokio::test]
async fn test_crawl_falls_back_to_keywords_when_scorer_fails() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<html><body>
            <p><a href="/budget">Budget book</a></p>
            <p><a href="/parks">Parks</a></p>
        </body></html>"#,
    )
    .await;

    let api = MockServer::start().await;
    mount_completion(&api, ResponseTemplate::new(503)).await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![site.uri()], &temp_dir.path().join("fallback.db"), 0, None);
    let scorer: Arc<dyn RelevancyScorer> =
        Arc::new(OpenAiScorer::new(options(&api), &settings.classifier).unwrap());
    let mut engine = http_engine(settings, Some(scorer));
    let summary = engine.crawl(&[site.uri()]).await.unwrap();

    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.scorer_fallbacks, 2);

    let links = engine.storage().links_from(&site.uri()).unwrap();
    assert_eq!(links[0].priority_tier, PriorityTier::High);
    assert_eq!(links[0].relevancy_score, None);
    assert_eq!(links[1].priority_tier, PriorityTier::Low);
    assert_eq!(links[1].relevancy_score, None);
}

#[test]
fn test_build_scorer_without_api_key_uses_keywords() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = test_settings(vec![], &temp_dir.path().join("unused.db"), 0, None);
    settings.scorer.kind = ScorerKind::OpenAi;
    settings.scorer.api_key_env = "LINKSCOUT_TEST_KEY_THAT_IS_NEVER_SET".to_string();

    let scorer = build_scorer(&settings).unwrap();
    assert_eq!(scorer.name(), "keyword");
}

fn gemini_options(server: &MockServer) -> GeminiOptions {
    GeminiOptions {
        endpoint: format!("{}/v1beta", server.uri()),
        model: "gemini-1.5-flash".to_string(),
        api_key: "gm-test".to_string(),
        temperature: 0.3,
        timeout: Duration::from_secs(5),
        calls_per_minute: 6_000,
        batch_size: 2,
    }
}

fn gemini_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    }))
}

#[tokio::test]
async fn test_gemini_scores_links_in_batches() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "gm-test"))
        .respond_with(gemini_reply(
            r#"{"links": [
                {"url": "https://city.gov/b", "relevancy": 0.4, "relevancy_explanation": "staff"},
                {"url": "https://city.gov/a", "relevancy": 0.9, "relevancy_explanation": "budget"}
            ]}"#,
        ))
        .mount(&api)
        .await;

    let scorer = GeminiScorer::new(gemini_options(&api), &keywords()).unwrap();
    let links = [
        link("https://city.gov/a", "FY24 budget"),
        link("https://city.gov/b", "Finance staff"),
        link("https://city.gov/c", "Parks"),
    ];
    let verdicts = scorer.score_page(&links).await;

    assert_eq!(verdicts.len(), 3);
    assert_eq!(verdicts[0].as_ref().unwrap().tier, PriorityTier::High);
    assert_eq!(verdicts[1].as_ref().unwrap().tier, PriorityTier::Medium);
    // No entry names /c, so it takes the entry at its own position
    assert_eq!(verdicts[2].as_ref().unwrap().tier, PriorityTier::Medium);

    // Three links at two per request
    let requests = api.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
    let first_prompt = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(first_prompt.contains("https://city.gov/a"));
    assert!(first_prompt.contains("https://city.gov/b"));
    assert!(!first_prompt.contains("https://city.gov/c"));
}

#[tokio::test]
async fn test_gemini_failure_marks_whole_batch_unavailable() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&api)
        .await;

    let scorer = GeminiScorer::new(gemini_options(&api), &keywords()).unwrap();
    let verdicts = scorer
        .score_page(&[link("https://city.gov/a", "Budget"), link("https://city.gov/b", "Parks")])
        .await;

    assert_eq!(verdicts.len(), 2);
    for verdict in verdicts {
        assert!(verdict.unwrap_err().reason.contains("429"));
    }
}

#[tokio::test]
async fn test_crawl_with_gemini_scorer() {
    let site = MockServer::start().await;
    mount_page(
        &site,
        "/",
        r#"<html><body>
            <p><a href="/acfr">Annual Comprehensive Financial Report</a></p>
            <p><a href="/parks">Parks</a></p>
        </body></html>"#,
    )
    .await;

    let api = MockServer::start().await;
    let acfr = format!("{}/acfr", site.uri());
    Mock::given(method("POST"))
        .respond_with(gemini_reply(&format!(
            r#"```json
{{"links": [{{"url": "{}", "relevancy": 0.8}}, {{"relevancy": 0.1}}]}}
```"#,
            acfr
        )))
        .expect(1)
        .mount(&api)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![site.uri()], &temp_dir.path().join("gemini.db"), 0, None);
    let scorer: Arc<dyn RelevancyScorer> =
        Arc::new(GeminiScorer::new(gemini_options(&api), &settings.classifier).unwrap());
    let mut engine = http_engine(settings, Some(scorer));
    let summary = engine.crawl(&[site.uri()]).await.unwrap();

    assert_eq!(summary.scorer_fallbacks, 0);
    let links = engine.storage().links_from(&site.uri()).unwrap();
    assert_eq!(links[0].target_url, acfr);
    assert_eq!(links[0].priority_tier, PriorityTier::High);
    assert_eq!(links[0].relevancy_score, Some(0.8));
    assert_eq!(links[1].priority_tier, PriorityTier::Low);
    assert_eq!(links[1].relevancy_score, Some(0.1));
}

#[test]
fn test_build_scorer_without_gemini_key_uses_keywords() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = test_settings(vec![], &temp_dir.path().join("unused.db"), 0, None);
    settings.scorer.kind = ScorerKind::Gemini;
    settings.scorer.gemini.api_key_env = "LINKSCOUT_TEST_GEMINI_KEY_THAT_IS_NEVER_SET".to_string();

    let scorer = build_scorer(&settings).unwrap();
    assert_eq!(scorer.name(), "keyword");
}
