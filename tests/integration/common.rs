use linkscout::classify::{KeywordClassifier, KeywordScorer, RelevancyScorer};
use linkscout::config::{Config, CrawlSettings, Overrides};
use linkscout::crawler::{build_http_client, CrawlEngine, HtmlLinkExtractor, HttpFetcher};
use linkscout::storage::SqliteStorage;
use linkscout::RetryPolicy;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings for a local crawl: budget keywords, fast retries, given limits
pub fn test_settings(
    seeds: Vec<String>,
    db_path: &Path,
    max_depth: u32,
    max_pages: Option<u32>,
) -> CrawlSettings {
    let mut settings = Config::default().resolve(&Overrides::default());
    settings.seeds = seeds;
    settings.max_depth = max_depth;
    settings.max_pages = max_pages;
    settings.classifier = KeywordClassifier::new(["Budget"], ["Finance"]);
    settings.retry = RetryPolicy {
        max_attempts: 2,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        toggle_www: true,
    };
    settings.request_timeout = Duration::from_secs(5);
    settings.database_path = db_path.to_path_buf();
    settings
}

/// Engine wired with the real HTTP fetcher, HTML extractor and SQLite storage
pub fn http_engine(settings: CrawlSettings, scorer: Option<Arc<dyn RelevancyScorer>>) -> CrawlEngine {
    let client = build_http_client(&settings.user_agent, settings.request_timeout)
        .expect("Failed to build HTTP client");
    let storage = SqliteStorage::new(&settings.database_path).expect("Failed to open storage");
    let scorer = scorer
        .unwrap_or_else(|| Arc::new(KeywordScorer::new(settings.classifier.clone())));

    CrawlEngine::new(
        settings,
        Arc::new(HttpFetcher::new(client)),
        Box::new(HtmlLinkExtractor),
        scorer,
        Box::new(storage),
    )
}

/// Serves `body` as an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Paths of the GET requests the server saw, in arrival order
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .collect()
}
