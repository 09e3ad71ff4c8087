//! End-to-end crawls against a mock site

use crate::common::{http_engine, mount_page, requested_paths, test_settings};
use linkscout::crawler::{run_crawl, Termination};
use linkscout::output::load_statistics;
use linkscout::storage::{PageFilter, SqliteStorage, Storage};
use linkscout::PriorityTier;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a home page linking to /a (budget) and /b (parks), both leaf pages
async fn mount_two_link_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <p><a href="/a">Budget documents for FY24</a></p>
            <p><a href="/b">Parks and trails</a></p>
        </body></html>"#,
    )
    .await;
    mount_page(
        server,
        "/a",
        "<html><head><title>Budget</title></head><body>No links</body></html>",
    )
    .await;
    mount_page(
        server,
        "/b",
        "<html><head><title>Parks</title></head><body>No links</body></html>",
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    mount_two_link_site(&server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    let base = server.uri();

    let settings = test_settings(vec![format!("{}/", base)], &db_path, 1, Some(5));
    let seeds = settings.seeds.clone();
    let mut engine = http_engine(settings, None);
    let summary = engine.crawl(&seeds).await.unwrap();

    assert_eq!(summary.termination, Termination::Completed);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.links_discovered, 2);
    assert_eq!(summary.links_by_tier.high, 1);
    assert_eq!(summary.links_by_tier.low, 1);

    let storage = engine.storage();
    assert_eq!(storage.count_pages().unwrap(), 3);
    assert_eq!(storage.count_links().unwrap(), 2);

    let seed = storage.get_page(&base).unwrap().expect("seed page stored");
    assert_eq!(seed.depth, 0);
    assert_eq!(seed.status_code, Some(200));
    assert_eq!(seed.title.as_deref(), Some("Home"));

    let page_a = storage.get_page(&format!("{}/a", base)).unwrap().unwrap();
    let page_b = storage.get_page(&format!("{}/b", base)).unwrap().unwrap();
    assert_eq!(page_a.depth, 1);
    assert_eq!(page_b.depth, 1);

    let links = storage.links_from(&base).unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].target_url, format!("{}/a", base));
    assert_eq!(links[0].priority_tier, PriorityTier::High);
    assert_eq!(links[0].anchor_context, "Budget documents for FY24");
    assert_eq!(links[1].priority_tier, PriorityTier::Low);

    // Depth-first: the first link on the page is fetched before the second
    assert_eq!(requested_paths(&server).await, vec!["/", "/a", "/b"]);
}

#[tokio::test]
async fn test_depth_first_descends_before_siblings() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a> <a href="/b">B</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/a", r#"<html><body><a href="/a/deep">Deep</a></body></html>"#).await;
    mount_page(&server, "/a/deep", "<html><body>Leaf</body></html>").await;
    mount_page(&server, "/b", "<html><body>Leaf</body></html>").await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("dfs.db"), 2, None);
    let mut engine = http_engine(settings, None);
    let summary = engine.crawl(&[server.uri()]).await.unwrap();

    assert_eq!(summary.pages_fetched, 4);
    assert_eq!(
        requested_paths(&server).await,
        vec!["/", "/a", "/a/deep", "/b"]
    );
}

#[tokio::test]
async fn test_page_budget_stops_crawl() {
    let server = MockServer::start().await;
    let anchors: String = (0..10)
        .map(|i| format!(r#"<li><a href="/p{i}">Page {i}</a></li>"#))
        .collect();
    mount_page(&server, "/", &format!("<html><body><ul>{}</ul></body></html>", anchors)).await;
    for i in 0..10 {
        mount_page(&server, &format!("/p{}", i), "<html><body>Leaf</body></html>").await;
    }

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("budget.db"), 1, Some(2));
    let mut engine = http_engine(settings, None);
    let summary = engine.crawl(&[server.uri()]).await.unwrap();

    assert_eq!(summary.termination, Termination::BudgetExhausted);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.links_discovered, 10);
    assert_eq!(summary.frontier_discarded, 9);
    assert_eq!(engine.storage().count_pages().unwrap(), 2);
    assert_eq!(requested_paths(&server).await, vec!["/", "/p0"]);
}

#[tokio::test]
async fn test_links_beyond_max_depth_are_stored_not_fetched() {
    let server = MockServer::start().await;
    mount_two_link_site(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("depth.db"), 0, None);
    let mut engine = http_engine(settings, None);
    let summary = engine.crawl(&[server.uri()]).await.unwrap();

    assert_eq!(summary.termination, Termination::Completed);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(engine.storage().count_pages().unwrap(), 1);
    assert_eq!(engine.storage().count_links().unwrap(), 2);
    assert_eq!(requested_paths(&server).await, vec!["/"]);
}

#[tokio::test]
async fn test_failed_pages_are_recorded() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/report.pdf">Annual report</a>
            <a href="/missing">Old page</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("fail.db"), 1, None);
    let mut engine = http_engine(settings, None);
    let summary = engine.crawl(&[server.uri()]).await.unwrap();

    assert_eq!(summary.termination, Termination::Completed);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.pages_failed, 2);

    let storage = engine.storage();
    let pdf = storage
        .get_page(&format!("{}/report.pdf", server.uri()))
        .unwrap()
        .unwrap();
    assert!(pdf.is_failed());
    assert_eq!(pdf.status_code, Some(200));
    assert!(pdf.title.is_none());

    let missing = storage
        .get_page(&format!("{}/missing", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(missing.status_code, Some(404));
    assert!(missing.error.unwrap().contains("404"));

    // A 4xx is not retried
    let paths = requested_paths(&server).await;
    assert_eq!(paths.iter().filter(|p| p.as_str() == "/missing").count(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("retry.db"), 1, None);
    let mut engine = http_engine(settings, None);
    let summary = engine.crawl(&[server.uri()]).await.unwrap();

    assert_eq!(summary.pages_failed, 1);
    assert_eq!(requested_paths(&server).await.len(), 2);

    let page = engine.storage().get_page(&server.uri()).unwrap().unwrap();
    assert_eq!(page.status_code, Some(503));
}

#[tokio::test]
async fn test_cancelled_before_start_writes_nothing() {
    let server = MockServer::start().await;
    mount_two_link_site(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("cancel.db"), 1, None);
    let token = CancellationToken::new();
    token.cancel();

    let mut engine = http_engine(settings, None).with_cancellation(token);
    let summary = engine.crawl(&[server.uri()]).await.unwrap();

    assert_eq!(summary.termination, Termination::Cancelled);
    assert_eq!(summary.pages_fetched, 0);
    assert_eq!(summary.frontier_discarded, 1);
    assert_eq!(engine.storage().count_pages().unwrap(), 0);
    assert!(requested_paths(&server).await.is_empty());
}

#[tokio::test]
async fn test_statistics_after_crawl() {
    let server = MockServer::start().await;
    mount_two_link_site(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let settings = test_settings(vec![server.uri()], &temp_dir.path().join("stats.db"), 1, None);
    let mut engine = http_engine(settings, None);
    engine.crawl(&[server.uri()]).await.unwrap();

    let stats = load_statistics(engine.storage()).unwrap();
    assert_eq!(stats.total_pages, 3);
    assert_eq!(stats.failed_pages, 0);
    assert_eq!(stats.total_links, 2);
    assert_eq!(stats.links_by_tier.high, 1);
    assert_eq!(stats.depth_breakdown.get(&0), Some(&1));
    assert_eq!(stats.depth_breakdown.get(&1), Some(&2));

    let deep = engine
        .storage()
        .list_pages(&PageFilter {
            depth: Some(1),
            url_contains: None,
        })
        .unwrap();
    assert_eq!(deep.len(), 2);
}

#[tokio::test]
async fn test_run_crawl_fresh_clears_previous_rows() {
    let server = MockServer::start().await;
    mount_two_link_site(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("runs.db");
    let settings = test_settings(vec![server.uri()], &db_path, 1, None);

    run_crawl(settings.clone(), false, CancellationToken::new())
        .await
        .unwrap();
    let second = run_crawl(settings.clone(), false, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.pages_fetched, 3);

    {
        let storage = SqliteStorage::new(&db_path).unwrap();
        // Page rows are keyed by URL; link rows accumulate per run
        assert_eq!(storage.count_pages().unwrap(), 3);
        assert_eq!(storage.count_links().unwrap(), 4);
    }

    run_crawl(settings, true, CancellationToken::new())
        .await
        .unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_pages().unwrap(), 3);
    assert_eq!(storage.count_links().unwrap(), 2);
}
