//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! seed, claim, fetch and ingest cycle end-to-end against an on-disk
//! frontier.

use skein::config::{Config, CrawlerConfig, FrontierConfig, LinksConfig, StoreConfig};
use skein::crawler::{
    build_http_client, crawl, seed_frontier, DispatchSettings, Dispatcher, StopReason,
};
use skein::state::FrontierStatus;
use skein::storage::{open_store, FrontierStore, SqliteStore};
use skein::url::AddressDigest;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling from the given seeds
fn create_test_config(seeds: Vec<String>, db_path: &str, max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            max_concurrent_tasks: 5,
            fetch_timeout_ms: 2000,
            ..CrawlerConfig::default()
        },
        links: LinksConfig::default(),
        store: StoreConfig {
            database_path: db_path.to_string(),
        },
        frontier: FrontierConfig { seeds },
    }
}

fn open_test_store(dir: &TempDir) -> (Arc<SqliteStore>, String) {
    let db_path = dir.path().join("frontier.db");
    let store = open_store(&db_path).expect("Failed to open frontier");
    (Arc::new(store), db_path.to_string_lossy().into_owned())
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn status_of(store: &SqliteStore, address: &str) -> Option<FrontierStatus> {
    store
        .get_record(&AddressDigest::of(address))
        .expect("Failed to read record")
        .map(|record| record.status)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{0}/page1">Page 1</a>
            <a href="{0}/page2">Page 2</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        format!(
            r#"<a href="{0}/page2">Page 2</a> <a href="{0}">Home</a>"#,
            base_url
        ),
    )
    .await;
    mount_page(&mock_server, "/page2", "<p>No links here</p>".to_string()).await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let config = create_test_config(vec![base_url.clone()], &db_path, 2);
    let (_tx, rx) = watch::channel(false);

    let summary = crawl(&config, store.clone(), rx).await.expect("Crawl failed");

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.claimed, 3);
    assert_eq!(summary.done, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.created, 2);

    assert_eq!(status_of(&store, &base_url), Some(FrontierStatus::Done));
    assert_eq!(
        status_of(&store, &format!("{}/page1", base_url)),
        Some(FrontierStatus::Done)
    );
    assert_eq!(
        status_of(&store, &format!("{}/page2", base_url)),
        Some(FrontierStatus::Done)
    );

    // home -> page1, home -> page2, page1 -> page2, page1 -> home
    assert_eq!(store.count_edges().unwrap(), 4);
    let from_home = store.edges_from(&AddressDigest::of(&base_url)).unwrap();
    assert_eq!(from_home.len(), 2);
}

#[tokio::test]
async fn test_fetch_timeout_marks_failed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/never">never</a>"#)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let mut config = create_test_config(vec![base_url.clone()], &db_path, 2);
    config.crawler.fetch_timeout_ms = 200;

    seed_frontier(store.as_ref(), &config.frontier.seeds, &config.links).unwrap();
    let client = build_http_client(Duration::from_millis(config.crawler.fetch_timeout_ms))
        .expect("Failed to build client");
    let dispatcher = Dispatcher::new(
        store.clone(),
        client,
        DispatchSettings::from_config(&config.crawler, &config.links),
    );
    let permits = dispatcher.permits();
    let (_tx, rx) = watch::channel(false);

    let summary = dispatcher.run(rx).await.expect("Crawl failed");

    // The one unit taken for the timed-out fetch came back, and only once
    assert_eq!(
        permits.available_permits(),
        config.crawler.max_concurrent_tasks as usize
    );
    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.done, 0);
    assert_eq!(status_of(&store, &base_url), Some(FrontierStatus::Failed));
    assert_eq!(store.count_records().unwrap(), 1);
    assert_eq!(store.count_edges().unwrap(), 0);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(r#"<a href="{}/a">A</a>"#, base_url),
    )
    .await;
    mount_page(
        &mock_server,
        "/a",
        format!(r#"<a href="{}/a/b">B</a>"#, base_url),
    )
    .await;
    mount_page(&mock_server, "/a/b", "<p>too deep</p>".to_string()).await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let config = create_test_config(vec![base_url.clone()], &db_path, 1);
    let (_tx, rx) = watch::channel(false);

    let summary = crawl(&config, store.clone(), rx).await.expect("Crawl failed");

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.claimed, 2);

    // Discovered, but beyond the claim depth
    let deep = store
        .get_record(&AddressDigest::of(&format!("{}/a/b", base_url)))
        .unwrap()
        .expect("Deep page should be recorded");
    assert_eq!(deep.depth, 2);
    assert_eq!(deep.status, FrontierStatus::Pending);
}

#[tokio::test]
async fn test_repeated_discovery_records_every_edge() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<a href="{0}/p1">1</a> <a href="{0}/p2">2</a>
            <a href="{0}/shared">s</a> <a href="{0}/shared">s again</a>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/p1",
        format!(r#"<a href="{}/shared">s</a>"#, base_url),
    )
    .await;
    mount_page(
        &mock_server,
        "/p2",
        format!(r#"<a href="{}/shared">s</a>"#, base_url),
    )
    .await;
    mount_page(&mock_server, "/shared", String::new()).await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let config = create_test_config(vec![base_url.clone()], &db_path, 1);
    let (_tx, rx) = watch::channel(false);

    let summary = crawl(&config, store.clone(), rx).await.expect("Crawl failed");

    assert_eq!(summary.done, 4);
    assert_eq!(summary.created, 3);
    assert_eq!(store.count_records().unwrap(), 4);

    // The duplicate anchor on the home page collapses to one edge
    assert_eq!(store.count_edges().unwrap(), 5);
}

#[tokio::test]
async fn test_error_status_pages_are_still_parsed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(format!(r#"<a href="{}/help">help</a>"#, base_url)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/help", String::new()).await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let config = create_test_config(vec![base_url.clone()], &db_path, 1);
    let (_tx, rx) = watch::channel(false);

    let summary = crawl(&config, store.clone(), rx).await.expect("Crawl failed");

    assert_eq!(summary.done, 2);
    assert_eq!(status_of(&store, &base_url), Some(FrontierStatus::Done));
}

#[tokio::test]
async fn test_second_run_resumes_finished_frontier() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", "<p>only page</p>".to_string()).await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let config = create_test_config(vec![base_url.clone()], &db_path, 1);

    let (_tx, rx) = watch::channel(false);
    let first = crawl(&config, store.clone(), rx).await.expect("Crawl failed");
    assert_eq!(first.done, 1);
    drop(store);

    // Reopen the same file, as a restarted process would
    let (store, _) = open_test_store(&temp_dir);
    let (_tx, rx) = watch::channel(false);
    let second = crawl(&config, store.clone(), rx).await.expect("Crawl failed");

    assert_eq!(second.stop_reason, StopReason::Exhausted);
    assert_eq!(second.claimed, 0);
    assert_eq!(store.count_records().unwrap(), 1);
    assert_eq!(status_of(&store, &base_url), Some(FrontierStatus::Done));
}

#[tokio::test]
async fn test_shutdown_joins_in_flight_tasks() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>slow</p>")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let (store, db_path) = open_test_store(&temp_dir);
    let mut config = create_test_config(vec![base_url.clone()], &db_path, 1);
    config.crawler.on_empty_frontier = skein::config::EmptyFrontierPolicy::Wait;
    config.crawler.idle_interval_ms = 20;
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn({
        let store = store.clone();
        async move { crawl(&config, store, rx).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(true).unwrap();

    let summary = handle.await.unwrap().expect("Crawl failed");

    // The page in flight at shutdown was allowed to finish
    assert_eq!(summary.stop_reason, StopReason::Shutdown);
    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.done, 1);
    assert_eq!(status_of(&store, &base_url), Some(FrontierStatus::Done));
}
