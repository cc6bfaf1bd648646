//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small fake catalogue and run complete
//! jobs against it end-to-end.

use catalog_harvest::config::{
    Config, CrawlerConfig, ExportFormat, OutputConfig, SourceConfig, UserAgentConfig,
};
use catalog_harvest::crawler::{
    available_parallelism, page_refs, partition, run_job, worker_count, Coordinator, JobParams,
    JobSlot,
};
use catalog_harvest::progress::{read_snapshot, ProgressSink, ProgressState};
use catalog_harvest::{HarvestError, ProductRecord};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock catalogue
fn create_test_config(root_url: &str, items_per_page: usize, dir: &Path) -> Config {
    Config {
        source: SourceConfig {
            root_url: root_url.to_string(),
            page_path_template: "catalogue/page-{page}.html".to_string(),
            items_per_page,
        },
        crawler: CrawlerConfig {
            max_items: 20,
            max_workers: 4,
            request_timeout_secs: 5,
            progress_step: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            export_path: dir.join("books.csv"),
            export_format: ExportFormat::Csv,
            progress_path: dir.join("progress.json"),
        },
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn detail_path(page: usize, item: usize) -> String {
    format!("/catalogue/book-{}-{}/index.html", page, item)
}

fn detail_page(page: usize, item: usize) -> String {
    format!(
        r#"<html><body>
        <div class="product_main">
            <h1>Book {page}-{item}</h1>
            <p class="price_color">£{page}.{item:02}</p>
            <p class="instock availability">
                In stock ({item} available)
            </p>
        </div>
        <div id="product_description"><h2>Product Description</h2></div>
        <p>Description of book {page}-{item}.</p>
        <table class="table table-striped">
            <tr><th>UPC</th><td>upc-{page}-{item}</td></tr>
            <tr><th>Product Type</th><td>Books</td></tr>
            <tr><th>Price (excl. tax)</th><td>£{page}.{item:02}</td></tr>
            <tr><th>Price (incl. tax)</th><td>£{page}.{item:02}</td></tr>
            <tr><th>Tax</th><td>£0.00</td></tr>
            <tr><th>Availability</th><td>In stock</td></tr>
            <tr><th>Number of reviews</th><td>{item}</td></tr>
        </table>
        </body></html>"#
    )
}

fn listing_page(page: usize, items: usize) -> String {
    let articles: String = (1..=items)
        .map(|item| {
            format!(
                r#"<article class="product_pod"><div class="image_container">
                <a href="book-{}-{}/index.html"><img src="x.jpg"/></a></div></article>"#,
                page, item
            )
        })
        .collect();
    format!("<html><body><ol>{}</ol></body></html>", articles)
}

/// Mounts a catalogue with `pages` listing pages of `per_page` items each
///
/// `advertised` is the page count shown by the root page's pagination
/// indicator; `None` leaves the indicator out.
async fn mount_catalogue(
    server: &MockServer,
    pages: usize,
    per_page: usize,
    advertised: Option<usize>,
    missing_details: &[(usize, usize)],
) {
    mount_slow_catalogue(server, pages, per_page, advertised, missing_details, Duration::ZERO).await;
}

/// Like `mount_catalogue`, but every detail page answers after `delay`
async fn mount_slow_catalogue(
    server: &MockServer,
    pages: usize,
    per_page: usize,
    advertised: Option<usize>,
    missing_details: &[(usize, usize)],
    delay: Duration,
) {
    let pager = advertised
        .map(|n| format!(r#"<ul class="pager"><li class="current">Page 1 of {}</li></ul>"#, n))
        .unwrap_or_default();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!("<html><body>{}</body></html>", pager)))
        .mount(server)
        .await;

    for page in 1..=pages {
        Mock::given(method("GET"))
            .and(path(format!("/catalogue/page-{}.html", page)))
            .respond_with(html(listing_page(page, per_page)))
            .mount(server)
            .await;

        for item in 1..=per_page {
            if missing_details.contains(&(page, item)) {
                continue;
            }
            Mock::given(method("GET"))
                .and(path(detail_path(page, item)))
                .respond_with(html(detail_page(page, item)).set_delay(delay))
                .mount(server)
                .await;
        }
    }
}

async fn harvest(config: &Config, cap: usize, workers: usize) -> Result<Vec<ProductRecord>, HarvestError> {
    let slot = JobSlot::new();
    let permit = slot.try_acquire()?;
    let report = run_job(config, JobParams { cap, worker_count: workers }, &permit).await?;
    Ok(report.records)
}

#[derive(Default)]
struct RecordingSink {
    states: Mutex<Vec<ProgressState>>,
}

impl ProgressSink for RecordingSink {
    fn publish(&self, state: &ProgressState) -> io::Result<()> {
        self.states.lock().unwrap().push(*state);
        Ok(())
    }
}

#[tokio::test]
async fn test_single_page_full_records() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 1, 20, Some(1), &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 20, dir.path());

    let slot = JobSlot::new();
    let permit = slot.try_acquire().unwrap();
    let report = run_job(&config, JobParams { cap: 20, worker_count: 4 }, &permit)
        .await
        .expect("Harvest failed");

    assert_eq!(report.items_collected, 20);
    assert_eq!(report.records.len(), 20);
    assert!(report.elapsed_seconds >= 0.0);
    for record in &report.records {
        assert!(
            record.values().iter().all(|v| !v.is_empty()),
            "Record has empty fields: {:?}",
            record
        );
    }

    let first = &report.records[0];
    assert_eq!(first.title, "Book 1-1");
    assert_eq!(first.price, "£1.01");
    assert_eq!(first.availability, "In stock (1 available)");
    assert_eq!(first.description, "Description of book 1-1.");
    assert_eq!(first.upc, "upc-1-1");
    assert_eq!(first.num_reviews, "1");
    assert_eq!(first.url, format!("{}{}", server.uri(), detail_path(1, 1)));

    // Header plus one row per record
    let artifact = report.artifact.expect("No artifact written");
    let csv = std::fs::read_to_string(artifact).unwrap();
    assert_eq!(csv.lines().count(), 21);
    assert!(csv.starts_with("title,price,availability,description,upc,"));

    let progress = read_snapshot(&config.output.progress_path, 0);
    assert_eq!(progress, ProgressState::completed(20, 20));
}

#[tokio::test]
async fn test_unreachable_detail_page_keeps_record() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 1, 20, Some(1), &[(1, 7)]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 20, dir.path());

    let records = harvest(&config, 20, 1).await.expect("Harvest failed");
    assert_eq!(records.len(), 20);

    let missing = &records[6];
    assert_eq!(missing.url, format!("{}{}", server.uri(), detail_path(1, 7)));
    assert!(missing.values()[..10].iter().all(|v| v.is_empty()));

    assert_eq!(records[5].title, "Book 1-6");
    assert_eq!(records[7].title, "Book 1-8");
}

#[tokio::test]
async fn test_missing_pagination_means_single_page() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 3, 20, None, &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 20, dir.path());

    let records = harvest(&config, 60, 4).await.expect("Harvest failed");
    assert_eq!(records.len(), 20);

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.path() != "/catalogue/page-2.html"));
}

#[tokio::test]
async fn test_cap_is_exact_when_catalogue_is_larger() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 5, 20, Some(5), &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 20, dir.path());

    let records = harvest(&config, 45, 2).await.expect("Harvest failed");
    assert_eq!(records.len(), 45);

    // Only ceil(45 / 20) = 3 listing pages are ever requested
    let requests = server.received_requests().await.unwrap();
    for page in 4..=5 {
        let listing = format!("/catalogue/page-{}.html", page);
        assert!(requests.iter().all(|r| r.url.path() != listing));
    }
}

#[tokio::test]
async fn test_record_order_follows_worker_index() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 3, 4, Some(3), &[]).await;

    let dir = TempDir::new().unwrap();
    let root = format!("{}/", server.uri());
    let config = create_test_config(&root, 4, dir.path());

    // The cap equals everything in the selected pages, so every item is kept
    let records = harvest(&config, 12, 2).await.expect("Harvest failed");

    let pages = page_refs(&Url::parse(&root).unwrap(), "catalogue/page-{page}.html", 3).unwrap();
    let plan = partition(&pages, 12, 4, 2, available_parallelism());
    let expected: Vec<String> = plan
        .assignments
        .iter()
        .flatten()
        .flat_map(|page| (1..=4).map(move |item| format!("Book {}-{}", page.index(), item)))
        .collect();

    let titles: Vec<String> = records.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, expected);

    // A second run with identical inputs yields the identical sequence
    let again: Vec<String> = harvest(&config, 12, 2)
        .await
        .expect("Harvest failed")
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(again, titles);
}

#[tokio::test]
async fn test_progress_snapshots_are_monotonic_and_bounded() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 6, 10, Some(6), &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 10, dir.path());

    let sink = Arc::new(RecordingSink::default());
    let params = JobParams { cap: 30, worker_count: 3 };
    let coordinator = Coordinator::new(config, params, sink.clone()).unwrap();

    let slot = JobSlot::new();
    let permit = slot.try_acquire().unwrap();
    let records = coordinator.run(&permit).await.expect("Harvest failed");
    assert_eq!(records.len(), 30);

    let states = sink.states.lock().unwrap();
    assert_eq!(states.first(), Some(&ProgressState::zero(30)));
    assert!(states.windows(2).all(|w| w[0].current <= w[1].current));

    let last = states.last().unwrap();
    assert_eq!(last.percent, 100);
    assert!(last.current >= 30);
    assert!(last.current <= 30 + params.worker_count - 1);
}

#[tokio::test]
async fn test_progress_overshoot_is_bounded_while_records_are_capped() {
    let server = MockServer::start().await;
    mount_slow_catalogue(&server, 4, 5, Some(4), &[], Duration::from_millis(50)).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 5, dir.path());

    // Seven items need two pages, so up to two workers are in flight when the
    // shared counter reaches the cap.
    let cap = 7;
    let params = JobParams { cap, worker_count: 2 };
    let workers = worker_count(params.worker_count, available_parallelism(), 2);

    let sink = Arc::new(RecordingSink::default());
    let coordinator = Coordinator::new(config, params, sink.clone()).unwrap();

    let slot = JobSlot::new();
    let permit = slot.try_acquire().unwrap();
    let records = coordinator.run(&permit).await.expect("Harvest failed");
    assert_eq!(records.len(), cap);

    let states = sink.states.lock().unwrap();
    assert!(states.windows(2).all(|w| w[0].current <= w[1].current));

    let last = states.last().unwrap();
    assert_eq!(last.percent, 100);
    assert_eq!(last.total, cap);
    assert!(last.current >= cap);
    assert!(
        last.current <= cap + workers - 1,
        "{} items emitted for cap {} with {} workers",
        last.current,
        cap,
        workers
    );
}

#[tokio::test]
async fn test_failed_export_does_not_report_completion() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 1, 5, Some(1), &[]).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", server.uri()), 5, dir.path());
    config.output.export_path = dir.path().join("missing-dir").join("books.csv");

    let result = harvest(&config, 5, 1).await;
    assert!(matches!(result, Err(HarvestError::Export(_))));

    let progress = read_snapshot(&config.output.progress_path, 5);
    assert!(progress.percent < 100, "Snapshot reports {:?}", progress);
    assert_eq!(progress.total, 5);
}

#[tokio::test]
async fn test_huge_page_count_only_builds_needed_pages() {
    let server = MockServer::start().await;
    mount_catalogue(&server, 2, 20, Some(1_000_000_000), &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 20, dir.path());

    let records = harvest(&config, 40, 2).await.expect("Harvest failed");
    assert_eq!(records.len(), 40);

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.path() != "/catalogue/page-3.html"));
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config("http://127.0.0.1:9/", 20, dir.path());

    let result = harvest(&config, 20, 2).await;
    assert!(matches!(result, Err(HarvestError::SourceUnreachable { .. })));
    assert!(!config.output.export_path.exists());

    let progress = read_snapshot(&config.output.progress_path, 20);
    assert_eq!(progress, ProgressState::zero(20));
}

#[tokio::test]
async fn test_unreachable_listing_page_is_fatal() {
    let server = MockServer::start().await;
    // The pager advertises three pages but only two exist
    mount_catalogue(&server, 2, 20, Some(3), &[]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", server.uri()), 20, dir.path());

    let result = harvest(&config, 60, 2).await;
    match result {
        Err(HarvestError::Navigation { url, message }) => {
            assert!(url.ends_with("/catalogue/page-3.html"));
            assert_eq!(message, "HTTP 404");
        }
        other => panic!("Expected a navigation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_second_job_is_rejected_while_one_is_running() {
    let slot = JobSlot::new();
    let _permit = slot.try_acquire().unwrap();
    assert!(matches!(slot.try_acquire(), Err(HarvestError::AlreadyRunning)));
}
