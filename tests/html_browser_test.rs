use std::sync::Arc;
use std::time::Duration;

use autos_tracker::adapters::html::HtmlBrowser;
use autos_tracker::adapters::store::JsonStore;
use autos_tracker::config::types::{BrowserConfig, TraversalConfig};
use autos_tracker::error::TrackerError;
use autos_tracker::pipeline::run_once;
use autos_tracker::ports::browser::ListingBrowser;
use autos_tracker::traversal::pacing::NoPacer;
use autos_tracker::traversal::{Crawler, StopReason};

use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_browser_config(base_url: &str) -> BrowserConfig {
    BrowserConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        max_retries: 1,
        ..Default::default()
    }
}

fn browser(server: &MockServer) -> HtmlBrowser {
    HtmlBrowser::new(&fast_browser_config(&server.uri()), 4000.0)
        .unwrap()
        .with_retry_backoff(Duration::from_millis(10))
}

fn crawler(browser: HtmlBrowser) -> Crawler {
    Crawler::new(
        Arc::new(browser),
        Arc::new(NoPacer),
        &TraversalConfig::default(),
    )
}

fn card(id: u32, price: &str, title: &str, extra: &str) -> String {
    format!(
        r#"<a href="/advert/{id}"><img src="/img/{id}.jpg"><div>{price}</div><h3>{title}</h3><p>{extra}</p></a>"#
    )
}

fn results_page(cards: &[String], next_page: Option<u32>) -> String {
    let nav = next_page
        .map(|n| format!(r#"<a href="/autos-boats/autos?minprice=4000&page={n}">Next</a>"#))
        .unwrap_or_default();
    format!(
        "<html><body><div class=\"results\">{}</div><nav>{nav}</nav></body></html>",
        cards.join("\n")
    )
}

async fn mount_results(server: &MockServer, page: Option<u32>, body: String) {
    let mock = Mock::given(method("GET"))
        .and(path("/autos-boats/autos"))
        .and(query_param("minprice", "4000"));
    let mock = match page {
        Some(n) => mock.and(query_param("page", n.to_string())),
        None => mock.and(query_param_is_missing("page")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn crawls_until_a_page_has_no_cards() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        None,
        results_page(
            &[
                card(1, "CI$ 12,000", "2018 Toyota Camry", "45,000 km · On Island"),
                card(2, "CI$ 900", "Roof rack", ""),
            ],
            Some(2),
        ),
    )
    .await;
    mount_results(
        &server,
        Some(2),
        results_page(
            &[card(3, "US$ 16,000", "2020 Honda Civic", "12,000 km")],
            Some(3),
        ),
    )
    .await;
    mount_results(&server, Some(3), results_page(&[], None)).await;

    let report = crawler(browser(&server)).run().await;

    assert_eq!(report.stop, StopReason::EmptyPage { page: 3 });
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.raw_cards, 3);
    assert_eq!(report.rejected, 1);
    let ids: Vec<&str> = report
        .listings
        .iter()
        .map(|l| l.external_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);

    let camry = &report.listings[0];
    assert_eq!(camry.make, "Toyota");
    assert_eq!(camry.mileage, Some(45_000));
    assert_eq!(camry.currency.as_deref(), Some("KYD"));
    assert_eq!(camry.location.as_deref(), Some("On Island"));
    assert_eq!(camry.images, vec![format!("{}/img/1.jpg", server.uri())]);
    assert_eq!(report.listings[1].currency.as_deref(), Some("USD"));
}

#[tokio::test]
async fn missing_next_link_ends_the_crawl() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        None,
        results_page(&[card(1, "CI$ 12,000", "2018 Toyota Camry", "45,000 km")], None),
    )
    .await;

    let report = crawler(browser(&server)).run().await;

    assert_eq!(report.stop, StopReason::NoNextPage { page: 1 });
    assert_eq!(report.listings.len(), 1);
}

#[tokio::test]
async fn detail_page_fills_missing_mileage() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        None,
        results_page(&[card(7, "CI$ 14,000", "2016 Honda CR-V", "Automatic")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/advert/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r"<html><body><h1>2016 Honda CR-V</h1>
              <dl>
                <dt>Mileage</dt><dd>85,600 km</dd>
                <dt>Fuel Type</dt><dd>Petrol</dd>
                <dt>Colour</dt><dd>Silver</dd>
                <dt>On Island</dt><dd>Yes</dd>
              </dl></body></html>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawler(browser(&server)).run().await;

    let crv = &report.listings[0];
    assert_eq!(crv.mileage, Some(85_600));
    assert_eq!(crv.fuel_type.as_deref(), Some("Petrol"));
    assert_eq!(crv.color.as_deref(), Some("Silver"));
    assert_eq!(crv.on_island, Some(true));
    assert_eq!(report.detail_failures, 0);
}

#[tokio::test]
async fn detail_body_text_is_scanned_when_labels_lack_mileage() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        None,
        results_page(&[card(8, "CI$ 7,500", "2012 Nissan Tiida", "")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/advert/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Well kept, approx. 98,000 on the clock.</p></body></html>",
        ))
        .mount(&server)
        .await;

    let report = crawler(browser(&server)).run().await;

    assert_eq!(report.listings[0].mileage, Some(98_000));
}

#[tokio::test]
async fn missing_detail_page_keeps_listing_without_mileage() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        None,
        results_page(&[card(9, "CI$ 7,500", "2012 Nissan Tiida", "")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/advert/9"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawler(browser(&server)).run().await;

    assert_eq!(report.listings.len(), 1);
    assert_eq!(report.listings[0].mileage, None);
    assert_eq!(report.detail_failures, 1);
}

#[tokio::test]
async fn server_errors_are_retried_then_fail_the_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/autos-boats/autos"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let browser = browser(&server);
    let err = browser.open_results(1).await.unwrap_err();

    assert!(matches!(err, TrackerError::Navigation { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn full_run_writes_listings_file() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        None,
        results_page(
            &[
                card(1, "CI$ 12,000", "2018 Toyota Camry", "45,000 km"),
                card(2, "CI$ 8,500", "2017 Mazda 3", "60,000 km"),
            ],
            None,
        ),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("listings.json");

    let store = JsonStore::open(&store_path).await.unwrap();
    let summary = run_once(&crawler(browser(&server)), &store).await.unwrap();

    assert_eq!(summary.inserted, 2);
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    assert_eq!(written.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn empty_site_fails_the_run() {
    let server = MockServer::start().await;
    mount_results(&server, None, results_page(&[], None)).await;

    let err = run_once(&crawler(browser(&server)), &JsonStore::in_memory())
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::NoListings));
}
