//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to stand in for both the catalog site and the
//! ingestion endpoint, and run the full listing → gallery → image → upload
//! cycle end-to-end.

use cvrs_scraper::config::{BackendConfig, CatalogConfig, Config, HttpConfig, WorkerConfig};
use cvrs_scraper::crawler::{build_http_client, resolve_image, Coordinator};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_string_contains, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const TOKEN: &str = "test-token";
const UPLOAD_PATH: &str = "/api/artists/add";

/// Creates a test configuration pointing both the catalog and backend at the mock server
fn create_test_config(base_url: &str, tags: &[&str], max_page: u32) -> Config {
    Config {
        catalog: CatalogConfig {
            base_url: base_url.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            max_page,
        },
        backend: BackendConfig {
            url: format!("{}/api", base_url),
            token_env: "CVRS_TOKEN".to_string(),
        },
        workers: WorkerConfig { capacity: 4 },
        http: HttpConfig::default(),
    }
}

fn listing_html(artists: &[(&str, &str)]) -> String {
    let items: String = artists
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<li><h3 class="big-artist-list-title"><a href="{}">{}</a></h3></li>"#,
                href, name
            )
        })
        .collect();
    format!("<html><body><ol>{}</ol></body></html>", items)
}

fn gallery_html(entries: &[&str]) -> String {
    let items: String = entries
        .iter()
        .map(|href| format!(r#"<li><a class="image-list-item" href="{}">img</a></li>"#, href))
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", items)
}

fn entry_html(src: &str) -> String {
    format!(
        r#"<html><body><img class="avatar" src="/avatar.png"><img class="js-gallery-image" src="{}"></body></html>"#,
        src
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_image(server: &MockServer, route: &str, mime: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), mime))
        .mount(server)
        .await;
}

async fn mount_upload_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).to_string()
}

/// Serves an empty gallery after a fixed delay, noting when each request arrived
struct SlowGallery {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for SlowGallery {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        html(gallery_html(&[])).set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_end_to_end_single_artist() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/tag/pop+punk/artists"))
        .and(query_param("page", "1"))
        .respond_with(html(listing_html(&[("Artist X", "/music/ArtistX")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_html(
        &mock_server,
        "/music/ArtistX/+images",
        gallery_html(&["/music/ArtistX/+images/abc123"]),
    )
    .await;
    mount_html(
        &mock_server,
        "/music/ArtistX/+images/abc123",
        entry_html(&format!("{}/i/u/cover.jpg#ignore", base_url)),
    )
    .await;
    mount_image(&mock_server, "/i/u/cover.jpg", "image/jpeg", b"JPEGBYTES").await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string_contains(r#"{"name":"Artist X"}"#))
        .and(body_string_contains(r#"name="img""#))
        .and(body_string_contains(r#"filename="cover.jpg""#))
        .and(body_string_contains("JPEGBYTES"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &["pop+punk"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.listing_pages_fetched, 1);
    assert_eq!(stats.artists_discovered, 1);
    assert_eq!(stats.images_resolved, 1);
    assert_eq!(stats.submissions_ok, 1);
    assert_eq!(stats.tags_completed, 1);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_exact_listing_fetch_count() {
    let mock_server = MockServer::start().await;
    let tags = ["hip-hop", "indie+rock", "drum+and+bass", "pop+punk", "electronic"];

    Mock::given(method("GET"))
        .and(path_regex(r"^/tag/[^/]+/artists$"))
        .respond_with(html(listing_html(&[])))
        .expect(50)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &tags, 10);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.listing_pages_fetched, 50);
    assert_eq!(stats.tags_completed, 5);

    // Every tag saw pages 1..=10, in order
    for tag in tags {
        let pages: Vec<u32> = requests_to(&mock_server, &format!("/tag/{}/artists", tag))
            .await
            .iter()
            .filter_map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "page")
                    .and_then(|(_, v)| v.parse().ok())
            })
            .collect();
        assert_eq!(pages, (1..=10).collect::<Vec<u32>>(), "tag {}", tag);
    }

    mock_server.verify().await;
}

#[tokio::test]
async fn test_resolution_stops_at_first_jpeg() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/music/A/+images",
        gallery_html(&["/music/A/+images/1", "/music/A/+images/2", "/music/A/+images/3"]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/music/A/+images/1"))
        .respond_with(html(entry_html("/img/one.png")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/music/A/+images/2"))
        .respond_with(html(entry_html("/img/two.jpg")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/music/A/+images/3"))
        .respond_with(html(entry_html("/img/three.jpg")))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_image(&mock_server, "/img/one.png", "image/png", b"PNGBYTES").await;
    mount_image(&mock_server, "/img/two.jpg", "image/jpeg", b"SECOND").await;
    Mock::given(method("GET"))
        .and(path("/img/three.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"THIRD".to_vec(), "image/jpeg"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let candidate = resolve_image(&client, &base_url, "/music/A")
        .await
        .expect("gallery fetch failed")
        .expect("no image resolved");

    assert_eq!(candidate.filename, "two.jpg");
    assert_eq!(candidate.mime, "image/jpeg");
    assert_eq!(candidate.content, b"SECOND".to_vec());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_empty_gallery_submits_name_only() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/rock/artists",
        listing_html(&[("Nobody", "/music/Nobody")]),
    )
    .await;
    mount_html(&mock_server, "/music/Nobody/+images", gallery_html(&[])).await;
    mount_upload_ok(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), &["rock"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.images_missing, 1);
    assert_eq!(stats.submissions_ok, 1);
    assert_eq!(stats.submissions_without_image, 1);

    let uploads = requests_to(&mock_server, UPLOAD_PATH).await;
    assert_eq!(uploads.len(), 1);
    let body = body_text(&uploads[0]);
    assert!(body.contains(r#"name="json""#));
    assert!(body.contains(r#"{"name":"Nobody"}"#));
    assert!(!body.contains(r#"name="img""#));
}

#[tokio::test]
async fn test_non_jpeg_gallery_submits_name_only() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/rock/artists",
        listing_html(&[("Pngs Only", "/music/P")]),
    )
    .await;
    mount_html(
        &mock_server,
        "/music/P/+images",
        gallery_html(&["/music/P/+images/1", "/music/P/+images/2"]),
    )
    .await;
    mount_html(&mock_server, "/music/P/+images/1", entry_html("/img/1.png")).await;
    mount_html(&mock_server, "/music/P/+images/2", entry_html("/img/2.webp")).await;
    mount_image(&mock_server, "/img/1.png", "image/png", b"PNG").await;
    mount_image(&mock_server, "/img/2.webp", "image/webp", b"WEBP").await;
    mount_upload_ok(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), &["rock"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.images_resolved, 0);
    assert_eq!(stats.submissions_ok, 1);

    let uploads = requests_to(&mock_server, UPLOAD_PATH).await;
    assert_eq!(uploads.len(), 1);
    assert!(!body_text(&uploads[0]).contains(r#"name="img""#));
}

#[tokio::test]
async fn test_quote_in_name_is_escaped() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/folk/artists",
        listing_html(&[("O&quot;Brien", "/music/OBrien")]),
    )
    .await;
    mount_html(&mock_server, "/music/OBrien/+images", gallery_html(&[])).await;
    mount_upload_ok(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), &["folk"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    coordinator.run().await.expect("Scrape failed");

    let uploads = requests_to(&mock_server, UPLOAD_PATH).await;
    assert_eq!(uploads.len(), 1);

    // The metadata field must stay valid JSON
    assert!(body_text(&uploads[0]).contains(r#"{"name":"O\"Brien"}"#));
}

#[tokio::test]
async fn test_listing_failure_aborts_only_that_tag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tag/broken/artists"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tag/fine/artists"))
        .respond_with(html(listing_html(&[])))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["broken", "fine"], 3);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.tags_aborted, 1);
    assert_eq!(stats.tags_completed, 1);
    assert_eq!(stats.listing_pages_failed, 1);
    assert_eq!(stats.listing_pages_fetched, 3);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_gallery_failure_still_submits() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/rock/artists",
        listing_html(&[("Ghost", "/music/Ghost")]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/music/Ghost/+images"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_upload_ok(&mock_server).await;

    let config = create_test_config(&mock_server.uri(), &["rock"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.resolve_failures, 1);
    assert_eq!(stats.submissions_ok, 1);

    let uploads = requests_to(&mock_server, UPLOAD_PATH).await;
    assert_eq!(uploads.len(), 1);
    assert!(body_text(&uploads[0]).contains(r#"{"name":"Ghost"}"#));
}

#[tokio::test]
async fn test_broken_entry_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/music/B/+images",
        gallery_html(&["/music/B/+images/gone", "/music/B/+images/ok"]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/music/B/+images/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_html(&mock_server, "/music/B/+images/ok", entry_html("/img/b.jpg")).await;
    mount_image(&mock_server, "/img/b.jpg", "image/jpeg", b"B").await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let candidate = resolve_image(&client, &mock_server.uri(), "/music/B")
        .await
        .unwrap();

    assert_eq!(candidate.map(|c| c.filename), Some("b.jpg".to_string()));
}

#[tokio::test]
async fn test_rejected_uploads_are_contained() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/rock/artists",
        listing_html(&[("One", "/music/One"), ("Two", "/music/Two")]),
    )
    .await;
    mount_html(&mock_server, "/music/One/+images", gallery_html(&[])).await;
    mount_html(&mock_server, "/music/Two/+images", gallery_html(&[])).await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["rock"], 1);
    let coordinator = Coordinator::new(config, "").expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.artists_discovered, 2);
    assert_eq!(stats.submissions_rejected, 2);
    assert_eq!(stats.submissions_ok, 0);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_duplicate_artists_are_not_deduplicated() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/a/artists",
        listing_html(&[("Same", "/music/Same")]),
    )
    .await;
    mount_html(
        &mock_server,
        "/tag/b/artists",
        listing_html(&[("Same", "/music/Same")]),
    )
    .await;
    mount_html(&mock_server, "/music/Same/+images", gallery_html(&[])).await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["a", "b"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.artists_discovered, 2);
    assert_eq!(stats.submissions_ok, 2);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_protocol_relative_gallery_entry() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let entry_href = format!("{}/e/1", base_url.trim_start_matches("http:"));

    mount_html(
        &mock_server,
        "/music/C/+images",
        gallery_html(&[entry_href.as_str()]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/e/1"))
        .respond_with(html(entry_html("/img/c.jpg")))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_image(&mock_server, "/img/c.jpg", "image/jpeg", b"C").await;

    let client = build_http_client(&HttpConfig::default()).unwrap();
    let candidate = resolve_image(&client, &base_url, "/music/C")
        .await
        .unwrap();

    assert_eq!(candidate.map(|c| c.filename), Some("c.jpg".to_string()));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_only_200_counts_as_accepted() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/tag/rock/artists",
        listing_html(&[("Quiet", "/music/Quiet")]),
    )
    .await;
    mount_html(&mock_server, "/music/Quiet/+images", gallery_html(&[])).await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &["rock"], 1);
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Scrape failed");

    assert_eq!(stats.submissions_ok, 0);
    assert_eq!(stats.submissions_rejected, 1);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_worker_capacity_bounds_gallery_fetches() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(300);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    let artists: Vec<(String, String)> = (1..=6)
        .map(|i| (format!("Artist {}", i), format!("/music/A{}", i)))
        .collect();
    let listed: Vec<(&str, &str)> = artists
        .iter()
        .map(|(name, href)| (name.as_str(), href.as_str()))
        .collect();

    mount_html(&mock_server, "/tag/rock/artists", listing_html(&listed)).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/music/A\d/\+images$"))
        .respond_with(SlowGallery {
            arrivals: arrivals.clone(),
            delay,
        })
        .expect(6)
        .mount(&mock_server)
        .await;
    mount_upload_ok(&mock_server).await;

    let mut config = create_test_config(&mock_server.uri(), &["rock"], 1);
    config.workers.capacity = 2;
    let coordinator = Coordinator::new(config, TOKEN).expect("Failed to create coordinator");

    let started = Instant::now();
    let stats = coordinator.run().await.expect("Scrape failed");
    let elapsed = started.elapsed();

    assert_eq!(stats.submissions_ok, 6);

    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 6);

    // Two slots are used at once
    assert!(arrivals[1] - arrivals[0] < delay);

    // A third gallery fetch never starts while two are still being served
    for window in arrivals.windows(3) {
        assert!(
            window[2] - window[0] >= delay,
            "three gallery fetches within {:?}",
            window[2] - window[0]
        );
    }

    // Six slow fetches through two slots take three rounds
    assert!(elapsed >= delay * 3, "finished in {:?}", elapsed);

    mock_server.verify().await;
}
