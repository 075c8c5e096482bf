//! End-to-end pipeline tests against a local HTTP server.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use insta_fetch::archive::AccountArchive;
use insta_fetch::download::{BatchDownloader, FetchRequest, ImageFetcher, Outcome};
use insta_fetch::error::{Error, Result};
use insta_fetch::remote::{BlobStore, MediaRecord, MetadataStore, RemoteSync};
use insta_fetch::{CandidateSource, MediaCandidate, Pipeline};

fn encode_image(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
    buffer.into_inner()
}

async fn serve(server: &MockServer, route: &str, width: u32, height: u32) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(encode_image(width, height)))
        .mount(server)
        .await;
}

/// Source returning a fixed candidate list.
struct FixedSource(Vec<MediaCandidate>);

#[async_trait]
impl CandidateSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_candidates(&self, _handle: &str, limit: usize) -> Result<Vec<MediaCandidate>> {
        Ok(self.0.iter().take(limit).cloned().collect())
    }
}

struct MissingAccountSource;

#[async_trait]
impl CandidateSource for MissingAccountSource {
    fn name(&self) -> &str {
        "missing"
    }

    async fn fetch_candidates(&self, handle: &str, _limit: usize) -> Result<Vec<MediaCandidate>> {
        Err(Error::AccountNotFound(handle.to_string()))
    }
}

struct FailingBlobStore;

#[async_trait]
impl BlobStore for FailingBlobStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        Err(Error::Store("bucket offline".to_string()))
    }
}

#[derive(Default)]
struct RecordingMetadataStore {
    records: Mutex<Vec<MediaRecord>>,
}

#[async_trait]
impl MetadataStore for RecordingMetadataStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn put_record(&self, _collection: &str, record: &MediaRecord) -> Result<String> {
        self.records.lock().unwrap().push(record.clone());
        Ok("doc".to_string())
    }
}

fn downloader(fetch_timeout: Duration, concurrency: usize) -> BatchDownloader {
    BatchDownloader::new(
        ImageFetcher::new(fetch_timeout, 10 * 1024 * 1024).unwrap(),
        concurrency,
    )
}

fn pipeline(candidates: Vec<MediaCandidate>, downloader: BatchDownloader, dir: &Path) -> Pipeline {
    Pipeline::new(
        Box::new(FixedSource(candidates)),
        downloader,
        dir.to_path_buf(),
        25,
    )
}

#[tokio::test]
async fn filter_drops_small_and_repeated_candidates() {
    let server = MockServer::start().await;
    serve(&server, "/a.jpg", 1920, 1080).await;
    serve(&server, "/b.jpg", 400, 300).await;
    let dir = tempfile::tempdir().unwrap();

    let a = MediaCandidate::new(format!("{}/a.jpg", server.uri()), 1920, 1080).with_source_id("a");
    let b = MediaCandidate::new(format!("{}/b.jpg", server.uri()), 400, 300).with_source_id("b");
    let pipeline = pipeline(
        vec![a.clone(), b, a],
        downloader(Duration::from_secs(5), 4),
        dir.path(),
    );

    let request = FetchRequest::new("natgeo", 800, 10, false).unwrap();
    let report = pipeline.fetch_account(&request).await.unwrap();

    assert_eq!(report.stats.candidates_found, 3);
    assert_eq!(report.stats.candidates_kept, 1);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Downloaded);
    assert_eq!(report.results[0].filename(), Some("natgeo_a.jpg"));
}

#[tokio::test]
async fn misreported_dimensions_are_rechecked() {
    let server = MockServer::start().await;
    serve(&server, "/c.jpg", 300, 300).await;
    let dir = tempfile::tempdir().unwrap();

    let c = MediaCandidate::new(format!("{}/c.jpg", server.uri()), 1920, 1080).with_source_id("c");
    let pipeline = pipeline(vec![c], downloader(Duration::from_secs(5), 1), dir.path());

    let request = FetchRequest::new("natgeo", 800, 10, false).unwrap();
    let report = pipeline.fetch_account(&request).await.unwrap();

    assert_eq!(report.results[0].outcome, Outcome::SkippedLowResolution);
    assert_eq!(report.results[0].actual_width, Some(300));
    assert!(report.results[0].local_path.is_none());
    assert!(!dir.path().join("natgeo").join("natgeo_c.jpg").exists());
}

#[tokio::test]
async fn failed_fetch_does_not_count_toward_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/0.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(encode_image(1000, 1000))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let mut candidates = Vec::new();
    for i in 0..5 {
        let route = format!("/{}.jpg", i);
        if i > 0 {
            serve(&server, &route, 1000, 1000).await;
        }
        candidates.push(
            MediaCandidate::new(format!("{}{}", server.uri(), route), 1000, 1000)
                .with_source_id(i.to_string()),
        );
    }
    let dir = tempfile::tempdir().unwrap();

    // The first fetch times out
    let pipeline = pipeline(
        candidates,
        downloader(Duration::from_millis(300), 1),
        dir.path(),
    );
    let request = FetchRequest::new("natgeo", 800, 2, false).unwrap();
    let report = pipeline.fetch_account(&request).await.unwrap();

    let outcomes: Vec<Outcome> = report.results.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![Outcome::FetchError, Outcome::Downloaded, Outcome::Downloaded]
    );
    assert_eq!(report.stats.downloaded_count, 2);
    assert!(!dir.path().join("natgeo").join("natgeo_3.jpg").exists());
}

#[tokio::test]
async fn upload_failure_keeps_local_download() {
    let server = MockServer::start().await;
    serve(&server, "/1.jpg", 1080, 1080).await;
    serve(&server, "/2.jpg", 1080, 1080).await;
    let dir = tempfile::tempdir().unwrap();

    let metadata = Arc::new(RecordingMetadataStore::default());
    let remote = RemoteSync::new(Arc::new(FailingBlobStore), metadata.clone(), "instagram_media");
    let candidates = vec![
        MediaCandidate::new(format!("{}/1.jpg", server.uri()), 0, 0).with_source_id("1"),
        MediaCandidate::new(format!("{}/2.jpg", server.uri()), 0, 0).with_source_id("2"),
    ];
    let pipeline = pipeline(
        candidates,
        downloader(Duration::from_secs(5), 2).with_remote(remote),
        dir.path(),
    );

    let request = FetchRequest::new("natgeo", 800, 10, true).unwrap();
    let report = pipeline.fetch_account(&request).await.unwrap();

    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert_eq!(result.outcome, Outcome::Downloaded);
        assert!(result.remote_url.is_none());
        assert!(result.error_detail.as_deref().unwrap().starts_with("sync:"));
        assert!(result.local_path.as_ref().unwrap().is_file());
    }
    assert_eq!(report.stats.sync_failed_count, 2);
    assert!(metadata.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rerun_reports_duplicates_and_appends_manifest() {
    let server = MockServer::start().await;
    let mut candidates = Vec::new();
    for i in 0..3 {
        let route = format!("/{}.jpg", i);
        serve(&server, &route, 900, 1200).await;
        candidates.push(
            MediaCandidate::new(format!("{}{}", server.uri(), route), 0, 0)
                .with_source_id(format!("P{}", i)),
        );
    }
    let dir = tempfile::tempdir().unwrap();
    let request = FetchRequest::new("natgeo", 800, 10, false).unwrap();

    let first = pipeline(candidates.clone(), downloader(Duration::from_secs(5), 3), dir.path())
        .fetch_account(&request)
        .await
        .unwrap();
    assert!(first.results.iter().all(|r| r.is_downloaded()));

    let second = pipeline(candidates, downloader(Duration::from_secs(5), 3), dir.path())
        .fetch_account(&request)
        .await
        .unwrap();
    assert_eq!(second.results.len(), 3);
    assert!(second
        .results
        .iter()
        .all(|r| r.outcome == Outcome::SkippedDuplicate));

    let archive = AccountArchive::open(dir.path(), "natgeo").unwrap();
    assert_eq!(archive.items.len(), 6);
    assert_eq!(archive.downloaded().count(), 3);
}

#[tokio::test]
async fn downloaded_results_meet_threshold() {
    let server = MockServer::start().await;
    let sizes = [(1200, 500), (500, 1200), (799, 799), (800, 10), (100, 100)];
    let mut candidates = Vec::new();
    for (i, (w, h)) in sizes.iter().enumerate() {
        let route = format!("/{}.jpg", i);
        serve(&server, &route, *w, *h).await;
        candidates.push(MediaCandidate::new(format!("{}{}", server.uri(), route), 0, 0));
    }
    let dir = tempfile::tempdir().unwrap();

    let pipeline = pipeline(candidates, downloader(Duration::from_secs(5), 4), dir.path());
    let request = FetchRequest::new("natgeo", 800, 10, false).unwrap();
    let report = pipeline.fetch_account(&request).await.unwrap();

    assert_eq!(report.results.len(), sizes.len());
    assert_eq!(report.stats.downloaded_count, 3);
    for result in report.results.iter().filter(|r| r.is_downloaded()) {
        let (w, h) = (result.actual_width.unwrap(), result.actual_height.unwrap());
        assert!(w >= 800 || h >= 800);
        assert!(result.filename().unwrap().starts_with("natgeo_hash_"));
    }
}

#[tokio::test]
async fn source_failure_aborts_without_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        Box::new(MissingAccountSource),
        downloader(Duration::from_secs(5), 1),
        dir.path().to_path_buf(),
        25,
    );

    let request = FetchRequest::new("ghost", 800, 10, false).unwrap();
    let err = pipeline.fetch_account(&request).await.unwrap_err();

    assert!(matches!(err, Error::AccountNotFound(_)));
    assert!(!dir.path().join("ghost").exists());
}
