//! End-to-end batch job tests against a mock proxy

use crate::common::{create_test_config, pages, sitemap_index, urlset};
use sitemap_harvest::extractor::{BatchJob, JobOutcome};
use sitemap_harvest::state::{BatchState, JobStatus, OutputRow};
use sitemap_harvest::storage::{self, open_storage, BATCH_STATE_KEY};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "https://example.com";

async fn mount_document(server: &MockServer, target: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .and(query_param("url", target))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn proxy(server: &MockServer) -> Vec<String> {
    vec![format!("{}/proxy?url=", server.uri())]
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open CSV");
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_index_expansion_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let posts = pages(SITE, "posts", 5);
    let pages_list = pages(SITE, "pages", 5);
    mount_document(
        &server,
        "https://example.com/sitemap_index.xml",
        sitemap_index(&[
            "https://example.com/post-sitemap.xml",
            "https://example.com/page-sitemap.xml",
        ]),
    )
    .await;
    mount_document(&server, "https://example.com/post-sitemap.xml", urlset(&posts)).await;
    mount_document(&server, "https://example.com/page-sitemap.xml", urlset(&pages_list)).await;

    let config = create_test_config(proxy(&server), dir.path());
    let store = open_storage(Path::new(&config.output.database_path)).unwrap();
    let mut job = BatchJob::from_config(&config, store, None).unwrap();

    let outcome = job.start(["example.com"]).await.unwrap();

    let summary = match outcome {
        JobOutcome::Completed(summary) => summary,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(summary.rows, 10);
    assert_eq!(summary.errors, 0);

    let mut expected = posts.clone();
    expected.extend(pages_list.clone());
    let extracted: Vec<String> = job
        .state()
        .output_rows
        .iter()
        .map(|row| row.extracted_url.clone())
        .collect();
    assert_eq!(extracted, expected);

    let csv = read_csv(&dir.path().join("sitemap_urls.csv"));
    assert_eq!(csv.len(), 11);
    assert_eq!(csv[0], vec!["Sitemap URL", "Extracted URL"]);
    assert_eq!(
        csv[1],
        vec![
            "https://example.com/sitemap_index.xml".to_string(),
            posts[0].clone()
        ]
    );
}

#[tokio::test]
async fn test_fallback_to_plain_sitemap_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // The index URL is never mounted, so the proxy answers 404
    mount_document(
        &server,
        "https://example.com/sitemap.xml",
        urlset(&pages(SITE, "p", 2)),
    )
    .await;

    let config = create_test_config(proxy(&server), dir.path());
    let store = open_storage(Path::new(&config.output.database_path)).unwrap();
    let mut job = BatchJob::from_config(&config, store, None).unwrap();

    job.start(["example.com"]).await.unwrap();

    assert_eq!(
        job.state().output_rows,
        vec![
            OutputRow::new("https://example.com/sitemap_index.xml", "https://example.com/p/1"),
            OutputRow::new("https://example.com/sitemap_index.xml", "https://example.com/p/2"),
        ]
    );
    assert!(job.state().errors.is_empty());
}

#[tokio::test]
async fn test_failures_recorded_and_state_persisted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_document(
        &server,
        "https://one.example.com/sitemap.xml",
        urlset(&pages("https://one.example.com", "a", 1)),
    )
    .await;
    mount_document(
        &server,
        "https://three.example.com/sitemap.xml",
        "<urlset><url><loc>https://three.example.com/a".to_string(),
    )
    .await;

    let config = create_test_config(proxy(&server), dir.path());
    let db_path = Path::new(&config.output.database_path).to_path_buf();
    {
        let store = open_storage(&db_path).unwrap();
        let mut job = BatchJob::from_config(&config, store, Some("hash".to_string())).unwrap();

        job.start([
            "https://one.example.com/sitemap.xml",
            "not a url at all",
            "https://three.example.com/sitemap.xml",
        ])
        .await
        .unwrap();
    }

    // A fresh process sees the finished run
    let store = open_storage(&db_path).unwrap();
    let state: BatchState = storage::load(&store, BATCH_STATE_KEY).unwrap().unwrap();

    assert_eq!(state.processed_count, 3);
    assert_eq!(state.status(), JobStatus::Completed);
    assert_eq!(state.errors.len(), 2);
    assert!(state.errors[0].starts_with("Invalid URL format"));
    assert!(state.errors[1].starts_with("Parse error"));
    assert_eq!(state.output_rows.len(), 1);
    assert_eq!(state.config_hash.as_deref(), Some("hash"));
    assert_eq!(state.log.last().unwrap(), "Summary: 2 errors occurred.");
}

#[tokio::test]
async fn test_resume_after_restart() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let inputs: Vec<String> = (0..5)
        .map(|i| format!("https://site{}.example.com/sitemap.xml", i))
        .collect();
    for (i, input) in inputs.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(query_param("url", input.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(urlset(&[format!("https://site{}.example.com/", i)])),
            )
            .expect(if i >= 3 { 1 } else { 0 })
            .mount(&server)
            .await;
    }

    let config = create_test_config(proxy(&server), dir.path());
    let store = open_storage(Path::new(&config.output.database_path)).unwrap();

    // Snapshot left behind by a run interrupted after three items
    let mut interrupted = BatchState::new(inputs, None);
    for i in 0..3 {
        interrupted.output_rows.push(OutputRow::new(
            format!("https://site{}.example.com/sitemap.xml", i),
            format!("https://site{}.example.com/", i),
        ));
        interrupted.advance();
    }
    storage::save(&store, BATCH_STATE_KEY, &interrupted).unwrap();

    let mut job = BatchJob::from_config(&config, store, None).unwrap();
    let outcome = job.resume().await.unwrap();

    assert!(matches!(outcome, JobOutcome::Completed(_)));
    assert_eq!(job.state().processed_count, 5);
    assert_eq!(&job.state().output_rows[..3], &interrupted.output_rows[..]);
    assert_eq!(job.state().output_rows.len(), 5);
    assert_eq!(read_csv(&dir.path().join("sitemap_urls.csv")).len(), 6);
}
