//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for the article server and run the
//! full fetch → extract → format → persist cycle into a temporary directory.

use pmc_harvest::config::{Config, FetchConfig, OutputConfig, SourceConfig};
use pmc_harvest::harvest::{run_batch, Runner};
use pmc_harvest::ident::collect_ids;
use pmc_harvest::output::rebuild_index;
use pmc_harvest::ArticleRecord;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "TestHarvester/1.0 (+https://example.com/contact)";

/// Creates a test configuration pointing at the mock server, with no sleeps
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        source: SourceConfig {
            url_template: format!("{}/articles/{{id}}/", server.uri()),
            id_prefix: "PMC".to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: 5,
        },
        fetch: FetchConfig {
            max_attempts: 3,
            min_delay_ms: 0,
            max_delay_ms: 0,
            failure_cooldown_ms: 0,
        },
        output: OutputConfig {
            root: dir.path().to_path_buf(),
            wrap_width: 40,
        },
    }
}

fn article_page(title: &str) -> String {
    format!(
        r#"<html><head>
        <title>Site chrome</title>
        <meta name="citation_title" content="{title}">
        <meta name="citation_journal_title" content="Journal of Tests">
        <meta name="citation_publication_date" content="2024 Feb 29">
        <meta name="citation_doi" content="10.5555/test.1">
        <meta name="citation_author" content="Grace Hopper">
        <meta name="citation_author" content="Edsger Dijkstra">
        </head><body>
        <div id="abstract"><p>This abstract is long enough that it has to be wrapped across lines.</p></div>
        <article><h2>Introduction</h2><p>Body text for the article.</p><p>It has two paragraphs.</p></article>
        </body></html>"#
    )
}

fn read_records(config: &Config) -> Vec<ArticleRecord> {
    fs::read_to_string(config.output.record_log_path())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("record line is valid JSON"))
        .collect()
}

fn operation_log(config: &Config) -> String {
    fs::read_to_string(config.output.operation_log_path()).unwrap()
}

#[tokio::test]
async fn test_full_harvest_single_article() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);
    let body = article_page("Harvesting in Practice");

    Mock::given(method("GET"))
        .and(path("/articles/PMC1001/"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.clone())
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = run_batch(config.clone(), &[" pmc1001 "]).await.unwrap();
    assert_eq!(summary.succeeded, vec!["PMC1001"]);
    assert!(summary.failed.is_empty());

    // Raw markup is stored byte for byte
    let raw = fs::read(config.output.raw_dir().join("PMC1001.html")).unwrap();
    assert_eq!(raw, body.as_bytes());

    // Text artifact follows the labeled layout
    let text = fs::read_to_string(config.output.parsed_dir().join("PMC1001.txt")).unwrap();
    assert!(text.starts_with("TITLE: Harvesting in Practice\nJOURNAL: Journal of Tests\n"));
    assert!(text.contains("\nAUTHORS: Grace Hopper, Edsger Dijkstra\n"));
    assert!(text.contains(&format!("\nURL: {}/articles/PMC1001/\n", mock_server.uri())));
    assert!(text.contains("\n\nABSTRACT:\n"));
    assert!(text.contains("\n\nBODY:\nIntroduction Body text for the article."));
    for line in text.lines().skip_while(|l| *l != "ABSTRACT:") {
        assert!(line.chars().count() <= 40, "line exceeds width: {:?}", line);
    }

    // One structured record
    let records = read_records(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "PMC1001");
    assert_eq!(records[0].doi, "10.5555/test.1");
    assert_eq!(records[0].body_word_count, 10);

    // Operational log has the OK line
    let log = operation_log(&config);
    assert!(log.contains(" OK PMC1001 ms="));
    assert!(log.contains(" words=10"));
}

#[tokio::test]
async fn test_not_found_is_retried_then_reported() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    Mock::given(method("GET"))
        .and(path("/articles/PMC999999/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/PMC2002/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("Next One")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = run_batch(config.clone(), &["PMC999999", "PMC2002"]).await.unwrap();

    assert_eq!(summary.succeeded, vec!["PMC2002"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "PMC999999");
    assert!(summary.failed[0].1.contains("404"));

    // No artifacts for the failed id
    assert!(!config.output.raw_dir().join("PMC999999.html").exists());
    assert!(!config.output.parsed_dir().join("PMC999999.txt").exists());
    let records = read_records(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "PMC2002");

    let log = operation_log(&config);
    let fail_line = log
        .lines()
        .find(|l| l.contains(" FAIL PMC999999 "))
        .expect("FAIL line present");
    assert!(fail_line.contains("exc=fetch failed (404)"));
    assert_eq!(log.lines().filter(|l| l.contains(" WARN status=404 ")).count(), 3);
    assert!(log.contains(" OK PMC2002 "));
}

#[tokio::test]
async fn test_transient_error_recovers() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    Mock::given(method("GET"))
        .and(path("/articles/PMC3003/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/PMC3003/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("Second Try")))
        .mount(&mock_server)
        .await;

    let summary = run_batch(config.clone(), &["PMC3003"]).await.unwrap();
    assert_eq!(summary.succeeded, vec!["PMC3003"]);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let log = operation_log(&config);
    assert!(log.contains(" WARN status=503 "));
    assert!(log.contains(" OK PMC3003 "));
}

#[tokio::test]
async fn test_unrecognized_ids_make_no_requests() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0) // Should never be called
        .mount(&mock_server)
        .await;

    let summary = run_batch(config.clone(), &["12345", "doi:10.1/x", "PM123", "P.M.C.1"])
        .await
        .unwrap();

    assert_eq!(summary.skipped.len(), 4);
    assert_eq!(summary.attempted(), 0);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
    assert_eq!(operation_log(&config).lines().filter(|l| l.contains(" SKIP ")).count(), 4);
}

#[tokio::test]
async fn test_empty_id_file_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let id_file = dir.path().join("ids.txt");
    fs::write(&id_file, "\n  \n").unwrap();
    let ids = collect_ids(vec![id_file.to_string_lossy().into_owned()])
        .unwrap()
        .expect("file argument yields an id list");
    assert!(ids.is_empty());

    let summary = run_batch(config, ids.as_slice()).await.unwrap();
    assert_eq!(summary, Default::default());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_heading_title_fallback() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    Mock::given(method("GET"))
        .and(path("/articles/PMC4004/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>Portal</title></head><body><h1>Study of X</h1></body></html>",
        ))
        .mount(&mock_server)
        .await;

    run_batch(config.clone(), &["PMC4004"]).await.unwrap();

    let records = read_records(&config);
    assert_eq!(records[0].title, "Study of X");
    assert_eq!(records[0].journal, "");
    assert!(records[0].authors.is_empty());
}

#[tokio::test]
async fn test_repeat_run_overwrites_artifacts_and_appends_records() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    Mock::given(method("GET"))
        .and(path("/articles/PMC5005/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("First Edition")))
        .mount(&mock_server)
        .await;

    let mut runner = Runner::new(config.clone()).unwrap();
    runner.run(&["PMC5005"]).await;
    drop(runner);

    mock_server.reset().await;
    let revised = article_page("Second Edition");
    Mock::given(method("GET"))
        .and(path("/articles/PMC5005/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(revised.clone()))
        .mount(&mock_server)
        .await;

    let mut runner = Runner::new(config.clone()).unwrap();
    runner.run(&["PMC5005"]).await;

    let raw = fs::read(config.output.raw_dir().join("PMC5005.html")).unwrap();
    assert_eq!(raw, revised.as_bytes());
    let text = fs::read_to_string(config.output.parsed_dir().join("PMC5005.txt")).unwrap();
    assert!(text.starts_with("TITLE: Second Edition\n"));

    let titles: Vec<String> = read_records(&config).into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["First Edition", "Second Edition"]);
}

#[tokio::test]
async fn test_index_rebuilt_from_harvested_articles() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    for (id, title) in [("PMC7", "Seventh"), ("PMC6", "Sixth")] {
        Mock::given(method("GET"))
            .and(path(format!("/articles/{}/", id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(article_page(title)))
            .mount(&mock_server)
            .await;
    }

    run_batch(config.clone(), &["PMC7", "PMC6"]).await.unwrap();
    let rows = rebuild_index(&config).unwrap();
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_path(config.output.index_path()).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(&records[0][0], "PMC6");
    assert_eq!(&records[0][1], "Sixth");
    assert_eq!(&records[0][2], "Journal of Tests");
    assert_eq!(&records[0][3], "2024 Feb 29");
    assert_eq!(&records[0][4], "10.5555/test.1");
    assert_eq!(&records[1][0], "PMC7");
    assert_eq!(&records[1][5], format!("{}/articles/PMC7/", mock_server.uri()));
}

#[tokio::test]
async fn test_declared_latin1_charset_is_decoded() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server, &dir);

    let mut body = b"<html><head><meta name=\"citation_title\" content=\"Caf".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b" study\"></head><body><article>Cr\xE8me br\xFBl\xE9e</article></body></html>");

    Mock::given(method("GET"))
        .and(path("/articles/PMC8008/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "text/html; charset=iso-8859-1"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = run_batch(config.clone(), &["PMC8008"]).await.unwrap();
    assert_eq!(summary.succeeded, vec!["PMC8008"]);

    // Raw artifact keeps the original bytes, text artifact is UTF-8
    assert_eq!(fs::read(config.output.raw_dir().join("PMC8008.html")).unwrap(), body);
    let text = fs::read_to_string(config.output.parsed_dir().join("PMC8008.txt")).unwrap();
    assert!(text.starts_with("TITLE: Caf\u{e9} study\n"));
    assert!(text.contains("Cr\u{e8}me br\u{fb}l\u{e9}e"));

    let records = read_records(&config);
    assert_eq!(records[0].title, "Caf\u{e9} study");
}

#[tokio::test]
async fn test_cooldown_follows_failures_only() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server, &dir);
    config.fetch.max_attempts = 1;
    config.fetch.failure_cooldown_ms = 500;
    let cooldown = Duration::from_millis(500);

    Mock::given(method("GET"))
        .and(path("/articles/PMC4004/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("Quick")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/articles/PMC4005/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut runner = Runner::new(config).unwrap();

    let started = Instant::now();
    let summary = runner.run(&["PMC4004"]).await;
    assert_eq!(summary.succeeded, vec!["PMC4004"]);
    assert!(started.elapsed() < cooldown);

    let started = Instant::now();
    let summary = runner.run(&["PMC4005"]).await;
    assert_eq!(summary.failed.len(), 1);
    assert!(started.elapsed() >= cooldown);
}
