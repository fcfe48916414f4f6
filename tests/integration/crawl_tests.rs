//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from seed to written output.

use std::sync::Arc;
use sumi_recon::config::{parse_config, Config};
use sumi_recon::crawler::{run_crawl_with_output, CrawlerOptions};
use sumi_recon::output::{StandardWriter, StatisticsSnapshot};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// Creates a test configuration crawling the given seed
fn create_test_config(seed: &str, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.input.seeds = vec![seed.to_string()];
    config.crawler.max_depth = max_depth;
    config.crawler.retries = 0;
    config.crawler.rate_limit = 0;
    config.crawler.timeout = 5;
    config
}

/// Runs a crawl writing into `output_file` instead of stdout
async fn run(config: &Config) -> StatisticsSnapshot {
    let options = Arc::new(CrawlerOptions::from_config(config).expect("valid options"));
    let writer = StandardWriter::from_config(&config.output, &options.registry)
        .expect("writer")
        .without_stdout();
    run_crawl_with_output(config, options, Arc::new(writer))
        .await
        .expect("crawl runs")
}

fn output_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("output written")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_plain_output() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<html><body>
                <a href="/page1">One</a>
                <a href="page2?id=7#details">Two</a>
                <a href="#top">Top</a>
                <a href="mailto:admin@example.com">Mail</a>
            </body></html>"##,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/">Home</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<p>leaf</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    let mut config = create_test_config(&format!("{}/", base), 2);
    config.output.file = Some(out.to_string_lossy().to_string());

    let stats = run(&config).await;

    let mut lines = output_lines(&out);
    lines.sort();
    let mut expected = vec![
        format!("{}/", base),
        format!("{}/page1", base),
        format!("{}/page2?id=7", base),
    ];
    expected.sort();
    assert_eq!(lines, expected);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.results_written, 3);
}

#[tokio::test]
async fn test_depth_limit_stops_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/level1">1</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html(r#"<a href="/level2">2</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html("too deep"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    let mut config = create_test_config(&format!("{}/", server.uri()), 1);
    config.output.file = Some(out.to_string_lossy().to_string());

    run(&config).await;
    assert_eq!(output_lines(&out).len(), 2);
}

#[tokio::test]
async fn test_scope_and_extension_filters() {
    let server = MockServer::start().await;
    let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();

    // `localhost` reaches the same server under a different host name
    let page = format!(
        r#"<a href="http://localhost:{}/elsewhere">Other host</a>
           <a href="/admin/panel">Admin</a>
           <img src="/logo.png">
           <script src="/app.js"></script>"#,
        port
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("var x = 1;"))
        .expect(1)
        .mount(&server)
        .await;
    for blocked in ["/elsewhere", "/admin/panel", "/logo.png"] {
        Mock::given(method("GET"))
            .and(path(blocked))
            .respond_with(html("blocked"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    let mut config = create_test_config(&format!("{}/", server.uri()), 2);
    config.scope.out_of_scope = vec!["/admin/".to_string()];
    config.output.file = Some(out.to_string_lossy().to_string());

    let stats = run(&config).await;
    assert_eq!(output_lines(&out).len(), 2);
    assert_eq!(stats.links_rejected, 3);
}

#[tokio::test]
async fn test_json_output_with_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/search?q=rust&page=2">Search</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.jsonl");
    let mut config = create_test_config(&format!("{}/", server.uri()), 1);
    config.output.file = Some(out.to_string_lossy().to_string());
    config.output.json = true;
    config.output.fields = Some("key,kv".to_string());

    run(&config).await;

    let records: Vec<serde_json::Value> = output_lines(&out)
        .iter()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect();
    assert_eq!(records.len(), 2);

    let search = records
        .iter()
        .find(|r| r["url"].as_str().unwrap_or_default().contains("/search"))
        .expect("search result present");
    assert_eq!(search["status_code"], 404);
    assert_eq!(search["depth"], 1);
    assert_eq!(search["tag"], "a");
    assert_eq!(search["fields"]["key"], serde_json::json!(["q", "page"]));
    assert_eq!(search["fields"]["kv"], serde_json::json!(["q=rust", "page=2"]));

    let seed = records
        .iter()
        .find(|r| r["depth"] == 0)
        .expect("seed result present");
    assert_eq!(seed["fields"]["key"], serde_json::json!([]));
}

#[tokio::test]
async fn test_store_fields_written_per_host() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/login?next=/home">Login</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html("login form"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store_dir = dir.path().join("fields");
    let mut config = create_test_config(&format!("{}/", server.uri()), 1);
    config.output.store_fields = Some("key,path".to_string());
    config.output.store_fields_directory = store_dir.to_string_lossy().to_string();

    run(&config).await;

    let keys = std::fs::read_to_string(store_dir.join("http_127.0.0.1_key.txt"))
        .expect("key file written");
    assert_eq!(keys, "next\n");

    let paths = std::fs::read_to_string(store_dir.join("http_127.0.0.1_path.txt"))
        .expect("path file written");
    let mut paths: Vec<&str> = paths.lines().collect();
    paths.sort();
    assert_eq!(paths, vec!["/", "/login"]);
}

#[tokio::test]
async fn test_custom_field_from_toml_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>Reach us at ops@example.org</p>").insert_header("server", "nginx/1.25"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    let toml = format!(
        r#"
[input]
seeds = ["{seed}/"]

[crawler]
max-depth = 0
rate-limit = 0
retries = 0

[output]
file = "{out}"
fields = "email,server"

[[custom-field]]
name = "email"
part = "body"
patterns = ['[a-z]+@[a-z]+\.org']

[[custom-field]]
name = "server"
part = "header"
patterns = ['(?i)server: (\S+)']
group = 1
"#,
        seed = server.uri(),
        out = out.to_string_lossy().replace('\\', "/"),
    );
    let config = parse_config(&toml).expect("config parses");

    run(&config).await;

    assert_eq!(output_lines(&out), vec!["ops@example.org", "nginx/1.25"]);
}

#[tokio::test]
async fn test_unreachable_seed_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("results.txt");
    let mut config = create_test_config("http://127.0.0.1:1/", 1);
    config.output.file = Some(out.to_string_lossy().to_string());

    let stats = run(&config).await;
    assert_eq!(stats.fetch_failures, 1);
    assert!(output_lines(&out).is_empty());
}
