//! Integration tests for the HTTP API.
//!
//! The SQLite-backed tests start the real server in the background on a
//! free port; the in-memory test builds the router directly around an
//! [`InMemoryStore`] to show the API is independent of the store backend.

use doclens::config::Config;
use doclens::migrate;
use doclens::server::{build_router, run_server, AppState};
use doclens_core::classify::Classifier;
use doclens_core::store::memory::InMemoryStore;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config_with_port(tmp: &TempDir, port: u16, max_file_size_mb: u64) -> Config {
    let db_path = tmp.path().join("doclens.sqlite");
    let config_content = format!(
        r#"
[db]
path = "{}"

[server]
bind = "127.0.0.1:{}"

[upload]
max_file_size_mb = {}
"#,
        db_path.display(),
        port,
        max_file_size_mb
    );
    toml::from_str(&config_content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/api/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start_server(tmp: &TempDir, max_file_size_mb: u64) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = test_config_with_port(tmp, port, max_file_size_mb);
    migrate::run_migrations(&cfg).await.unwrap();

    let handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;
    (format!("http://127.0.0.1:{}/api", port), handle)
}

fn file_form(name: &str, bytes: Vec<u8>) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(name.to_string()))
}

async fn upload(client: &reqwest::Client, base: &str, name: &str, body: &str) -> Value {
    let resp = client
        .post(format!("{}/upload", base))
        .multipart(file_form(name, body.as_bytes().to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp, 10).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["upload_config"]["max_file_size_mb"], 10);
    assert_eq!(body["upload_config"]["allowed_extensions"], json!(["txt", "pdf", "docx"]));

    handle.abort();
}

#[tokio::test]
async fn test_upload_search_and_get() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp, 10).await;
    let client = reqwest::Client::new();

    let body = upload(
        &client,
        &base,
        "contract.txt",
        "Service Agreement\nThis legal contract covers compliance.",
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["duplicate"], false);
    assert_eq!(body["document"]["classification"], "Legal Document");
    assert_eq!(body["document"]["extracted_title"], "Service Agreement");
    let id = body["document"]["id"].as_str().unwrap().to_string();

    // Same bytes again → existing document
    let again = upload(
        &client,
        &base,
        "copy.txt",
        "Service Agreement\nThis legal contract covers compliance.",
    )
    .await;
    assert_eq!(again["duplicate"], true);
    assert_eq!(again["document"]["id"], id.as_str());

    let resp = client
        .get(format!("{}/search", base))
        .query(&[("q", "Contract")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["query"], "Contract");
    assert_eq!(body["mode"], "keyword");
    assert_eq!(body["total_results"], 1);
    let hit = &body["results"][0];
    assert_eq!(hit["document_id"], id.as_str());
    assert_eq!(hit["title"], "contract.txt");
    assert_eq!(hit["matched_terms"], json!(["contract"]));
    assert!(hit["highlighted_snippet"]
        .as_str()
        .unwrap()
        .contains("<mark>contract</mark>"));
    assert_eq!(hit["text_snippets"][0]["term"], "contract");

    let resp = client
        .get(format!("{}/documents/{}", base, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let doc: Value = resp.json().await.unwrap();
    assert_eq!(
        doc["content"],
        "Service Agreement\nThis legal contract covers compliance."
    );

    let resp = client
        .get(format!("{}/documents/missing", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["code"], "not_found");

    handle.abort();
}

#[tokio::test]
async fn test_search_validation() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp, 10).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/search", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["code"], "bad_request");
    assert_eq!(err["error"]["message"], "Search query is required");

    let resp = client
        .get(format!("{}/search", base))
        .query(&[("q", "x"), ("mode", "semantic")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown search mode"));

    handle.abort();
}

#[tokio::test]
async fn test_upload_rejections() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp, 1).await;
    let client = reqwest::Client::new();

    // Disallowed extension
    let resp = client
        .post(format!("{}/upload", base))
        .multipart(file_form("run.exe", b"MZ".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Missing `file` field
    let resp = client
        .post(format!("{}/upload", base))
        .multipart(Form::new().text("other", "value"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["message"], "No file part");

    // Over the 1 MB limit
    let resp = client
        .post(format!("{}/upload", base))
        .multipart(file_form("big.txt", vec![b'a'; 1024 * 1024 + 1]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["code"], "payload_too_large");

    let body: Value = reqwest::get(format!("{}/documents", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    handle.abort();
}

#[tokio::test]
async fn test_statistics_classifications_and_listing() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp, 10).await;
    let client = reqwest::Client::new();

    upload(&client, &base, "a.txt", "legal contract agreement").await;
    upload(&client, &base, "b.txt", "climate paper on the environment").await;
    upload(&client, &base, "c.txt", "hello world").await;
    client
        .get(format!("{}/search", base))
        .query(&[("q", "climate")])
        .send()
        .await
        .unwrap();

    let stats: Value = reqwest::get(format!("{}/statistics", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["documents"]["total"], 3);
    assert_eq!(stats["search"]["total_searches"], 1);
    assert_eq!(stats["search"]["popular_terms"][0]["term"], "climate");
    assert_eq!(stats["classifications"][0]["name"], "Legal Document");
    assert_eq!(stats["classifications"][0]["percentage"], 33.33);

    let body: Value = reqwest::get(format!("{}/classifications", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body["categories"],
        json!(["Legal Document", "Other", "Scientific Paper"])
    );
    assert_eq!(body["total_categories"], 3);

    let body: Value = client
        .get(format!("{}/documents", base))
        .query(&[("page", "2"), ("per_page", "2")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"], json!({"page": 2, "per_page": 2, "total": 3, "pages": 2}));
    assert_eq!(body["documents"][0]["title"], "c.txt");
    assert!(body["documents"][0].get("content").is_none());

    handle.abort();
}

#[tokio::test]
async fn test_classify_endpoint() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = start_server(&tmp, 10).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/classify", base))
        .json(&json!({"content": "This is a research paper with academic methodology"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["classification"], "Academic Research");
    assert_eq!(body["confidence_score"], 0.75);

    let resp = client
        .post(format!("{}/classify", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["error"]["message"], "Content is required");

    // Nothing was stored
    let body: Value = reqwest::get(format!("{}/documents", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    handle.abort();
}

#[tokio::test]
async fn test_router_over_in_memory_store() {
    let cfg = Config::minimal();
    let state = AppState::new(
        cfg,
        Arc::new(InMemoryStore::new()),
        Classifier::with_defaults(),
    );
    let app = build_router(state).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    wait_for_server(port).await;

    let base = format!("http://127.0.0.1:{}/api", port);
    let client = reqwest::Client::new();
    upload(&client, &base, "fox.txt", "The quick brown fox jumps").await;

    let body: Value = client
        .get(format!("{}/search", base))
        .query(&[("q", "quick brown"), ("mode", "phrase")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["results"][0]["relevance_score"], 10);
    assert_eq!(
        body["results"][0]["highlighted_snippet"],
        "The <mark>quick brown</mark> fox jumps"
    );

    handle.abort();
}
