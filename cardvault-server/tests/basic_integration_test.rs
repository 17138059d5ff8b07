//! Basic integration tests for cardvault-server

use reqwest::{Client, StatusCode};

mod common;

async fn create(client: &Client, url: &str, body: &'static [u8]) -> serde_json::Value {
    let response = client
        .post(format!("{url}/cards"))
        .body(body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse JSON")
}

#[tokio::test]
async fn test_health_check() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", server.url))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_and_fetch_card() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let created = create(&client, &server.url, b"hello").await;
    assert_eq!(created["digest"], "5d41402abc4b2a76b9719d911017c592");
    assert_eq!(created["size"], 5);
    assert!(created["claimed_at"].is_string());
    assert!(created.get("audit").is_none());

    let response = client
        .get(format!("{}/cards/5d41402abc4b2a76b9719d911017c592", server.url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["x-content-digest"],
        "5d41402abc4b2a76b9719d911017c592"
    );
    assert_eq!(
        response.headers()["x-claimed-at"].to_str().unwrap(),
        created["claimed_at"].as_str().unwrap()
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"hello");
}

#[tokio::test]
async fn test_duplicate_submission_is_audited() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let first = create(&client, &server.url, b"same bytes").await;
    let second = create(&client, &server.url, b"same bytes").await;

    assert_ne!(first["digest"], second["digest"]);
    assert_eq!(second["audit"], "duplicate");

    // Audit card body is the JSON record
    let response = client
        .get(format!(
            "{}/cards/{}",
            server.url,
            second["digest"].as_str().unwrap()
        ))
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = response.json().await.unwrap();
    assert_eq!(record["kind"], "duplicate");
    assert_eq!(record["observed_digest"], first["digest"]);
}

#[tokio::test]
async fn test_empty_body_rejected() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/cards", server.url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/cards", server.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/cards", server.url))
        .body(vec![7u8; common::TEST_MAX_CONTENT + 1])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|msg| msg.contains("too large"))
    );
}

#[tokio::test]
async fn test_invalid_and_missing_digests() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/cards/not-a-digest", server.url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/cards/{}", server.url, "ab".repeat(16)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_newest_first() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let a = create(&client, &server.url, b"alpha").await;
    let b = create(&client, &server.url, b"beta").await;
    let c = create(&client, &server.url, b"gamma").await;

    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/cards", server.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let digests: Vec<_> = listed.iter().map(|card| card["digest"].clone()).collect();
    assert_eq!(digests, vec![c["digest"].clone(), b["digest"].clone(), a["digest"].clone()]);

    let page: Vec<serde_json::Value> = client
        .get(format!("{}/cards?limit=1&offset=1", server.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["digest"], b["digest"]);
}

#[tokio::test]
async fn test_delete_card() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let created = create(&client, &server.url, b"short lived").await;
    let url = format!("{}/cards/{}", server.url, created["digest"].as_str().unwrap());

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lookup_and_escalation() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let lookup = |body: &'static [u8]| {
        client
            .post(format!("{}/cards/lookup", server.url))
            .body(body)
            .send()
    };

    let before: serde_json::Value = lookup(b"lookup me").await.unwrap().json().await.unwrap();
    assert_eq!(before["exists"], false);
    assert_eq!(before["algorithm"], "md5");

    create(&client, &server.url, b"lookup me").await;

    let after: serde_json::Value = lookup(b"lookup me").await.unwrap().json().await.unwrap();
    assert_eq!(after["exists"], true);

    let escalation: serde_json::Value = client
        .get(format!("{}/escalation", server.url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(escalation["algorithm"], "md5");
    assert_eq!(escalation["position"], 0);
    assert_eq!(
        escalation["rungs"],
        serde_json::json!(["md5", "sha1", "sha256", "sha512", "blake3"])
    );
}
