mod support;

#[tokio::test]
async fn test_session_creation() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let session_id = format!("duel-{}", uuid::Uuid::new_v4());
    let payload = serde_json::json!({
        "session_id": session_id,
        "host_id": "host-1",
        "host_name": "Ahab"
    });

    let res = client
        .post(format!("{base_url}/sessions"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
}

#[tokio::test]
async fn test_duplicate_session_is_rejected() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let session_id = format!("duel-{}", uuid::Uuid::new_v4());
    let payload = serde_json::json!({
        "session_id": session_id,
        "host_id": "host-1"
    });

    let first = client
        .post(format!("{base_url}/sessions"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(first.status(), reqwest::StatusCode::CREATED);

    let second = client
        .post(format!("{base_url}/sessions"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();
    let payload = serde_json::json!({
        "session_id": "",
        "host_id": "host-1"
    });

    let res = client
        .post(format!("{base_url}/sessions"))
        .json(&payload)
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}
