//! End-to-end tests that drive the real client against a local HTTP server,
//! covering the signing headers on the wire and the normalization of every
//! outcome class, transport failures included.

use api_client::{CallStatus, VyaparApi, VyaparClient};
use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use axum::routing::post;
use configuration::settings::ApiConfig;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// One request as the server saw it.
#[derive(Debug, Clone)]
struct CapturedRequest {
    endpoint: String,
    headers: HeaderMap,
    body: String,
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Binds an ephemeral port, serves `app` in the background, and returns the
/// base URL to point the client at.
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

/// A catch-all route that records every request and replies with `response`.
fn recording_app(captured: Captured, response: serde_json::Value) -> Router {
    Router::new().route(
        "/:endpoint",
        post(
            move |Path(endpoint): Path<String>, headers: HeaderMap, body: String| async move {
                captured.lock().unwrap().push(CapturedRequest {
                    endpoint,
                    headers,
                    body,
                });
                Json(response)
            },
        ),
    )
}

fn config_for(base_url: String) -> ApiConfig {
    ApiConfig {
        api_key: "test-secret".to_string(),
        vendor: "RUPYZ".to_string(),
        base_url,
        request_timeout_secs: 2,
    }
}

/// Recomputes the expected signature from scratch, independent of the code
/// under test.
fn expected_signature(secret: &str, body: &str, vendor: &str, timestamp: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{body}{vendor}{timestamp}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn success_round_trip_signs_and_normalizes() {
    let captured: Captured = Arc::default();
    let app = recording_app(
        captured.clone(),
        json!({
            "statusCode": 200,
            "status": "ok",
            "message": "Success",
            "data": {"items": [1, 2, 3]},
        }),
    );
    let base_url = spawn_server(app).await;

    let client = VyaparClient::new(42, &config_for(base_url)).unwrap();
    let response = client.item_summary(10).await;

    assert_eq!(response.status, CallStatus::Success);
    assert_eq!(response.data, Some(json!({"items": [1, 2, 3]})));
    assert_eq!(response.message, "Success");
    assert_eq!(response.api_status, None);
    assert_eq!(response.status_code, None);

    let requests = captured.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.endpoint, "items-summary");

    // The transmitted body is the canonical form byte for byte: identity
    // first, then limit, no whitespace.
    assert_eq!(request.body, r#"{"user_data_identifier_id":42,"limit":10}"#);

    // All five headers present, with the signature matching an independent
    // recomputation over the same body and timestamp.
    assert_eq!(request.headers.get("x-vendor").unwrap(), "RUPYZ");
    assert_eq!(request.headers.get("x-api-version").unwrap(), "1");
    assert_eq!(
        request.headers.get(CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let timestamp = request
        .headers
        .get("x-timestamp")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(timestamp.parse::<i64>().unwrap() > 0);
    let signature = request
        .headers
        .get("x-auth-signature")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        signature,
        expected_signature("test-secret", &request.body, "RUPYZ", timestamp)
    );
}

#[tokio::test]
async fn remote_rejection_with_http_200_is_a_failure() {
    let captured: Captured = Arc::default();
    let app = recording_app(
        captured.clone(),
        json!({
            "statusCode": 400,
            "status": "error",
            "message": "bad id",
        }),
    );
    let base_url = spawn_server(app).await;

    let client = VyaparClient::new(7, &config_for(base_url)).unwrap();
    let response = client.party_detailed(&[9]).await;

    assert_eq!(response.status, CallStatus::Failed);
    assert_eq!(response.message, "API returned error: bad id");
    assert_eq!(response.api_status.as_deref(), Some("error"));
    assert_eq!(response.status_code, Some(400));

    let requests = captured.lock().unwrap();
    assert_eq!(requests[0].endpoint, "parties-detailed");
    assert_eq!(
        requests[0].body,
        r#"{"user_data_identifier_id":7,"party_ids":[9]}"#
    );
}

#[tokio::test]
async fn each_entity_uses_its_own_endpoint_and_id_field() {
    let captured: Captured = Arc::default();
    let app = recording_app(
        captured.clone(),
        json!({"statusCode": 200, "data": null}),
    );
    let base_url = spawn_server(app).await;
    let client = VyaparClient::new(5, &config_for(base_url)).unwrap();

    client.item_detailed(&[3, 5, 8]).await;
    client.transaction_detailed(&[]).await;
    client.party_summary(25).await;
    client.transaction_summary(1).await;

    let requests = captured.lock().unwrap();
    let seen: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.endpoint.as_str(), r.body.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (
                "items-detailed",
                r#"{"user_data_identifier_id":5,"item_ids":[3,5,8]}"#
            ),
            (
                "transactions-detailed",
                r#"{"user_data_identifier_id":5,"transaction_ids":[]}"#
            ),
            (
                "parties-summary",
                r#"{"user_data_identifier_id":5,"limit":25}"#
            ),
            (
                "transactions-summary",
                r#"{"user_data_identifier_id":5,"limit":1}"#
            ),
        ]
    );
}

#[tokio::test]
async fn base_url_without_a_trailing_slash_still_routes() {
    let captured: Captured = Arc::default();
    let app = recording_app(
        captured.clone(),
        json!({"statusCode": 200, "message": "Success"}),
    );
    let base_url = spawn_server(app).await;

    let config = config_for(base_url.trim_end_matches('/').to_string());
    let client = VyaparClient::new(1, &config).unwrap();
    let response = client.item_summary(10).await;

    assert_eq!(response.status, CallStatus::Success);
    assert_eq!(captured.lock().unwrap()[0].endpoint, "items-summary");
}

#[tokio::test]
async fn timeout_is_folded_into_a_failed_response() {
    let app = Router::new().route(
        "/:endpoint",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"statusCode": 200}))
        }),
    );
    let base_url = spawn_server(app).await;

    let mut config = config_for(base_url);
    config.request_timeout_secs = 1;
    let client = VyaparClient::new(3, &config).unwrap();

    let response = client.transaction_summary(10).await;
    assert_eq!(response.status, CallStatus::Failed);
    assert_eq!(response.message, "Request timed out after 1 seconds");
    assert_eq!(response.data, None);
    assert_eq!(response.status_code, None);
}

#[tokio::test]
async fn timeout_while_reading_the_body_is_still_a_timeout() {
    // Plain TCP so the response can stall after the headers: a 200 with a
    // content-length the handler never finishes sending.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"statusCode\":",
            )
            .await;
        // Hold the socket open past the client's deadline.
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let mut config = config_for(format!("http://{addr}/"));
    config.request_timeout_secs = 1;
    let client = VyaparClient::new(3, &config).unwrap();

    let response = client.item_summary(10).await;
    assert_eq!(response.status, CallStatus::Failed);
    assert_eq!(response.message, "Request timed out after 1 seconds");
    assert_eq!(response.data, None);
    assert_eq!(response.status_code, None);
}

#[tokio::test]
async fn connection_drop_mid_body_is_a_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"statusCode\":")
            .await;
        // Dropping the socket here leaves the promised body unfinished.
    });

    let client = VyaparClient::new(3, &config_for(format!("http://{addr}/"))).unwrap();
    let response = client.party_summary(10).await;

    assert_eq!(response.status, CallStatus::Failed);
    assert!(response.message.starts_with("Transport error: "));
    assert_eq!(response.data, None);
    assert_eq!(response.status_code, None);
}

#[tokio::test]
async fn connection_refusal_is_folded_into_a_failed_response() {
    // Bind then drop to get a port with nothing listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = VyaparClient::new(3, &config_for(format!("http://{addr}/"))).unwrap();
    let response = client.item_summary(10).await;

    assert_eq!(response.status, CallStatus::Failed);
    assert!(response.message.starts_with("Could not reach the API"));
    assert_eq!(response.data, None);
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_the_http_status() {
    let app = Router::new().route(
        "/:endpoint",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
    );
    let base_url = spawn_server(app).await;

    let client = VyaparClient::new(3, &config_for(base_url)).unwrap();
    let response = client.party_summary(10).await;

    assert_eq!(response.status, CallStatus::Failed);
    assert_eq!(response.message, "API returned error: HTTP 502");
    assert_eq!(response.api_status, None);
    assert_eq!(response.status_code, None);
}
