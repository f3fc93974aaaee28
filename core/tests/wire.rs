//! Status, header and body handling over real HTTP.
//!
//! A small canned-response server stands in for the API so each status code
//! and body shape can be provoked directly, and an echo route reports back
//! the headers the client actually put on the wire.

use std::time::Duration;

use axum::{
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, delete, get, patch, post},
    Json, Router,
};
use facilities_core::{
    Anonymous, ApiClient, ApiResponse, ClientConfig, Endpoint, ErrorKind, FormData, HttpMethod, SessionStorage,
    StoredToken, TOKEN_KEY,
};
use serde_json::{json, Value};

fn canned() -> Router {
    Router::new()
        .route(
            "/api/requests",
            get(|| async { Json(json!([{"id": 1, "name": "X"}])) }).post(|Json(body): Json<Value>| async move {
                let mut created = body;
                created["id"] = json!(12);
                (StatusCode::CREATED, Json(created))
            }),
        )
        .route(
            "/api/requests/9",
            patch(|| async { (StatusCode::FORBIDDEN, Json(json!({"message": "Forbidden"}))) }),
        )
        .route("/api/staff/5", delete(|| async { StatusCode::NO_CONTENT }))
        .route("/api/not-json", get(|| async { (StatusCode::OK, "definitely not json") }))
        .route("/api/gateway", get(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }))
        .route(
            "/api/validation",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"errors": {"title": "required"}})),
                )
            }),
        )
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({}))
            }),
        )
        .route(
            "/api/garbled",
            get(|| async { (StatusCode::FORBIDDEN, vec![0x46u8, 0x6f, 0xe9, 0xff]) }),
        )
        .route("/api/garbled-ok", get(|| async { (StatusCode::OK, vec![0xffu8, 0xfe, 0x00]) }))
        .route(
            "/api/too-large",
            post(|| async { (StatusCode::PAYLOAD_TOO_LARGE, vec![b'x'; 11 * 1024 * 1024]) }),
        )
        .route("/api/echo", any(echo))
}

async fn echo(method: Method, headers: HeaderMap, body: axum::body::Bytes) -> Json<Value> {
    let header_value = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "method": method.as_str(),
        "authorization": header_value(header::AUTHORIZATION),
        "content_type": header_value(header::CONTENT_TYPE),
        "x_trace": header_value(header::HeaderName::from_static("x-trace")),
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Serve `canned()` on a random port and return its API base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, canned()).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::anonymous(ClientConfig::new(base_url)).unwrap()
}

fn client_with_token(base_url: &str, token: &str) -> ApiClient {
    let storage = SessionStorage::new();
    storage.set(TOKEN_KEY, token);
    ApiClient::new(ClientConfig::new(base_url), StoredToken::new(storage)).unwrap()
}

#[test]
fn get_returns_decoded_body() {
    let base = start_server();
    let resp: ApiResponse<Value> = client(&base).get("/requests").unwrap();
    assert_eq!(resp, ApiResponse::Content(json!([{"id": 1, "name": "X"}])));
}

#[test]
fn post_returns_created_object() {
    let base = start_server();
    let body = json!({"title": "Flooded basement", "priority": "Critical"});
    let created: Value = client(&base).post("/requests", &body).unwrap().content().unwrap();
    assert_eq!(created, json!({"id": 12, "title": "Flooded basement", "priority": "Critical"}));
}

#[test]
fn delete_204_is_no_content() {
    let base = start_server();
    let resp: ApiResponse<Value> = client(&base).delete("/staff/5").unwrap();
    assert!(resp.is_no_content());
}

#[test]
fn forbidden_carries_server_message() {
    let base = start_server();
    let err = client(&base)
        .patch::<_, Value>("/requests/9", &json!({"status": "completed"}))
        .unwrap_err();
    assert_eq!(err.status(), 403);
    assert_eq!(err.message(), "Forbidden");
    assert_eq!(err.data(), Some(&json!({"message": "Forbidden"})));
}

#[test]
fn error_without_message_field_uses_fallback_and_keeps_data() {
    let base = start_server();
    let err = client(&base).post::<_, Value>("/validation", &json!({})).unwrap_err();
    assert_eq!(err.status(), 422);
    assert_eq!(err.message(), "An error occurred");
    assert_eq!(err.data(), Some(&json!({"errors": {"title": "required"}})));
}

#[test]
fn non_json_error_body_has_no_data() {
    let base = start_server();
    let err = client(&base).get::<Value>("/gateway").unwrap_err();
    assert_eq!(err.status(), 502);
    assert_eq!(err.message(), "An error occurred");
    assert!(err.data().is_none());
}

#[test]
fn unknown_route_is_404() {
    let base = start_server();
    let err = client(&base).get::<Value>("/nowhere").unwrap_err();
    assert!(err.is_status(404));
}

#[test]
fn non_json_success_body_is_decode_error() {
    let base = start_server();
    let err = client(&base).get::<Value>("/not-json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.status(), 200);
}

#[test]
fn non_utf8_error_body_keeps_server_status() {
    let base = start_server();
    let err = client(&base).get::<Value>("/garbled").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
    assert_eq!(err.status(), 403);
    assert_eq!(err.message(), "An error occurred");
    assert!(err.data().is_none());
}

#[test]
fn non_utf8_success_body_is_decode_error() {
    let base = start_server();
    let err = client(&base).get::<Value>("/garbled-ok").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.status(), 200);
}

#[test]
fn oversized_error_body_keeps_server_status() {
    let base = start_server();
    let err = client(&base).post::<_, Value>("/too-large", &json!({})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
    assert_eq!(err.status(), 413);
    assert_eq!(err.message(), "An error occurred");
}

#[test]
fn bad_file_content_type_is_rejected_before_send() {
    let base = start_server();
    let form = FormData::new().file("file", "a.bin", "not a mime type", b"x".to_vec());
    let err = client(&base).post_form::<Value>("/echo", form).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Request);
}

#[test]
fn connection_refused_is_500() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(&format!("http://{addr}/api")).get::<Value>("/requests").unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(!err.message().is_empty());
}

#[test]
fn slow_response_times_out() {
    let base = start_server();
    let client = ApiClient::new(
        ClientConfig::new(&base).with_timeout(Duration::from_millis(200)),
        Anonymous,
    )
    .unwrap();
    let err = client.get::<Value>("/slow").unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[test]
fn token_is_sent_as_bearer() {
    let base = start_server();
    let echoed: Value = client_with_token(&base, "abc123").get("/echo").unwrap().content().unwrap();
    assert_eq!(echoed["authorization"], "Bearer abc123");
    assert_eq!(echoed["content_type"], "application/json");
}

#[test]
fn no_token_no_authorization_header() {
    let base = start_server();
    let echoed: Value = client(&base).get("/echo").unwrap().content().unwrap();
    assert!(echoed["authorization"].is_null());
}

#[test]
fn json_body_reaches_server() {
    let base = start_server();
    let echoed: Value = client(&base)
        .put("/echo", &json!({"name": "Dana"}))
        .unwrap()
        .content()
        .unwrap();
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["body"], r#"{"name":"Dana"}"#);
}

#[test]
fn post_form_sends_multipart_boundary() {
    let base = start_server();
    let form = FormData::new().text("note", "hello");
    let echoed: Value = client_with_token(&base, "t")
        .post_form("/echo", form)
        .unwrap()
        .content()
        .unwrap();

    let content_type = echoed["content_type"].as_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="), "{content_type}");
    assert!(!content_type.contains("application/json"));
    assert!(echoed["body"].as_str().unwrap().contains("name=\"note\"\r\n\r\nhello"));
    assert_eq!(echoed["authorization"], "Bearer t");
}

#[test]
fn line_breaks_in_file_names_do_not_add_part_headers() {
    let base = start_server();
    let form = FormData::new().file("file", "a.png\r\nX-Injected: 1", "image/png", b"PNG".to_vec());
    let echoed: Value = client(&base).post_form("/echo", form).unwrap().content().unwrap();

    let body = echoed["body"].as_str().unwrap();
    assert!(!body.contains("\r\nX-Injected"), "{body}");
    assert!(body.to_ascii_lowercase().contains("content-type: image/png\r\n\r\npng"), "{body}");
}

#[test]
fn caller_headers_override_defaults() {
    let base = start_server();
    let endpoint = Endpoint::new(HttpMethod::Get, "/echo")
        .header("Content-Type", "text/plain")
        .header("X-Trace", "req-7");
    let echoed: Value = client_with_token(&base, "t").send(endpoint).unwrap().content().unwrap();
    assert_eq!(echoed["content_type"], "text/plain");
    assert_eq!(echoed["x_trace"], "req-7");
}

#[test]
fn concurrent_calls_are_independent() {
    let base = start_server();
    let client = client(&base);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            std::thread::spawn(move || client.get::<Value>("/requests"))
        })
        .collect();
    for handle in handles {
        let resp = handle.join().unwrap().unwrap();
        assert_eq!(resp, ApiResponse::Content(json!([{"id": 1, "name": "X"}])));
    }
}
