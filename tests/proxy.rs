use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use tower::ServiceExt;

use undertone::proxy::{router, ProxySettings};

/// What the stub upstream saw: request count plus the headers and body of
/// the last request.
#[derive(Default)]
struct Upstream {
    hits: AtomicUsize,
    last_headers: Mutex<Option<HeaderMap>>,
    last_body: Mutex<Vec<u8>>,
}

/// Spin up a real HTTP listener standing in for the speech-to-text API.
/// Returns its base URL and the capture handle.
async fn spawn_upstream(status: StatusCode, response_body: &'static str) -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    let capture = upstream.clone();

    let app = Router::new().route(
        "/v1/listen",
        post(move |headers: HeaderMap, body: Bytes| {
            let capture = capture.clone();
            async move {
                capture.hits.fetch_add(1, Ordering::SeqCst);
                *capture.last_headers.lock() = Some(headers);
                *capture.last_body.lock() = body.to_vec();
                (
                    status,
                    [(header::CONTENT_TYPE, "application/json")],
                    response_body,
                )
                    .into_response()
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/listen", addr), upstream)
}

fn settings(upstream_url: &str, api_key_env: &str) -> ProxySettings {
    ProxySettings {
        upstream_url: upstream_url.to_string(),
        api_key_env: api_key_env.to_string(),
        upstream_timeout: None,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn non_post_requests_are_rejected_without_touching_upstream() {
    let (url, upstream) = spawn_upstream(StatusCode::OK, "{}").await;
    std::env::set_var("UNDERTONE_TEST_KEY_405", "secret");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_405")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/transcribe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Method not allowed");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_credential_is_a_500_and_never_leaves_the_process() {
    let (url, upstream) = spawn_upstream(StatusCode::OK, "{}").await;
    std::env::remove_var("UNDERTONE_TEST_KEY_UNSET");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_UNSET")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .body(Body::from("audio bytes"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "API key not configured");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_credential_counts_as_missing() {
    let (url, upstream) = spawn_upstream(StatusCode::OK, "{}").await;
    std::env::set_var("UNDERTONE_TEST_KEY_EMPTY", "");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_EMPTY")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .body(Body::from("audio bytes"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "API key not configured");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_upload_relays_the_upstream_payload_verbatim() {
    let payload = r#"{"results":{"channels":[{"alternatives":[{"transcript":"hello"}]}]}}"#;
    let (url, upstream) = spawn_upstream(StatusCode::OK, payload).await;
    std::env::set_var("UNDERTONE_TEST_KEY_OK", "dg-secret");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_OK")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .header(header::CONTENT_TYPE, "audio/wav")
                .body(Body::from(vec![1u8, 2, 3, 4]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], payload.as_bytes());

    assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    let headers = upstream.last_headers.lock().take().unwrap();
    assert_eq!(headers.get("authorization").unwrap(), "Token dg-secret");
    assert_eq!(headers.get("content-type").unwrap(), "audio/wav");
    assert_eq!(*upstream.last_body.lock(), vec![1u8, 2, 3, 4]);
}

#[tokio::test]
async fn missing_content_type_defaults_to_octet_stream() {
    let (url, upstream) = spawn_upstream(StatusCode::OK, "{}").await;
    std::env::set_var("UNDERTONE_TEST_KEY_CT", "dg-secret");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_CT")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .body(Body::from("raw"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = upstream.last_headers.lock().take().unwrap();
    assert_eq!(
        headers.get("content-type").unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn upstream_error_message_is_relayed_with_its_status() {
    let (url, _upstream) = spawn_upstream(
        StatusCode::BAD_REQUEST,
        r#"{"message":"unsupported audio encoding"}"#,
    )
    .await;
    std::env::set_var("UNDERTONE_TEST_KEY_400", "dg-secret");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_400")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .body(Body::from("noise"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unsupported audio encoding");
}

#[tokio::test]
async fn unparseable_upstream_error_synthesizes_a_status_line() {
    let (url, _upstream) = spawn_upstream(StatusCode::BAD_GATEWAY, "<html>upstream down</html>").await;
    std::env::set_var("UNDERTONE_TEST_KEY_502", "dg-secret");
    let app = router(settings(&url, "UNDERTONE_TEST_KEY_502")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .body(Body::from("noise"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "API Error: 502 Bad Gateway");
}

#[tokio::test]
async fn unreachable_upstream_becomes_a_500_error_envelope() {
    std::env::set_var("UNDERTONE_TEST_KEY_DOWN", "dg-secret");
    // Port 1 on loopback is never listening.
    let app = router(settings("http://127.0.0.1:1/v1/listen", "UNDERTONE_TEST_KEY_DOWN")).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transcribe")
                .body(Body::from("noise"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}
