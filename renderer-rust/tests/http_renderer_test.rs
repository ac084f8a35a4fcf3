use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use docgen_renderer::{
    http::{HttpDocumentRenderer, HttpRendererOptions},
    DocumentRenderer, GenerationRequest, RenderContext, RenderError,
};
use serde_json::{json, Value};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Clone, Default)]
struct Received {
    bodies: Arc<Mutex<Vec<Value>>>,
    authorization: Arc<Mutex<Vec<String>>>,
}

async fn record_and_render(
    State(received): State<Received>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    received.bodies.lock().unwrap().push(body);
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        received
            .authorization
            .lock()
            .unwrap()
            .push(value.to_str().unwrap().to_string());
    }
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::LOCATION, "https://files.example/lease.pdf"),
        ],
        b"%PDF-1.7 rendered".to_vec(),
    )
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

fn renderer(addr: SocketAddr, timeout: Duration) -> HttpDocumentRenderer {
    HttpDocumentRenderer::new(HttpRendererOptions {
        base_url: Some(format!("http://{addr}/")),
        api_key: Some("secret".to_string()),
        timeout: Some(timeout),
        ..HttpRendererOptions::default()
    })
}

fn lease_request() -> GenerationRequest {
    let mut context = RenderContext::new();
    context.insert("tenant".to_string(), "Alice".to_string());
    GenerationRequest::new("lease", context)
}

#[tokio::test]
async fn http_renderer_posts_request_and_returns_pdf_bytes() {
    let received = Received::default();
    let router = Router::new()
        .route("/render", post(record_and_render))
        .with_state(received.clone());
    let addr = serve(router).await;

    let artifact = renderer(addr, Duration::from_secs(5))
        .render(lease_request())
        .await
        .expect("render succeeds");

    assert_eq!(artifact.data, b"%PDF-1.7 rendered".to_vec());
    assert_eq!(artifact.mime_type, "application/pdf");
    assert_eq!(
        artifact.file_url.as_deref(),
        Some("https://files.example/lease.pdf")
    );
    assert_eq!(
        received.bodies.lock().unwrap().clone(),
        vec![json!({ "templateId": "lease", "context": { "tenant": "Alice" } })]
    );
    assert_eq!(
        received.authorization.lock().unwrap().clone(),
        vec!["Bearer secret".to_string()]
    );
}

#[tokio::test]
async fn http_renderer_decodes_json_envelope() {
    let router = Router::new().route(
        "/render",
        post(|| async {
            Json(json!({
                // "%PDF-1.4"
                "data": "JVBERi0xLjQ=",
                "fileUrl": "https://files.example/notice.pdf"
            }))
        }),
    );
    let addr = serve(router).await;

    let artifact = renderer(addr, Duration::from_secs(5))
        .render(lease_request())
        .await
        .expect("render succeeds");

    assert_eq!(artifact.data, b"%PDF-1.4".to_vec());
    assert_eq!(artifact.mime_type, "application/pdf");
    assert_eq!(
        artifact.file_url.as_deref(),
        Some("https://files.example/notice.pdf")
    );
}

#[tokio::test]
async fn http_renderer_maps_status_errors() {
    let router = Router::new().route(
        "/render",
        post(|| async {
            (StatusCode::UNPROCESSABLE_ENTITY, "missing field: tenant").into_response()
        }),
    );
    let addr = serve(router).await;

    let err = renderer(addr, Duration::from_secs(5))
        .render(lease_request())
        .await
        .expect_err("render fails");

    match err {
        RenderError::StatusCode(status, body) => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(body, "missing field: tenant");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn http_renderer_rejects_malformed_payload() {
    let router = Router::new().route(
        "/render",
        post(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html>oops</html>") }),
    );
    let addr = serve(router).await;

    let err = renderer(addr, Duration::from_secs(5))
        .render(lease_request())
        .await
        .expect_err("render fails");

    assert!(matches!(err, RenderError::MalformedPayload("http", _)));
}

#[tokio::test]
async fn http_renderer_surfaces_timeouts() {
    let router = Router::new().route(
        "/render",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ([(header::CONTENT_TYPE, "application/pdf")], b"%PDF-1.7".to_vec())
        }),
    );
    let addr = serve(router).await;

    let err = renderer(addr, Duration::from_millis(100))
        .render(lease_request())
        .await
        .expect_err("render times out");

    match err {
        RenderError::Timeout(timeout) => assert_eq!(timeout, Duration::from_millis(100)),
        other => panic!("unexpected error variant: {other:?}"),
    }
}
