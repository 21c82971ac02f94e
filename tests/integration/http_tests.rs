//! Real HTTP round trips against a local mock API server.
//!
//! Tests verify:
//! - `HttpTransport` sends the request the API expects and decodes responses
//! - Status classification over a real connection
//! - Connection failures surface as `Unknown`
//! - `CachingTransport` avoids repeated downloads

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use url::Url;

use photobook::transport::TRANSPORT_CACHE_DIR;
use photobook::{
    CachingTransport, HttpTransport, ImageTimeouts, NetworkError, PhotoService, ResponseCache,
};

use super::test_utils::{png_bytes, search_body, ACCESS_KEY};

// =============================================================================
// Mock API Server
// =============================================================================

#[derive(Clone, Default)]
struct ServerState {
    image_hits: Arc<AtomicUsize>,
}

async fn search_handler(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let expected = format!("Client-ID {ACCESS_KEY}");
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, "{\"errors\":[\"OAuth error\"]}".to_string());
    }

    let per_page: usize = params
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    match params.get("query").map(String::as_str) {
        Some("red fox") if params.get("page").map(String::as_str) == Some("0") => {
            (StatusCode::OK, search_body(per_page.min(3)))
        }
        Some("broken") => (StatusCode::OK, "{\"results\": 17}".to_string()),
        _ => (StatusCode::UNPROCESSABLE_ENTITY, "{}".to_string()),
    }
}

async fn image_handler(State(state): State<ServerState>) -> impl IntoResponse {
    state.image_hits.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "image/png")], png_bytes(3))
}

async fn not_an_image_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<html>moved</html>")
}

async fn spawn_server() -> (SocketAddr, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/search/photos", get(search_handler))
        .route("/images/photo.png", get(image_handler))
        .route("/images/page.html", get(not_an_image_handler))
        .route("/images/flaky", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn http_service(
    addr: SocketAddr,
    access_key: &str,
) -> PhotoService<HttpTransport, HttpTransport> {
    PhotoService::new(
        HttpTransport::api().unwrap(),
        HttpTransport::images(ImageTimeouts::default()).unwrap(),
        Url::parse(&format!("http://{addr}")).unwrap(),
        access_key,
    )
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_http_search_round_trip() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, ACCESS_KEY);

    let photos = service.search_photos("red fox", 0, 2).await.unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].user.name, "Photographer 0");
    assert_eq!(photos[1].likes, 101);
}

#[tokio::test]
async fn test_http_search_bad_key_is_invalid_url() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, "wrong-key");

    let result = service.search_photos("red fox", 0, 2).await;
    assert!(matches!(result, Err(NetworkError::InvalidUrl)));
}

#[tokio::test]
async fn test_http_search_unprocessable_is_invalid_url() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, ACCESS_KEY);

    let result = service.search_photos("red fox", 5, 2).await;
    assert!(matches!(result, Err(NetworkError::InvalidUrl)));
}

#[tokio::test]
async fn test_http_search_schema_mismatch_is_decoding_error() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, ACCESS_KEY);

    let result = service.search_photos("broken", 0, 2).await;
    assert!(matches!(result, Err(NetworkError::DecodingError)));
}

#[tokio::test]
async fn test_http_connection_refused_is_unknown() {
    // Reserve a port, then close it so nothing is listening
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let service = http_service(addr, ACCESS_KEY);

    let result = service.search_photos("red fox", 0, 2).await;
    assert!(matches!(result, Err(NetworkError::Unknown(_))), "got {result:?}");
}

// =============================================================================
// Images
// =============================================================================

#[tokio::test]
async fn test_http_image_fetch() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, ACCESS_KEY);
    let url = format!("http://{addr}/images/photo.png");

    let image = service.fetch_image(&url).await.unwrap();
    assert_eq!((image.width(), image.height()), (8, 6));
    assert!(service.cached_image(&url).await.is_some());
}

#[tokio::test]
async fn test_http_image_not_an_image() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, ACCESS_KEY);

    let result = service
        .fetch_image(&format!("http://{addr}/images/page.html"))
        .await;
    assert!(matches!(result, Err(NetworkError::NoImage)));
}

#[tokio::test]
async fn test_http_image_service_unavailable() {
    let (addr, _) = spawn_server().await;
    let service = http_service(addr, ACCESS_KEY);

    let result = service.fetch_image(&format!("http://{addr}/images/flaky")).await;
    assert!(matches!(result, Err(NetworkError::InvalidUrl)));
}

#[tokio::test]
async fn test_caching_transport_avoids_second_download() {
    let (addr, state) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();

    let images = CachingTransport::new(
        HttpTransport::images(ImageTimeouts::default()).unwrap(),
        ResponseCache::with_disk(64 * 1024, dir.path().join(TRANSPORT_CACHE_DIR), 64 * 1024),
    );
    let service = PhotoService::new(
        HttpTransport::api().unwrap(),
        images,
        Url::parse(&format!("http://{addr}")).unwrap(),
        ACCESS_KEY,
    );
    let url = format!("http://{addr}/images/photo.png");

    service.fetch_image(&url).await.unwrap();
    service.fetch_image(&url).await.unwrap();

    assert_eq!(state.image_hits.load(Ordering::SeqCst), 1);
    assert!(dir.path().join(TRANSPORT_CACHE_DIR).is_dir());
}
