//! Test utilities for integration tests.
//!
//! Provides router construction, request builders and body helpers shared by
//! the API tests.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;

use pixelway::engine::EngineConfig;
use pixelway::server::{create_router, AppState, RouterConfig};

pub const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const SAFARI_IOS_16_3: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Mobile/15E148 Safari/604.1";

pub const SAFARI_IOS_16_4: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.4 Mobile/15E148 Safari/604.1";

pub const CHROME_IOS_16_3: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/90.0.4430.78 Mobile/15E148 Safari/604.1";

pub const TEST_BASE_URL: &str = "https://img.example.com";

/// Engine configuration used by most tests.
pub fn acme_config() -> EngineConfig {
    EngineConfig::new("acme")
        .with_default_quality(80)
        .with_base_url(TEST_BASE_URL)
}

/// Router with the `acme` defaults and tracing disabled.
pub fn test_router() -> Router {
    router_with_defaults(acme_config())
}

pub fn router_with_defaults(defaults: EngineConfig) -> Router {
    create_router(
        AppState::new(defaults),
        RouterConfig::new().with_tracing(false),
    )
}

/// GET request with optional headers.
pub fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Descriptors (`1x`, `480w`, ...) of every srcset entry, in order.
pub fn descriptors(src_set: &str) -> Vec<String> {
    src_set
        .split(", ")
        .filter_map(|entry| entry.rsplit(' ').next())
        .map(str::to_string)
        .collect()
}
