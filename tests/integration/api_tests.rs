//! API integration tests for render data, format support and loader redirects.
//!
//! Tests verify:
//! - Render data for density, fill and sizes strategies
//! - Client hints (User-Agent, ECT, Save-Data, DPR) flowing into decisions
//! - Error cases (missing src, bad quality, bad format, missing organization)
//! - HTTP response codes and headers

use axum::http::StatusCode;
use tower::ServiceExt;

use pixelway::engine::EngineConfig;

use super::test_utils::{
    descriptors, get, json_body, router_with_defaults, test_router, CHROME_DESKTOP,
    CHROME_IOS_16_3, SAFARI_IOS_16_3, SAFARI_IOS_16_4, TEST_BASE_URL,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let response = test_router().oneshot(get("/health", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

// =============================================================================
// Render
// =============================================================================

#[tokio::test]
async fn test_render_density_set() {
    let response = test_router()
        .oneshot(get("/render?src=p.jpg&w=800&h=600&adjust=false", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("vary")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("User-Agent"));

    let json = json_body(response).await;
    assert_eq!(
        json["url"],
        format!("{}/image/acme/p.jpg?w=800&h=600&quality=80", TEST_BASE_URL)
    );
    assert_eq!(json["adjustedQuality"], 80);
    assert_eq!(json["size"]["width"], 800);
    assert_eq!(json["size"]["height"], 600);

    let src_set = json["srcSet"].as_str().unwrap();
    assert_eq!(descriptors(src_set), vec!["1x", "2x", "3x"]);
    for entry in src_set.split(", ") {
        assert!(entry.contains("w=800&h=600"));
    }
}

#[tokio::test]
async fn test_render_fill_mode() {
    let response = test_router()
        .oneshot(get("/render?src=hero.jpg&fill=true&adjust=false", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["size"]["width"], 1920);
    assert!(json["size"].get("height").is_none());
    assert_eq!(
        descriptors(json["srcSet"].as_str().unwrap()),
        vec!["480w", "960w", "1440w", "1920w", "2400w", "2880w", "3840w"]
    );
}

#[tokio::test]
async fn test_render_sizes_expression() {
    let response = test_router()
        .oneshot(get("/render?src=p.jpg&sizes=400px&adjust=false", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(
        descriptors(json["srcSet"].as_str().unwrap()),
        vec!["400w", "600w", "800w", "1000w", "1200w"]
    );
}

#[tokio::test]
async fn test_render_transform_query_merged() {
    let response = test_router()
        .oneshot(get(
            "/render?src=p.jpg&w=300&adjust=false&t=grayscale%3Dtrue%26w%3D10",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["transforms"]["width"], 300);
    assert_eq!(json["transforms"]["grayscale"], true);
    assert!(json["url"].as_str().unwrap().contains("grayscale=true"));
}

#[tokio::test]
async fn test_render_organization_override() {
    let response = test_router()
        .oneshot(get("/render?src=p.jpg&w=100&org=globex", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json["url"]
        .as_str()
        .unwrap()
        .starts_with(&format!("{}/image/globex/p.jpg", TEST_BASE_URL)));
}

// =============================================================================
// Client Hints
// =============================================================================

#[tokio::test]
async fn test_render_format_from_user_agent() {
    let cases = [
        (CHROME_DESKTOP, Some("avif")),
        (SAFARI_IOS_16_4, Some("avif")),
        (SAFARI_IOS_16_3, Some("webp")),
        (CHROME_IOS_16_3, Some("webp")),
        ("curl/8.4.0", None),
    ];

    for (ua, expected) in cases {
        let response = test_router()
            .oneshot(get("/render?src=p.jpg&w=100", &[("user-agent", ua)]))
            .await
            .unwrap();
        let json = json_body(response).await;

        match expected {
            Some(format) => assert_eq!(json["transforms"]["format"], format, "ua: {}", ua),
            None => assert!(json["transforms"].get("format").is_none(), "ua: {}", ua),
        }
    }
}

#[tokio::test]
async fn test_render_explicit_format_falls_back() {
    let response = test_router()
        .oneshot(get(
            "/render?src=p.jpg&w=100&format=avif",
            &[("user-agent", SAFARI_IOS_16_3)],
        ))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["transforms"]["format"], "webp");

    let response = test_router()
        .oneshot(get(
            "/render?src=p.jpg&w=100&format=off",
            &[("user-agent", CHROME_DESKTOP)],
        ))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert!(!json["url"].as_str().unwrap().contains("format="));
}

#[tokio::test]
async fn test_render_connection_hints() {
    let response = test_router()
        .oneshot(get("/render?src=p.jpg&w=400", &[("ect", "2g")]))
        .await
        .unwrap();
    let json = json_body(response).await;
    // 80 - 40, floor 30
    assert_eq!(json["adjustedQuality"], 40);
    assert_eq!(descriptors(json["srcSet"].as_str().unwrap()), vec!["1x"]);

    let response = test_router()
        .oneshot(get("/render?src=p.jpg&w=400", &[("save-data", "on")]))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["adjustedQuality"], 50);

    let response = test_router()
        .oneshot(get(
            "/render?src=p.jpg&w=400&adjust=false",
            &[("ect", "slow-2g")],
        ))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["adjustedQuality"], 80);
}

#[tokio::test]
async fn test_render_device_pixel_ratio_hint() {
    let response = test_router()
        .oneshot(get(
            "/render?src=p.jpg&w=400&adjust=false",
            &[("sec-ch-dpr", "2")],
        ))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(descriptors(json["srcSet"].as_str().unwrap()), vec!["1x", "2x"]);

    let response = test_router()
        .oneshot(get("/render?src=p.jpg&w=400&adjust=false", &[("dpr", "1")]))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(descriptors(json["srcSet"].as_str().unwrap()), vec!["1x"]);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_render_validation_errors_aggregated() {
    let response = test_router()
        .oneshot(get("/render?w=-5&q=500", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_request");
    assert_eq!(json["status"], 400);

    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid image parameters: "));
    assert!(message.contains("src is required"));
    assert!(message.contains("width must be a positive finite number"));
    assert!(message.contains("quality must be between 1 and 100"));
}

#[tokio::test]
async fn test_render_unknown_format() {
    let response = test_router()
        .oneshot(get("/render?src=p.jpg&format=gif", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_parameter");
}

#[tokio::test]
async fn test_render_without_organization() {
    let router = router_with_defaults(EngineConfig::new("").with_base_url(TEST_BASE_URL));
    let response = router
        .oneshot(get("/render?src=p.jpg", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_config");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Organization name is required"));
}

#[tokio::test]
async fn test_render_malformed_query_is_json_error() {
    let response = test_router()
        .oneshot(get("/render?src=p.jpg&w=abc", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_parameter");
    assert_eq!(json["status"], 400);
    assert!(json["message"].as_str().unwrap().starts_with("Invalid query: "));
}

#[tokio::test]
async fn test_loader_missing_width_is_json_error() {
    let response = test_router()
        .oneshot(get("/loader?src=p.jpg", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_parameter");
}

#[tokio::test]
async fn test_render_encodes_awkward_source_path() {
    let response = test_router()
        .oneshot(get(
            "/render?src=my%20photo%20%231%2C%20final.jpg&w=200&adjust=false",
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(
        json["url"],
        format!(
            "{}/image/acme/my%20photo%20%231%2C%20final.jpg?w=200&quality=80",
            TEST_BASE_URL
        )
    );
    let src_set = json["srcSet"].as_str().unwrap();
    assert_eq!(descriptors(src_set), vec!["1x", "2x", "3x"]);
    for entry in src_set.split(", ") {
        assert_eq!(entry.split(' ').count(), 2, "{}", entry);
    }
}

// =============================================================================
// Support
// =============================================================================

#[tokio::test]
async fn test_support_endpoint() {
    let response = test_router()
        .oneshot(get("/support", &[("user-agent", CHROME_IOS_16_3)]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["browser"]["name"], "chrome");
    assert_eq!(json["browser"]["platform"], "ios");
    assert_eq!(json["browser"]["iosVersion"]["major"], 16);
    assert_eq!(json["browser"]["iosVersion"]["minor"], 3);
    assert_eq!(json["support"]["avif"], false);
    assert_eq!(json["support"]["webp"], true);
}

#[tokio::test]
async fn test_support_without_user_agent() {
    let response = test_router().oneshot(get("/support", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["browser"]["name"], "unknown");
    assert_eq!(json["support"]["avif"], false);
    assert_eq!(json["support"]["webp"], false);
}

// =============================================================================
// Loader
// =============================================================================

#[tokio::test]
async fn test_loader_redirect() {
    let response = test_router()
        .oneshot(get("/loader?src=p.jpg&w=640&q=70", &[("ect", "2g")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap(),
        &format!("{}/image/acme/p.jpg?w=640&quality=70", TEST_BASE_URL)
    );
}

#[tokio::test]
async fn test_loader_invalid_width() {
    let response = test_router()
        .oneshot(get("/loader?src=p.jpg&w=0", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "invalid_request");
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let response = test_router()
        .oneshot(get(
            "/health",
            &[("origin", "https://shop.example.com")],
        ))
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
