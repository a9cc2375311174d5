//! HTTP request handlers for the pixelway decision API.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check endpoint
//! - `GET /render` - Render data (URL + srcset) for one image
//! - `GET /support` - Browser info and format support for the caller
//! - `GET /loader` - Redirect to the image URL for a width
//!
//! Client capabilities are read from request headers: `User-Agent` for format
//! support, `ECT` and `Save-Data` for connection hints, `Sec-CH-DPR` or `DPR`
//! for the device pixel ratio.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{
    parse_browser_info, BrowserInfo, ConnectionInfo, DprOptions, EffectiveType, FormatSupport,
    SupportCache,
};
use crate::engine::{EngineCache, EngineConfig, ImageEngine, RenderRequest};
use crate::error::EngineError;
use crate::transform::{self, FormatChoice};

/// Headers the `/render` response depends on.
const RENDER_VARY: &str = "User-Agent, ECT, Save-Data, DPR, Sec-CH-DPR";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Engines keyed by organization
    pub engines: Arc<EngineCache>,

    /// Memoized user agent → format support
    pub support: Arc<SupportCache>,

    /// Engine settings used when a request names no organization
    pub defaults: Arc<EngineConfig>,
}

impl AppState {
    /// Create a new application state with default cache sizes.
    pub fn new(defaults: EngineConfig) -> Self {
        Self::with_caches(defaults, EngineCache::new(), SupportCache::new())
    }

    /// Create a new application state with explicit caches.
    pub fn with_caches(defaults: EngineConfig, engines: EngineCache, support: SupportCache) -> Self {
        Self {
            engines: Arc::new(engines),
            support: Arc::new(support),
            defaults: Arc::new(defaults),
        }
    }

    /// Resolve the engine for an optional organization override.
    fn engine_for(&self, organization: Option<&str>) -> Result<Arc<ImageEngine>, EngineError> {
        let mut config = (*self.defaults).clone();
        if let Some(organization) = organization {
            config.organization_name = organization.to_string();
        }
        Ok(self.engines.get_or_create(&config)?)
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for render requests.
#[derive(Debug, Default, Deserialize)]
pub struct RenderQueryParams {
    /// Image path or absolute URL
    #[serde(default)]
    pub src: String,

    /// Logical width
    pub w: Option<f64>,

    /// Logical height
    pub h: Option<f64>,

    /// Fill mode
    #[serde(default)]
    pub fill: bool,

    /// CSS sizes expression
    pub sizes: Option<String>,

    /// Quality (1-100)
    pub q: Option<u32>,

    /// Format policy: auto, off, or a format name
    pub format: Option<String>,

    /// Network-aware quality adjustment (default: true)
    pub adjust: Option<bool>,

    /// Organization override
    pub org: Option<String>,

    /// Extra transforms as a query string
    pub t: Option<String>,
}

/// Query parameters for loader requests.
#[derive(Debug, Deserialize)]
pub struct LoaderQueryParams {
    #[serde(default)]
    pub src: String,

    /// Target width in pixels
    pub w: u32,

    /// Quality (1-100)
    pub q: Option<u32>,

    /// Organization override
    pub org: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "invalid_request", "invalid_config")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response from the support endpoint.
#[derive(Debug, Serialize)]
pub struct SupportResponse {
    pub browser: BrowserInfo,
    pub support: FormatSupport,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert EngineError to HTTP response.
///
/// Every engine error is a client error and is logged at WARN level.
impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            EngineError::Config(_) => (StatusCode::BAD_REQUEST, "invalid_config"),
            EngineError::InvalidParam(_) | EngineError::InvalidQuery(_) => {
                (StatusCode::BAD_REQUEST, "invalid_parameter")
            }
        };
        let message = self.to_string();

        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            message
        );

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

impl From<QueryRejection> for EngineError {
    fn from(rejection: QueryRejection) -> Self {
        EngineError::InvalidQuery(rejection.body_text())
    }
}

// =============================================================================
// Client Hints
// =============================================================================

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Read `ECT` and `Save-Data`. Unparseable values are ignored.
pub fn connection_from_headers(headers: &HeaderMap) -> Option<ConnectionInfo> {
    let effective_type = header_str(headers, "ect").and_then(|v| v.parse::<EffectiveType>().ok());
    let save_data = header_str(headers, "save-data")
        .map(|v| v.eq_ignore_ascii_case("on"))
        .unwrap_or(false);

    let info = ConnectionInfo::new(effective_type, save_data);
    (!info.is_empty()).then_some(info)
}

/// Read `Sec-CH-DPR`, falling back to the legacy `DPR` header.
pub fn device_ratio_from_headers(headers: &HeaderMap) -> Option<f64> {
    ["sec-ch-dpr", "dpr"]
        .iter()
        .filter_map(|name| header_str(headers, name))
        .filter_map(|value| value.parse::<f64>().ok())
        .find(|ratio| ratio.is_finite() && *ratio > 0.0)
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, header::USER_AGENT.as_str())
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle render requests.
///
/// # Endpoint
///
/// `GET /render`
///
/// # Query Parameters
///
/// - `src`: Image path or absolute URL (required)
/// - `w`, `h`: Logical box size
/// - `fill`: Fill mode (`true`/`false`)
/// - `sizes`: CSS sizes expression
/// - `q`: Quality 1-100
/// - `format`: `auto`, `off`, or a format name
/// - `adjust`: Network-aware quality (default: true)
/// - `org`: Organization override
/// - `t`: Extra transforms as a query string
///
/// # Response
///
/// - `200 OK`: RenderData JSON (`url`, `srcSet`, `size`, `transforms`, `adjustedQuality`)
/// - `400 Bad Request`: Invalid or malformed parameters, or organization
pub async fn render_handler(
    State(state): State<AppState>,
    query: Result<Query<RenderQueryParams>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, EngineError> {
    let Query(params) = query?;
    let engine = state.engine_for(params.org.as_deref())?;

    let mut request = RenderRequest::new(params.src)
        .with_size(params.w, params.h)
        .with_fill(params.fill)
        .with_network_adjustment(params.adjust.unwrap_or(true));
    request.sizes = params.sizes;
    request.quality = params.q;
    request.format = params
        .format
        .as_deref()
        .map(str::parse::<FormatChoice>)
        .transpose()?;
    request.transforms = params.t.as_deref().map(transform::parse);
    request.connection = connection_from_headers(&headers);
    request.format_support = user_agent(&headers).map(|ua| state.support.get_or_resolve(ua));
    request.dpr_options = device_ratio_from_headers(&headers).map(DprOptions::for_device);

    let data = engine.generate_image_data(&request)?;

    debug!(
        src = %request.src,
        quality = data.adjusted_quality,
        "Rendered image data"
    );

    let mut response = Json(data).into_response();
    response
        .headers_mut()
        .insert(header::VARY, HeaderValue::from_static(RENDER_VARY));
    Ok(response)
}

/// Handle format support requests.
///
/// # Endpoint
///
/// `GET /support`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "browser": { "name": "chrome", "version": 120, "minorVersion": 0, "platform": "desktop" },
///   "support": { "avif": true, "webp": true }
/// }
/// ```
pub async fn support_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SupportResponse> {
    let ua = user_agent(&headers).unwrap_or_default();

    Json(SupportResponse {
        browser: parse_browser_info(ua),
        support: state.support.get_or_resolve(ua),
    })
}

/// Handle loader requests.
///
/// # Endpoint
///
/// `GET /loader?src=...&w=...`
///
/// # Response
///
/// - `307 Temporary Redirect` to the composed image URL
/// - `400 Bad Request`: Invalid parameters or organization
pub async fn loader_handler(
    State(state): State<AppState>,
    query: Result<Query<LoaderQueryParams>, QueryRejection>,
) -> Result<Redirect, EngineError> {
    let Query(params) = query?;
    let engine = state.engine_for(params.org.as_deref())?;
    let url = engine.loader().load(&params.src, params.w, params.q)?;

    Ok(Redirect::temporary(&url))
}

// =============================================================================
// Tests
// =============================================================================
