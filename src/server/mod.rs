//! HTTP server layer for pixelway.
//!
//! Answers render-data, format-support and loader requests from rendering
//! surfaces. The service never fetches or proxies images; it only computes URLs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │        GET /render   GET /support   GET /loader   GET /health   │
//! │                                                                 │
//! │  ┌──────────────────────────────┐  ┌─────────────────────────┐  │
//! │  │          handlers            │  │        routes           │  │
//! │  │ (client hints → RenderData)  │  │ (CORS, tracing)         │  │
//! │  └──────────────────────────────┘  └─────────────────────────┘  │
//! │                 │                                               │
//! │                 ▼                                               │
//! │     ┌─────────────┐    ┌──────────────┐                         │
//! │     │ EngineCache │    │ SupportCache │                         │
//! │     └─────────────┘    └──────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    connection_from_headers, device_ratio_from_headers, health_handler, loader_handler,
    render_handler, support_handler, AppState, ErrorResponse, HealthResponse, LoaderQueryParams,
    RenderQueryParams, SupportResponse,
};
pub use routes::{create_default_router, create_router, RouterConfig};
