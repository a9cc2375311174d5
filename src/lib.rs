//! # pixelway
//!
//! An image-delivery decision engine for a remote image-transformation service.
//!
//! Given an image reference and display constraints (box size, fill or
//! responsive mode, quality hints, transforms), the engine computes one
//! canonical request URL and a srcset descriptor list that lets a renderer
//! pick the best variant for the device without a round trip. It never
//! fetches, decodes or inspects image bytes.
//!
//! ## Features
//!
//! - **Density descriptors**: `1x`/`2x`/`3x` sets chosen from the device pixel ratio
//! - **Width descriptors**: ladders from CSS `sizes` expressions or fill mode
//! - **Format negotiation**: version-gated AVIF/WebP support from user agents
//! - **Network awareness**: quality and density ceilings from connection hints
//! - **Engine cache**: bounded, time-expiring engines per organization
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`transform`] - Transform vocabulary and query serialization
//! - [`compose`] - URL and srcset composition
//! - [`client`] - Browser, density and network heuristics
//! - [`responsive`] - Sizes parsing and width ladders
//! - [`engine`] - Orchestration and the engine cache
//! - [`server`] - Axum-based HTTP decision service
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use pixelway::{EngineCache, EngineConfig, RenderRequest};
//!
//! let cache = EngineCache::new();
//! let engine = cache.get_or_create(&EngineConfig::new("acme").with_default_quality(80))?;
//!
//! let request = RenderRequest::new("p.jpg")
//!     .with_size(Some(800.0), Some(600.0))
//!     .with_network_adjustment(false);
//! let data = engine.generate_image_data(&request)?;
//!
//! assert_eq!(data.url, "https://cdn.pixelway.io/image/acme/p.jpg?w=800&h=600&quality=80");
//! assert_eq!(data.src_set.split(", ").count(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod responsive;
pub mod server;
pub mod transform;

// Re-export commonly used types
pub use client::{
    adjust_quality_for_connection, check_avif_support, check_webp_support,
    get_format_support_from_ua, get_optimal_dpr_values, parse_browser_info,
    should_use_3x_images, BrowserInfo, BrowserName, ConnectionInfo, DprOptions, EffectiveType,
    FormatSupport, Platform, SupportCache,
};
pub use compose::{FormatUrls, UrlComposer};
pub use config::{Cli, Command, RenderConfig, ServeConfig, SupportConfig};
pub use engine::{
    EngineCache, EngineConfig, ImageEngine, ImageLoader, RenderData, RenderRequest, Size,
    ValidationReport,
};
pub use error::{ConfigError, EngineError, ParseValueError, ValidationError};
pub use responsive::{generate_responsive_widths, parse_image_sizes, WidthLadderOptions};
pub use server::{create_router, AppState, ErrorResponse, RouterConfig};
pub use transform::{FormatChoice, ImageFormat, TransformSet};
