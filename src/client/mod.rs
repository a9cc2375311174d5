//! Client capability heuristics.
//!
//! Everything the engine knows about the device it is serving comes from
//! externally supplied hints: a user-agent string, connection hints
//! (`effective type`, `save-data`) and a device pixel ratio. This module turns
//! those hints into decisions:
//!
//! - [`browser`]: user-agent parsing into [`BrowserInfo`]
//! - [`support`]: version-gated AVIF/WebP support table and a memo cache
//! - [`density`]: which DPR multiples to offer
//! - [`network`]: quality and DPR ceilings from connection hints
//!
//! None of these functions perform I/O; all of them are deterministic for a
//! given input.

pub mod browser;
pub mod density;
pub mod network;
pub mod support;

pub use browser::{parse_browser_info, BrowserInfo, BrowserName, IosVersion, Platform};
pub use density::{get_optimal_dpr_values, should_use_3x_images, DprOptions, DEFAULT_MAX_DPR};
pub use network::{
    adjust_quality_for_connection, max_dpr_for_connection, ConnectionInfo, EffectiveType,
    DEFAULT_BASE_QUALITY,
};
pub use support::{
    check_avif_support, check_webp_support, get_format_support_from_ua, FormatSupport,
    SupportCache, DEFAULT_SUPPORT_CACHE_CAPACITY,
};
