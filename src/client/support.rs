//! Image format support by browser and version.
//!
//! Support is decided by small ordered rule tables. Each row is a predicate
//! over [`BrowserInfo`] and a verdict; the first matching row wins and a
//! browser that matches no row supports nothing. New browser or version rules
//! are added as rows, not as branches.
//!
//! One row cuts across every browser family: all iOS browsers share the
//! system image decoder, and iOS 16.0 through 16.3 shipped a broken AVIF
//! decoder, so those versions never get AVIF regardless of the browser.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::Serialize;
use tracing::debug;

use crate::transform::ImageFormat;

use super::browser::{parse_browser_info, BrowserInfo, BrowserName, IosVersion, Platform};

/// Default number of user agents remembered by [`SupportCache`].
pub const DEFAULT_SUPPORT_CACHE_CAPACITY: usize = 256;

// =============================================================================
// Rule Tables
// =============================================================================

/// One row of a support table.
struct SupportRule {
    applies: fn(&BrowserInfo) -> bool,
    supported: bool,
}

const AVIF_RULES: &[SupportRule] = &[
    SupportRule {
        applies: is_ios_16_before_4,
        supported: false,
    },
    SupportRule {
        applies: chrome_85,
        supported: true,
    },
    SupportRule {
        applies: firefox_93,
        supported: true,
    },
    SupportRule {
        applies: edge_91,
        supported: true,
    },
    SupportRule {
        applies: safari_ios_16_4,
        supported: true,
    },
    SupportRule {
        applies: safari_desktop_16_4,
        supported: true,
    },
];

const WEBP_RULES: &[SupportRule] = &[
    SupportRule {
        applies: chrome_23,
        supported: true,
    },
    SupportRule {
        applies: firefox_65,
        supported: true,
    },
    SupportRule {
        applies: edge_14_or_legacy,
        supported: true,
    },
    SupportRule {
        applies: safari_ios_14,
        supported: true,
    },
    SupportRule {
        applies: safari_desktop_14,
        supported: true,
    },
];

fn is_ios_16_before_4(info: &BrowserInfo) -> bool {
    matches!(info.ios_version, Some(IosVersion { major: 16, minor }) if minor <= 3)
}

fn chrome_85(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Chrome && info.version >= 85
}

fn firefox_93(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Firefox && info.version >= 93
}

fn edge_91(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Edge && info.version >= 91
}

fn safari_ios_16_4(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Safari
        && info.platform == Platform::Ios
        && info.ios_version >= Some(IosVersion::new(16, 4))
}

fn safari_desktop_16_4(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Safari
        && info.platform != Platform::Ios
        && (info.version, info.minor_version) >= (16, 4)
}

fn chrome_23(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Chrome && info.version >= 23
}

fn firefox_65(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Firefox && info.version >= 65
}

// Version 0 is legacy EdgeHTML that reported no parseable version
fn edge_14_or_legacy(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Edge && (info.version >= 14 || info.version == 0)
}

fn safari_ios_14(info: &BrowserInfo) -> bool {
    let major = info.ios_version.map(|v| v.major).unwrap_or(info.version);
    info.name == BrowserName::Safari && info.platform == Platform::Ios && major >= 14
}

fn safari_desktop_14(info: &BrowserInfo) -> bool {
    info.name == BrowserName::Safari && info.platform != Platform::Ios && info.version >= 14
}

fn evaluate(rules: &[SupportRule], info: &BrowserInfo) -> bool {
    rules
        .iter()
        .find(|rule| (rule.applies)(info))
        .map(|rule| rule.supported)
        .unwrap_or(false)
}

// =============================================================================
// Lookups
// =============================================================================

/// Whether the client can decode AVIF.
pub fn check_avif_support(info: &BrowserInfo) -> bool {
    evaluate(AVIF_RULES, info)
}

/// Whether the client can decode WebP.
pub fn check_webp_support(info: &BrowserInfo) -> bool {
    evaluate(WEBP_RULES, info)
}

/// Modern format support for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FormatSupport {
    pub avif: bool,
    pub webp: bool,
}

impl FormatSupport {
    /// Support for everything; used when nothing is known about the client.
    pub fn all() -> Self {
        Self {
            avif: true,
            webp: true,
        }
    }

    pub fn from_browser(info: &BrowserInfo) -> Self {
        Self {
            avif: check_avif_support(info),
            webp: check_webp_support(info),
        }
    }

    /// Whether `format` can be decoded. Baseline formats always can.
    pub fn supports(&self, format: ImageFormat) -> bool {
        match format {
            ImageFormat::Avif => self.avif,
            ImageFormat::Webp => self.webp,
            ImageFormat::Jpeg | ImageFormat::Jpg | ImageFormat::Png => true,
        }
    }

    /// Best modern format available, or `None` for baseline only.
    pub fn best_format(&self) -> Option<ImageFormat> {
        if self.avif {
            Some(ImageFormat::Avif)
        } else if self.webp {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }
}

/// Parse a user agent and evaluate both support tables.
pub fn get_format_support_from_ua(user_agent: &str) -> FormatSupport {
    FormatSupport::from_browser(&parse_browser_info(user_agent))
}

// =============================================================================
// Support Cache
// =============================================================================

/// Memo of user agent → format support.
///
/// Purely advisory: resolution is deterministic and side-effect free, so the
/// cache can be cleared at any time without changing results.
pub struct SupportCache {
    cache: Mutex<LruCache<String, FormatSupport>>,
}

impl SupportCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUPPORT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up the support for `user_agent`, resolving it on a miss.
    pub fn get_or_resolve(&self, user_agent: &str) -> FormatSupport {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(support) = cache.get(user_agent) {
            return *support;
        }

        let support = get_format_support_from_ua(user_agent);
        debug!(?support, "resolved format support for new user agent");
        cache.put(user_agent.to_string(), support);
        support
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl Default for SupportCache {
    fn default() -> Self {
        Self::new()
    }
}
