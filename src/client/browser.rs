//! User-agent parsing.
//!
//! Token order matters:
//!
//! - Edge user agents also carry a `Chrome/` token, so Edge is matched first.
//! - iOS build tokens are matched before generic platform tokens. Every
//!   browser on iOS embeds the system WebKit, so an iOS Chrome (`CriOS/`) is
//!   still reported as `chrome` but with `platform: ios` and an iOS version.
//! - Android user agents contain `Linux`, so Android is checked before the
//!   desktop tokens.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EDGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Edg|Edge|EdgA|EdgiOS)/(\d+)").expect("valid regex"));

static CHROME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:CriOS|Chrome)/(\d+)").expect("valid regex"));

static FIREFOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:FxiOS|Firefox)/(\d+)").expect("valid regex"));

static SAFARI_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bVersion/(\d+)(?:\.(\d+))?").expect("valid regex"));

static IOS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:iPhone|iPad|iPod)\b.*?\bOS (\d+)(?:[_.](\d+))?").expect("valid regex")
});

static DESKTOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Windows|Macintosh|Mac OS X|X11|Linux|CrOS)\b").expect("valid regex"));

/// Browser family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserName {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Unknown,
}

/// Operating platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Desktop,
    Ios,
    Android,
    Unknown,
}

/// iOS system version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IosVersion {
    pub major: u32,
    pub minor: u32,
}

impl IosVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Everything the support table needs to know about a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserInfo {
    pub name: BrowserName,
    /// Major version, 0 when unknown
    pub version: u32,
    /// Minor version, 0 when unknown (only Safari reports one)
    pub minor_version: u32,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_version: Option<IosVersion>,
}

impl BrowserInfo {
    pub fn unknown() -> Self {
        Self {
            name: BrowserName::Unknown,
            version: 0,
            minor_version: 0,
            platform: Platform::Unknown,
            ios_version: None,
        }
    }

    pub fn new(name: BrowserName, version: u32, platform: Platform) -> Self {
        Self {
            name,
            version,
            minor_version: 0,
            platform,
            ios_version: None,
        }
    }

    pub fn with_ios_version(mut self, major: u32, minor: u32) -> Self {
        self.ios_version = Some(IosVersion::new(major, minor));
        self
    }

    pub fn with_minor_version(mut self, minor: u32) -> Self {
        self.minor_version = minor;
        self
    }
}

/// Parse a user-agent string.
///
/// Unrecognized input yields [`BrowserInfo::unknown`] fields rather than an
/// error.
pub fn parse_browser_info(user_agent: &str) -> BrowserInfo {
    let mut info = BrowserInfo::unknown();

    if let Some(caps) = IOS_RE.captures(user_agent) {
        info.platform = Platform::Ios;
        info.ios_version = Some(IosVersion::new(
            capture_u32(&caps, 1),
            capture_u32(&caps, 2),
        ));
    } else if user_agent.contains("Android") {
        info.platform = Platform::Android;
    } else if DESKTOP_RE.is_match(user_agent) {
        info.platform = Platform::Desktop;
    }

    if let Some(caps) = EDGE_RE.captures(user_agent) {
        info.name = BrowserName::Edge;
        info.version = capture_u32(&caps, 1);
    } else if let Some(caps) = CHROME_RE.captures(user_agent) {
        info.name = BrowserName::Chrome;
        info.version = capture_u32(&caps, 1);
    } else if let Some(caps) = FIREFOX_RE.captures(user_agent) {
        info.name = BrowserName::Firefox;
        info.version = capture_u32(&caps, 1);
    } else if user_agent.contains("Safari/") && !user_agent.contains("Chromium") {
        info.name = BrowserName::Safari;
        if let Some(caps) = SAFARI_VERSION_RE.captures(user_agent) {
            info.version = capture_u32(&caps, 1);
            info.minor_version = capture_u32(&caps, 2);
        }
    }

    info
}

fn capture_u32(caps: &regex::Captures<'_>, index: usize) -> u32 {
    caps.get(index)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
