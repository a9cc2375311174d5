//! Engine orchestration and instance caching.
//!
//! - [`ImageEngine`] validates a [`RenderRequest`], resolves quality, size and
//!   format, and produces a [`RenderData`] record.
//! - [`EngineCache`] keeps a bounded, time-expiring set of engines keyed by
//!   organization so hosts can reuse them across requests.

mod orchestrator;
mod registry;

pub use orchestrator::{ImageEngine, ImageLoader, FILL_DEFAULT_WIDTH};
pub use registry::{EngineCache, DEFAULT_ENGINE_CACHE_CAPACITY, DEFAULT_ENGINE_CACHE_TTL};

use serde::Serialize;

use crate::client::{ConnectionInfo, DprOptions, FormatSupport, DEFAULT_BASE_QUALITY};
use crate::compose::{DEFAULT_BASE_URL, DEFAULT_RESOURCE_ROOT};
use crate::error::ConfigError;
use crate::transform::{FormatChoice, ImageFormat, TransformSet};

// =============================================================================
// Engine Configuration
// =============================================================================

/// Settings an engine is built from. Immutable once the engine exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Organization segment of every composed URL (required)
    pub organization_name: String,

    /// Quality used when a request does not give one (1-100)
    pub default_quality: u32,

    /// Format policy used when a request does not give one
    pub default_format: FormatChoice,

    /// Image service origin
    pub base_url: String,

    /// Path segment between the origin and the organization
    pub resource_root: String,
}

impl EngineConfig {
    /// Create a configuration with default quality, format and service location.
    pub fn new(organization_name: impl Into<String>) -> Self {
        Self {
            organization_name: organization_name.into(),
            default_quality: DEFAULT_BASE_QUALITY as u32,
            default_format: FormatChoice::Auto,
            base_url: DEFAULT_BASE_URL.to_string(),
            resource_root: DEFAULT_RESOURCE_ROOT.to_string(),
        }
    }

    pub fn with_default_quality(mut self, quality: u32) -> Self {
        self.default_quality = quality;
        self
    }

    pub fn with_default_format(mut self, format: FormatChoice) -> Self {
        self.default_format = format;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_resource_root(mut self, resource_root: impl Into<String>) -> Self {
        self.resource_root = resource_root.into();
        self
    }

    /// Check every field, failing on the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.organization_name.trim().is_empty() {
            return Err(ConfigError::MissingOrganization);
        }

        if !(1..=100).contains(&self.default_quality) {
            return Err(ConfigError::InvalidQuality {
                quality: self.default_quality,
            });
        }

        match self.default_format {
            FormatChoice::Auto
            | FormatChoice::Explicit(ImageFormat::Avif)
            | FormatChoice::Explicit(ImageFormat::Webp) => {}
            other => {
                return Err(ConfigError::UnsupportedFormat {
                    format: other.to_string(),
                })
            }
        }

        let valid_base = url::Url::parse(&self.base_url)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid_base {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
            });
        }

        Ok(())
    }

    /// Key used by [`EngineCache`]. Only the organization takes part.
    pub fn cache_key(&self) -> &str {
        &self.organization_name
    }
}

// =============================================================================
// Render Request
// =============================================================================

/// Caller input for one rendered image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Image path relative to the organization, or an absolute URL
    pub src: String,

    /// Logical box width in CSS pixels
    pub width: Option<f64>,

    /// Logical box height in CSS pixels
    pub height: Option<f64>,

    /// Fill an unknown container instead of a fixed box
    pub fill: bool,

    /// CSS `sizes` expression for width-descriptor sets
    pub sizes: Option<String>,

    /// Requested quality (1-100)
    pub quality: Option<u32>,

    /// Extra transforms; size, quality and format are overridden
    pub transforms: Option<TransformSet>,

    /// Lower the quality for slow or metered connections
    pub adjust_quality_by_network: bool,

    pub dpr_options: Option<DprOptions>,

    /// Format policy; falls back to the engine default
    pub format: Option<FormatChoice>,

    /// Ambient connection hints from the host
    pub connection: Option<ConnectionInfo>,

    /// What the client can decode, when known
    pub format_support: Option<FormatSupport>,
}

impl RenderRequest {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: None,
            height: None,
            fill: false,
            sizes: None,
            quality: None,
            transforms: None,
            adjust_quality_by_network: true,
            dpr_options: None,
            format: None,
            connection: None,
            format_support: None,
        }
    }

    pub fn with_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_transforms(mut self, transforms: TransformSet) -> Self {
        self.transforms = Some(transforms);
        self
    }

    pub fn with_network_adjustment(mut self, enabled: bool) -> Self {
        self.adjust_quality_by_network = enabled;
        self
    }

    pub fn with_dpr_options(mut self, options: DprOptions) -> Self {
        self.dpr_options = Some(options);
        self
    }

    pub fn with_format(mut self, format: FormatChoice) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn with_format_support(mut self, support: FormatSupport) -> Self {
        self.format_support = Some(support);
        self
    }
}

// =============================================================================
// Render Output
// =============================================================================

/// Resolved box size. Absent sides are left to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Size {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Everything a rendering surface needs for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderData {
    /// Canonical URL for the requested box
    pub url: String,

    /// Width- or density-descriptor set
    pub src_set: String,

    pub size: Size,

    /// Final transforms the URL was built from
    pub transforms: TransformSet,

    pub adjusted_quality: u8,
}

/// Outcome of [`ImageEngine::validate_params`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}
