//! Render-data orchestration.
//!
//! ```text
//! RenderRequest
//!      │
//!      ▼
//!  validate ──► quality ──► size ──► format ──► merged TransformSet
//!                                                      │
//!                     ┌────────────────────────────────┼───────────────┐
//!                     ▼                                ▼               ▼
//!              fill: width ladder           sizes: parsed ladder   DPR set
//!                     └────────────────────────────────┼───────────────┘
//!                                                      ▼
//!                                                 RenderData
//! ```

use tracing::debug;

use crate::client::{adjust_quality_for_connection, get_optimal_dpr_values, DprOptions};
use crate::compose::UrlComposer;
use crate::error::{ConfigError, ValidationError};
use crate::responsive::{
    generate_responsive_widths, parse_image_sizes, WidthLadderOptions, DEFAULT_MAX_WIDTH,
};
use crate::transform::{FormatChoice, ImageFormat, TransformSet};

use super::{EngineConfig, RenderData, RenderRequest, Size, ValidationReport};

/// Logical width used for fill-mode images.
pub const FILL_DEFAULT_WIDTH: u32 = 1920;

/// Multipliers applied to each width parsed from a sizes expression.
const SIZES_MULTIPLIERS: [f64; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];

/// Which descriptor set a request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SrcSetStrategy {
    Fill,
    Sizes,
    Density,
}

impl SrcSetStrategy {
    fn for_request(request: &RenderRequest) -> Self {
        if request.fill {
            Self::Fill
        } else if request.sizes.is_some() {
            Self::Sizes
        } else {
            Self::Density
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Sizes => "sizes",
            Self::Density => "density",
        }
    }
}

// =============================================================================
// ImageEngine
// =============================================================================

/// Turns render requests into URLs and descriptor sets for one organization.
///
/// # Example
///
/// ```
/// use pixelway::engine::{EngineConfig, ImageEngine, RenderRequest};
///
/// let engine = ImageEngine::new(EngineConfig::new("acme").with_default_quality(80))?;
/// let request = RenderRequest::new("p.jpg")
///     .with_size(Some(800.0), Some(600.0))
///     .with_network_adjustment(false);
///
/// let data = engine.generate_image_data(&request)?;
/// assert!(data.url.contains("w=800&h=600"));
/// assert!(data.src_set.ends_with(" 3x"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct ImageEngine {
    config: EngineConfig,
    composer: UrlComposer,
}

impl ImageEngine {
    /// Build an engine, rejecting invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let composer = UrlComposer::new(config.base_url.as_str(), config.resource_root.as_str())
            .with_default_organization(config.organization_name.as_str());

        Ok(Self { config, composer })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The composer used for every URL this engine builds.
    pub fn composer(&self) -> &UrlComposer {
        &self.composer
    }

    /// Collect every violation in `request`.
    pub fn validate_params(&self, request: &RenderRequest) -> ValidationReport {
        let mut errors = Vec::new();

        if request.src.trim().is_empty() {
            errors.push("src is required".to_string());
        }

        for (name, value) in [("width", request.width), ("height", request.height)] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    errors.push(format!("{} must be a positive finite number", name));
                }
            }
        }

        if let Some(quality) = request.quality {
            if !(1..=100).contains(&quality) {
                errors.push("quality must be between 1 and 100".to_string());
            }
        }

        ValidationReport::from_errors(errors)
    }

    /// Produce the main URL and descriptor set for `request`.
    pub fn generate_image_data(
        &self,
        request: &RenderRequest,
    ) -> Result<RenderData, ValidationError> {
        let report = self.validate_params(request);
        if !report.is_valid {
            return Err(ValidationError::new(report.errors));
        }

        let quality = self.effective_quality(request);
        let size = target_size(request);
        let format = self.resolve_format(request);

        let caller = request.transforms.clone().unwrap_or_default();
        let computed = TransformSet::new()
            .with_size(size.width, size.height)
            .with_quality(quality);
        let mut transforms = caller.merged_with(&computed);
        transforms.format = format;

        let url = self
            .composer
            .build_transformed_url(&request.src, &transforms, None);

        let strategy = SrcSetStrategy::for_request(request);
        let src_set = match strategy {
            SrcSetStrategy::Fill => {
                let widths =
                    generate_responsive_widths(FILL_DEFAULT_WIDTH, &WidthLadderOptions::default());
                self.composer
                    .build_srcset(&request.src, &widths, &transforms, None)
            }
            SrcSetStrategy::Sizes => {
                let widths = sizes_widths(request.sizes.as_deref().unwrap_or_default(), size);
                self.composer
                    .build_srcset(&request.src, &widths, &transforms, None)
            }
            SrcSetStrategy::Density => {
                let dprs = get_optimal_dpr_values(&dpr_options_for(request));
                self.composer.build_dpr_srcset(
                    &request.src,
                    transforms.width,
                    transforms.height,
                    &transforms,
                    &dprs,
                    None,
                )
            }
        };

        debug!(
            organization = %self.config.organization_name,
            src = %request.src,
            strategy = strategy.as_str(),
            quality = quality,
            format = ?format,
            "Generated render data"
        );

        Ok(RenderData {
            url,
            src_set,
            size,
            transforms,
            adjusted_quality: quality,
        })
    }

    /// A narrow `(src, width, quality) -> url` adapter for host loaders.
    pub fn loader(&self) -> ImageLoader<'_> {
        ImageLoader { engine: self }
    }

    fn effective_quality(&self, request: &RenderRequest) -> u8 {
        let base = request.quality.unwrap_or(self.config.default_quality).min(100) as u8;

        if request.adjust_quality_by_network {
            adjust_quality_for_connection(base, None, request.connection.as_ref())
        } else {
            base
        }
    }

    /// Resolve the format policy to a concrete format, at most once per request.
    ///
    /// Precedence: request choice, then a format in the caller's transforms,
    /// then the engine default.
    fn resolve_format(&self, request: &RenderRequest) -> Option<ImageFormat> {
        let choice = request
            .format
            .or_else(|| {
                request
                    .transforms
                    .as_ref()
                    .and_then(|t| t.format)
                    .map(FormatChoice::Explicit)
            })
            .unwrap_or(self.config.default_format);

        let support = request.format_support;
        match choice {
            FormatChoice::Disabled => None,
            FormatChoice::Auto => support.and_then(|s| s.best_format()),
            FormatChoice::Explicit(format) => match support {
                None => Some(format),
                Some(s) if s.supports(format) => Some(format),
                // AVIF falls back to WebP, WebP falls back to baseline
                Some(s) if format == ImageFormat::Avif && s.webp => Some(ImageFormat::Webp),
                Some(_) => None,
            },
        }
    }
}

fn target_size(request: &RenderRequest) -> Size {
    if request.fill {
        return Size {
            width: Some(FILL_DEFAULT_WIDTH),
            height: None,
        };
    }

    Size {
        width: request.width.map(to_pixels),
        height: request.height.map(to_pixels),
    }
}

fn to_pixels(value: f64) -> u32 {
    value.round().clamp(1.0, u32::MAX as f64) as u32
}

/// Widths for a sizes-driven set: the union of a dense ladder over every
/// parsed width, or the default ladder over the box width when nothing parses.
fn sizes_widths(sizes: &str, size: Size) -> Vec<u32> {
    let dense = WidthLadderOptions::with_multipliers(&SIZES_MULTIPLIERS);

    let mut widths: Vec<u32> = parse_image_sizes(sizes)
        .into_iter()
        .flat_map(|width| generate_responsive_widths(width, &dense))
        .collect();
    widths.sort_unstable();
    widths.dedup();

    if widths.is_empty() {
        let base = size
            .width
            .unwrap_or(FILL_DEFAULT_WIDTH)
            .min(DEFAULT_MAX_WIDTH);
        widths = generate_responsive_widths(base, &WidthLadderOptions::default());
    }

    widths
}

fn dpr_options_for(request: &RenderRequest) -> DprOptions {
    let mut options = request.dpr_options.clone().unwrap_or_default();
    if options.connection.is_none() && request.adjust_quality_by_network {
        options.connection = request.connection;
    }
    options
}

// =============================================================================
// ImageLoader
// =============================================================================

/// Loader adapter for hosts that pick widths themselves.
///
/// Network adjustment is always off: the host is expected to have accounted
/// for connection conditions before choosing a width.
#[derive(Debug, Clone, Copy)]
pub struct ImageLoader<'a> {
    engine: &'a ImageEngine,
}

impl ImageLoader<'_> {
    /// URL for `src` at `width` pixels.
    pub fn load(
        &self,
        src: &str,
        width: u32,
        quality: Option<u32>,
    ) -> Result<String, ValidationError> {
        let mut request = RenderRequest::new(src)
            .with_size(Some(width as f64), None)
            .with_network_adjustment(false);
        request.quality = quality;

        self.engine
            .generate_image_data(&request)
            .map(|data| data.url)
    }
}
