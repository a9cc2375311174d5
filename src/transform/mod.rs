//! Transform model.
//!
//! The shared vocabulary of image-processing instructions understood by the
//! remote transformation service: sizing, cropping, effects, output format and
//! quality. These types only describe *what* to ask for; the
//! [`query`] submodule turns them into a canonical query string and the
//! [`compose`](crate::compose) module places that query on a URL.
//!
//! # Format selection
//!
//! A [`TransformSet`] only ever carries a concrete [`ImageFormat`]. The
//! "let the engine decide" and "leave the format alone" cases live in
//! [`FormatChoice`], which the orchestrator resolves exactly once before any
//! URL is composed.

pub mod query;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

pub use query::{parse, serialize};

// =============================================================================
// Formats
// =============================================================================

/// Concrete output format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Jpg,
    Png,
    Webp,
    Avif,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Avif => "avif",
        }
    }

    /// Whether this is one of the modern formats gated on browser support.
    pub fn is_modern(&self) -> bool {
        matches!(self, Self::Webp | Self::Avif)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" => Ok(Self::Jpeg),
            "jpg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            "avif" => Ok(Self::Avif),
            _ => Err(ParseValueError::new("format", s)),
        }
    }
}

/// How the caller wants the output format chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatChoice {
    /// Always request this format (subject to browser support when known)
    Explicit(ImageFormat),
    /// Pick the best format the client supports
    #[default]
    Auto,
    /// Never send a format parameter
    Disabled,
}

impl fmt::Display for FormatChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(format) => write!(f, "{}", format),
            Self::Auto => f.write_str("auto"),
            Self::Disabled => f.write_str("off"),
        }
    }
}

impl FromStr for FormatChoice {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "off" | "disabled" | "none" => Ok(Self::Disabled),
            other => other
                .parse::<ImageFormat>()
                .map(Self::Explicit)
                .map_err(|_| ParseValueError::new("format", s)),
        }
    }
}

// =============================================================================
// Parameter Types
// =============================================================================

/// How the image is fitted into the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    Cover,
    Contain,
    Fill,
    Inside,
    Outside,
}

impl FitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
            Self::Inside => "inside",
            Self::Outside => "outside",
        }
    }
}

impl FromStr for FitMode {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            "inside" => Ok(Self::Inside),
            "outside" => Ok(Self::Outside),
            _ => Err(ParseValueError::new("fit mode", s)),
        }
    }
}

/// Blur is either a toggle (service default sigma) or an explicit sigma.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Blur {
    Enabled(bool),
    Sigma(f64),
}

/// Crop region, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extract {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Background color used when padding or flattening transparency.
///
/// Alpha is in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Background {
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

// =============================================================================
// TransformSet
// =============================================================================

/// The full set of optimization parameters for one request.
///
/// Absent fields are not sent to the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitMode>,
    /// Mirror vertically
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip: Option<bool>,
    /// Mirror horizontally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flop: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<Blur>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lightness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<Extract>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
    /// Output quality (1-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    /// Advisory processing timeout, forwarded to the service untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Device pixel ratio multiplier for density descriptor sets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpr: Option<f64>,
}

impl TransformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `other` on top of `self`: every field set in `other` wins.
    pub fn merged_with(&self, other: &TransformSet) -> TransformSet {
        TransformSet {
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            fit: other.fit.or(self.fit),
            flip: other.flip.or(self.flip),
            flop: other.flop.or(self.flop),
            blur: other.blur.or(self.blur),
            grayscale: other.grayscale.or(self.grayscale),
            brightness: other.brightness.or(self.brightness),
            hue: other.hue.or(self.hue),
            lightness: other.lightness.or(self.lightness),
            saturation: other.saturation.or(self.saturation),
            negate: other.negate.or(self.negate),
            normalize: other.normalize.or(self.normalize),
            extract: other.extract.or(self.extract),
            background: other.background.or(self.background),
            quality: other.quality.or(self.quality),
            format: other.format.or(self.format),
            timeout: other.timeout.or(self.timeout),
            dpr: other.dpr.or(self.dpr),
        }
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_format(mut self, format: Option<ImageFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.dpr = Some(dpr);
        self
    }

    /// Serialize to the service's query string.
    pub fn to_query(&self) -> String {
        serialize(self)
    }

    pub fn is_empty(&self) -> bool {
        self == &TransformSet::default()
    }
}
