use thiserror::Error;

/// Errors raised while constructing an engine from an [`EngineConfig`].
///
/// These are fatal to the construction: retrying with the same configuration
/// will fail the same way.
///
/// [`EngineConfig`]: crate::engine::EngineConfig
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Organization name is empty
    #[error("Organization name is required")]
    MissingOrganization,

    /// Default quality is outside 1-100
    #[error("Invalid default quality: {quality} (must be between 1 and 100)")]
    InvalidQuality { quality: u32 },

    /// Default format is not one of avif, webp or auto
    #[error("Unsupported default format: {format} (expected avif, webp or auto)")]
    UnsupportedFormat { format: String },

    /// Service base URL is not an absolute http(s) URL
    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },
}

/// A render request failed validation.
///
/// Carries every violation found, not just the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid image parameters: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

impl ValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

/// A format or effective-type name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseValueError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseValueError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Umbrella error for the HTTP and CLI layers.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid parameter: {0}")]
    InvalidParam(#[from] ParseValueError),

    /// Query string could not be deserialized
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}
