//! Configuration management for pixelway.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap, one subcommand per entry point
//! - Environment variables with `PIXELWAY_` prefix
//! - Defaults for every optional setting
//!
//! Precedence is explicit flag, then environment variable, then default.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use pixelway::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Render(config) => println!("Rendering {}", config.src),
//!     Command::Support(config) => println!("Checking {}", config.user_agent),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `PIXELWAY_ORG` - Organization segment of image URLs
//! - `PIXELWAY_QUALITY` - Default quality (default: 85)
//! - `PIXELWAY_FORMAT` - Default format: auto, avif or webp (default: auto)
//! - `PIXELWAY_BASE_URL` - Image service origin (default: https://cdn.pixelway.io)
//! - `PIXELWAY_RESOURCE_ROOT` - Path segment under the origin (default: image)
//! - `PIXELWAY_HOST` - Server bind address (default: 0.0.0.0)
//! - `PIXELWAY_PORT` - Server port (default: 3000)
//! - `PIXELWAY_CACHE_ENGINES` - Max engines to cache (default: 10)
//! - `PIXELWAY_CACHE_TTL` - Engine idle expiry in seconds (default: 300)
//! - `PIXELWAY_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::client::{
    ConnectionInfo, DprOptions, EffectiveType, DEFAULT_BASE_QUALITY,
    DEFAULT_SUPPORT_CACHE_CAPACITY,
};
use crate::compose::{DEFAULT_BASE_URL, DEFAULT_RESOURCE_ROOT};
use crate::engine::{
    EngineConfig, RenderRequest, DEFAULT_ENGINE_CACHE_CAPACITY, DEFAULT_ENGINE_CACHE_TTL,
};
use crate::transform::{self, FormatChoice};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Organization used to validate engine settings when none is configured.
const PLACEHOLDER_ORGANIZATION: &str = "default";

// =============================================================================
// CLI Arguments
// =============================================================================

/// pixelway - responsive image URL decisions for a remote transformation service.
///
/// Computes canonical image URLs and srcset descriptor lists from display
/// constraints, browser capabilities and connection hints. Never fetches images.
#[derive(Parser, Debug, Clone)]
#[command(name = "pixelway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP decision service
    Serve(ServeConfig),

    /// Print render data for one image as JSON
    Render(RenderConfig),

    /// Print browser info and format support for a user agent as JSON
    Support(SupportConfig),
}

// =============================================================================
// Engine Arguments
// =============================================================================

/// Engine settings shared by `serve` and `render`.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Organization segment of image URLs.
    #[arg(long = "org", env = "PIXELWAY_ORG")]
    pub organization: Option<String>,

    /// Default output quality (1-100).
    #[arg(long, default_value_t = DEFAULT_BASE_QUALITY as u32, env = "PIXELWAY_QUALITY")]
    pub quality: u32,

    /// Default format policy: auto, avif or webp.
    #[arg(long, default_value = "auto", env = "PIXELWAY_FORMAT")]
    pub format: FormatChoice,

    /// Image service origin.
    #[arg(long, default_value = DEFAULT_BASE_URL, env = "PIXELWAY_BASE_URL")]
    pub base_url: String,

    /// Path segment between the origin and the organization.
    #[arg(long, default_value = DEFAULT_RESOURCE_ROOT, env = "PIXELWAY_RESOURCE_ROOT")]
    pub resource_root: String,
}

impl EngineArgs {
    /// Build the engine configuration. A missing organization becomes empty.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.organization.clone().unwrap_or_default())
            .with_default_quality(self.quality)
            .with_default_format(self.format)
            .with_base_url(self.base_url.as_str())
            .with_resource_root(self.resource_root.as_str())
    }

    /// Validate the engine settings.
    ///
    /// When the organization is optional, the remaining settings are still
    /// checked against a placeholder organization.
    pub fn validate(&self, require_organization: bool) -> Result<(), String> {
        let mut config = self.engine_config();
        if config.organization_name.trim().is_empty() {
            if require_organization {
                return Err(
                    "Organization is required. Set --org or PIXELWAY_ORG".to_string(),
                );
            }
            config.organization_name = PLACEHOLDER_ORGANIZATION.to_string();
        }

        config.validate().map_err(|e| e.to_string())
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Configuration for the HTTP service.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PIXELWAY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PIXELWAY_PORT")]
    pub port: u16,

    /// Maximum number of engines (one per organization) to keep cached.
    #[arg(long, default_value_t = DEFAULT_ENGINE_CACHE_CAPACITY, env = "PIXELWAY_CACHE_ENGINES")]
    pub cache_engines: usize,

    /// Seconds an idle engine stays cached.
    #[arg(long, default_value_t = DEFAULT_ENGINE_CACHE_TTL.as_secs(), env = "PIXELWAY_CACHE_TTL")]
    pub cache_ttl: u64,

    /// Maximum number of user agents with memoized format support.
    #[arg(long, default_value_t = DEFAULT_SUPPORT_CACHE_CAPACITY)]
    pub cache_user_agents: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "PIXELWAY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.engine.validate(false)?;

        if self.cache_engines == 0 {
            return Err("cache_engines must be greater than 0".to_string());
        }
        if self.cache_ttl == 0 {
            return Err("cache_ttl must be greater than 0".to_string());
        }
        if self.cache_user_agents == 0 {
            return Err("cache_user_agents must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    /// Engine configuration used when a request names no organization.
    pub fn engine_config(&self) -> EngineConfig {
        self.engine.engine_config()
    }
}

// =============================================================================
// Render Command
// =============================================================================

/// Configuration for a one-off render from the command line.
#[derive(Args, Debug, Clone)]
pub struct RenderConfig {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Image path (relative to the organization) or absolute URL.
    pub src: String,

    /// Logical box width in CSS pixels.
    #[arg(short, long)]
    pub width: Option<f64>,

    /// Logical box height in CSS pixels.
    #[arg(long)]
    pub height: Option<f64>,

    /// Fill an unknown container (default 1920px logical width).
    #[arg(long, default_value_t = false)]
    pub fill: bool,

    /// CSS sizes expression, e.g. "(max-width: 768px) 100vw, 50vw".
    #[arg(long)]
    pub sizes: Option<String>,

    /// Request quality (1-100); overrides the default quality.
    #[arg(long = "request-quality")]
    pub request_quality: Option<u32>,

    /// Request format policy: auto, off, or a format name.
    #[arg(long = "request-format")]
    pub request_format: Option<FormatChoice>,

    /// Extra transforms as a query string, e.g. "blur=5&grayscale=true".
    #[arg(short, long)]
    pub transforms: Option<String>,

    /// Effective connection type: slow-2g, 2g, 3g or 4g.
    #[arg(long)]
    pub ect: Option<EffectiveType>,

    /// Client has data saving enabled.
    #[arg(long, default_value_t = false)]
    pub save_data: bool,

    /// Do not lower quality for slow connections.
    #[arg(long, default_value_t = false)]
    pub no_adjust: bool,

    /// Device pixel ratio of the client.
    #[arg(long)]
    pub dpr: Option<f64>,

    /// User agent used to resolve AVIF/WebP support.
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RenderConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.engine.validate(true)?;

        if let Some(dpr) = self.dpr {
            if !dpr.is_finite() || dpr <= 0.0 {
                return Err("dpr must be a positive number".to_string());
            }
        }

        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        self.engine.engine_config()
    }

    /// Build the render request described by the command-line flags.
    ///
    /// Format support is left unset; the caller resolves it from the user agent.
    pub fn render_request(&self) -> RenderRequest {
        let mut request = RenderRequest::new(self.src.as_str())
            .with_size(self.width, self.height)
            .with_fill(self.fill)
            .with_network_adjustment(!self.no_adjust);

        request.sizes = self.sizes.clone();
        request.quality = self.request_quality;
        request.format = self.request_format;
        request.transforms = self.transforms.as_deref().map(transform::parse);

        let connection = ConnectionInfo::new(self.ect, self.save_data);
        if !connection.is_empty() {
            request.connection = Some(connection);
        }

        if let Some(dpr) = self.dpr {
            request.dpr_options = Some(DprOptions::for_device(dpr));
        }

        request
    }
}

// =============================================================================
// Support Command
// =============================================================================

/// Configuration for a user-agent support lookup.
#[derive(Args, Debug, Clone)]
pub struct SupportConfig {
    /// User-agent string to evaluate.
    pub user_agent: String,

    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

// =============================================================================
// Tests
// =============================================================================
