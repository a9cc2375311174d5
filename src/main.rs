//! pixelway - responsive image URL decisions.
//!
//! This binary runs the HTTP decision service or answers one-off queries
//! from the command line.

use clap::Parser;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelway::{
    client::{parse_browser_info, SupportCache},
    config::{Cli, Command, RenderConfig, ServeConfig, SupportConfig},
    engine::{EngineCache, ImageEngine},
    server::{create_router, AppState, RouterConfig, SupportResponse},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Render(config) => run_render(config),
        Command::Support(config) => run_support(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let defaults = config.engine_config();

    info!("pixelway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Image service: {}/{}", defaults.base_url, defaults.resource_root);
    if defaults.organization_name.is_empty() {
        info!("  Organization: none (requests must pass ?org=)");
    } else {
        info!("  Organization: {}", defaults.organization_name);
    }
    info!(
        "  Defaults: quality {}, format {}",
        defaults.default_quality, defaults.default_format
    );
    info!(
        "  Cache: {} engines, {}s TTL, {} user agents",
        config.cache_engines, config.cache_ttl, config.cache_user_agents
    );

    let state = AppState::with_caches(
        defaults,
        EngineCache::with_limits(config.cache_engines, config.cache_ttl()),
        SupportCache::with_capacity(config.cache_user_agents),
    );
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl 'http://{}/render?src=photo.jpg&w=800&h=600'", addr);
    info!("    curl http://{}/support", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pixelway=debug,tower_http=debug"
    } else {
        "pixelway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Render Command
// =============================================================================

fn run_render(config: RenderConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let engine = match ImageEngine::new(config.engine_config()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut request = config.render_request();
    if let Some(ref ua) = config.user_agent {
        request.format_support = Some(pixelway::get_format_support_from_ua(ua));
    }

    match engine.generate_image_data(&request) {
        Ok(data) => print_json(&data, config.pretty),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Support Command
// =============================================================================

fn run_support(config: SupportConfig) -> ExitCode {
    let browser = parse_browser_info(&config.user_agent);
    let response = SupportResponse {
        browser,
        support: pixelway::FormatSupport::from_browser(&browser),
    };

    print_json(&response, config.pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> ExitCode {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };

    match output {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}
