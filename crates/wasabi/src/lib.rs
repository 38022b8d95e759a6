//! # wasabi
//!
//! Bootstrap for a backend service: configuration from the environment, a
//! JSON logger, a PostgreSQL pool, an optional Redis client, an HTTP server
//! with request probes and a separate Prometheus scrape endpoint, all driven
//! through an ordered start/stop lifecycle.
//!
//! ## Architecture
//!
//! - `domain` - errors, lifecycle and health ports, configuration values
//! - `providers` - database, cache, HTTP and metrics adapters
//! - `infrastructure` - config loading, logging, lifecycle, composition root

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use wasabi_infrastructure::banner::print_banner;
use wasabi_infrastructure::config::ConfigLoader;
use wasabi_infrastructure::di::init_app;
use wasabi_infrastructure::infrastructure::shutdown_signal;
use wasabi_infrastructure::logging::Logger;

/// Domain layer - errors, ports and configuration values
pub mod domain {
    pub use wasabi_domain::*;
}

/// Provider layer - adapters for PostgreSQL, Redis, HTTP and metrics
pub mod providers {
    pub use wasabi_providers::*;
}

/// Infrastructure layer - config, logging, lifecycle and composition root
pub mod infrastructure {
    pub use wasabi_infrastructure::*;
}

/// Command line interface
#[derive(Parser, Debug)]
#[command(name = "wasabi")]
#[command(about = "wasabi backend service")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file; `WASABI_*` variables override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Load configuration, build the application and serve until a
/// termination signal arrives
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }
    let config = loader.load().context("failed to load configuration")?;

    let logger = Logger::new(&config.log);
    logger
        .install_global()
        .context("failed to install logger")?;

    print_banner(&config, &mut std::io::stdout().lock()).context("failed to print banner")?;

    let context = init_app(config, &logger)
        .await
        .context("failed to build application")?;
    context
        .run(shutdown_signal())
        .await
        .context("application terminated with errors")
}
