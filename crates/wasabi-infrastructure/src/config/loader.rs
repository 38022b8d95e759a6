//! Configuration loader
//!
//! Sources are merged in this order, later ones overriding earlier ones:
//!
//! 1. `AppConfig::default()`
//! 2. a TOML file, either the explicit path or `wasabi.toml` in the
//!    working directory when present
//! 3. environment variables `WASABI_<SECTION>_<FIELD>`
//!
//! `WASABI_POSTGRES_MAX_IDLE_CONNS` maps to `postgres.max_idle_conns`;
//! variables whose first segment is not a section (`WASABI_ENV`,
//! `WASABI_SHUTDOWN_TIMEOUT`) map to top-level fields. Values of string
//! fields are taken verbatim, so a numeric password keeps its digits.

use crate::config::AppConfig;
use crate::constants::{CONFIG_ENV_PREFIX, CONFIG_SECTIONS, DEFAULT_CONFIG_FILENAME};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::value::{Uncased, UncasedStr, Value};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use wasabi_domain::error::{Error, Result};
use wasabi_domain::error_ext::ErrorContext;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Read this TOML file; it must exist
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Explicit configuration file path, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let defaults = Figment::from(Serialized::defaults(AppConfig::default()));
        let mut figment = defaults.clone();

        match &self.config_path {
            Some(path) if !path.exists() => {
                return Err(Error::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        let env = Env::prefixed(&format!("{}_", self.env_prefix)).map(section_key);
        figment = figment.merge(env.clone());
        figment = merge_text_overrides(figment, &defaults, &env);

        let config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&config)?;
        Ok(config)
    }

    /// Write `config` as TOML, loadable again through [`Self::with_config_path`]
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `POSTGRES_MAX_IDLE_CONNS` -> `postgres.max_idle_conns`
fn section_key(key: &UncasedStr) -> Uncased<'_> {
    let key = key.as_str().to_ascii_lowercase();
    let nested = match key.split_once('_') {
        Some((section, field)) if CONFIG_SECTIONS.contains(&section) => {
            Some(format!("{section}.{field}"))
        }
        _ => None,
    };
    Uncased::from(nested.unwrap_or(key))
}

/// Re-apply string-typed variables verbatim
///
/// `Env` parses values, so `WASABI_REDIS_PASSWORD=007` would arrive as the
/// integer 7. Keys whose default is a string take the raw text instead.
fn merge_text_overrides(mut figment: Figment, defaults: &Figment, env: &Env) -> Figment {
    for (key, raw) in env.iter() {
        if matches!(defaults.find_value(key.as_str()), Ok(Value::String(..))) {
            figment = figment.merge(Serialized::default(key.as_str(), raw));
        }
    }
    figment
}

/// Validate application configuration
fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_postgres_config(config)?;
    validate_redis_config(config)?;
    validate_metrics_config(config)?;
    validate_tracing_config(config)?;
    Ok(())
}

fn validate_postgres_config(config: &AppConfig) -> Result<()> {
    if config.postgres.dsn.trim().is_empty() {
        return Err(Error::config(
            "PostgreSQL DSN is required (set WASABI_POSTGRES_DSN)",
        ));
    }
    Ok(())
}

fn validate_redis_config(config: &AppConfig) -> Result<()> {
    if config.redis.enable && config.redis.addr.trim().is_empty() {
        return Err(Error::config(
            "Redis address cannot be empty when redis is enabled",
        ));
    }
    Ok(())
}

fn validate_metrics_config(config: &AppConfig) -> Result<()> {
    config
        .metrics
        .addr
        .parse::<SocketAddr>()
        .map(|_| ())
        .config_context(format!("Invalid metrics address {:?}", config.metrics.addr))
}

fn validate_tracing_config(config: &AppConfig) -> Result<()> {
    let rate = config.tracing.sample_rate;
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::config(format!(
            "Tracing sample rate must be within [0, 1], got {rate}"
        )));
    }
    Ok(())
}
