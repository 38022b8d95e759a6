//! Startup banner

use crate::config::AppConfig;
use std::io::{self, Write};
use wasabi_domain::constants::{APP_NAME, APP_VERSION};

const BANNER: &str = r"
 __      ____ _ ___  __ _| |__ (_)
 \ \ /\ / / _` / __|/ _` | '_ \| |
  \ V  V / (_| \__ \ (_| | |_) | |
   \_/\_/ \__,_|___/\__,_|_.__/|_|";

/// Banner text followed by the name, version and environment
pub fn render_banner(env: &str) -> String {
    format!("{BANNER}\n\n  {APP_NAME} v{APP_VERSION} ({env})\n")
}

/// Write the banner to `out` unless running in production
///
/// Returns whether anything was written.
pub fn print_banner<W: Write>(config: &AppConfig, out: &mut W) -> io::Result<bool> {
    if config.is_production() {
        return Ok(false);
    }
    out.write_all(render_banner(&config.env).as_bytes())?;
    out.flush()?;
    Ok(true)
}
