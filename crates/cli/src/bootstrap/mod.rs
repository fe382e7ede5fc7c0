mod logging;

pub use logging::init_logging;

use dohproxy_domain::{CliOverrides, Config};
use std::time::{Duration, Instant};
use tracing::info;

/// A validated configuration plus where it came from.
pub struct LoadedConfig {
    pub config: Config,
    source: String,
    elapsed: Duration,
}

impl LoadedConfig {
    /// Logging is initialised from the config, so the load is reported afterwards.
    pub fn log_summary(&self) {
        info!(
            source = %self.source,
            elapsed_ms = self.elapsed.as_secs_f64() * 1000.0,
            listeners = self.config.listen.len(),
            upstreams = self.config.upstreams.len(),
            rules = self.config.rules.len(),
            "Configuration loaded"
        );
    }
}

/// Load, override and validate the configuration. Any error is fatal.
pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<LoadedConfig> {
    let started = Instant::now();
    let config = Config::load(path, overrides)?;
    config.validate()?;

    let source = path
        .map(str::to_string)
        .or_else(Config::get_config_path)
        .unwrap_or_else(|| "built-in defaults".to_string());

    Ok(LoadedConfig {
        config,
        source,
        elapsed: started.elapsed(),
    })
}
