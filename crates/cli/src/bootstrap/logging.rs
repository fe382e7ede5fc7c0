use dohproxy_domain::config::{LogFormat, LoggingConfig};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber described by `[logging]`.
///
/// `RUST_LOG` is ignored; the filter comes from the level and per-module filters.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(config.filter_directive()?)?;
    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, config.output.as_str()) {
        (LogFormat::Json, "stdout") => registry
            .with(fmt::layer().json().with_writer(io::stdout))
            .try_init()?,
        (LogFormat::Json, "stderr") => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()?,
        (LogFormat::Compact, "stdout") => registry
            .with(fmt::layer().compact().with_writer(io::stdout))
            .try_init()?,
        (LogFormat::Compact, "stderr") => registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .try_init()?,
        (LogFormat::Pretty, "stdout") => registry
            .with(fmt::layer().with_writer(io::stdout))
            .try_init()?,
        (LogFormat::Pretty, "stderr") => registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init()?,
        (format, path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = Mutex::new(file);
            match format {
                LogFormat::Json => registry
                    .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                    .try_init()?,
                LogFormat::Compact => registry
                    .with(fmt::layer().compact().with_ansi(false).with_writer(writer))
                    .try_init()?,
                LogFormat::Pretty => registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .try_init()?,
            }
        }
    }

    Ok(())
}
