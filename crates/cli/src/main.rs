use clap::Parser;
use dohproxy_domain::CliOverrides;
use dohproxy_infrastructure::dns::DnsServerHandler;
use dohproxy_jobs::{CacheMaintenanceJob, JobRunner};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "dohproxy")]
#[command(version)]
#[command(about = "Rule-based DNS proxy with DNS-over-HTTPS upstreams")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
    };

    let loaded = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&loaded.config.logging)?;

    info!("Starting dohproxy v{}", env!("CARGO_PKG_VERSION"));
    loaded.log_summary();
    let config = loaded.config;

    let services = di::DnsServices::new(&config)?;
    let handler = DnsServerHandler::new(services.handler_use_case.clone());

    let shutdown = CancellationToken::new();
    let mut listeners = Vec::with_capacity(config.listen.len());
    for listener in &config.listen {
        let task = server::bind_listener(listener, handler.clone(), shutdown.clone()).await?;
        listeners.push(task);
    }

    let mut runner = JobRunner::new().with_shutdown(shutdown.clone());
    if let Some(maintenance) = services.cache_maintenance.clone() {
        runner = runner.with_cache_maintenance(
            CacheMaintenanceJob::new(maintenance).with_interval(config.cache.compaction_interval),
        );
    }
    let jobs = runner.start().await;

    wait_for_shutdown().await;
    info!("Shutdown signal received");
    shutdown.cancel();

    for handle in listeners.into_iter().chain(jobs) {
        if let Err(e) = handle.await {
            error!(error = %e, "Task failed during shutdown");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
