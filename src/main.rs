//! Sidecar injector service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │               SIDECAR INJECTOR                │
//!                        │                                               │
//!   POST /v1/inject      │  ┌────────┐   ┌──────────┐   ┌─────────────┐  │
//!   ─────────────────────┼─▶│  http  │──▶│ handlers │──▶│   inject    │  │
//!   {workload,instances} │  │ server │   │          │   │  eligibility│  │
//!                        │  └────────┘   └──────────┘   │  selector   │  │
//!                        │                              │  sidecar    │  │
//!   mutated workload     │                              │   env/args/ │  │
//!   ◀────────────────────┼──────────────────────────────│   resources │  │
//!                        │                              └─────────────┘  │
//!                        │  ┌─────────────────────────────────────────┐  │
//!                        │  │ config (TOML, watcher → ArcSwap)        │  │
//!                        │  │ observability (tracing, prometheus)     │  │
//!                        │  │ lifecycle (signals, graceful shutdown)  │  │
//!                        │  └─────────────────────────────────────────┘  │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use sidecar_injector::config::{load_config, watcher::ConfigWatcher, InjectorConfig};
use sidecar_injector::lifecycle::{signals, Shutdown};
use sidecar_injector::observability::{logging, metrics};
use sidecar_injector::HttpServer;

#[derive(Parser)]
#[command(name = "sidecar-injector")]
#[command(about = "Attaches tracing-agent sidecars to workloads", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "SIDECAR_INJECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => InjectorConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("sidecar-injector v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        image = %config.sidecar.image_reference(),
        cpu_limit = %config.sidecar.cpu_limit,
        memory_limit = %config.sidecar.memory_limit,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    signals::forward_signals(&shutdown);

    let tls = config.listener.tls.clone();
    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let server = HttpServer::new(config);

    match tls {
        Some(tls) => {
            server
                .run_tls(addr, &tls, config_updates, shutdown.subscribe())
                .await?
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, shutdown.subscribe()).await?
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();

        let arg = Args::command()
            .get_arguments()
            .find(|a| a.get_id() == "config")
            .map(|a| a.get_env().map(|e| e.to_os_string()))
            .unwrap();
        assert_eq!(arg.as_deref(), Some(std::ffi::OsStr::new("SIDECAR_INJECTOR_CONFIG")));

        let args = Args::try_parse_from(["sidecar-injector", "--config", "/etc/injector.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/injector.toml")));
        assert!(args.bind.is_none());
    }
}
