//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use sidecar_injector::config::InjectorConfig;
use sidecar_injector::http::HttpServer;
use sidecar_injector::inject::ANNOTATION;
use sidecar_injector::lifecycle::Shutdown;
use sidecar_injector::model::{BackendInstance, Container, Workload};
use tokio::sync::mpsc;

/// A single-container workload, annotated with `routing` when given.
pub fn workload(routing: Option<&str>) -> Workload {
    let mut workload = Workload::with_containers(vec![Container::new("app", "app:1")]);
    workload.name = Some("testapp-deployment".into());
    if let Some(value) = routing {
        workload.annotations.insert(ANNOTATION.into(), value.into());
    }
    workload
}

/// Backend instances with the given names and no options.
pub fn instances(names: &[&str]) -> Vec<BackendInstance> {
    names.iter().map(|name| BackendInstance::new(*name)).collect()
}

/// A running injector bound to `addr`.
pub struct TestServer {
    pub base_url: String,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<InjectorConfig>,
}

/// Start an injector on `addr` and wait until it accepts connections.
pub async fn start_server(addr: SocketAddr, mut config: InjectorConfig) -> TestServer {
    config.listener.bind_address = addr.to_string();
    config.observability.metrics_enabled = false;

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    wait_for_server(addr).await;

    TestServer {
        base_url: format!("http://{}", addr),
        shutdown,
        config_tx,
    }
}

async fn wait_for_server(addr: SocketAddr) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server on {} did not start", addr);
}

/// A client that does not pool connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
