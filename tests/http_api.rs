//! HTTP API tests against a live injector.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use sidecar_injector::config::InjectorConfig;
use sidecar_injector::http::{InjectRequest, SelectResponse, X_REQUEST_ID};
use sidecar_injector::inject::SIDECAR_NAME;
use sidecar_injector::InjectionOutcome;

mod common;

#[tokio::test]
async fn test_inject_endpoint() {
    let addr: SocketAddr = "127.0.0.1:28281".parse().unwrap();
    let server = common::start_server(addr, InjectorConfig::default()).await;
    let client = common::client();

    let request = InjectRequest {
        workload: common::workload(Some("true")),
        instances: common::instances(&["simple"]),
    };
    let res = client
        .post(format!("{}/v1/inject", server.base_url))
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let outcome: InjectionOutcome = res.json().await.unwrap();
    assert!(outcome.injected);
    assert_eq!(outcome.instance.as_deref(), Some("simple"));
    let sidecar = &outcome.workload.containers[1];
    assert_eq!(sidecar.name, SIDECAR_NAME);
    assert_eq!(sidecar.image, "jaegertracing/jaeger-agent:1.7");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_inject_unresolved_returns_reason() {
    let addr: SocketAddr = "127.0.0.1:28282".parse().unwrap();
    let server = common::start_server(addr, InjectorConfig::default()).await;
    let client = common::client();

    let request = InjectRequest {
        workload: common::workload(Some("true")),
        instances: common::instances(&["a", "b"]),
    };
    let outcome: InjectionOutcome = client
        .post(format!("{}/v1/inject", server.base_url))
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(!outcome.injected);
    assert_eq!(outcome.workload, request.workload);
    assert_eq!(
        outcome.reason.as_deref(),
        Some("2 backend instances available, refusing to pick one")
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_select_endpoint() {
    let addr: SocketAddr = "127.0.0.1:28283".parse().unwrap();
    let server = common::start_server(addr, InjectorConfig::default()).await;
    let client = common::client();

    let request = InjectRequest {
        workload: common::workload(Some("b")),
        instances: common::instances(&["a", "b", "c"]),
    };
    let response: SelectResponse = client
        .post(format!("{}/v1/select", server.base_url))
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        response,
        SelectResponse {
            instance: Some("b".into()),
            reason: None,
        }
    );

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let addr: SocketAddr = "127.0.0.1:28284".parse().unwrap();
    let server = common::start_server(addr, InjectorConfig::default()).await;
    let client = common::client();

    let res = client
        .post(format!("{}/v1/inject", server.base_url))
        .json(&json!({ "instances": [] }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_header() {
    let addr: SocketAddr = "127.0.0.1:28285".parse().unwrap();
    let server = common::start_server(addr, InjectorConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("{}/healthz", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let generated = res.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap().to_string();
    assert_eq!(generated.len(), 36);
    assert_eq!(res.text().await.unwrap(), "ok");

    let res = client
        .get(format!("{}/healthz", server.base_url))
        .header(X_REQUEST_ID, "caller-id-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers().get(X_REQUEST_ID).unwrap(), "caller-id-42");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_config_reload_changes_image() {
    let addr: SocketAddr = "127.0.0.1:28286".parse().unwrap();
    let server = common::start_server(addr, InjectorConfig::default()).await;
    let client = common::client();

    let mut reloaded = InjectorConfig::default();
    reloaded.listener.bind_address = addr.to_string();
    reloaded.observability.metrics_enabled = false;
    reloaded.sidecar.version = "1.8".into();
    server.config_tx.send(reloaded).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let request = InjectRequest {
        workload: common::workload(Some("simple")),
        instances: common::instances(&["simple"]),
    };
    let outcome: InjectionOutcome = client
        .post(format!("{}/v1/inject", server.base_url))
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(outcome.workload.containers[1].image, "jaegertracing/jaeger-agent:1.8");

    server.shutdown.trigger();
}
