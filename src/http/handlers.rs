//! API handlers exposing the injection engine.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::inject::{try_select, InjectionOutcome, Injector};
use crate::model::{BackendInstance, Workload};

/// Body of `/v1/inject` and `/v1/select`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InjectRequest {
    pub workload: Workload,
    #[serde(default)]
    pub instances: Vec<BackendInstance>,
}

/// Body returned by `/v1/select`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectResponse {
    pub instance: Option<String>,
    pub reason: Option<String>,
}

pub async fn inject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<InjectRequest>,
) -> Json<InjectionOutcome> {
    let config = state.config.load_full();
    let injector = Injector::new(config.sidecar.clone());

    tracing::debug!(
        request_id = %request_id(&headers),
        workload = %request.workload.display_name(),
        candidates = request.instances.len(),
        "Inject request"
    );

    let outcome = injector.process(request.workload, &request.instances);
    Json(outcome)
}

pub async fn select(headers: HeaderMap, Json(request): Json<InjectRequest>) -> Json<SelectResponse> {
    let response = match try_select(&request.workload, &request.instances) {
        Ok(instance) => SelectResponse {
            instance: Some(instance.name.clone()),
            reason: None,
        },
        Err(e) => SelectResponse {
            instance: None,
            reason: Some(e.to_string()),
        },
    };

    tracing::debug!(
        request_id = %request_id(&headers),
        workload = %request.workload.display_name(),
        instance = ?response.instance,
        "Select request"
    );

    Json(response)
}

pub async fn healthz() -> &'static str {
    "ok"
}
