use axum::{extract::State, response::Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::state::AppState;

/// Service name reported by the info endpoint
pub const SERVICE_NAME: &str = "Vapi Custom TTS Gateway";
/// Integration target reported by the health endpoint
pub const VAPI_COMPATIBILITY: &str = "2025";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub supported_modes: Vec<&'static str>,
    pub timestamp: String,
    pub api_versions: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
    pub supported_modes: Vec<&'static str>,
}

fn supported_modes(state: &AppState) -> Vec<&'static str> {
    state
        .router
        .enabled_modes()
        .iter()
        .map(|mode| mode.as_str())
        .collect()
}

/// GET / - service information
pub async fn root_info(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    let mut endpoints = BTreeMap::from([
        ("/health", "Health check"),
        ("/synthesize", "Main synthesis endpoint (Vapi)"),
    ]);
    if state.config.enable_test_endpoint {
        endpoints.insert("/test", "Test synthesis endpoint");
    }

    Json(ServiceInfo {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: "Dynamic voice routing between OpenAI Realtime and ElevenLabs v3",
        endpoints,
        supported_modes: supported_modes(&state),
    })
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    let api_versions = BTreeMap::from([
        ("openai_realtime", state.config.openai_realtime_model.clone()),
        ("elevenlabs", "v1".to_string()),
        ("elevenlabs_model", state.config.elevenlabs_model_id.clone()),
        ("vapi_compatibility", VAPI_COMPATIBILITY.to_string()),
    ]);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        supported_modes: supported_modes(&state),
        timestamp,
        api_versions,
    })
}
