//! End-to-end synthesis through the HTTP layer with real backend clients
//!
//! The realtime backend talks to a scripted WebSocket server and the
//! streamed backend to wiremock, so the whole pipeline from request body to
//! canonical PCM runs in process.

mod fixtures;
mod mock_providers;

use axum::{body::Body, http::Request, http::StatusCode};
use fixtures::{TEST_SECRET, test_config};
use mock_providers::http_mock::mount_stream;
use mock_providers::websocket_mock::{MockRealtimeServer, RealtimeScript};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use vapi_tts_gateway::core::{SynthesisRequest, SynthesisRouter};
use vapi_tts_gateway::{ServerConfig, routes, state::AppState};
use wiremock::MockServer;

fn synthesize_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/synthesize")
        .header("content-type", "application/json")
        .header("X-VAPI-SECRET", TEST_SECRET)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn config_with(realtime: Option<&MockRealtimeServer>, streamed: Option<&MockServer>) -> ServerConfig {
    let mut config = test_config();
    if let Some(server) = realtime {
        config.openai_realtime_url = server.url();
    }
    if let Some(server) = streamed {
        config.elevenlabs_base_url = server.uri();
    }
    config
}

#[tokio::test]
async fn test_streamed_pcm_is_returned_unchanged() {
    let elevenlabs = MockServer::start().await;
    let pcm = fixtures::generate_sine_wave_bytes(1600, 440.0, 0.5, 16000);
    assert_eq!(pcm.len(), 3200);
    mount_stream(&elevenlabs, pcm.clone(), "audio/pcm").await;

    let state = AppState::new(config_with(None, Some(&elevenlabs))).unwrap();
    let app = routes::create_app(state);

    let response = app
        .oneshot(synthesize_request(json!({"message": "שלום", "mode": "v3"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-voice-provider"], "elevenlabs-v3");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.as_ref(), pcm.as_slice());
}

#[tokio::test]
async fn test_realtime_fragments_are_resampled_to_16khz() {
    let fragments = vec![
        fixtures::generate_sine_wave_bytes(500, 440.0, 0.5, 24000),
        fixtures::generate_sine_wave_bytes(500, 440.0, 0.5, 24000),
    ];
    let realtime = MockRealtimeServer::start(RealtimeScript::speak(fragments)).await;

    let state = AppState::new(config_with(Some(&realtime), None)).unwrap();
    let app = routes::create_app(state);

    let response = app
        .oneshot(synthesize_request(json!({"message": "שלום", "mode": "realtime"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-voice-provider"], "openai-realtime");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    // 2000 bytes at 24 kHz is 1000 samples, about 667 samples at 16 kHz
    assert!((1330..=1336).contains(&body.len()), "got {} bytes", body.len());
    assert_eq!(body.len() % 2, 0);
}

#[tokio::test]
async fn test_realtime_session_error_maps_to_server_error() {
    let realtime = MockRealtimeServer::start(RealtimeScript::RejectSession {
        message: "model not available".to_string(),
    })
    .await;

    let state = AppState::new(config_with(Some(&realtime), None)).unwrap();
    let app = routes::create_app(state);

    let response = app
        .oneshot(synthesize_request(json!({"message": "hi", "mode": "realtime"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["kind"], "session_rejected");
}

#[tokio::test]
async fn test_wav_payload_is_normalized() {
    let elevenlabs = MockServer::start().await;
    // Stereo 8 kHz WAV: 800 frames become 1600 mono samples at 16 kHz
    let mono = fixtures::generate_sine_wave(800, 300.0, 0.5, 8000);
    let wav = fixtures::create_wav_file(&fixtures::to_stereo(&mono), 8000, 2);
    mount_stream(&elevenlabs, wav, "audio/wav").await;

    let config = config_with(None, Some(&elevenlabs));
    let router = SynthesisRouter::from_config(&config).unwrap();

    let result = router
        .synthesize(&SynthesisRequest::new("hi", "v3"))
        .await
        .unwrap();

    assert_eq!(result.audio.len(), 3200);
    assert!(result.elapsed_seconds >= 0.0);
}

#[tokio::test]
async fn test_upstream_unavailable_maps_to_its_status() {
    let elevenlabs = MockServer::start().await;
    mock_providers::http_mock::mount_status(&elevenlabs, 502, "bad gateway").await;

    let state = AppState::new(config_with(None, Some(&elevenlabs))).unwrap();
    let app = routes::create_app(state);

    let response = app
        .oneshot(synthesize_request(json!({"message": "hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_test_endpoint_rejects_path_like_voice_id() {
    let elevenlabs = MockServer::start().await;
    mount_stream(&elevenlabs, vec![0u8; 64], "audio/pcm").await;

    let state = AppState::new(config_with(None, Some(&elevenlabs))).unwrap();
    let app = routes::create_app(state);

    let request = Request::builder()
        .method("POST")
        .uri("/test")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "message": "hi",
                "mode": "v3",
                "voice_settings": {"voice_id": "x/../../v1/user?"}
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("voice_id"));
    assert!(elevenlabs.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_synthesize_rejects_path_like_voice_id() {
    let elevenlabs = MockServer::start().await;
    mount_stream(&elevenlabs, vec![0u8; 64], "audio/pcm").await;

    let state = AppState::new(config_with(None, Some(&elevenlabs))).unwrap();
    let app = routes::create_app(state);

    let response = app
        .oneshot(synthesize_request(json!({
            "message": "hi",
            "voiceOptions": {"voice_id": "../../v1/user"}
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(elevenlabs.received_requests().await.unwrap_or_default().is_empty());
}
