//! ElevenLabs stream endpoint mocks

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_VOICE_ID: &str = "test-voice";
pub const TEST_API_KEY: &str = "xi-test-key";

pub fn stream_path(voice_id: &str) -> String {
    format!("/v1/text-to-speech/{voice_id}/stream")
}

/// Serve `body` with `content_type` for the default test voice.
pub async fn mount_stream(server: &MockServer, body: Vec<u8>, content_type: &str) {
    Mock::given(method("POST"))
        .and(path(stream_path(TEST_VOICE_ID)))
        .and(header("xi-api-key", TEST_API_KEY))
        .and(query_param("output_format", "pcm_16000"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

/// Serve an error status with a text body for the default test voice.
pub async fn mount_status(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(stream_path(TEST_VOICE_ID)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// JSON bodies of every request the server received.
pub async fn received_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| serde_json::from_slice(&request.body).ok())
        .collect()
}
