//! Mock provider servers
//!
//! - `websocket_mock`: scripted OpenAI Realtime WebSocket server
//! - `http_mock`: ElevenLabs stream endpoint on `wiremock`

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

pub mod http_mock;
pub mod websocket_mock;
