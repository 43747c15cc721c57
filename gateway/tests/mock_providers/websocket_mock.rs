//! Scripted OpenAI Realtime mock server
//!
//! Accepts any number of connections and plays the same script on each. Every
//! client event, the handshake's `Authorization` header and how each
//! connection ended are recorded.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the server does once the client asks for a response.
#[derive(Debug, Clone)]
pub enum RealtimeScript {
    /// Stream `fragments` as audio deltas, then send `done_event`
    Speak {
        fragments: Vec<Vec<u8>>,
        done_event: &'static str,
    },
    /// Answer `session.update` with an error event
    RejectSession { message: String },
    /// Never answer `session.update`
    NeverAck,
    /// Send one fragment, then an error event
    ErrorAfterFragment { fragment: Vec<u8>, message: String },
    /// Send the fragments, then close the socket without a done event
    CloseAfter { fragments: Vec<Vec<u8>> },
    /// Send the fragments, then go quiet
    GoSilentAfter { fragments: Vec<Vec<u8>> },
    /// Send a delta whose payload is not base64
    BadDelta,
}

impl RealtimeScript {
    pub fn speak(fragments: Vec<Vec<u8>>) -> Self {
        Self::Speak {
            fragments,
            done_event: "response.output_audio.done",
        }
    }
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub events: Vec<Value>,
    pub authorization: Vec<String>,
    pub beta_header: Vec<String>,
    pub paths: Vec<String>,
    /// Close frames sent by the client
    pub close_frames: usize,
    /// Connections that ended from the client side (close frame, EOF or reset)
    pub disconnects: usize,
}

pub struct MockRealtimeServer {
    pub addr: SocketAddr,
    pub recorded: Arc<Mutex<Recorded>>,
    handle: JoinHandle<()>,
}

impl MockRealtimeServer {
    pub async fn start(script: RealtimeScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let shared = recorded.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let script = script.clone();
                let recorded = shared.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, script, recorded).await;
                });
            }
        });

        Self {
            addr,
            recorded,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/v1/realtime", self.addr)
    }

    pub fn event_types(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .events
            .iter()
            .filter_map(|e| e["type"].as_str().map(str::to_string))
            .collect()
    }

    pub fn events_of(&self, event_type: &str) -> Vec<Value> {
        self.recorded
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e["type"] == event_type)
            .cloned()
            .collect()
    }
}

impl MockRealtimeServer {
    pub fn close_frames(&self) -> usize {
        self.recorded.lock().unwrap().close_frames
    }

    /// Wait until at least `count` client connections have ended.
    pub async fn wait_for_disconnects(&self, count: usize) -> bool {
        for _ in 0..100 {
            if self.recorded.lock().unwrap().disconnects >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

impl Drop for MockRealtimeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn delta_event(fragment: &[u8]) -> Message {
    let event = json!({
        "type": "response.output_audio.delta",
        "response_id": "resp_mock",
        "item_id": "item_mock",
        "delta": BASE64_STANDARD.encode(fragment),
    });
    Message::Text(event.to_string().into())
}

fn error_event(message: &str) -> Message {
    let event = json!({
        "type": "error",
        "error": {
            "type": "invalid_request_error",
            "message": message,
        }
    });
    Message::Text(event.to_string().into())
}

async fn handle_connection(
    stream: TcpStream,
    script: RealtimeScript,
    recorded: Arc<Mutex<Recorded>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handshake_record = recorded.clone();
    let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let mut rec = handshake_record.lock().unwrap();
        if let Some(value) = request.headers().get("authorization") {
            rec.authorization
                .push(value.to_str().unwrap_or_default().to_string());
        }
        if let Some(value) = request.headers().get("openai-beta") {
            rec.beta_header
                .push(value.to_str().unwrap_or_default().to_string());
        }
        rec.paths.push(request.uri().to_string());
        Ok(response)
    };

    let ws_stream = accept_hdr_async(stream, callback).await?;
    let (mut write, mut read) = ws_stream.split();

    let created = json!({"type": "session.created", "session": {"id": "sess_mock"}});
    write.send(Message::Text(created.to_string().into())).await?;

    loop {
        let msg = match read.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(_)) | None => {
                recorded.lock().unwrap().disconnects += 1;
                return Ok(());
            }
        };
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => {
                let mut rec = recorded.lock().unwrap();
                rec.close_frames += 1;
                rec.disconnects += 1;
                break;
            }
            _ => continue,
        };
        let event: Value = serde_json::from_str(&text)?;
        let event_type = event["type"].as_str().unwrap_or_default().to_string();
        recorded.lock().unwrap().events.push(event);

        match event_type.as_str() {
            "session.update" => match &script {
                RealtimeScript::RejectSession { message } => {
                    write.send(error_event(message)).await?;
                }
                RealtimeScript::NeverAck => {}
                _ => {
                    let updated = json!({"type": "session.updated", "session": {"id": "sess_mock"}});
                    write.send(Message::Text(updated.to_string().into())).await?;
                }
            },
            "response.create" => {
                let created = json!({"type": "response.created", "response": {"id": "resp_mock"}});
                write.send(Message::Text(created.to_string().into())).await?;

                match &script {
                    RealtimeScript::Speak {
                        fragments,
                        done_event,
                    } => {
                        for fragment in fragments {
                            write.send(delta_event(fragment)).await?;
                        }
                        let done = json!({"type": done_event, "response_id": "resp_mock"});
                        write.send(Message::Text(done.to_string().into())).await?;
                    }
                    RealtimeScript::ErrorAfterFragment { fragment, message } => {
                        write.send(delta_event(fragment)).await?;
                        write.send(error_event(message)).await?;
                    }
                    RealtimeScript::CloseAfter { fragments } => {
                        for fragment in fragments {
                            write.send(delta_event(fragment)).await?;
                        }
                        write.send(Message::Close(None)).await?;
                        return Ok(());
                    }
                    RealtimeScript::GoSilentAfter { fragments } => {
                        for fragment in fragments {
                            write.send(delta_event(fragment)).await?;
                        }
                    }
                    RealtimeScript::BadDelta => {
                        let bad = json!({
                            "type": "response.output_audio.delta",
                            "delta": "***not base64***",
                        });
                        write.send(Message::Text(bad.to_string().into())).await?;
                    }
                    RealtimeScript::RejectSession { .. } | RealtimeScript::NeverAck => {}
                }
            }
            _ => {}
        }
    }

    Ok(())
}
