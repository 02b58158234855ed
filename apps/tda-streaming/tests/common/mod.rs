//! In-process streaming server for integration tests.
//!
//! Accepts WebSocket connections on a random local port, records every
//! request it receives and answers through a caller-supplied responder.
//! Frames can also be pushed at any time.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tda_streaming::{
    PrincipalAccount, StreamerInfo, StreamerSubscriptionKeys, SubscriptionKey, UserPrincipals,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Computes the frames sent back for one request.
pub type Responder = Arc<dyn Fn(&Value) -> Vec<String> + Send + Sync>;

/// Instruction for the server connection.
enum Push {
    Frame(String),
    Binary(Vec<u8>),
    Close,
}

/// Scripted streaming server.
pub struct MockStreamServer {
    /// `ws://` URL of the server.
    pub url: String,
    connections: Arc<AtomicUsize>,
    requests: mpsc::UnboundedReceiver<Value>,
    push: mpsc::UnboundedSender<Push>,
}

impl MockStreamServer {
    /// Start a server that answers every request with success.
    pub async fn start() -> Self {
        Self::with_responder(Arc::new(|req| vec![ok_response(req)])).await
    }

    /// Start a server with a custom responder.
    pub async fn with_responder(responder: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let (push, mut push_rx) = mpsc::unbounded_channel::<Push>();

        let accepted = Arc::clone(&connections);
        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            accepted.fetch_add(1, Ordering::SeqCst);
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            loop {
                tokio::select! {
                    msg = ws.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            let envelope: Value = serde_json::from_str(text.as_str()).unwrap();
                            let request = envelope["requests"][0].clone();
                            let _ = requests_tx.send(request.clone());
                            for frame in responder(&request) {
                                if ws.send(Message::Text(frame.into())).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_)) | Err(_)) | None => return,
                        Some(Ok(_)) => {}
                    },
                    Some(push) = push_rx.recv() => match push {
                        Push::Frame(frame) => {
                            if ws.send(Message::Text(frame.into())).await.is_err() {
                                return;
                            }
                        }
                        Push::Binary(data) => {
                            if ws.send(Message::Binary(data.into())).await.is_err() {
                                return;
                            }
                        }
                        Push::Close => {
                            let _ = ws.close(None).await;
                            return;
                        }
                    },
                }
            }
        });

        Self {
            url,
            connections,
            requests,
            push,
        }
    }

    /// Number of accepted connections.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Next request received, waiting up to one second.
    pub async fn next_request(&mut self) -> Value {
        tokio::time::timeout(Duration::from_secs(1), self.requests.recv())
            .await
            .expect("timed out waiting for request")
            .expect("server stopped")
    }

    /// Send a raw text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        self.push.send(Push::Frame(frame.into())).unwrap();
    }

    /// Send a frame as a binary message.
    pub fn push_binary(&self, frame: impl Into<String>) {
        self.push
            .send(Push::Binary(frame.into().into_bytes()))
            .unwrap();
    }

    /// Close the connection from the server side.
    pub fn close(&self) {
        self.push.send(Push::Close).unwrap();
    }
}

/// Success reply mirroring `request`.
pub fn ok_response(request: &Value) -> String {
    response_frame(request, &request["command"], 0)
}

/// Reply to `request` with the given command and code.
pub fn response_frame(request: &Value, command: &Value, code: i64) -> String {
    json!({
        "response": [{
            "service": request["service"],
            "requestid": request["requestid"],
            "command": command,
            "timestamp": 1_590_186_642_440_i64,
            "content": {"code": code, "msg": format!("{} result", command.as_str().unwrap_or(""))}
        }]
    })
    .to_string()
}

/// `data` frame for `service` carrying `entries`.
pub fn data_frame(service: &str, entries: Value) -> String {
    json!({
        "data": [{
            "service": service,
            "timestamp": 1_590_186_642_440_i64,
            "command": "SUBS",
            "content": entries
        }]
    })
    .to_string()
}

/// Two-symbol `QUOTE` data frame with numeric keys.
pub fn quote_frame() -> String {
    data_frame(
        "QUOTE",
        json!([
            {"key": "GOOG", "delayed": false, "1": 1400.5, "2": 1401.0, "3": 1400.75},
            {"key": "MSFT", "delayed": false, "1": 180.1, "2": 180.2, "3": 180.15}
        ]),
    )
}

/// Heartbeat notify frame.
pub fn heartbeat_frame() -> String {
    json!({"notify": [{"heartbeat": "1591499624412"}]}).to_string()
}

/// Principals pointing at `url` with one account per id.
pub fn principals(url: &str, ids: &[&str]) -> UserPrincipals {
    UserPrincipals {
        accounts: ids
            .iter()
            .map(|id| PrincipalAccount {
                account_id: (*id).to_string(),
                company: "AMER".to_string(),
                segment: "AMER".to_string(),
                account_cd_domain_id: "A000000031539144".to_string(),
            })
            .collect(),
        streamer_subscription_keys: StreamerSubscriptionKeys {
            keys: vec![SubscriptionKey {
                key: "abc123".to_string(),
            }],
        },
        streamer_info: StreamerInfo {
            streamer_socket_url: url.to_string(),
            token: "streamer-token".to_string(),
            token_timestamp: "2020-05-22T02:12:48+0000".to_string(),
            user_group: "ACCT".to_string(),
            access_level: "ACCT".to_string(),
            app_id: "test-app".to_string(),
            acl: "AKBPBRCFDTESF7G1GKHIIEM1ALMPMRPRQSRFSDSFSTTETFTOTSTT".to_string(),
        },
    }
}
