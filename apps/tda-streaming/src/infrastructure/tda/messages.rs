//! Streaming Wire Types
//!
//! Serde types for the JSON text frames exchanged over the streaming socket.
//!
//! # Outbound
//!
//! Every request travels inside an envelope. The server accepts batches, but
//! this client always sends exactly one request per envelope:
//!
//! ```json
//! {"requests": [{"service": "QUOTE", "requestid": "1", "command": "SUBS",
//!                "account": "1001", "source": "app",
//!                "parameters": {"keys": "GOOG,MSFT", "fields": "0,1,2"}}]}
//! ```
//!
//! # Inbound
//!
//! An inbound frame carries one of several top-level arrays:
//!
//! - `response`: replies to requests, `content.code == 0` on success
//! - `data`: pushed updates, `content` is a list of per-symbol entries
//! - `snapshot`: same shape as `data`, sent for snapshot services
//! - `notify`: heartbeats (`{"heartbeat": "<ms>"}`) and admin notices

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::service::{Command, Service};

// =============================================================================
// Outbound
// =============================================================================

/// One logical request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// Target service.
    pub service: Service,
    /// Request ID, a decimal string.
    pub requestid: String,
    /// Command to execute.
    pub command: Command,
    /// Account the request is made for.
    pub account: String,
    /// Application id of the caller.
    pub source: String,
    /// Command parameters.
    pub parameters: Map<String, Value>,
}

/// Envelope wrapping outbound requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    /// Requests in this envelope.
    pub requests: Vec<Request>,
}

impl RequestEnvelope {
    /// Envelope holding a single request.
    #[must_use]
    pub fn single(request: Request) -> Self {
        Self {
            requests: vec![request],
        }
    }
}

// =============================================================================
// Inbound
// =============================================================================

/// A decoded inbound frame.
///
/// Entries are kept as raw JSON so that unexpected replies can be reported
/// verbatim and data entries can be relabeled in place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InboundFrame {
    /// Replies to requests.
    #[serde(default)]
    pub response: Vec<Value>,
    /// Pushed data updates.
    #[serde(default)]
    pub data: Vec<Value>,
    /// Snapshot updates.
    #[serde(default)]
    pub snapshot: Vec<Value>,
    /// Heartbeats and notices.
    #[serde(default)]
    pub notify: Vec<Value>,
}

impl InboundFrame {
    /// Whether this frame answers requests.
    #[must_use]
    pub fn is_response(&self) -> bool {
        !self.response.is_empty()
    }

    /// Classify the frame for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> FrameKind {
        if self.is_response() {
            FrameKind::Response
        } else if !self.data.is_empty() || !self.snapshot.is_empty() {
            FrameKind::Data
        } else if !self.notify.is_empty() {
            if self.notify.iter().all(is_heartbeat) {
                FrameKind::Heartbeat
            } else {
                FrameKind::Notify
            }
        } else {
            FrameKind::Empty
        }
    }

    /// All pushed entries in frame order: `data`, then `snapshot`, then `notify`.
    pub fn pushed_items(self) -> impl Iterator<Item = Value> {
        self.data
            .into_iter()
            .chain(self.snapshot)
            .chain(self.notify)
    }
}

/// Coarse classification of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Carries a `response` array.
    Response,
    /// Carries `data` or `snapshot` entries.
    Data,
    /// Carries only heartbeats.
    Heartbeat,
    /// Carries other notices.
    Notify,
    /// Carries nothing recognised.
    Empty,
}

impl FrameKind {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Data => "data",
            Self::Heartbeat => "heartbeat",
            Self::Notify => "notify",
            Self::Empty => "empty",
        }
    }
}

/// Whether a pushed entry is a bare heartbeat marker.
#[must_use]
pub fn is_heartbeat(item: &Value) -> bool {
    item.get("heartbeat").is_some() && item.get("service").is_none()
}

/// Typed view of a `response` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    /// Service the reply is for.
    pub service: String,
    /// ID of the request being answered.
    pub requestid: String,
    /// Command being answered.
    pub command: String,
    /// Server time in epoch milliseconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Result status.
    pub content: ResponseContent,
}

/// Result status of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseContent {
    /// Status code, zero on success.
    pub code: i64,
    /// Human-readable status.
    #[serde(default)]
    pub msg: String,
}

/// Request ID of a raw `response` entry, if present.
#[must_use]
pub fn response_request_id(entry: &Value) -> Option<String> {
    match entry.get("requestid")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Handler Payload
// =============================================================================

/// A relabeled update delivered to handlers and the broadcast feed.
///
/// `content` is one entry of the item's `content` list with field codes
/// already renamed. Items that carry no `content` list are delivered whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamMessage {
    /// Service that produced the update.
    pub service: Service,
    /// Command of the enclosing item (`SUBS`, `NOTIFY`, ...).
    pub command: Option<String>,
    /// Server time in epoch milliseconds.
    pub timestamp: Option<i64>,
    /// Relabeled entry.
    pub content: Value,
}

impl StreamMessage {
    /// Value of a relabeled field in `content`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.get(name)
    }

    /// The `key` of `content`, usually the symbol.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.content.get("key").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_serializes_wire_names() {
        let mut parameters = Map::new();
        parameters.insert("qoslevel".to_string(), json!("2"));
        let envelope = RequestEnvelope::single(Request {
            service: Service::Admin,
            requestid: "7".to_string(),
            command: Command::Qos,
            account: "1001".to_string(),
            source: "app".to_string(),
            parameters,
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({"requests": [{
                "service": "ADMIN",
                "requestid": "7",
                "command": "QOS",
                "account": "1001",
                "source": "app",
                "parameters": {"qoslevel": "2"}
            }]})
        );
    }

    #[test]
    fn frame_kind_classifies() {
        let frame: InboundFrame =
            serde_json::from_value(json!({"response": [{"requestid": "0"}]})).unwrap();
        assert_eq!(frame.kind(), FrameKind::Response);

        let frame: InboundFrame =
            serde_json::from_value(json!({"data": [{"service": "QUOTE"}]})).unwrap();
        assert_eq!(frame.kind(), FrameKind::Data);

        let frame: InboundFrame =
            serde_json::from_value(json!({"notify": [{"heartbeat": "1591499624412"}]})).unwrap();
        assert_eq!(frame.kind(), FrameKind::Heartbeat);

        let frame: InboundFrame = serde_json::from_value(
            json!({"notify": [{"service": "ADMIN", "content": {"code": 30}}]}),
        )
        .unwrap();
        assert_eq!(frame.kind(), FrameKind::Notify);

        let frame: InboundFrame = serde_json::from_value(json!({})).unwrap();
        assert_eq!(frame.kind(), FrameKind::Empty);
    }

    #[test]
    fn pushed_items_keep_frame_order() {
        let frame: InboundFrame = serde_json::from_value(json!({
            "data": [{"n": 1}, {"n": 2}],
            "snapshot": [{"n": 3}]
        }))
        .unwrap();
        let order: Vec<i64> = frame
            .pushed_items()
            .filter_map(|v| v.get("n").and_then(Value::as_i64))
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn response_request_id_accepts_numbers() {
        assert_eq!(response_request_id(&json!({"requestid": "3"})), Some("3".into()));
        assert_eq!(response_request_id(&json!({"requestid": 3})), Some("3".into()));
        assert_eq!(response_request_id(&json!({})), None);
    }

    #[test]
    fn stream_message_accessors() {
        let msg = StreamMessage {
            service: Service::Quote,
            command: Some("SUBS".into()),
            timestamp: Some(1),
            content: json!({"key": "GOOG", "BID_PRICE": 100.5}),
        };
        assert_eq!(msg.key(), Some("GOOG"));
        assert_eq!(msg.field("BID_PRICE"), Some(&json!(100.5)));
    }
}
