//! Streaming WebSocket Adapter
//!
//! Implements the streaming protocol client:
//!
//! - **auth**: account resolution and LOGIN credentials
//! - **codec**: JSON frames in and out
//! - **correlator**: request IDs and response matching
//! - **dispatcher**: handler registry and broadcast feed
//! - **client**: the session-owning [`StreamClient`]

pub mod auth;
pub mod client;
pub mod codec;
pub mod correlator;
pub mod dispatcher;
pub mod messages;

pub use auth::AuthError;
pub use client::{
    DEFAULT_BROADCAST_CAPACITY, StreamClient, StreamClientConfig, StreamClientError, StreamSession,
};
pub use codec::{CodecError, StreamCodec};
pub use correlator::{CorrelationError, Correlator};
pub use dispatcher::{Dispatcher, Handler, HandlerFuture, HandlerId, HandlerRegistry};
pub use messages::{
    FrameKind, InboundFrame, Request, RequestEnvelope, ResponseContent, ResponseMessage,
    StreamMessage,
};
