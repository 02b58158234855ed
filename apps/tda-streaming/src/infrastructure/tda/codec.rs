//! Stream Codec
//!
//! JSON encoding of request envelopes and decoding of inbound text frames.
//!
//! A frame that is not valid JSON is reported with its raw text. The server
//! answers some subscriptions for unrecognised symbols with malformed JSON, so
//! the error message points there first.

use super::messages::{InboundFrame, RequestEnvelope};

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Inbound frame could not be parsed.
    #[error(
        "failed to parse message. This often happens with unknown symbols or other error \
         conditions. Full message text: {raw}"
    )]
    Unparsable {
        /// Frame text as received.
        raw: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// Outbound envelope could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// JSON codec for the streaming socket.
#[derive(Debug, Default, Clone)]
pub struct StreamCodec;

impl StreamCodec {
    /// Create a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Unparsable`] carrying the raw text if the frame
    /// is not a JSON object.
    pub fn decode(&self, text: &str) -> Result<InboundFrame, CodecError> {
        serde_json::from_str(text).map_err(|source| CodecError::Unparsable {
            raw: text.to_string(),
            source,
        })
    }

    /// Encode a request envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self, envelope: &RequestEnvelope) -> Result<String, CodecError> {
        serde_json::to_string(envelope).map_err(CodecError::Encode)
    }
}
