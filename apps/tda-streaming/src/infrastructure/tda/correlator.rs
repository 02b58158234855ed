//! Request/Response Correlation
//!
//! Responses arrive on the same socket as pushed data, in no fixed relation
//! to the request that caused them. The correlator matches them by request ID.
//!
//! # Request Lifecycle
//!
//! ```text
//! next_request_id ──► expect ──► awaiting ──fulfill──► fulfilled ──take──► validate
//!                                   │
//!                                   └──abandon──► abandoned ──fulfill──► discarded
//! ```
//!
//! A reply whose ID is in none of these sets means client and server have
//! drifted apart and is reported as [`CorrelationError::UnexpectedResponse`].

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;

use super::messages::{Request, ResponseMessage, response_request_id};

/// Response validation failures.
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// Response does not belong to any outstanding request, or does not
    /// match the request it claims to answer.
    #[error("unexpected response: {response}")]
    UnexpectedResponse {
        /// Offending response entry.
        response: Box<Value>,
    },

    /// Response reports failure.
    #[error("unexpected response code {code}: {message}")]
    UnexpectedResponseCode {
        /// Status code returned by the server.
        code: i64,
        /// Status message returned by the server.
        message: String,
        /// Full response entry.
        response: Box<Value>,
    },
}

impl CorrelationError {
    fn unexpected(response: Value) -> Self {
        Self::UnexpectedResponse {
            response: Box::new(response),
        }
    }
}

/// Result of filing an inbound response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filed {
    /// Stored for the waiting caller.
    Fulfilled(String),
    /// Arrived after its caller gave up; dropped.
    Late(String),
}

/// Request ID allocation and response bookkeeping for one session.
#[derive(Debug, Default)]
pub struct Correlator {
    next_id: u64,
    awaiting: HashSet<String>,
    fulfilled: HashMap<String, Value>,
    abandoned: HashSet<String>,
}

impl Correlator {
    /// Create a correlator whose first request ID is `"0"`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next request ID.
    pub fn next_request_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }

    /// Start waiting for a response to `request_id`.
    pub fn expect(&mut self, request_id: &str) {
        self.awaiting.insert(request_id.to_string());
    }

    /// Number of requests awaiting a response.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.awaiting.len()
    }

    /// File an inbound `response` entry.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationError::UnexpectedResponse`] if the entry has no
    /// request ID or nobody asked for it.
    pub fn fulfill(&mut self, response: Value) -> Result<Filed, CorrelationError> {
        let Some(request_id) = response_request_id(&response) else {
            return Err(CorrelationError::unexpected(response));
        };

        if self.awaiting.remove(&request_id) {
            self.fulfilled.insert(request_id.clone(), response);
            Ok(Filed::Fulfilled(request_id))
        } else if self.abandoned.remove(&request_id) {
            tracing::warn!(
                request_id = %request_id,
                "Discarding response that arrived after its wait ended"
            );
            Ok(Filed::Late(request_id))
        } else {
            Err(CorrelationError::unexpected(response))
        }
    }

    /// Whether a response to `request_id` is filed and not yet taken.
    #[must_use]
    pub fn is_fulfilled(&self, request_id: &str) -> bool {
        self.fulfilled.contains_key(request_id)
    }

    /// Remove and return the stored response for `request_id`.
    pub fn take(&mut self, request_id: &str) -> Option<Value> {
        self.fulfilled.remove(request_id)
    }

    /// Stop waiting for `request_id`; a reply arriving later is discarded.
    pub fn abandon(&mut self, request_id: &str) {
        if self.awaiting.remove(request_id) {
            self.abandoned.insert(request_id.to_string());
        } else {
            self.fulfilled.remove(request_id);
        }
    }

    /// Check a response against the request it answers.
    ///
    /// # Errors
    ///
    /// - [`CorrelationError::UnexpectedResponse`] if `requestid`, `service` or
    ///   `command` differ from the request, or the entry is malformed
    /// - [`CorrelationError::UnexpectedResponseCode`] if `content.code` is not 0
    pub fn validate(
        request: &Request,
        response: Value,
    ) -> Result<ResponseMessage, CorrelationError> {
        let Ok(parsed) = serde_json::from_value::<ResponseMessage>(response.clone()) else {
            return Err(CorrelationError::unexpected(response));
        };

        if parsed.requestid != request.requestid
            || parsed.service != request.service.as_str()
            || parsed.command != request.command.as_str()
        {
            return Err(CorrelationError::unexpected(response));
        }

        if parsed.content.code != 0 {
            return Err(CorrelationError::UnexpectedResponseCode {
                code: parsed.content.code,
                message: parsed.content.msg,
                response: Box::new(response),
            });
        }

        Ok(parsed)
    }
}
