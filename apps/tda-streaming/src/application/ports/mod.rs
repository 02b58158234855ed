//! Port Interfaces
//!
//! ## Driven Ports (Outbound)
//!
//! - [`PrincipalsProvider`]: fetches the user principals document, the only
//!   REST call the streaming client needs. It supplies the account records,
//!   the stream subscription keys and the streamer connection info used to
//!   open and authenticate the socket.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// User Principals
// =============================================================================

/// Subset of the user principals document used by the streaming client.
///
/// # Wire Format (JSON)
/// ```json
/// {
///   "accounts": [{"accountId": "1001", "company": "AMER", "segment": "AMER", "accountCdDomainId": "A000000031539144"}],
///   "streamerSubscriptionKeys": {"keys": [{"key": "abc123"}]},
///   "streamerInfo": {
///     "streamerSocketUrl": "streamer-ws.tdameritrade.com",
///     "token": "token",
///     "tokenTimestamp": "2020-05-22T02:12:48+0000",
///     "userGroup": "ACCT",
///     "accessLevel": "ACCT",
///     "appId": "app",
///     "acl": "AKBPBRCFDTESF7G1GKHIIEM1ALMPMRPRQSRFSDSFSTTETFTOTSTT"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPrincipals {
    /// Accounts the user can trade.
    #[serde(default)]
    pub accounts: Vec<PrincipalAccount>,
    /// Stream subscription keys, one per account.
    pub streamer_subscription_keys: StreamerSubscriptionKeys,
    /// Streamer connection info.
    pub streamer_info: StreamerInfo,
}

/// One account record from the principals document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalAccount {
    /// Account identifier.
    pub account_id: String,
    /// Company code.
    pub company: String,
    /// Segment code.
    pub segment: String,
    /// CD domain identifier.
    pub account_cd_domain_id: String,
}

/// Container for stream subscription keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerSubscriptionKeys {
    /// Subscription keys.
    #[serde(default)]
    pub keys: Vec<SubscriptionKey>,
}

/// An opaque stream subscription key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKey {
    /// Key value.
    pub key: String,
}

/// Streamer connection info.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamerInfo {
    /// Host (or full URL) of the streamer socket.
    pub streamer_socket_url: String,
    /// Streamer token.
    pub token: String,
    /// Token issue time, `%Y-%m-%dT%H:%M:%S%z`.
    pub token_timestamp: String,
    /// User group code.
    pub user_group: String,
    /// Access level code.
    pub access_level: String,
    /// Application id, sent as the request `source`.
    pub app_id: String,
    /// Access control list blob.
    pub acl: String,
}

impl std::fmt::Debug for StreamerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamerInfo")
            .field("streamer_socket_url", &self.streamer_socket_url)
            .field("token", &"[REDACTED]")
            .field("token_timestamp", &self.token_timestamp)
            .field("user_group", &self.user_group)
            .field("access_level", &self.access_level)
            .field("app_id", &self.app_id)
            .field("acl", &self.acl)
            .finish()
    }
}

// =============================================================================
// Principals Provider
// =============================================================================

/// Errors from a principals provider.
#[derive(Debug, Error)]
pub enum PrincipalsError {
    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// API returned a non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("failed to decode user principals: {0}")]
    Decode(String),

    /// Provider is misconfigured.
    #[error("invalid principals configuration: {0}")]
    Config(String),
}

/// Source of the user principals document.
#[async_trait]
pub trait PrincipalsProvider: Send + Sync {
    /// Fetch principals including streamer connection info and
    /// stream subscription keys.
    async fn user_principals(&self) -> Result<UserPrincipals, PrincipalsError>;
}

/// A principals document already in hand serves itself.
#[async_trait]
impl PrincipalsProvider for UserPrincipals {
    async fn user_principals(&self) -> Result<UserPrincipals, PrincipalsError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "userId": "user",
        "accounts": [
            {"accountId": "1001", "company": "AMER", "segment": "AMER",
             "accountCdDomainId": "A000000031539144", "displayName": "main"}
        ],
        "streamerSubscriptionKeys": {"keys": [{"key": "abc123"}]},
        "streamerInfo": {
            "streamerBinaryUrl": "streamer-bin.tdameritrade.com",
            "streamerSocketUrl": "streamer-ws.tdameritrade.com",
            "token": "secret-token",
            "tokenTimestamp": "2020-05-22T02:12:48+0000",
            "userGroup": "ACCT",
            "accessLevel": "ACCT",
            "acl": "AKBP",
            "appId": "app"
        }
    }"#;

    #[test]
    fn decode_principals_ignores_extra_fields() {
        let principals: UserPrincipals = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(principals.accounts.len(), 1);
        assert_eq!(principals.accounts[0].account_cd_domain_id, "A000000031539144");
        assert_eq!(principals.streamer_subscription_keys.keys[0].key, "abc123");
        assert_eq!(principals.streamer_info.app_id, "app");
    }

    #[test]
    fn streamer_info_debug_redacts_token() {
        let principals: UserPrincipals = serde_json::from_str(SAMPLE).unwrap();
        let debug = format!("{:?}", principals.streamer_info);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-token"));
    }

    #[tokio::test]
    async fn principals_document_provides_itself() {
        let principals: UserPrincipals = serde_json::from_str(SAMPLE).unwrap();
        let fetched = principals.user_principals().await.unwrap();
        assert_eq!(fetched, principals);
    }
}
