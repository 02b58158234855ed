//! Streaming Login Credentials
//!
//! Turns a user principals document into everything the ADMIN/LOGIN request
//! needs. All checks here run before a socket is opened.
//!
//! # Login Flow
//!
//! 1. Fetch user principals from the [`PrincipalsProvider`](crate::application::ports::PrincipalsProvider)
//! 2. Resolve the target account ([`resolve_account`])
//! 3. Derive the socket URL from `streamerInfo.streamerSocketUrl`
//! 4. Connect, then send `ADMIN/LOGIN` with [`login_parameters`]
//! 5. Receive `{"response":[{"service":"ADMIN","command":"LOGIN","content":{"code":0}}]}`
//!
//! # Credential
//!
//! The `credential` parameter is a form-urlencoded key/value string:
//!
//! ```text
//! userid=1001&token=...&company=AMER&segment=AMER&cddomain=A0000...&usergroup=ACCT
//! &accesslevel=ACCT&authorized=Y&timestamp=1590113568000&appid=app&acl=AKBP...
//! ```

use chrono::DateTime;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::application::ports::{PrincipalAccount, StreamerInfo, UserPrincipals};

// =============================================================================
// Constants
// =============================================================================

/// Protocol version sent with LOGIN.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Format of `streamerInfo.tokenTimestamp`, e.g. `2020-05-22T02:12:48+0000`.
pub const TOKEN_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

// =============================================================================
// Error Types
// =============================================================================

/// Errors raised while preparing a login.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Principals list no accounts.
    #[error("user principals contain no accounts")]
    NoAccounts,

    /// Several accounts and no account ID configured.
    #[error("multiple accounts found and no account ID was specified; available: {}", .available.join(", "))]
    AmbiguousAccount {
        /// Account IDs to choose from.
        available: Vec<String>,
    },

    /// Configured account ID matches no account.
    #[error("no account found with account ID {0}")]
    UnknownAccount(String),

    /// Principals carry no stream subscription key.
    #[error("user principals contain no stream subscription key")]
    MissingSubscriptionKey,

    /// Token timestamp is not in the expected format.
    #[error("invalid token timestamp {value:?}: {reason}")]
    InvalidTokenTimestamp {
        /// Timestamp as received.
        value: String,
        /// Parse failure.
        reason: String,
    },
}

// =============================================================================
// Account Resolution
// =============================================================================

/// Pick the account to stream for.
///
/// A single account is used as-is unless a different ID was requested.
///
/// # Errors
///
/// - [`AuthError::NoAccounts`] when the principals list none
/// - [`AuthError::AmbiguousAccount`] for several accounts and no `account_id`
/// - [`AuthError::UnknownAccount`] when `account_id` matches none
pub fn resolve_account<'a>(
    principals: &'a UserPrincipals,
    account_id: Option<&str>,
) -> Result<&'a PrincipalAccount, AuthError> {
    let accounts = &principals.accounts;

    match (accounts.as_slice(), account_id) {
        ([], _) => Err(AuthError::NoAccounts),
        (accounts, Some(id)) => accounts
            .iter()
            .find(|a| a.account_id == id)
            .ok_or_else(|| AuthError::UnknownAccount(id.to_string())),
        ([only], None) => Ok(only),
        (accounts, None) => Err(AuthError::AmbiguousAccount {
            available: accounts.iter().map(|a| a.account_id.clone()).collect(),
        }),
    }
}

/// First stream subscription key.
///
/// # Errors
///
/// Returns [`AuthError::MissingSubscriptionKey`] if there is none.
pub fn subscription_key(principals: &UserPrincipals) -> Result<&str, AuthError> {
    principals
        .streamer_subscription_keys
        .keys
        .first()
        .map(|k| k.key.as_str())
        .ok_or(AuthError::MissingSubscriptionKey)
}

// =============================================================================
// Socket URL
// =============================================================================

/// Socket URL for a `streamerSocketUrl` value.
///
/// The server reports a bare host; it is served at `wss://{host}/ws`. Values
/// that already carry a scheme are used unchanged.
#[must_use]
pub fn socket_url(streamer_socket_url: &str) -> String {
    if streamer_socket_url.contains("://") {
        streamer_socket_url.to_string()
    } else {
        format!("wss://{streamer_socket_url}/ws")
    }
}

// =============================================================================
// Credential
// =============================================================================

/// Convert the token timestamp to epoch milliseconds.
///
/// # Errors
///
/// Returns [`AuthError::InvalidTokenTimestamp`] if it does not match
/// [`TOKEN_TIMESTAMP_FORMAT`].
pub fn token_timestamp_millis(value: &str) -> Result<i64, AuthError> {
    DateTime::parse_from_str(value, TOKEN_TIMESTAMP_FORMAT)
        .map(|ts| ts.timestamp_millis())
        .map_err(|e| AuthError::InvalidTokenTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Form-urlencoded `credential` string for LOGIN.
///
/// # Errors
///
/// Returns an error if the token timestamp cannot be parsed.
pub fn build_credential(
    account: &PrincipalAccount,
    info: &StreamerInfo,
) -> Result<String, AuthError> {
    let timestamp = token_timestamp_millis(&info.token_timestamp)?.to_string();

    Ok(url::form_urlencoded::Serializer::new(String::new())
        .append_pair("userid", &account.account_id)
        .append_pair("token", &info.token)
        .append_pair("company", &account.company)
        .append_pair("segment", &account.segment)
        .append_pair("cddomain", &account.account_cd_domain_id)
        .append_pair("usergroup", &info.user_group)
        .append_pair("accesslevel", &info.access_level)
        .append_pair("authorized", "Y")
        .append_pair("timestamp", &timestamp)
        .append_pair("appid", &info.app_id)
        .append_pair("acl", &info.acl)
        .finish())
}

/// Parameters of the ADMIN/LOGIN request.
///
/// # Errors
///
/// Returns an error if the credential cannot be built.
pub fn login_parameters(
    account: &PrincipalAccount,
    info: &StreamerInfo,
) -> Result<Map<String, Value>, AuthError> {
    let credential = build_credential(account, info)?;

    let mut parameters = Map::new();
    parameters.insert("credential".to_string(), json!(credential));
    parameters.insert("token".to_string(), json!(info.token));
    parameters.insert("version".to_string(), json!(PROTOCOL_VERSION));
    Ok(parameters)
}
