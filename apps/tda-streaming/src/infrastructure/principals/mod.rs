//! User Principals HTTP Adapter
//!
//! REST implementation of [`PrincipalsProvider`]:
//!
//! ```text
//! GET {base}/v1/userprincipals?fields=streamerSubscriptionKeys,streamerConnectionInfo
//! Authorization: Bearer {access token}
//! ```
//!
//! Token refresh is the caller's concern; a rejected token surfaces as
//! [`PrincipalsError::Api`] with status 401.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::application::ports::{PrincipalsError, PrincipalsProvider, UserPrincipals};
use crate::infrastructure::config::AccessToken;

/// Fields requested alongside the principals document.
pub const PRINCIPALS_FIELDS: &str = "streamerSubscriptionKeys,streamerConnectionInfo";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the user principals endpoint.
#[derive(Debug, Clone)]
pub struct HttpPrincipalsClient {
    client: Client,
    base_url: String,
    access_token: AccessToken,
}

impl HttpPrincipalsClient {
    /// Create a client for `base_url` authenticating with `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be
    /// built.
    pub fn new(base_url: &str, access_token: AccessToken) -> Result<Self, PrincipalsError> {
        if access_token.expose().is_empty() {
            return Err(PrincipalsError::Config("access token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| PrincipalsError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }
}

#[async_trait]
impl PrincipalsProvider for HttpPrincipalsClient {
    async fn user_principals(&self) -> Result<UserPrincipals, PrincipalsError> {
        let url = format!("{}/v1/userprincipals", self.base_url);
        tracing::debug!(url = %url, "Fetching user principals");

        let response = self
            .client
            .get(&url)
            .query(&[("fields", PRINCIPALS_FIELDS)])
            .bearer_auth(self.access_token.expose())
            .send()
            .await
            .map_err(|e| PrincipalsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "User principals request failed");
            return Err(PrincipalsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PrincipalsError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_is_rejected() {
        let err = HttpPrincipalsClient::new("https://example.test", AccessToken::new(String::new()))
            .unwrap_err();
        assert!(matches!(err, PrincipalsError::Config(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            HttpPrincipalsClient::new("https://example.test/", AccessToken::new("tok".into()))
                .unwrap();
        assert_eq!(client.base_url, "https://example.test");
    }
}
