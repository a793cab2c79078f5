//! Platform Authentication
//!
//! Exchanges account credentials for an access token through the internal
//! host, and manages the token stored on the client.

use super::client::{DaoClient, Endpoint};
use super::http::encode;
use crate::error::Result;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Path of the token exchange on the internal host
pub const ACCESS_TOKEN_PATH: &str = "/internal/access-token";

/// Body of the token exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

impl DaoClient {
    /// Log in through the internal host and store the returned token
    ///
    /// Requires an internal host; the internal-service secret is attached by
    /// the dispatcher.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let body = encode(&AccessTokenRequest {
            username: user.to_string(),
            password: password.to_string(),
        })?;

        let response: AccessTokenResponse = self
            .execute(Method::POST, ACCESS_TOKEN_PATH, Some(body), Endpoint::Internal)
            .await?
            .json()?;

        self.set_auth_token(&response.access_token);
        tracing::info!("Logged in as {}", user);
        Ok(())
    }

    /// Forget the stored token
    pub fn logout(&mut self) {
        self.clear_auth_token();
        tracing::debug!("Auth token cleared");
    }
}
