//! Platform Client
//!
//! Main client for the platform API. Holds the endpoint configuration, the
//! auth token and the schema strategy, and dispatches every request.

use super::http::{encode, join_url, normalize_base_url, ApiHttpClient, RawResponse};
use super::schema::{ApiSchema, SchemaVersion};
use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Which configured host a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The public API host
    Public,
    /// The internal host, with the internal-service token attached
    Internal,
}

/// Internal host and its service secret
#[derive(Clone)]
struct InternalEndpoint {
    base: Url,
    token: String,
    header: String,
}

impl fmt::Debug for InternalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalEndpoint")
            .field("base", &self.base.as_str())
            .field("token", &redact(&self.token))
            .field("header", &self.header)
            .finish()
    }
}

/// Main platform client
///
/// Reads take `&self` and may run concurrently. Changing the auth token takes
/// `&mut self`, so it cannot overlap an in-flight call on the same client.
#[derive(Clone)]
pub struct DaoClient {
    http: ApiHttpClient,
    base: Url,
    internal: Option<InternalEndpoint>,
    auth_token: String,
    schema: Arc<dyn ApiSchema>,
}

impl fmt::Debug for DaoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaoClient")
            .field("base", &self.base.as_str())
            .field("internal", &self.internal)
            .field("auth_token", &redact(&self.auth_token))
            .field("schema", &self.schema.version())
            .finish()
    }
}

/// Stand-in for a secret in debug output
fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

impl DaoClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest("no host configured".to_string()))?;
        let base = normalize_base_url(host)?;

        let internal = match config.internal_host.as_deref() {
            Some(internal_host) => Some(InternalEndpoint {
                base: normalize_base_url(internal_host)?,
                token: config.internal_token.clone().unwrap_or_default(),
                header: config.effective_internal_token_header().to_string(),
            }),
            None => None,
        };

        let http = ApiHttpClient::new(config.effective_timeout())?;

        tracing::debug!(
            "Platform client for {} (schema: {}, internal: {})",
            base,
            config.schema,
            internal.is_some()
        );

        Ok(Self {
            http,
            base,
            internal,
            auth_token: config.auth_token.clone().unwrap_or_default(),
            schema: config.schema.schema(),
        })
    }

    /// Shorthand for a public-host-only client
    pub fn with_host(host: &str) -> Result<Self> {
        Self::new(&Config::new(host))
    }

    /// Base URL of the public host
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.schema.version()
    }

    pub(crate) fn schema(&self) -> &dyn ApiSchema {
        self.schema.as_ref()
    }

    /// Current auth token (empty when logged out)
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn set_auth_token(&mut self, token: &str) {
        self.auth_token = token.to_string();
    }

    pub(crate) fn clear_auth_token(&mut self) {
        self.auth_token.clear();
    }

    // =========================================================================
    // Request dispatch
    // =========================================================================

    /// Send one request and return the raw status, body and headers
    ///
    /// `path` already includes any query string. A non-2xx status is not an
    /// error here; the caller classifies it.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        headers: &[(String, String)],
        body: Option<Vec<u8>>,
        endpoint: Endpoint,
    ) -> Result<RawResponse> {
        let mut all_headers: Vec<(String, String)> = headers.to_vec();
        all_headers.push((AUTHORIZATION.to_string(), self.auth_token.clone()));

        let url = match endpoint {
            Endpoint::Public => join_url(&self.base, path),
            Endpoint::Internal => {
                let internal = self.internal.as_ref().ok_or_else(|| {
                    Error::InvalidRequest("no internal host configured".to_string())
                })?;
                all_headers.push((internal.header.clone(), internal.token.clone()));
                join_url(&internal.base, path)
            }
        };

        self.http.send(method, &url, &all_headers, body).await
    }

    /// Dispatch with an optional JSON body and fail on non-2xx
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        endpoint: Endpoint,
    ) -> Result<RawResponse> {
        let headers = if body.is_some() {
            vec![(CONTENT_TYPE.to_string(), "application/json".to_string())]
        } else {
            Vec::new()
        };

        self.dispatch(method, path, &headers, body, endpoint)
            .await?
            .error_for_status()
    }

    /// GET a path and decode the JSON response
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(Method::GET, path, None, Endpoint::Public)
            .await?
            .json()
    }

    /// Send a JSON body and decode the JSON response
    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = encode(body)?;
        self.execute(method, path, Some(body), Endpoint::Public)
            .await?
            .json()
    }

    /// Fire an action and only report success or failure
    pub(crate) async fn send_action(&self, method: Method, path: &str) -> Result<()> {
        self.execute(method, path, None, Endpoint::Public).await?;
        Ok(())
    }

    /// Send a JSON body, ignoring any response body
    pub(crate) async fn send_action_with<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let body = encode(body)?;
        self.execute(method, path, Some(body), Endpoint::Public)
            .await?;
        Ok(())
    }
}

/// First element in listing order matching `predicate`
///
/// Lookups scan the whole listing (O(n)); ties go to the earliest element.
pub fn first_match<T>(items: Vec<T>, predicate: impl FnMut(&T) -> bool) -> Option<T> {
    items.into_iter().find(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_host() {
        let err = DaoClient::new(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_new_picks_schema_and_token() {
        let mut config = Config::new("api.example.com");
        config.schema = SchemaVersion::Classic;
        config.auth_token = Some("tok".into());

        let mut client = DaoClient::new(&config).unwrap();
        assert_eq!(client.schema_version(), SchemaVersion::Classic);
        assert_eq!(client.auth_token(), "tok");
        assert_eq!(client.base_url().as_str(), "http://api.example.com/");

        client.clear_auth_token();
        assert_eq!(client.auth_token(), "");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = Config::new("api.example.com");
        config.auth_token = Some("user-secret-token".into());
        config.internal_host = Some("10.0.0.2:8000".into());
        config.internal_token = Some("internal-secret".into());

        let client = DaoClient::new(&config).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("user-secret-token"));
        assert!(!debug.contains("internal-secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("api.example.com"));
    }

    #[test]
    fn test_first_match_prefers_earliest() {
        let items = vec![(1, "a"), (2, "b"), (3, "a")];
        assert_eq!(first_match(items.clone(), |i| i.1 == "a"), Some((1, "a")));
        assert_eq!(first_match(items, |i| i.1 == "z"), None);
    }

    #[test]
    fn test_internal_dispatch_without_internal_host_fails() {
        let client = DaoClient::with_host("127.0.0.1:1").unwrap();
        let err = tokio_test::block_on(client.dispatch(
            Method::GET,
            "/internal/ping",
            &[],
            None,
            Endpoint::Internal,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
