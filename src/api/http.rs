//! HTTP utilities for platform REST API calls

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... [truncated, {} bytes total]", &body[..cut], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Whether a status code counts as success (200..=299)
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Decode a JSON response body
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(Error::Decode)
}

/// Field deserializer treating an explicit JSON `null` like a missing key
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Encode a JSON request body
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(Error::Encode)
}

/// Percent-encode a caller supplied path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Parse a configured host into a base URL, defaulting to plain http
pub fn normalize_base_url(host: &str) -> Result<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::InvalidRequest("empty host".to_string()));
    }

    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| Error::InvalidRequest(format!("invalid host {}: {}", host, e)))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::InvalidRequest(format!("invalid host {}", host)));
    }

    Ok(url)
}

/// Join a base URL and a path that may carry a query string
pub(crate) fn join_url(base: &Url, path: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Raw outcome of one dispatched request
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Lower-case header names, first value per name
    pub headers: HashMap<String, String>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Body as lossy UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Turn a non-2xx response into [`Error::Status`]
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let body = self.text();
        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!("API error: {} - {}", self.status, sanitize_for_log(&body));
        Err(Error::Status {
            status: self.status,
            body,
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        decode(&self.body)
    }
}

/// HTTP transport for platform API calls
///
/// Keeps no idle connections, so each request opens a fresh connection.
#[derive(Clone, Debug)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("dao-client/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(0);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Send one request and read the whole response
    ///
    /// Non-2xx statuses are returned as-is; only transport failures are errors.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        tracing::debug!("{} {}", method, url);

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidRequest(format!("invalid value for header {}: {}", name, e)))?;
            header_map.insert(name, value);
        }
        header_map.insert(CONNECTION, HeaderValue::from_static("close"));

        let mut request = self.client.request(method, url).headers(header_map);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;

        let status = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                response_headers
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
        let body = response.bytes().await?.to_vec();

        tracing::debug!("{} -> {} ({} bytes)", url, status, body.len());

        Ok(RawResponse {
            status,
            body,
            headers: response_headers,
        })
    }
}
