// Live visitor HTTP client
//
// Wraps `reqwest::Client` with per-area request construction, error
// classification, and hand-off to the response parser. One call is one
// GET; retry policy belongs to whoever schedules the calls.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::parse::{self, RawExtraction};
use crate::transport::TransportConfig;

/// HTTP client for the per-area live visitor endpoints.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct OccupancyClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl OccupancyClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `timeout` is still applied to every request.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body text.
    ///
    /// Any non-2xx status is an error, never an empty body.
    pub async fn fetch_raw(
        &self,
        area: &str,
        url: &Url,
        headers: &BTreeMap<String, String>,
    ) -> Result<String, Error> {
        debug!(area, %url, "GET");

        let resp = self
            .http
            .get(url.clone())
            .headers(header_map(area, headers)?)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(area, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                area: area.into(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.classify(area, &e))?;
        debug!(area, body = body.trim(), "raw response");
        Ok(body)
    }

    /// GET `url` and parse the body into a [`RawExtraction`].
    pub async fn fetch_extraction(
        &self,
        area: &str,
        url: &Url,
        headers: &BTreeMap<String, String>,
    ) -> Result<RawExtraction, Error> {
        let body = self.fetch_raw(area, url, headers).await?;
        parse::parse(&body, area)
    }

    fn classify(&self, area: &str, err: &reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                area: area.into(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else if let Some(status) = err.status() {
            Error::HttpStatus {
                area: area.into(),
                status: status.as_u16(),
            }
        } else {
            Error::ConnectionFailed {
                area: area.into(),
                reason: err.to_string(),
            }
        }
    }
}

fn header_map(area: &str, headers: &BTreeMap<String, String>) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || Error::InvalidHeader {
            area: area.into(),
            name: name.clone(),
        };
        let key = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let val = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(key, val);
    }
    Ok(map)
}
