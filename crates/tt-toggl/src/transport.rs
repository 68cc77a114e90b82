//! HTTP plumbing behind the session client.

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use reqwest::{Method, StatusCode, Url};

use crate::TogglError;

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully prepared request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Adds a header, rejecting values that are not valid header text.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, TogglError> {
        let value = HeaderValue::from_str(value).map_err(TogglError::transport)?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// A response whose body has already been read in full.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    /// All `Set-Cookie` header values that are valid text.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
    }
}

/// Sends one request and waits for the complete response.
///
/// Non-success statuses are returned as responses; only failures to obtain a
/// response at all are errors.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TogglError>;
}

/// Blocking `reqwest` transport.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new() -> Result<Self, TogglError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TogglError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TogglError::ClientBuild)?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TogglError> {
        let response = self
            .http
            .request(request.method, request.url)
            .headers(request.headers)
            .send()?;

        let status = response.status();
        let headers = response.headers().clone();
        // Consumes the response, releasing the connection on success or error.
        let body = response.text()?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
