//! Session cookie extraction and replay.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::TogglError;

/// Name of the cookie the session endpoint hands out.
pub const SESSION_COOKIE_NAME: &str = "toggl_api_session_new";

/// Pre-compiled pattern for the session `Set-Cookie` header.
static SESSION_COOKIE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"toggl_api_session_new=(?P<contents>[^;]+);\s*Path=(?P<path>[^;]+);\s*Domain=(?P<domain>[^;]+);",
    )
    .unwrap()
});

/// The session cookie obtained at login, replayed on authenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    value: String,
    path: String,
    domain: String,
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("value", &"[REDACTED]")
            .field("path", &self.path)
            .field("domain", &self.domain)
            .finish()
    }
}

impl SessionCredential {
    /// Parses a `Set-Cookie` header value.
    ///
    /// The header must carry the session cookie followed by its `Path` and
    /// `Domain` attributes; anything else is rejected as a whole.
    pub fn from_set_cookie(header: &str) -> Result<Self, TogglError> {
        let caps = SESSION_COOKIE_RE
            .captures(header)
            .ok_or(TogglError::AuthenticationProtocol)?;
        Ok(Self {
            value: caps["contents"].trim().to_string(),
            path: caps["path"].trim().to_string(),
            domain: caps["domain"].trim().to_string(),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Renders the credential as a `Cookie` request header value.
    pub fn cookie_header(&self) -> String {
        format!("{SESSION_COOKIE_NAME}={}", self.value)
    }
}
