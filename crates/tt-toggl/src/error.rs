//! Error types for the session client.

use std::error::Error;

use reqwest::StatusCode;
use thiserror::Error;

/// Session client errors.
///
/// Only [`TogglError::Configuration`] and [`TogglError::ClientBuild`] are
/// returned to callers; the rest are reported through
/// [`SessionEvent`](crate::SessionEvent)s and the failure flag.
#[derive(Debug, Error)]
pub enum TogglError {
    /// The client was constructed with unusable arguments.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: &'static str },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync>),
    /// The session endpoint did not hand out the expected cookie.
    #[error("Session cookie missing or malformed")]
    AuthenticationProtocol,
    /// The server answered with an unexpected status.
    #[error("Server responded with status {status}")]
    Server { status: StatusCode },
    /// The response body was not the expected JSON.
    #[error("Invalid response from server")]
    InvalidResponse,
    /// An authenticated call was attempted without a session.
    #[error("Not logged in")]
    NotLoggedIn,
}

impl TogglError {
    /// Wraps a failure to obtain a response, for custom [`Transport`](crate::Transport)s.
    pub fn transport(err: impl Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

impl From<reqwest::Error> for TogglError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}
