//! Outcome notifications fired by the session client.

use std::fmt;

/// Something a [`SessionClient`](crate::SessionClient) operation reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LogonSucceeded,
    LogonFailed,
    LogoutSucceeded,
    LogoutFailed,
    /// Carries the user-facing reason the fetch failed.
    FetchingEntriesFailed(String),
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogonSucceeded => write!(f, "logon succeeded"),
            Self::LogonFailed => write!(f, "logon failed"),
            Self::LogoutSucceeded => write!(f, "logout succeeded"),
            Self::LogoutFailed => write!(f, "logout failed"),
            Self::FetchingEntriesFailed(message) => {
                write!(f, "fetching entries failed: {message}")
            }
        }
    }
}

/// Handle returned by [`SessionClient::subscribe`](crate::SessionClient::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub(crate) type Listener = Box<dyn Fn(&SessionEvent) + Send>;
