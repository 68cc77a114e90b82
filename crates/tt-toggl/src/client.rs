//! Session client for the Toggl v8 REST API.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeZone};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode, Url};
use tt_core::{Logger, TimeEntry, filter_short_entries, format_wire_timestamp};

use crate::TogglError;
use crate::credential::SessionCredential;
use crate::events::{Listener, ListenerId, SessionEvent};
use crate::transport::{HttpRequest, HttpTransport, Transport};

/// Base URL of the v8 API.
pub const DEFAULT_BASE_URL: &str = "https://www.toggl.com/api/v8";

/// Password paired with an API token in Basic authentication.
const API_TOKEN_PASSWORD: &str = "api_token";

/// Where the client sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub session_url: Url,
    pub entries_url: Url,
}

impl Endpoints {
    /// Derives the session and entries endpoints from an API base URL.
    pub fn from_base(base_url: &str) -> Result<Self, TogglError> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(|_| {
            TogglError::Configuration {
                reason: "base URL is not a valid absolute URL",
            }
        })?;
        if base.cannot_be_a_base() {
            return Err(TogglError::Configuration {
                reason: "base URL cannot have paths",
            });
        }
        let join = |path: &str| {
            base.join(path).map_err(|_| TogglError::Configuration {
                reason: "base URL cannot be extended",
            })
        };
        Ok(Self {
            session_url: join("sessions")?,
            entries_url: join("time_entries")?,
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_base(DEFAULT_BASE_URL).expect("default base URL is valid")
    }
}

/// Session-authenticated client.
///
/// Every operation performs one blocking round trip. Failures are not returned;
/// they are reported through [`SessionEvent`]s and
/// [`encountered_error`](Self::encountered_error), leaving the client usable.
///
/// # Thread Safety
///
/// Operations take `&mut self`, so one instance serves one request at a time.
/// Callers wanting background fetches move the client onto a worker thread.
pub struct SessionClient<T = HttpTransport> {
    transport: T,
    endpoints: Endpoints,
    api_token: String,
    credential: Option<SessionCredential>,
    encountered_error: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    logger: Arc<Logger>,
}

impl<T> fmt::Debug for SessionClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("endpoints", &self.endpoints)
            .field("api_token", &"[REDACTED]")
            .field("logged_in", &self.credential.is_some())
            .field("encountered_error", &self.encountered_error)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl SessionClient<HttpTransport> {
    /// Creates a client for the public API using a blocking HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only, or if the
    /// HTTP client fails to build. No request is made.
    pub fn new(api_token: impl Into<String>, logger: Arc<Logger>) -> Result<Self, TogglError> {
        let api_token = validate_token(api_token.into())?;
        Self::with_transport(api_token, Endpoints::default(), HttpTransport::new()?, logger)
    }
}

impl<T: Transport> SessionClient<T> {
    /// Creates a client sending requests through `transport`.
    pub fn with_transport(
        api_token: impl Into<String>,
        endpoints: Endpoints,
        transport: T,
        logger: Arc<Logger>,
    ) -> Result<Self, TogglError> {
        Ok(Self {
            transport,
            endpoints,
            api_token: validate_token(api_token.into())?,
            credential: None,
            encountered_error: false,
            listeners: Vec::new(),
            next_listener: 0,
            logger,
        })
    }

    /// Registers a listener; listeners run in registration order.
    pub fn subscribe(&mut self, listener: impl Fn(&SessionEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a session cookie is held. Its server-side validity is not checked.
    pub const fn is_logged_in(&self) -> bool {
        self.credential.is_some()
    }

    /// Whether the most recent login, logout or fetch failed.
    pub const fn encountered_error(&self) -> bool {
        self.encountered_error
    }

    /// The session cookie currently held, if any.
    pub const fn credential(&self) -> Option<&SessionCredential> {
        self.credential.as_ref()
    }

    /// The session and entries URLs this client talks to.
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Opens a session, replacing any credential already held.
    pub fn login(&mut self) {
        self.logger.debug("Logging on");
        match self.open_session() {
            Ok(credential) => {
                self.logger
                    .debug_fmt(format_args!("Session opened for {}", credential.domain()));
                self.credential = Some(credential);
                self.encountered_error = false;
                self.logger.info("Logon succeeded");
                self.emit(&SessionEvent::LogonSucceeded);
            }
            Err(err) => {
                self.credential = None;
                self.encountered_error = true;
                self.logger.error_with_error("Logon failed", &err);
                self.emit(&SessionEvent::LogonFailed);
            }
        }
    }

    /// Closes the session. Does nothing when not logged in.
    ///
    /// The credential is only dropped once the server confirms the logout.
    pub fn logout(&mut self) {
        let Some(credential) = &self.credential else {
            return;
        };
        self.logger.debug("Logging out");
        match self.close_session(credential) {
            Ok(()) => {
                self.credential = None;
                self.encountered_error = false;
                self.logger.info("Logout succeeded");
                self.emit(&SessionEvent::LogoutSucceeded);
            }
            Err(err) => {
                self.encountered_error = true;
                self.logger.error_with_error("Logout failed", &err);
                self.emit(&SessionEvent::LogoutFailed);
            }
        }
    }

    /// Fetches the entries started between `from` and `to`.
    ///
    /// Entries of 30 seconds or less are discarded; server order is kept.
    /// Returns `None` after firing [`SessionEvent::FetchingEntriesFailed`] when
    /// the fetch fails.
    pub fn get_entries<Tz>(&mut self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> Option<Vec<TimeEntry>>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self.fetch_entries(from, to) {
            Ok(entries) => {
                let fetched = entries.len();
                let entries = filter_short_entries(entries);
                self.logger.debug_fmt(format_args!(
                    "Fetched {fetched} entries, kept {} after dropping short ones",
                    entries.len()
                ));
                self.encountered_error = false;
                Some(entries)
            }
            Err(err) => {
                let message = err.to_string();
                self.encountered_error = true;
                self.logger.error_with_error("Fetching entries failed", &err);
                self.emit(&SessionEvent::FetchingEntriesFailed(message));
                None
            }
        }
    }

    fn open_session(&self) -> Result<SessionCredential, TogglError> {
        let request = HttpRequest::new(Method::POST, self.endpoints.session_url.clone())
            .with_header(AUTHORIZATION, &self.basic_authorization())?;
        let response = self.transport.send(request)?;
        if !response.status.is_success() {
            return Err(TogglError::Server {
                status: response.status,
            });
        }

        let mut headers = response.set_cookies().peekable();
        if headers.peek().is_none() {
            self.logger.warn("Session response carried no Set-Cookie header");
        }
        headers
            .find_map(|header| SessionCredential::from_set_cookie(header).ok())
            .ok_or(TogglError::AuthenticationProtocol)
    }

    fn close_session(&self, credential: &SessionCredential) -> Result<(), TogglError> {
        let request = HttpRequest::new(Method::POST, self.endpoints.session_url.clone())
            .with_header(COOKIE, &credential.cookie_header())?;
        let response = self.transport.send(request)?;
        if response.status == StatusCode::OK {
            Ok(())
        } else {
            Err(TogglError::Server {
                status: response.status,
            })
        }
    }

    fn fetch_entries<Tz>(
        &self,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
    ) -> Result<Vec<TimeEntry>, TogglError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let credential = self.credential.as_ref().ok_or(TogglError::NotLoggedIn)?;
        let url = self.entries_url(from, to);
        self.logger.debug_fmt(format_args!("Requesting {url}"));

        let request = HttpRequest::new(Method::GET, url)
            .with_header(COOKIE, &credential.cookie_header())?
            .with_header(CONTENT_TYPE, "application/json")?;
        let response = self.transport.send(request)?;
        if response.status != StatusCode::OK {
            return Err(TogglError::Server {
                status: response.status,
            });
        }

        match serde_json::from_str::<Option<Vec<TimeEntry>>>(&response.body) {
            Ok(Some(entries)) => Ok(entries),
            Ok(None) => {
                self.logger.warn("Entries response was null");
                Err(TogglError::InvalidResponse)
            }
            Err(err) => {
                self.logger
                    .warn_with_error("Entries response is not a valid entry list", &err);
                Err(TogglError::InvalidResponse)
            }
        }
    }

    fn entries_url<Tz>(&self, from: &DateTime<Tz>, to: &DateTime<Tz>) -> Url
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut url = self.endpoints.entries_url.clone();
        url.query_pairs_mut()
            .append_pair("start_date", &format_wire_timestamp(from))
            .append_pair("end_date", &format_wire_timestamp(to));
        url
    }

    fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{API_TOKEN_PASSWORD}", self.api_token);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn emit(&self, event: &SessionEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }
}

fn validate_token(token: String) -> Result<String, TogglError> {
    if token.is_empty() {
        return Err(TogglError::Configuration {
            reason: "API token cannot be empty",
        });
    }
    if token.trim().is_empty() {
        return Err(TogglError::Configuration {
            reason: "API token cannot be whitespace-only",
        });
    }
    Ok(token)
}
