//! Session-authenticated client for the Toggl time tracking API.
//!
//! [`SessionClient`] logs on with an API token, holds the resulting session
//! cookie, and fetches time entries for a date range. Outcomes are reported
//! through [`SessionEvent`] listeners rather than returned errors, so the
//! client stays usable after any failure.

mod client;
mod credential;
mod error;
mod events;
pub mod transport;

pub use client::{DEFAULT_BASE_URL, Endpoints, SessionClient};
pub use credential::{SESSION_COOKIE_NAME, SessionCredential};
pub use error::TogglError;
pub use events::{ListenerId, SessionEvent};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
