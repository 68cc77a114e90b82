//! CLI subcommand implementations.

pub mod check;
pub mod entries;
pub mod session;
pub mod util;

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::Arc;

    use reqwest::StatusCode;
    use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
    use tt_core::Logger;
    use tt_toggl::{
        Endpoints, HttpRequest, HttpResponse, SessionClient, TogglError, Transport,
    };

    pub const SESSION_COOKIE: &str = "toggl_api_session_new=abc123; Path=/; Domain=.toggl.com;";

    /// Replays canned responses in order.
    pub struct Scripted(RefCell<VecDeque<HttpResponse>>);

    impl Transport for Scripted {
        fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TogglError> {
            self.0
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| TogglError::transport(std::io::Error::other("no scripted response")))
        }
    }

    pub fn reply(status: u16, set_cookie: Option<&'static str>, body: &str) -> HttpResponse {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = set_cookie {
            headers.insert(SET_COOKIE, HeaderValue::from_static(cookie));
        }
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: body.to_string(),
        }
    }

    pub fn client(responses: Vec<HttpResponse>) -> SessionClient<Scripted> {
        SessionClient::with_transport(
            "token",
            Endpoints::from_base("https://toggl.test/api/v8").unwrap(),
            Scripted(RefCell::new(responses.into())),
            Arc::new(Logger::default()),
        )
        .unwrap()
    }
}
