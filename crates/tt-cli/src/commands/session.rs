//! Session client setup shared by commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tt_core::Logger;
use tt_toggl::{Endpoints, HttpTransport, SessionClient};

use crate::Config;

/// Builds a client from configuration. Makes no request.
pub fn connect(config: &Config, logger: Arc<Logger>) -> Result<SessionClient> {
    let token = config.api_token().context(
        "no API token configured; set api_token in config.toml or the TT_API_TOKEN environment variable",
    )?;
    let endpoints = Endpoints::from_base(&config.base_url)
        .with_context(|| format!("invalid base_url {}", config.base_url))?;
    let transport = HttpTransport::with_timeout(Duration::from_secs(config.timeout_secs))?;

    let mut client = SessionClient::with_transport(token, endpoints, transport, logger)?;
    client.subscribe(|event| tracing::debug!(%event, "session event"));
    Ok(client)
}
