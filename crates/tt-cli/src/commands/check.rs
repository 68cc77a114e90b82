//! Check command for verifying the API token.

use std::io::Write;

use anyhow::Result;
use tt_toggl::{SessionClient, Transport};

/// Opens and closes a session, reporting whether the token works.
pub fn run<W: Write, T: Transport>(writer: &mut W, client: &mut SessionClient<T>) -> Result<()> {
    client.login();
    if !client.is_logged_in() {
        anyhow::bail!("logon failed; check the API token and base_url");
    }

    let host = client
        .endpoints()
        .session_url
        .host_str()
        .unwrap_or("server")
        .to_string();
    writeln!(writer, "Logged on to {host}")?;

    client.logout();
    if client.encountered_error() {
        writeln!(writer, "Warning: logout was not confirmed by the server")?;
    } else {
        writeln!(writer, "Logged out")?;
    }
    Ok(())
}
