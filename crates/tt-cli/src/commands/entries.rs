//! Entries command for listing tracked time.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Duration, Local};
use tt_core::TimeEntry;
use tt_toggl::{SessionClient, SessionEvent, Transport};

use super::util::{format_duration, parse_datetime};

/// Range used when `--start` is omitted.
const DEFAULT_RANGE_DAYS: i64 = 7;

/// Resolves `--start`/`--end`, defaulting to the last week up to now.
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let to = end.map(parse_datetime).transpose()?.unwrap_or_else(Local::now);
    let from = match start {
        Some(start) => parse_datetime(start)?,
        None => to - Duration::days(DEFAULT_RANGE_DAYS),
    };
    if from > to {
        anyhow::bail!("start {} is after end {}", from.to_rfc3339(), to.to_rfc3339());
    }
    Ok((from, to))
}

/// Logs on, fetches the entries in range, logs out, and prints them.
pub fn run<W: Write, T: Transport>(
    writer: &mut W,
    client: &mut SessionClient<T>,
    from: &DateTime<Local>,
    to: &DateTime<Local>,
    json: bool,
) -> Result<()> {
    let failure = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&failure);
    let listener = client.subscribe(move |event| {
        if let SessionEvent::FetchingEntriesFailed(message) = event {
            *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.clone());
        }
    });
    let entries = fetch(client, from, to);
    client.unsubscribe(listener);
    let entries = entries?;

    let Some(entries) = entries else {
        let reason = failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(|| "unknown error".to_string());
        anyhow::bail!("fetching entries failed: {reason}");
    };
    tracing::debug!(count = entries.len(), "fetched entries");

    if json {
        write_json(writer, &entries)
    } else {
        write_table(writer, &entries)
    }
}

fn fetch<T: Transport>(
    client: &mut SessionClient<T>,
    from: &DateTime<Local>,
    to: &DateTime<Local>,
) -> Result<Option<Vec<TimeEntry>>> {
    client.login();
    if !client.is_logged_in() {
        anyhow::bail!("logon failed; check the API token and base_url");
    }
    let entries = client.get_entries(from, to);
    client.logout();
    Ok(entries)
}

fn write_json<W: Write>(writer: &mut W, entries: &[TimeEntry]) -> Result<()> {
    for entry in entries {
        let json = serde_json::to_string(entry)?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, entries: &[TimeEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No entries.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:<16}  {:>8}  {:<8}  {}",
        "START", "DURATION", "BILLABLE", "DESCRIPTION"
    )?;
    for entry in entries {
        writeln!(
            writer,
            "{:<16}  {:>8}  {:<8}  {}",
            entry.start.map_or_else(
                || "-".to_string(),
                |start| start.format("%Y-%m-%d %H:%M").to_string()
            ),
            format_duration(entry.duration),
            if entry.billable { "yes" } else { "no" },
            entry.description.as_deref().unwrap_or("(no description)"),
        )?;
    }

    let total = entries
        .iter()
        .fold(0_i64, |total, entry| total.saturating_add(entry.duration.max(0)));
    writeln!(
        writer,
        "Total: {} across {} entries",
        format_duration(total),
        entries.len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::testing::{SESSION_COOKIE, client, reply};

    const ENTRIES: &str = r#"[
        {"id": 1, "start": "2024-03-04T09:00:00+01:00", "duration": 3600, "billable": true, "description": "Planning"},
        {"id": 2, "start": "2024-03-04T11:00:00+01:00", "duration": 12, "description": "Misclick"},
        {"id": 3, "start": "2024-03-04T13:30:00+01:00", "duration": 95, "tags": null}
    ]"#;

    fn range() -> (DateTime<Local>, DateTime<Local>) {
        resolve_range(Some("2024-03-04"), Some("2024-03-05")).unwrap()
    }

    #[test]
    fn table_lists_kept_entries_with_total() {
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(200, None, ENTRIES),
            reply(200, None, ""),
        ]);
        let (from, to) = range();
        let mut output = Vec::new();

        run(&mut output, &mut client, &from, &to, false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        START             DURATION  BILLABLE  DESCRIPTION
        2024-03-04 09:00   1:00:00  yes       Planning
        2024-03-04 13:30   0:01:35  no        (no description)
        Total: 1:01:35 across 2 entries
        ");
        assert!(!client.is_logged_in());
    }

    #[test]
    fn json_output_is_one_entry_per_line() {
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(200, None, ENTRIES),
            reply(200, None, ""),
        ]);
        let (from, to) = range();
        let mut output = Vec::new();

        run(&mut output, &mut client, &from, &to, true).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: TimeEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.description.as_deref(), Some("Planning"));
    }

    #[test]
    fn empty_range_prints_placeholder() {
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(200, None, "[]"),
            reply(200, None, ""),
        ]);
        let (from, to) = range();
        let mut output = Vec::new();

        run(&mut output, &mut client, &from, &to, false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @"No entries.");
    }

    #[test]
    fn server_failure_surfaces_event_message() {
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(500, None, ""),
            reply(200, None, ""),
        ]);
        let (from, to) = range();
        let mut output = Vec::new();

        let err = run(&mut output, &mut client, &from, &to, false).unwrap_err();

        assert_eq!(
            err.to_string(),
            "fetching entries failed: Server responded with status 500 Internal Server Error"
        );
        assert!(!client.is_logged_in());
    }

    #[test]
    fn logon_failure_stops_before_fetching() {
        let mut client = client(vec![reply(401, None, "")]);
        let (from, to) = range();
        let mut output = Vec::new();

        let err = run(&mut output, &mut client, &from, &to, false).unwrap_err();

        assert!(err.to_string().contains("logon failed"));
    }

    #[test]
    fn entries_without_start_or_id_still_render() {
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(200, None, r#"[{"duration": 45.0}, {"duration": 120, "billable": null}]"#),
            reply(200, None, ""),
        ]);
        let (from, to) = range();
        let mut output = Vec::new();

        run(&mut output, &mut client, &from, &to, false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        START             DURATION  BILLABLE  DESCRIPTION
        -                  0:00:45  no        (no description)
        -                  0:02:00  no        (no description)
        Total: 0:02:45 across 2 entries
        ");
    }

    #[test]
    fn huge_durations_do_not_overflow_total() {
        let body = format!(
            r#"[{{"duration": {max}}}, {{"duration": {max}}}, {{"duration": 100000000000000000}}]"#,
            max = i64::MAX
        );
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(200, None, &body),
            reply(200, None, ""),
        ]);
        let (from, to) = range();
        let mut output = Vec::new();

        run(&mut output, &mut client, &from, &to, false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.ends_with("across 3 entries\n"), "{output}");
    }

    #[test]
    fn repeated_runs_leave_no_listeners_behind() {
        let mut client = client(vec![
            reply(200, Some(SESSION_COOKIE), ""),
            reply(200, None, ENTRIES),
            reply(200, None, ""),
            reply(200, Some(SESSION_COOKIE), ""),
            reply(500, None, ""),
            reply(200, None, ""),
            reply(401, None, ""),
        ]);
        let baseline = client.listener_count();
        let (from, to) = range();

        run(&mut Vec::new(), &mut client, &from, &to, false).unwrap();
        assert_eq!(client.listener_count(), baseline);
        run(&mut Vec::new(), &mut client, &from, &to, false).unwrap_err();
        assert_eq!(client.listener_count(), baseline);
        run(&mut Vec::new(), &mut client, &from, &to, false).unwrap_err();
        assert_eq!(client.listener_count(), baseline);
    }

    #[test]
    fn resolve_range_rejects_inverted_range() {
        let err = resolve_range(Some("2024-03-05"), Some("2024-03-04")).unwrap_err();
        assert!(err.to_string().contains("is after end"));
    }

    #[test]
    fn resolve_range_defaults_to_last_week() {
        let (from, to) = resolve_range(None, Some("2024-03-08")).unwrap();
        assert_eq!(to - from, Duration::days(7));
    }
}
