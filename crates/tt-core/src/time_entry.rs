//! Time entries as reported by the remote tracking service.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Entries this short or shorter are treated as noise.
pub const MIN_ENTRY_DURATION_SECS: i64 = 30;

/// Wire format for date-time query parameters: `yyyy-MM-ddTHH:mm:sszzz`.
const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// One tracked work interval.
///
/// Fields the client does not interpret (workspace, project, task, tags,
/// billing) are carried through as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Workspace ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wid: Option<u64>,
    /// Project ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u64>,
    /// Task ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<FixedOffset>>,
    /// Seconds. Negative while the timer is running.
    #[serde(deserialize_with = "whole_seconds")]
    pub duration: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub billable: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duronly: bool,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<FixedOffset>>,
}

impl TimeEntry {
    /// Whether the entry's timer is still running.
    pub const fn is_running(&self) -> bool {
        self.duration < 0
    }

    /// Tracked time; zero for a running entry, capped at [`Duration::MAX`].
    pub fn elapsed(&self) -> Duration {
        Duration::try_seconds(self.duration.max(0)).unwrap_or(Duration::MAX)
    }

    /// Whether the entry is long enough to be kept.
    pub const fn exceeds_noise_threshold(&self) -> bool {
        self.duration > MIN_ENTRY_DURATION_SECS
    }
}

/// Drops entries lasting [`MIN_ENTRY_DURATION_SECS`] or less, keeping order.
pub fn filter_short_entries(entries: Vec<TimeEntry>) -> Vec<TimeEntry> {
    entries
        .into_iter()
        .filter(TimeEntry::exceeds_noise_threshold)
        .collect()
}

/// Formats a timestamp for the entries query: local date-time with numeric
/// UTC offset, e.g. `2024-03-05T09:15:00+01:00`.
pub fn format_wire_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp.format(WIRE_TIMESTAMP_FORMAT).to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts integral or fractional seconds; fractions are truncated.
#[expect(
    clippy::cast_possible_truncation,
    reason = "float to int casts saturate at the i64 bounds"
)]
fn whole_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(i64),
        Fractional(f64),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Whole(secs) => Ok(secs),
        Seconds::Fractional(secs) if secs.is_finite() => Ok(secs.trunc() as i64),
        Seconds::Fractional(_) => Err(serde::de::Error::custom("duration is not finite")),
    }
}
