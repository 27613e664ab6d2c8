use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::client::ProfilerWindow;

#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("Please provide either 'time' or 'until' parameter.")]
    MissingWindow,

    #[error("invalid until '{raw}', expected YYYY-MM-DDTHH:MM or an RFC 3339 timestamp")]
    InvalidUntil { raw: String },

    #[error("failed to read profiler state: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write profiler state: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profiler state: {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Survives between runs so the countdown can be resumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfilerState {
    pub end_timestamp_ms: i64,
}

pub fn default_state_path() -> Option<PathBuf> {
    Some(crate::config::default_config_dir()?.join("profiler.json"))
}

/// Pick the profiling window from the two optional inputs; minutes win.
pub fn window_from_inputs(
    minutes: Option<u32>,
    until: Option<&str>,
) -> Result<ProfilerWindow, ProfilerError> {
    if let Some(minutes) = minutes {
        return Ok(ProfilerWindow::Minutes(minutes));
    }
    match until.map(str::trim).filter(|u| !u.is_empty()) {
        Some(until) => Ok(ProfilerWindow::Until(until.to_string())),
        None => Err(ProfilerError::MissingWindow),
    }
}

/// `YYYY-MM-DDTHH:MM[:SS]` is read as UTC; RFC 3339 keeps its offset.
pub fn parse_until(raw: &str) -> Result<OffsetDateTime, ProfilerError> {
    let raw = raw.trim();
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(at);
    }
    let minutes = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    let seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw, &minutes)
        .or_else(|_| PrimitiveDateTime::parse(raw, &seconds))
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|_| ProfilerError::InvalidUntil {
            raw: raw.to_string(),
        })
}

pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn end_timestamp_ms(
    window: &ProfilerWindow,
    now: OffsetDateTime,
) -> Result<i64, ProfilerError> {
    match window {
        ProfilerWindow::Minutes(minutes) => Ok(unix_millis(now) + i64::from(*minutes) * 60 * 1000),
        ProfilerWindow::Until(raw) => parse_until(raw).map(unix_millis),
    }
}

pub fn save_state(path: &Path, state: &ProfilerState) -> Result<(), ProfilerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ProfilerError::Write {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    let body = serde_json::to_vec(state).map_err(|e| ProfilerError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;
    std::fs::write(path, body).map_err(|e| ProfilerError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// `Ok(None)` when nothing has been started yet.
pub fn load_state(path: &Path) -> Result<Option<ProfilerState>, ProfilerError> {
    let contents = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ProfilerError::Read {
                path: path.display().to_string(),
                source: e,
            })
        }
    };
    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|e| ProfilerError::Parse {
            path: path.display().to_string(),
            source: e,
        })
}

/// Whole seconds left, rounded up, never negative.
pub fn seconds_left(end_ms: i64, now_ms: i64) -> u64 {
    let remaining = end_ms.saturating_sub(now_ms);
    if remaining <= 0 {
        return 0;
    }
    (remaining as u64).div_ceil(1000)
}

pub fn countdown_text(seconds_left: u64) -> String {
    if seconds_left == 0 {
        return "Rule profiling is stopped.".to_string();
    }
    format!("Time Left: {}m {}s", seconds_left / 60, seconds_left % 60)
}
