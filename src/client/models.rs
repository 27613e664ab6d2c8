use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pagination::PageLinks;

/// A listing record. Fields are rendered as received, so the record stays an
/// untyped JSON object.
pub type Item = serde_json::Map<String, Value>;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ListResponse {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<Item>,
}

impl ListResponse {
    pub fn links(&self) -> PageLinks {
        PageLinks {
            next: self.next.clone(),
            previous: self.previous.clone(),
        }
    }
}

/// Body of a 400 response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountKind {
    Sid,
    Addr,
}

impl CountKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sid" => Some(Self::Sid),
            "addr" => Some(Self::Addr),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sid => "sid",
            Self::Addr => "addr",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EventCount {
    Sid {
        sid: i64,
        count: u64,
    },
    Addr {
        src_addr: String,
        dst_addr: String,
        count: u64,
    },
}

impl EventCount {
    pub fn count(&self) -> u64 {
        match self {
            Self::Sid { count, .. } | Self::Addr { count, .. } => *count,
        }
    }
}

/// `{response: string}`, returned by the command and rule-update endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandResponse {
    pub response: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PerfMonitorResponse {
    pub response: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PerfQuery {
    pub begin: String,
    pub end: String,
    pub aggr: String,
    pub prefix: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfilerWindow {
    Minutes(u32),
    Until(String),
}

impl ProfilerWindow {
    pub fn query_pair(&self) -> (&'static str, String) {
        match self {
            Self::Minutes(minutes) => ("time", minutes.to_string()),
            Self::Until(until) => ("until", until.clone()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProfilerLast {
    pub result: ProfilerResult,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ProfilerResult {
    #[serde(rename = "startTime", default)]
    pub start_time: Value,
    #[serde(rename = "endTime", default)]
    pub end_time: Value,
    #[serde(default)]
    pub rules: Vec<RuleProfile>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleProfile {
    pub gid: u64,
    pub sid: u64,
    pub rev: u64,
    pub checks: u64,
    pub matches: u64,
    pub alerts: u64,
    pub time_us: u64,
    pub avg_check: f64,
    pub avg_match: f64,
    pub avg_non_match: f64,
    pub timeouts: u64,
    pub suspends: u64,
    pub rule_time_percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WriteRuleResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
