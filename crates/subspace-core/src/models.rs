//! Wire and view types shared by every dashboard front end.
//!
//! Everything here is produced by the backend and only ever replaced
//! wholesale by the client, never edited in place.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot returned by `GET /api/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationStatus {
    pub running: bool,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// What the automation did to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    SearchFound,
    Connect,
    Message,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::SearchFound => "SEARCH_FOUND",
            Action::Connect => "CONNECT",
            Action::Message => "MESSAGE",
            Action::Other(raw) => raw,
        }
    }

    /// Short label shown in the status column.
    pub fn badge(&self) -> &str {
        match self {
            Action::SearchFound => "Scraped",
            Action::Connect => "Req Sent",
            Action::Message => "Messaged",
            Action::Other(raw) => raw,
        }
    }
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SEARCH_FOUND" => Action::SearchFound,
            "CONNECT" => Action::Connect,
            "MESSAGE" => Action::Message,
            _ => Action::Other(raw),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One row of `GET /api/data`.
///
/// The dashboard reads the Go-style field names; the snake-case names the
/// server's JSON tags produce are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(rename = "ID", alias = "id")]
    pub id: u64,
    #[serde(rename = "Action", alias = "action")]
    pub action: Action,
    #[serde(rename = "Metadata", alias = "metadata", default)]
    pub metadata: String,
    #[serde(rename = "ProfileURL", alias = "profile_url", default)]
    pub profile_url: String,
    #[serde(rename = "Timestamp", alias = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    /// Wall-clock time of the action in the local timezone, `HH:MM:SS`.
    pub fn local_time(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
    }
}

/// Optional login override. Lives only in memory.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /api/start`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub query: String,
    pub email: String,
    pub password: String,
}

impl StartRequest {
    pub fn new(query: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            query: query.into(),
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        }
    }
}

impl std::fmt::Debug for StartRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartRequest")
            .field("query", &self.query)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Per-action counts for the summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivitySummary {
    pub profiles_found: usize,
    pub requests_sent: usize,
    pub messages_sent: usize,
}

impl ActivitySummary {
    pub fn from_records(records: &[ActivityRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut summary, record| {
                match record.action {
                    Action::SearchFound => summary.profiles_found += 1,
                    Action::Connect => summary.requests_sent += 1,
                    Action::Message => summary.messages_sent += 1,
                    Action::Other(_) => {}
                }
                summary
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOrder {
    #[default]
    LatestFirst,
    Insertion,
}

/// A status log entry split into its `[time]` prefix and the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub prefix: Option<String>,
    pub message: String,
}

impl LogLine {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with('[') {
            if let Some((head, tail)) = raw.split_once(']') {
                return Self {
                    prefix: Some(format!("{}]", head)),
                    message: tail.trim_start().to_string(),
                };
            }
        }
        Self {
            prefix: None,
            message: raw.to_string(),
        }
    }
}

pub fn order_logs(logs: &[String], order: LogOrder) -> Vec<LogLine> {
    match order {
        LogOrder::LatestFirst => logs.iter().rev().map(|l| LogLine::parse(l)).collect(),
        LogOrder::Insertion => logs.iter().map(|l| LogLine::parse(l)).collect(),
    }
}
