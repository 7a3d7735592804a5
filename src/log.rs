//! Per-seat cumulative logs.

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Who wrote a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    /// The engine, recording a resolved action or fault.
    Game,
    /// The seat's own strategy, via the perspective's log hook.
    Bot,
}

/// One append-only log line. Logs are for display only and never affect
/// rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Seconds since the Unix epoch.
    pub ts: f64,
    pub source: LogSource,
    pub text: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(source: LogSource, text: impl Into<String>) -> Self {
        Self {
            ts: timestamp(),
            source,
            text: text.into(),
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let who = match self.source {
            LogSource::Game => "Game",
            LogSource::Bot => "Bot",
        };
        write!(f, "[TS:{}]{}: {}", self.ts, who, self.text)
    }
}

fn timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
