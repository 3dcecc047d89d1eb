//! Log domain types

use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// A timestamped line in a job's audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogEntry {
    /// Creates an entry stamped with the current wall-clock time
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// Renders as `[HH:MM:SS] message` in local time
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_timestamp() {
        let entry = LogEntry::now(LogLevel::Info, "Login successful!");
        let rendered = entry.to_string();

        assert!(rendered.starts_with('['));
        assert_eq!(&rendered[9..11], "] ");
        assert!(rendered.ends_with("Login successful!"));
    }

    #[test]
    fn test_serializes_level_by_name() {
        let entry = LogEntry::now(LogLevel::Warning, "careful");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["level"], "Warning");
        assert_eq!(json["message"], "careful");
    }
}
