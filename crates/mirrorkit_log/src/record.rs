//! Error log record model and line format.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// Severity tag written into every record.
pub const C_SEVERITY_ERROR: &str = "ERROR";

/// One appended error line: `[<timestamp>] ERROR: <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLogRecord {
    /// UTC time the record was created.
    pub timestamp: DateTime<Utc>,
    /// Human-readable message, without the trailing newline.
    pub message: String,
}

impl SpecLogRecord {
    /// Stamp `message` with the current UTC time.
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    /// Render the record as one log line, newline included.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }

    /// Parse one line previously produced by [`SpecLogRecord::to_line`].
    ///
    /// Returns `None` for lines that do not follow the record layout.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let rest = line.strip_prefix('[')?;
        let (raw_timestamp, rest) = rest.split_once(']')?;
        let message = rest
            .strip_prefix(' ')?
            .strip_prefix(C_SEVERITY_ERROR)?
            .strip_prefix(": ")?;
        let timestamp = DateTime::parse_from_rfc3339(raw_timestamp)
            .ok()?
            .with_timezone(&Utc);
        Some(Self {
            timestamp,
            message: message.to_string(),
        })
    }
}

impl fmt::Display for SpecLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {C_SEVERITY_ERROR}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn record_line_uses_iso_timestamp_with_millis() {
        let record = SpecLogRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            message: "Error processing \"/src/a.txt\": Permission denied".to_string(),
        };
        assert_eq!(
            record.to_line(),
            "[2025-03-14T09:26:53.000Z] ERROR: Error processing \"/src/a.txt\": Permission denied\n"
        );
    }

    #[test]
    fn parse_line_reads_back_rendered_record() {
        let record = SpecLogRecord::now("Source directory \"/nope\" does not exist.");
        let parsed = SpecLogRecord::parse_line(&record.to_line()).expect("parse record");
        assert_eq!(parsed.message, record.message);
        assert_eq!(
            parsed.timestamp.timestamp_millis(),
            record.timestamp.timestamp_millis()
        );
    }

    #[test]
    fn parse_line_rejects_foreign_lines() {
        assert!(SpecLogRecord::parse_line("plain text").is_none());
        assert!(SpecLogRecord::parse_line("[not-a-time] ERROR: x").is_none());
        assert!(SpecLogRecord::parse_line("[2025-03-14T09:26:53.000Z] WARN: x").is_none());
    }
}
