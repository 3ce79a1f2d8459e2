//! `mirrorkit_log`:
//! Append-only error log used by the mirror engine.
//!
//! - `record` : log line model (`[<timestamp>] ERROR: <message>`)
//! - `sink`   : the `ErrorLog` capability, file and in-memory sinks

pub mod record;
pub mod sink;

pub use record::SpecLogRecord;
pub use sink::{ErrorLog, FileErrorLog, MemoryErrorLog, NAME_LOG_FILE_DEFAULT};
