//! Error sinks: the append-only log file and an in-memory capture.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::record::SpecLogRecord;

/// File name of the default error log.
pub const NAME_LOG_FILE_DEFAULT: &str = "file-move.log";

/// Capability handed to the mirror walk for reporting failures.
///
/// `record` must never panic or return an error: a failing sink degrades to
/// stderr so the walk keeps going.
pub trait ErrorLog {
    /// Record one error message (no trailing newline).
    fn record(&self, message: &str);
}

impl<T: ErrorLog + ?Sized> ErrorLog for &T {
    fn record(&self, message: &str) {
        (**self).record(message);
    }
}

/// Append-only error log file.
///
/// The file is opened in append mode for every record and created when missing.
/// It is never truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileErrorLog {
    path_log: PathBuf,
}

impl FileErrorLog {
    /// Log into an explicit file path.
    pub fn new(path_log: impl Into<PathBuf>) -> Self {
        Self {
            path_log: path_log.into(),
        }
    }

    /// Log into `file-move.log` next to the running executable.
    ///
    /// Falls back to the working directory when the executable path is unknown.
    pub fn beside_executable() -> Self {
        let path_dir_exe = std::env::current_exe()
            .ok()
            .and_then(|path_exe| path_exe.parent().map(Path::to_path_buf));
        match path_dir_exe {
            Some(path_dir) => Self::new(path_dir.join(NAME_LOG_FILE_DEFAULT)),
            None => {
                tracing::warn!(
                    "Cannot resolve executable directory; logging to ./{NAME_LOG_FILE_DEFAULT}"
                );
                Self::new(NAME_LOG_FILE_DEFAULT)
            }
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path_log
    }

    /// Append one record, surfacing IO failures to the caller.
    pub fn try_record(&self, message: &str) -> io::Result<()> {
        let line = SpecLogRecord::now(message).to_line();
        let mut file_log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path_log)?;
        file_log.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl ErrorLog for FileErrorLog {
    fn record(&self, message: &str) {
        if let Err(e) = self.try_record(message) {
            let _ = writeln!(
                io::stderr(),
                "Failed to append to {} ({e}); {}",
                self.path_log.display(),
                SpecLogRecord::now(message)
            );
        }
    }
}

/// Error sink that keeps messages in memory.
#[derive(Debug, Default)]
pub struct MemoryErrorLog {
    l_messages: Mutex<Vec<String>>,
}

impl MemoryErrorLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded messages in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.l_messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded messages.
    pub fn len(&self) -> usize {
        self.l_messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorLog for MemoryErrorLog {
    fn record(&self, message: &str) {
        self.l_messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_log_appends_and_never_truncates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_log = tmp.path().join(NAME_LOG_FILE_DEFAULT);
        std::fs::write(&path_log, "previous run\n").expect("seed log");

        let error_log = FileErrorLog::new(&path_log);
        error_log.record("first");
        error_log.record("second");

        let txt = std::fs::read_to_string(&path_log).expect("read log");
        let l_lines = txt.lines().collect::<Vec<_>>();
        assert_eq!(l_lines.len(), 3);
        assert_eq!(l_lines[0], "previous run");
        let l_messages = l_lines[1..]
            .iter()
            .map(|line| SpecLogRecord::parse_line(line).expect("record line").message)
            .collect::<Vec<_>>();
        assert_eq!(l_messages, vec!["first", "second"]);
    }

    #[test]
    fn file_log_creates_missing_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_log = tmp.path().join("fresh.log");

        FileErrorLog::new(&path_log).record("boom");

        let txt = std::fs::read_to_string(&path_log).expect("read log");
        assert!(txt.ends_with("] ERROR: boom\n"));
    }

    #[test]
    fn file_log_failure_does_not_panic() {
        let tmp = tempfile::tempdir().expect("tempdir");
        // A directory cannot be opened for appending.
        let error_log = FileErrorLog::new(tmp.path());

        assert!(error_log.try_record("lost").is_err());
        error_log.record("lost");
    }

    #[test]
    fn default_log_is_named_file_move_log() {
        let error_log = FileErrorLog::beside_executable();
        assert_eq!(
            error_log.path().file_name().and_then(|n| n.to_str()),
            Some(NAME_LOG_FILE_DEFAULT)
        );
    }

    #[test]
    fn memory_log_keeps_order() {
        let error_log = MemoryErrorLog::new();
        assert!(error_log.is_empty());
        error_log.record("a");
        error_log.record("b");
        assert_eq!(error_log.messages(), vec!["a", "b"]);
        assert_eq!(error_log.len(), 2);
    }
}
