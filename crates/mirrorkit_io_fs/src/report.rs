//! Mirror report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{EnumMirrorOutcome, SpecMirrorError, SpecMirrorEvent};

/// Aggregate counters and diagnostics for one `mirror_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportMirror {
    /// Entries classified (excluded entries are not scanned).
    pub cnt_scanned: u64,
    /// Regular files copied.
    pub cnt_copied: u64,
    /// Directories recreated at the destination whose children were scheduled.
    pub cnt_created_dirs: u64,
    /// Entries skipped by the exclude set.
    pub cnt_skipped: u64,
    /// Per-entry failures.
    pub errors: Vec<SpecMirrorError>,
    /// Every visited entry in visit order.
    pub events: Vec<SpecMirrorEvent>,
    /// The walk stopped early on the cancel flag.
    pub if_cancelled: bool,
}

impl ReportMirror {
    /// Number of collected per-entry errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Outcome recorded for `path`, if it was visited.
    pub fn outcome_of(&self, path: &std::path::Path) -> Option<&EnumMirrorOutcome> {
        self.events
            .iter()
            .find(|event| event.path == path)
            .map(|event| &event.outcome)
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_created_dirs".to_string(), self.cnt_created_dirs);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let mut txt = format!(
            "{prefix} scanned={} copied={} dirs={} skipped={} errors={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_created_dirs,
            self.cnt_skipped,
            self.error_count()
        );
        if self.if_cancelled {
            txt.push_str(" cancelled");
        }
        txt
    }
}

impl fmt::Display for ReportMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[MIRROR]"))
    }
}

/// Mutable accumulator for mirror statistics.
///
/// Every `add_*` call also appends the matching [`SpecMirrorEvent`].
#[derive(Debug, Default, Clone)]
pub struct ReportMirrorBuilder {
    cnt_scanned: u64,
    cnt_copied: u64,
    cnt_created_dirs: u64,
    cnt_skipped: u64,
    errors: Vec<SpecMirrorError>,
    events: Vec<SpecMirrorEvent>,
    if_cancelled: bool,
}

impl ReportMirrorBuilder {
    /// Entry passed the exclude check and is about to be classified.
    pub fn add_scanned(&mut self) {
        self.cnt_scanned += 1;
    }

    pub fn add_skipped(&mut self, path: PathBuf) {
        self.cnt_skipped += 1;
        self.push_event(path, EnumMirrorOutcome::Skipped);
    }

    pub fn add_copied(&mut self, path: PathBuf) {
        self.cnt_copied += 1;
        self.push_event(path, EnumMirrorOutcome::CopiedFile);
    }

    pub fn add_created_dir(&mut self, path: PathBuf) {
        self.cnt_created_dirs += 1;
        self.push_event(path, EnumMirrorOutcome::CreatedDirectory);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.push_event(path.clone(), EnumMirrorOutcome::Failed(exception.clone()));
        self.errors.push(SpecMirrorError { path, exception });
    }

    pub fn mark_cancelled(&mut self) {
        self.if_cancelled = true;
    }

    fn push_event(&mut self, path: PathBuf, outcome: EnumMirrorOutcome) {
        self.events.push(SpecMirrorEvent { path, outcome });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportMirror {
        ReportMirror {
            cnt_scanned: self.cnt_scanned,
            cnt_copied: self.cnt_copied,
            cnt_created_dirs: self.cnt_created_dirs,
            cnt_skipped: self.cnt_skipped,
            errors: self.errors,
            events: self.events,
            if_cancelled: self.if_cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{ReportMirror, ReportMirrorBuilder};
    use crate::spec::EnumMirrorOutcome;

    #[test]
    fn report_mirror_to_dict_and_format() {
        let report = ReportMirror {
            cnt_scanned: 7,
            cnt_copied: 4,
            cnt_created_dirs: 2,
            cnt_skipped: 3,
            ..ReportMirror::default()
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_scanned"], 7);
        assert_eq!(dict_counts["cnt_copied"], 4);
        assert_eq!(dict_counts["cnt_created_dirs"], 2);
        assert_eq!(dict_counts["cnt_skipped"], 3);
        assert_eq!(dict_counts["cnt_errors"], 0);

        let txt = report.format("[MIRROR]");
        assert_eq!(txt, "[MIRROR] scanned=7 copied=4 dirs=2 skipped=3 errors=0");
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_records_events_in_order() {
        let mut builder = ReportMirrorBuilder::default();
        builder.add_skipped(PathBuf::from("s/node_modules"));
        builder.add_scanned();
        builder.add_created_dir(PathBuf::from("s/a"));
        builder.add_scanned();
        builder.add_error(PathBuf::from("s/a/locked"), "Permission denied".to_string());
        builder.mark_cancelled();
        let report = builder.build();

        assert_eq!(report.cnt_scanned, 2);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.events.len(), 3);
        assert_eq!(
            report.outcome_of(Path::new("s/node_modules")),
            Some(&EnumMirrorOutcome::Skipped)
        );
        assert_eq!(
            report.outcome_of(Path::new("s/a/locked")),
            Some(&EnumMirrorOutcome::Failed("Permission denied".to_string()))
        );
        assert!(report.format("[MIRROR]").ends_with(" cancelled"));
    }
}
