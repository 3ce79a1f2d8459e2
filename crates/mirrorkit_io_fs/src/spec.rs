//! Mirror specification models and top-level error types.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Matching mode for exclude names.
///
/// Every mode is applied to the entry basename only, at any depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumMirrorPatternMode {
    /// Basename equals one of the names.
    #[default]
    Exact,
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
}

/// What happened to one visited entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumMirrorOutcome {
    /// Basename matched the exclude set; nothing touched.
    Skipped,
    /// Regular file copied over the destination.
    CopiedFile,
    /// Directory (re)created empty at the destination.
    CreatedDirectory,
    /// Processing stopped at this entry.
    Failed(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `mirror_tree`.
#[derive(Debug, Clone, Default)]
pub struct SpecMirrorOptions {
    /// Basenames (or patterns) excluded wherever they occur.
    pub names_exclude: Vec<String>,
    /// How `names_exclude` is interpreted.
    pub rule_pattern: EnumMirrorPatternMode,
    /// Also copy permissions, timestamps and extended attributes (Linux).
    pub if_preserve_metadata: bool,
    /// Stop the walk before the next entry once set.
    pub flag_cancel: Option<Arc<AtomicBool>>,
}

impl SpecMirrorOptions {
    /// Options with an exact-match exclude set.
    pub fn with_names_exclude<I, S>(names_exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names_exclude: names_exclude.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// One per-entry failure with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMirrorError {
    /// Source path of the failed entry.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// One visited entry and its outcome, in visit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMirrorEvent {
    /// Source path of the entry.
    pub path: PathBuf,
    pub outcome: EnumMirrorOutcome,
}

/// Fatal errors: the run stops before touching the destination tree.
#[derive(Debug, Error)]
pub enum MirrorTreeError {
    /// Invalid exclude pattern.
    #[error("Invalid exclude pattern: {0}")]
    InvalidPattern(String),
    /// Source root does not exist.
    #[error("Source directory \"{}\" does not exist.", .0.display())]
    SourceMissing(PathBuf),
    /// Source root existence could not be determined.
    #[error("Source directory \"{}\" is not accessible: {message}", .path.display())]
    SourceInaccessible {
        /// Source root.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .source_dir.display(),
        .destination_dir.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        source_dir: PathBuf,
        /// Normalized destination directory.
        destination_dir: PathBuf,
    },
    /// Destination root creation failed.
    #[error("Failed to initialize destination {}: {message}", .path.display())]
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
