//! `mirrorkit_io_fs` v1:
//! Destructive directory mirror engine.
//!
//! - `mirror` : validation and tree walk
//! - `spec`   : enums/options/errors
//! - `report` : run-time report model
//! - `util`   : exclude matching and file-system helpers

pub mod mirror;
pub mod report;
pub mod spec;
mod util;

pub use mirror::{mirror, mirror_tree};
pub use mirrorkit_log::{ErrorLog, FileErrorLog, MemoryErrorLog};
pub use report::{ReportMirror, ReportMirrorBuilder};
pub use spec::{
    EnumMirrorOutcome, EnumMirrorPatternMode, MirrorTreeError, SpecMirrorError, SpecMirrorEvent,
    SpecMirrorOptions,
};
