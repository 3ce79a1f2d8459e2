use std::collections::BTreeMap;

use mirrorkit_io_fs::{
    EnumMirrorOutcome, EnumMirrorPatternMode, MirrorTreeError, ReportMirror, SpecMirrorError,
    SpecMirrorEvent, SpecMirrorOptions, mirror_tree,
};
use mirrorkit_log::FileErrorLog;
use pyo3::exceptions::{PyFileNotFoundError, PyOSError, PyPermissionError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "mirrorkit.fs.mirror_tree.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "SpecMirrorError")]
#[derive(Debug, Clone)]
struct PySpecMirrorError {
    #[pyo3(get)]
    path: String,
    #[pyo3(get)]
    exception: String,
}

impl From<SpecMirrorError> for PySpecMirrorError {
    fn from(spec_error: SpecMirrorError) -> Self {
        Self {
            path: spec_error.path.to_string_lossy().to_string(),
            exception: spec_error.exception,
        }
    }
}

#[pyclass(name = "SpecMirrorEvent")]
#[derive(Debug, Clone)]
struct PySpecMirrorEvent {
    #[pyo3(get)]
    path: String,
    /// One of `skipped`, `copied_file`, `created_directory`, `failed`.
    #[pyo3(get)]
    outcome: String,
    /// Failure text for `failed` outcomes.
    #[pyo3(get)]
    exception: Option<String>,
}

impl From<SpecMirrorEvent> for PySpecMirrorEvent {
    fn from(spec_event: SpecMirrorEvent) -> Self {
        let (outcome, exception) = match spec_event.outcome {
            EnumMirrorOutcome::Skipped => ("skipped", None),
            EnumMirrorOutcome::CopiedFile => ("copied_file", None),
            EnumMirrorOutcome::CreatedDirectory => ("created_directory", None),
            EnumMirrorOutcome::Failed(message) => ("failed", Some(message)),
        };
        Self {
            path: spec_event.path.to_string_lossy().to_string(),
            outcome: outcome.to_string(),
            exception,
        }
    }
}

#[pyclass(name = "ReportMirror")]
#[derive(Debug, Clone)]
struct PyReportMirror {
    #[pyo3(get)]
    cnt_scanned: u64,
    #[pyo3(get)]
    cnt_copied: u64,
    #[pyo3(get)]
    cnt_created_dirs: u64,
    #[pyo3(get)]
    cnt_skipped: u64,
    #[pyo3(get)]
    errors: Vec<PySpecMirrorError>,
    #[pyo3(get)]
    events: Vec<PySpecMirrorEvent>,
    #[pyo3(get)]
    if_cancelled: bool,
    summary: String,
}

impl From<ReportMirror> for PyReportMirror {
    fn from(report_mirror: ReportMirror) -> Self {
        let summary = report_mirror.format("[MIRROR]");
        Self {
            cnt_scanned: report_mirror.cnt_scanned,
            cnt_copied: report_mirror.cnt_copied,
            cnt_created_dirs: report_mirror.cnt_created_dirs,
            cnt_skipped: report_mirror.cnt_skipped,
            errors: report_mirror
                .errors
                .into_iter()
                .map(PySpecMirrorError::from)
                .collect(),
            events: report_mirror
                .events
                .into_iter()
                .map(PySpecMirrorEvent::from)
                .collect(),
            if_cancelled: report_mirror.if_cancelled,
            summary,
        }
    }
}

#[pymethods]
impl PyReportMirror {
    #[getter]
    fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_created_dirs".to_string(), self.cnt_created_dirs);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts
    }

    fn __str__(&self) -> String {
        self.summary.clone()
    }
}

fn parse_rule_pattern(value: &str) -> PyResult<EnumMirrorPatternMode> {
    match value {
        "exact" => Ok(EnumMirrorPatternMode::Exact),
        "glob" => Ok(EnumMirrorPatternMode::Glob),
        "regex" => Ok(EnumMirrorPatternMode::Regex),
        _ => Err(PyValueError::new_err(format!(
            "Invalid pattern strategy: `{value}`. Expected one of: ['exact', 'glob', 'regex']"
        ))),
    }
}

fn map_mirror_tree_error(exception: MirrorTreeError) -> PyErr {
    let message = exception.to_string();
    match exception {
        MirrorTreeError::SourceMissing(_) => PyFileNotFoundError::new_err(message),
        MirrorTreeError::SourceInaccessible { .. } => PyPermissionError::new_err(message),
        MirrorTreeError::InvalidPattern(_) | MirrorTreeError::SourceDestinationOverlap { .. } => {
            PyValueError::new_err(message)
        }
        MirrorTreeError::DestinationInitFailed { .. } => PyOSError::new_err(message),
    }
}

/// Mirror `dir_source` into `dir_destination` and return a `ReportMirror`.
///
/// `path_log` names the error log file. When omitted, records go to `file-move.log` beside
/// the running executable, which here is the Python interpreter; that directory is often not
/// writable, and records then fall back to stderr. Pass `path_log` to keep a log file.
#[pyfunction(name = "mirror_tree")]
#[pyo3(signature = (
    dir_source,
    dir_destination,
    names_exclude = None,
    rule_pattern = "exact",
    if_preserve_metadata = false,
    path_log = None
))]
fn mirror_tree_py(
    py: Python<'_>,
    dir_source: String,
    dir_destination: String,
    names_exclude: Option<Vec<String>>,
    rule_pattern: &str,
    if_preserve_metadata: bool,
    path_log: Option<String>,
) -> PyResult<PyReportMirror> {
    let spec_mr_options = SpecMirrorOptions {
        names_exclude: names_exclude.unwrap_or_default(),
        rule_pattern: parse_rule_pattern(rule_pattern)?,
        if_preserve_metadata,
        flag_cancel: None,
    };
    let error_log = match path_log {
        Some(path_log) => FileErrorLog::new(path_log),
        None => FileErrorLog::beside_executable(),
    };

    let report_mirror = py.allow_threads(|| {
        mirror_tree(dir_source, dir_destination, spec_mr_options, &error_log)
    });
    let report_mirror = report_mirror.map_err(map_mirror_tree_error)?;
    Ok(PyReportMirror::from(report_mirror))
}

#[pymodule]
fn _mirrorkit_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySpecMirrorError>()?;
    module.add_class::<PySpecMirrorEvent>()?;
    module.add_class::<PyReportMirror>()?;
    module.add_function(wrap_pyfunction!(mirror_tree_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}

