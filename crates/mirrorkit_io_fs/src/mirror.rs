//! Source tree walk and destructive mirror orchestration.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use chrono::{SecondsFormat, Utc};
use mirrorkit_log::{ErrorLog, FileErrorLog};
use tracing::{error, info, warn};

use crate::report::{ReportMirror, ReportMirrorBuilder};
use crate::spec::{MirrorTreeError, SpecMirrorOptions};
use crate::util::{
    EnumEntryKind, SpecExcludeNames, classify_entry, copy_file_fresh, is_overlap,
    list_child_names, remove_existing_destination,
};

#[derive(Debug, Clone)]
struct SpecMirrorTask {
    path_src: PathBuf,
    path_dst: PathBuf,
}

struct SpecMirrorContext<'a> {
    spec_mr_options: SpecMirrorOptions,
    spec_ex_names: SpecExcludeNames,
    error_log: &'a dyn ErrorLog,
    builder_mr_report: ReportMirrorBuilder,
    l_tasks_pending: Vec<SpecMirrorTask>,
}

impl SpecMirrorContext<'_> {
    fn is_cancelled(&self) -> bool {
        self.spec_mr_options
            .flag_cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Queue children so that they pop in listing order.
    fn schedule_children(&mut self, path_src: &Path, path_dst: &Path, l_names: Vec<OsString>) {
        self.l_tasks_pending
            .extend(l_names.into_iter().rev().map(|name| SpecMirrorTask {
                path_src: path_src.join(&name),
                path_dst: path_dst.join(&name),
            }));
    }

    fn record_failure(&mut self, path_src: &Path, e: &io::Error) {
        let message = format!("Error processing \"{}\": {e}", path_src.display());
        error!("{message}");
        self.error_log.record(&message);
        self.builder_mr_report
            .add_error(path_src.to_path_buf(), e.to_string());
    }
}

/// Mirror `dir_source` into `dir_destination` with default options, logging
/// failures to `file-move.log` beside the running executable.
pub fn mirror<P, Q, I, S>(
    dir_source: P,
    dir_destination: Q,
    names_exclude: I,
) -> Result<ReportMirror, MirrorTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let error_log = FileErrorLog::beside_executable();
    mirror_tree(
        dir_source,
        dir_destination,
        SpecMirrorOptions::with_names_exclude(names_exclude),
        &error_log,
    )
}

/// Make `dir_destination` a copy of `dir_source`, minus excluded names.
///
/// Every non-excluded entry replaces its destination counterpart: directories
/// are deleted recursively and recreated before their children are written,
/// files are deleted and copied fresh. Nothing is merged.
///
/// Failures on single entries are logged to `error_log`, collected in the
/// returned [`ReportMirror`], and never stop the walk. Returns
/// [`MirrorTreeError`] only when validation fails before the walk starts (the
/// error is logged too); in that case the destination is left untouched.
pub fn mirror_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_mr_options: SpecMirrorOptions,
    error_log: &dyn ErrorLog,
) -> Result<ReportMirror, MirrorTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let time_start = Utc::now();
    info!(
        "Mirror started at {}",
        time_start.to_rfc3339_opts(SecondsFormat::Millis, true)
    );

    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    let spec_ex_names = match prepare_roots(&path_dir_src, &path_dir_dst, &spec_mr_options) {
        Ok(v) => v,
        Err(e) => {
            let message = e.to_string();
            error!("{message}");
            error_log.record(&message);
            return Err(e);
        }
    };

    let mut spec_mr_ctx = SpecMirrorContext {
        spec_mr_options,
        spec_ex_names,
        error_log,
        builder_mr_report: ReportMirrorBuilder::default(),
        l_tasks_pending: Vec::new(),
    };

    match list_child_names(&path_dir_src) {
        Ok(l_names) => spec_mr_ctx.schedule_children(&path_dir_src, &path_dir_dst, l_names),
        Err(e) => spec_mr_ctx.record_failure(&path_dir_src, &e),
    }
    walk_tasks(&mut spec_mr_ctx);

    let report = spec_mr_ctx.builder_mr_report.build();
    let time_end = Utc::now();
    info!("{report}");
    info!(
        "Mirror finished at {} ({} ms)",
        time_end.to_rfc3339_opts(SecondsFormat::Millis, true),
        (time_end - time_start).num_milliseconds()
    );
    Ok(report)
}

fn prepare_roots(
    path_dir_src: &Path,
    path_dir_dst: &Path,
    spec_mr_options: &SpecMirrorOptions,
) -> Result<SpecExcludeNames, MirrorTreeError> {
    let spec_ex_names =
        SpecExcludeNames::from_raw(&spec_mr_options.names_exclude, spec_mr_options.rule_pattern)?;

    match fs::metadata(path_dir_src) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(MirrorTreeError::SourceMissing(path_dir_src.to_path_buf()));
        }
        Err(e) => {
            return Err(MirrorTreeError::SourceInaccessible {
                path: path_dir_src.to_path_buf(),
                message: e.to_string(),
            });
        }
    }

    if is_overlap(path_dir_src, path_dir_dst) {
        return Err(MirrorTreeError::SourceDestinationOverlap {
            source_dir: path_dir_src.to_path_buf(),
            destination_dir: path_dir_dst.to_path_buf(),
        });
    }

    let b_dst_exists =
        path_dir_dst
            .try_exists()
            .map_err(|e| MirrorTreeError::DestinationInitFailed {
                path: path_dir_dst.to_path_buf(),
                message: e.to_string(),
            })?;
    if !b_dst_exists {
        fs::create_dir_all(path_dir_dst).map_err(|e| MirrorTreeError::DestinationInitFailed {
            path: path_dir_dst.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    Ok(spec_ex_names)
}

fn walk_tasks(spec_mr_ctx: &mut SpecMirrorContext<'_>) {
    while let Some(spec_task) = spec_mr_ctx.l_tasks_pending.pop() {
        if spec_mr_ctx.is_cancelled() {
            warn!(
                "Mirror cancelled with {} entries pending",
                spec_mr_ctx.l_tasks_pending.len() + 1
            );
            spec_mr_ctx.builder_mr_report.mark_cancelled();
            return;
        }
        visit_entry(spec_task, spec_mr_ctx);
    }
}

fn visit_entry(spec_task: SpecMirrorTask, spec_mr_ctx: &mut SpecMirrorContext<'_>) {
    let SpecMirrorTask { path_src, path_dst } = spec_task;

    let b_is_excluded = path_src
        .file_name()
        .is_some_and(|name| spec_mr_ctx.spec_ex_names.is_excluded(name));
    if b_is_excluded {
        info!("Skipped: {}", path_src.display());
        spec_mr_ctx.builder_mr_report.add_skipped(path_src);
        return;
    }

    spec_mr_ctx.builder_mr_report.add_scanned();
    if let Err(e) = process_entry(&path_src, &path_dst, spec_mr_ctx) {
        spec_mr_ctx.record_failure(&path_src, &e);
    }
}

fn process_entry(
    path_src: &Path,
    path_dst: &Path,
    spec_mr_ctx: &mut SpecMirrorContext<'_>,
) -> io::Result<()> {
    match classify_entry(path_src)? {
        EnumEntryKind::Directory => {
            remove_existing_destination(path_dst)?;
            fs::create_dir(path_dst)?;
            info!("Created directory: {}", path_dst.display());

            // Counted only once its children are known; a failed listing is the outcome.
            let l_names = list_child_names(path_src)?;
            spec_mr_ctx
                .builder_mr_report
                .add_created_dir(path_src.to_path_buf());
            spec_mr_ctx.schedule_children(path_src, path_dst, l_names);
        }
        EnumEntryKind::File => {
            remove_existing_destination(path_dst)?;
            copy_file_fresh(
                path_src,
                path_dst,
                spec_mr_ctx.spec_mr_options.if_preserve_metadata,
            )?;
            info!("Copied: {} -> {}", path_src.display(), path_dst.display());
            spec_mr_ctx
                .builder_mr_report
                .add_copied(path_src.to_path_buf());
        }
        EnumEntryKind::Other => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "Unsupported file type",
            ));
        }
    }
    Ok(())
}
