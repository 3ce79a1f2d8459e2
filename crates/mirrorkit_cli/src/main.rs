mod args;
mod logging;

use anyhow::Context;
use clap::Parser;
use mirrorkit_io_fs::mirror_tree;
use mirrorkit_log::FileErrorLog;
use tracing::debug;

use crate::args::Args;
use crate::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level());

    let error_log = match &args.log_file {
        Some(path_log) => {
            if let Some(path_dir_log) = path_log.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(path_dir_log).with_context(|| {
                    format!("Failed to create log directory {}", path_dir_log.display())
                })?;
            }
            FileErrorLog::new(path_log)
        }
        None => FileErrorLog::beside_executable(),
    };
    debug!("Error log: {}", error_log.path().display());

    let b_failed = match mirror_tree(
        &args.source,
        &args.destination,
        args.to_options(),
        &error_log,
    ) {
        Ok(report) => report.error_count() > 0,
        // Already reported on the console and in the error log.
        Err(_) => true,
    };

    if b_failed && args.fail_on_error {
        std::process::exit(1);
    }
    Ok(())
}
