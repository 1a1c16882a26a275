use std::{path::PathBuf, sync::OnceLock};

use crate::{
    logging::{self, LogCategory},
    runtime_paths, LaunchPlan, DESKTOP_LOG_FILE,
};

fn desktop_log_path() -> &'static PathBuf {
    static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
    LOG_PATH.get_or_init(|| {
        logging::resolve_desktop_log_path(
            runtime_paths::default_packaged_root_dir(),
            DESKTOP_LOG_FILE,
        )
    })
}

pub fn append_log(category: LogCategory, message: &str) {
    logging::append_log_line(desktop_log_path(), category, message);
}

pub fn append_desktop_log(message: &str) {
    append_log(LogCategory::Desktop, message);
}

pub fn append_startup_log(message: &str) {
    append_log(LogCategory::Startup, message);
}

pub fn append_shutdown_log(message: &str) {
    append_log(LogCategory::Shutdown, message);
}

pub fn build_debug_command(plan: &LaunchPlan) -> Vec<String> {
    let mut parts = vec![plan.cmd.clone()];
    parts.extend(plan.args.clone());
    parts
}

pub fn current_desktop_log_path() -> PathBuf {
    desktop_log_path().clone()
}
