//! RUIE desktop shell: supervises the theming backend, hosts its web UI in a single
//! native window, and models the wizard page controller.

mod app_constants;
mod app_helpers;
mod app_runtime;
mod app_types;
pub mod backend_api;
pub mod backend_config;
mod backend_exit_watch;
pub mod backend_http;
pub mod backend_process_lifecycle;
pub mod backend_readiness;
mod backend_runtime;
pub mod color_convert;
pub mod color_presets;
mod desktop_bridge;
mod desktop_bridge_commands;
mod exit_events;
pub mod http_response;
pub mod launch_plan;
pub mod logging;
mod main_window;
pub mod operation_status;
pub mod origin_policy;
pub mod preview;
mod process_control;
mod runtime_paths;
mod startup_mode;
mod startup_task;
pub mod supervisor_error;
pub mod supervisor_state;
pub mod theme_file;
mod ui_dispatch;
pub mod wizard_error;
pub mod wizard_model;
pub mod wizard_runtime;

pub use app_constants::*;
pub(crate) use app_helpers::{
    append_desktop_log, append_log, append_shutdown_log, append_startup_log, build_debug_command,
    current_desktop_log_path,
};
pub use app_types::{AtomicFlagGuard, BackendState, LaunchPlan, RuntimeManifest};
pub use backend_config::BackendConfig;

pub fn run() {
    app_runtime::run();
}
