use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{append_shutdown_log, BackendState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    StopBackendAndExit,
    StopBackendKeepRunning,
}

/// `code == None` means the last window closed rather than an explicit exit.
/// On macOS the app outlives its windows until the user quits.
pub fn decide_exit_request(code: Option<i32>, is_macos: bool, quitting: bool) -> ExitDecision {
    if code.is_none() && is_macos && !quitting {
        ExitDecision::StopBackendKeepRunning
    } else {
        ExitDecision::StopBackendAndExit
    }
}

pub fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>, api: &ExitRequestApi) {
    let state = app_handle.state::<BackendState>();
    match decide_exit_request(code, cfg!(target_os = "macos"), state.is_quitting()) {
        ExitDecision::StopBackendKeepRunning => {
            append_shutdown_log("all windows closed; stopping backend and staying resident");
            api.prevent_exit();
            state.stop_backend();
        }
        ExitDecision::StopBackendAndExit => {
            append_shutdown_log(&format!("exit requested (code={code:?}); stopping backend"));
            state.mark_quitting();
            state.stop_backend();
        }
    }
}

pub fn handle_exit_event(app_handle: &AppHandle) {
    let state = app_handle.state::<BackendState>();
    state.mark_quitting();
    state.stop_backend();
    append_shutdown_log("desktop process exiting");
}
