use std::{thread, time::Duration};

use tauri::{AppHandle, Manager};

use crate::{supervisor_state::SupervisorPhase, BackendState, EXIT_WATCH_INTERVAL_MS};

/// Watches a healthy backend for an exit nobody asked for. Logged only; there is no automatic restart.
pub fn spawn_exit_watcher(app_handle: AppHandle) {
    thread::spawn(move || loop {
        thread::sleep(Duration::from_millis(EXIT_WATCH_INTERVAL_MS));
        let state = app_handle.state::<BackendState>();
        if state.phase() != SupervisorPhase::Healthy || state.is_quitting() {
            return;
        }
        if state.poll_unexpected_exit().is_some() {
            return;
        }
    });
}
