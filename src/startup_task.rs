use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log, backend_exit_watch, main_window, ui_dispatch, BackendState,
};

/// Brings the backend up off the main thread, then opens the window; any failure exits the app.
pub fn spawn_startup_task<F>(app_handle: AppHandle, log: F)
where
    F: Fn(&str) + Send + Copy + 'static,
{
    tauri::async_runtime::spawn_blocking(move || {
        let state = app_handle.state::<BackendState>();
        let resource_dir = app_handle.path().resource_dir().ok();

        if let Err(error) = state.ensure_backend_ready(resource_dir.as_deref()) {
            if !error.is_fatal() {
                log(&format!("startup skipped: {error}"));
                return;
            }
            log(&format!("backend startup failed, aborting: {error}"));
            state.stop_backend();
            app_handle.exit(1);
            return;
        }

        backend_exit_watch::spawn_exit_watcher(app_handle.clone());

        let dispatch = ui_dispatch::run_on_main_thread_dispatch(
            &app_handle,
            "create main window",
            move |main_app| {
                if let Err(error) = main_window::create_main_window(main_app, append_desktop_log) {
                    log(&format!("{error}; exiting"));
                    main_app.state::<BackendState>().stop_backend();
                    main_app.exit(1);
                }
            },
        );
        if let Err(error) = dispatch {
            log(&error);
            state.stop_backend();
            app_handle.exit(1);
        }
    });
}
