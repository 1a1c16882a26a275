use tauri::{webview::PageLoadEvent, Manager, RunEvent};

use crate::{
    append_desktop_log, append_startup_log, current_desktop_log_path, desktop_bridge,
    exit_events, main_window, origin_policy, startup_task, BackendState,
};

pub fn run() {
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        current_desktop_log_path().display()
    ));

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app_handle, _args, _cwd| {
            append_desktop_log("second instance launched; focusing existing window");
            main_window::focus_main_window(app_handle, append_desktop_log);
        }))
        .manage(BackendState::default())
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_get_app_version,
            crate::desktop_bridge_commands::desktop_bridge_is_dev_mode,
        ])
        .on_page_load(|webview, payload| {
            let phase = match payload.event() {
                PageLoadEvent::Started => "started",
                PageLoadEvent::Finished => "finished",
            };
            append_desktop_log(&format!("page-load {phase}: {}", payload.url()));

            let state = webview.app_handle().state::<BackendState>();
            if origin_policy::should_inject_host_bridge(state.backend_url(), payload.url()) {
                desktop_bridge::inject_host_bridge(webview);
            }
        })
        .setup(|app| {
            startup_task::spawn_startup_task(app.handle().clone(), append_startup_log);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                exit_events::handle_exit_requested(app_handle, code, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen {
                has_visible_windows: false,
                ..
            } => {
                append_startup_log("application reopened without windows; restarting backend");
                startup_task::spawn_startup_task(app_handle.clone(), append_startup_log);
            }
            _ => {}
        });
}
