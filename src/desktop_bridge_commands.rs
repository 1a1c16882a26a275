use tauri::AppHandle;

use crate::startup_mode;

#[tauri::command]
pub(crate) fn desktop_bridge_get_app_version(app_handle: AppHandle) -> String {
    app_handle.package_info().version.to_string()
}

#[tauri::command]
pub(crate) fn desktop_bridge_is_dev_mode() -> bool {
    startup_mode::is_dev_mode()
}
