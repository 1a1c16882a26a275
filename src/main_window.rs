use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};
use url::Url;

use crate::{
    origin_policy, startup_mode, supervisor_state::SupervisorPhase, BackendState,
    MAIN_WINDOW_HEIGHT, MAIN_WINDOW_LABEL, MAIN_WINDOW_MIN_HEIGHT, MAIN_WINDOW_MIN_WIDTH,
    MAIN_WINDOW_TITLE, MAIN_WINDOW_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    Create,
    FocusExisting,
    Refuse,
}

pub fn decide_main_window(phase: SupervisorPhase, window_exists: bool) -> WindowDecision {
    if phase != SupervisorPhase::Healthy {
        return WindowDecision::Refuse;
    }
    if window_exists {
        WindowDecision::FocusExisting
    } else {
        WindowDecision::Create
    }
}

pub fn focus_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        log("focus_main_window skipped: main window not found");
        return;
    };
    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}

/// Opens the single top-level window on the backend's page. Refuses unless the backend is healthy.
pub fn create_main_window<F>(app_handle: &AppHandle, log: F) -> Result<(), String>
where
    F: Fn(&str),
{
    let state = app_handle.state::<BackendState>();
    let window_exists = app_handle.get_webview_window(MAIN_WINDOW_LABEL).is_some();
    match decide_main_window(state.phase(), window_exists) {
        WindowDecision::Refuse => {
            return Err(format!(
                "Refusing to create main window while backend is {:?}.",
                state.phase()
            ));
        }
        WindowDecision::FocusExisting => {
            focus_main_window(app_handle, log);
            return Ok(());
        }
        WindowDecision::Create => {}
    }

    let backend_url = state.backend_url().to_string();
    let parsed = Url::parse(&backend_url)
        .map_err(|error| format!("Invalid backend URL {backend_url}: {error}"))?;
    let navigation_origin = backend_url.clone();

    let window = WebviewWindowBuilder::new(app_handle, MAIN_WINDOW_LABEL, WebviewUrl::External(parsed))
        .title(MAIN_WINDOW_TITLE)
        .inner_size(MAIN_WINDOW_WIDTH, MAIN_WINDOW_HEIGHT)
        .min_inner_size(MAIN_WINDOW_MIN_WIDTH, MAIN_WINDOW_MIN_HEIGHT)
        .center()
        .on_navigation(move |target| {
            origin_policy::allow_navigation(&navigation_origin, target)
        })
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))?;

    log(&format!(
        "main window '{}' created for {backend_url}",
        window.label()
    ));

    if startup_mode::is_dev_mode() {
        #[cfg(debug_assertions)]
        window.open_devtools();
        log("development mode: devtools enabled");
    }

    Ok(())
}
