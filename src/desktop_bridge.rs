use tauri::Webview;

use crate::append_desktop_log;

pub const GET_APP_VERSION_COMMAND: &str = "desktop_bridge_get_app_version";
pub const IS_DEV_MODE_COMMAND: &str = "desktop_bridge_is_dev_mode";

/// Exposes `window.desktopHost` with exactly two calls. Re-injection is a no-op.
pub fn host_bridge_script() -> String {
    format!(
        r#"(() => {{
  if (window.desktopHost) {{
    return;
  }}
  const invoke = (command) => {{
    const internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== 'function') {{
      return Promise.reject(new Error('desktop bridge is unavailable'));
    }}
    return internals.invoke(command);
  }};
  Object.defineProperty(window, 'desktopHost', {{
    value: Object.freeze({{
      getVersion: () => invoke('{GET_APP_VERSION_COMMAND}'),
      isDev: () => invoke('{IS_DEV_MODE_COMMAND}'),
    }}),
    writable: false,
    configurable: false,
  }});
}})();"#
    )
}

pub fn inject_host_bridge(webview: &Webview) {
    if let Err(error) = webview.eval(&host_bridge_script()) {
        append_desktop_log(&format!("failed to inject desktop host bridge: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_bridge_script_exposes_only_version_and_dev_flag() {
        let script = host_bridge_script();
        assert!(script.contains("getVersion: () => invoke('desktop_bridge_get_app_version')"));
        assert!(script.contains("isDev: () => invoke('desktop_bridge_is_dev_mode')"));
        assert_eq!(script.matches("invoke('").count(), 2);
        assert!(script.contains("Object.freeze"));
    }
}
