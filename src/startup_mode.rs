use std::env;

use crate::DEV_MODE_ENV;

/// `RUIE_DESKTOP_DEV` wins when it holds a recognizable boolean; otherwise the build flavor decides.
pub fn resolve_dev_mode(env_value: Option<&str>, build_is_dev: bool) -> bool {
    match env_value.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if matches!(value.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(value) if matches!(value.as_str(), "0" | "false" | "no" | "off") => false,
        _ => build_is_dev,
    }
}

pub fn is_dev_mode() -> bool {
    resolve_dev_mode(env::var(DEV_MODE_ENV).ok().as_deref(), tauri::is_dev())
}
