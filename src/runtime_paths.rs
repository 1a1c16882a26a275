use std::{env, path::PathBuf};

use crate::{BACKEND_ENTRYPOINT, PACKAGED_ROOT_DIR_NAME, ROOT_DIR_ENV, SERVER_DIR_ENV};

fn non_empty_env_path(key: &str) -> Option<PathBuf> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

/// Directory holding logs and saved desktop state.
pub fn default_packaged_root_dir() -> Option<PathBuf> {
    if let Some(root) = non_empty_env_path(ROOT_DIR_ENV) {
        return Some(root);
    }
    home::home_dir().map(|home| home.join(PACKAGED_ROOT_DIR_NAME))
}

pub fn workspace_root_dir() -> PathBuf {
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    candidate.canonicalize().unwrap_or(candidate)
}

/// Locates the development checkout of the backend, i.e. a directory with `server.py`.
pub fn detect_backend_source_root() -> Option<PathBuf> {
    if let Some(candidate) = non_empty_env_path(SERVER_DIR_ENV) {
        if candidate.join(BACKEND_ENTRYPOINT).is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }

    let workspace_root = workspace_root_dir();
    let candidates = [
        workspace_root.join("backend"),
        workspace_root.join(".."),
        workspace_root,
    ];
    for candidate in candidates {
        if candidate.join(BACKEND_ENTRYPOINT).is_file() {
            return Some(candidate.canonicalize().unwrap_or(candidate));
        }
    }
    None
}
