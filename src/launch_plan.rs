use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    runtime_paths, LaunchPlan, RuntimeManifest, BACKEND_CMD_ENV, BACKEND_CWD_ENV,
    BACKEND_ENTRYPOINT, BACKEND_RESOURCE_DIR, BACKEND_RUNTIME_MANIFEST, DEFAULT_PYTHON_COMMAND,
    PYTHON_ENV,
};

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn python_command() -> String {
    env_value(PYTHON_ENV).unwrap_or_else(|| DEFAULT_PYTHON_COMMAND.to_string())
}

/// Picks how to launch the backend: explicit command override, then the packaged layout, then the dev checkout.
pub fn resolve_launch_plan(resource_dir: Option<&Path>) -> Result<LaunchPlan, String> {
    if let Some(custom_cmd) = env_value(BACKEND_CMD_ENV) {
        let cwd = env_value(BACKEND_CWD_ENV)
            .map(PathBuf::from)
            .or_else(runtime_paths::detect_backend_source_root)
            .unwrap_or_else(runtime_paths::workspace_root_dir);
        return resolve_custom_launch(&custom_cmd, cwd);
    }

    if let Some(plan) = resource_dir
        .map(resolve_packaged_launch)
        .transpose()?
        .flatten()
    {
        return Ok(plan);
    }

    resolve_dev_launch()
}

pub fn resolve_custom_launch(custom_cmd: &str, cwd: PathBuf) -> Result<LaunchPlan, String> {
    let mut pieces = shlex::split(custom_cmd)
        .ok_or_else(|| format!("Invalid {BACKEND_CMD_ENV}: {custom_cmd}"))?;
    if pieces.is_empty() {
        return Err(format!("{BACKEND_CMD_ENV} is empty."));
    }

    let cmd = pieces.remove(0);
    Ok(LaunchPlan {
        cmd,
        args: pieces,
        cwd,
        packaged_mode: false,
    })
}

pub fn resolve_packaged_launch(resource_dir: &Path) -> Result<Option<LaunchPlan>, String> {
    let backend_dir = resource_dir.join(BACKEND_RESOURCE_DIR);
    let manifest_path = resource_dir.join(BACKEND_RUNTIME_MANIFEST);

    let manifest = if manifest_path.is_file() {
        let manifest_text = fs::read_to_string(&manifest_path).map_err(|error| {
            format!(
                "Failed to read packaged backend manifest {}: {}",
                manifest_path.display(),
                error
            )
        })?;
        serde_json::from_str::<RuntimeManifest>(&manifest_text).map_err(|error| {
            format!(
                "Failed to parse packaged backend manifest {}: {}",
                manifest_path.display(),
                error
            )
        })?
    } else if backend_dir.join(BACKEND_ENTRYPOINT).is_file() {
        RuntimeManifest::default()
    } else {
        return Ok(None);
    };

    let entrypoint = backend_dir.join(
        manifest
            .entrypoint
            .as_deref()
            .unwrap_or(BACKEND_ENTRYPOINT),
    );
    if !entrypoint.is_file() {
        return Err(format!(
            "Packaged backend entrypoint is missing: {}",
            entrypoint.display()
        ));
    }

    let cmd = match manifest.python.as_deref() {
        Some(relative) => {
            let python_path = backend_dir.join(relative);
            if !python_path.is_file() {
                return Err(format!(
                    "Packaged runtime python executable is missing: {}",
                    python_path.display()
                ));
            }
            python_path.to_string_lossy().to_string()
        }
        None => python_command(),
    };

    Ok(Some(LaunchPlan {
        cmd,
        args: vec![entrypoint.to_string_lossy().to_string()],
        cwd: env_value(BACKEND_CWD_ENV)
            .map(PathBuf::from)
            .unwrap_or(backend_dir),
        packaged_mode: true,
    }))
}

pub fn resolve_dev_launch() -> Result<LaunchPlan, String> {
    let source_root = runtime_paths::detect_backend_source_root().ok_or_else(|| {
        format!("Cannot locate {BACKEND_ENTRYPOINT}. Set RUIE_SERVER_DIR to the backend checkout.")
    })?;

    Ok(LaunchPlan {
        cmd: python_command(),
        args: vec![source_root
            .join(BACKEND_ENTRYPOINT)
            .to_string_lossy()
            .to_string()],
        cwd: env_value(BACKEND_CWD_ENV)
            .map(PathBuf::from)
            .unwrap_or(source_root),
        packaged_mode: false,
    })
}
