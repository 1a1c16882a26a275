use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
    thread,
};

use crate::{
    backend_api::{ApiRequest, BackendClient},
    color_presets::{PresetCatalog, PRESET_ROUTE_PREFIX},
    operation_status::{self, fetch_operation_status},
    theme_file,
    wizard_error::WizardError,
    wizard_model::{update, Effect, Msg, WizardModel},
};

/// Executes wizard effects against a live backend.
#[derive(Debug, Clone)]
pub struct EffectRunner {
    client: BackendClient,
    export_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(client: BackendClient, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            export_dir: export_dir.into(),
        }
    }

    /// Runs one effect and returns the messages it produced. Preview sync is the page's job.
    pub fn run(&self, effect: Effect) -> Vec<Msg> {
        match effect {
            Effect::Api { tag, request } => vec![Msg::Response {
                tag,
                result: self.client.send(&request),
            }],
            Effect::UploadFile {
                tag,
                target_path,
                source,
            } => {
                let result = read_upload(&source).and_then(|(file_name, bytes)| {
                    self.client
                        .send(&ApiRequest::upload(&target_path, &file_name, bytes))
                });
                vec![Msg::Response { tag, result }]
            }
            Effect::PollOperation { operation } => {
                let mut messages = Vec::new();
                let result = operation_status::poll_operation(
                    &operation,
                    || fetch_operation_status(&self.client),
                    thread::sleep,
                    |progress| messages.push(Msg::OperationProgress(progress.clone())),
                );
                messages.push(Msg::OperationFinished(result));
                messages
            }
            Effect::WriteThemeFile(document) => vec![Msg::ThemeWritten(
                theme_file::write_theme_file(&self.export_dir, &document),
            )],
            Effect::LoadPresets => {
                let (catalog, warnings) = PresetCatalog::load_with(|file_name| {
                    self.client
                        .fetch_text(&format!("{PRESET_ROUTE_PREFIX}{file_name}"))
                        .map_err(|error| error.to_string())
                });
                vec![Msg::PresetsLoaded { catalog, warnings }]
            }
            Effect::SyncPreview(_) => Vec::new(),
        }
    }

    /// Feeds `msg` through `update` and runs every resulting effect until the queue drains.
    pub fn dispatch(&self, model: &WizardModel, msg: Msg) -> WizardModel {
        let mut current = model.clone();
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let (next, effects) = update(&current, msg);
            current = next;
            for effect in effects {
                queue.extend(self.run(effect));
            }
        }
        current
    }
}

fn read_upload(source: &Path) -> Result<(String, Vec<u8>), WizardError> {
    let bytes = fs::read(source)
        .map_err(|error| WizardError::Io(format!("{}: {error}", source.display())))?;
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    Ok((file_name, bytes))
}
