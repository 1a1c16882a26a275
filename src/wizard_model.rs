//! Wizard page controller as an immutable view-model.
//!
//! `update` never performs I/O. It returns the next model plus the effects a runner
//! must execute; results come back as further messages.

use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Local};
use serde_json::{json, Value};

use crate::{
    backend_api::{ApiEndpoint, ApiRequest},
    color_presets::{ColorMap, MediaMap, Preset, PresetCatalog},
    operation_status::{OperationStatus, ProgressUpdate},
    preview::PreviewState,
    theme_file::{self, MusicTrack, ThemeDocument},
    wizard_error::WizardError,
};

pub const APPLY_COLORS_OPERATION: &str = "apply-colors";
pub const EXTRACT_OPERATION: &str = "extract";
pub const FALLBACK_MUSIC: [&str; 2] = ["GrimHex.ogg", "StarMarine.ogg"];
const MUSIC_ASSET_DIR: &str = "assets/musics";
const MUSIC_ROUTE_PREFIX: &str = "/musics/";
const LAUNCHER_RUNNING_TEXT: &str =
    "RSI Launcher is currently running. Please close it before proceeding, then try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    #[default]
    Launcher,
    Colors,
    Media,
    Music,
    Backup,
    Finalize,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        Self::Launcher,
        Self::Colors,
        Self::Media,
        Self::Music,
        Self::Backup,
        Self::Finalize,
    ];

    /// One-based position, as shown in the stepper.
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|step| *step == self)
            .map_or(1, |index| index + 1)
    }

    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(self)
    }

    pub fn previous(self) -> Self {
        Self::from_number(self.number() - 1).unwrap_or(self)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Launcher => "Select Launcher",
            Self::Colors => "Colors",
            Self::Media => "Media",
            Self::Music => "Music",
            Self::Backup => "Backups",
            Self::Finalize => "Finalize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusArea {
    Launcher,
    Extract,
    Colors,
    Media,
    Music,
    Backup,
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// A music entry; `file` is set for tracks the user added from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardTrack {
    pub track: MusicTrack,
    pub file: Option<PathBuf>,
}

impl WizardTrack {
    pub fn bundled(name: &str) -> Self {
        Self {
            track: MusicTrack::bundled(name),
            file: None,
        }
    }

    fn needs_upload(&self) -> bool {
        self.file.is_some() || !self.track.is_default
    }
}

/// What the backend last accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedConfig {
    pub colors: ColorMap,
    pub media: MediaMap,
    pub music: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCommit {
    Colors(ColorMap),
    Extraction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub operation: String,
    pub area: StatusArea,
    pub commit: PendingCommit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardModel {
    pub step: WizardStep,
    pub colors: ColorMap,
    pub media: MediaMap,
    pub music: Vec<WizardTrack>,
    pub theme_name: Option<String>,
    pub applied: AppliedConfig,
    pub preview: PreviewState,
    pub extracts: Vec<Value>,
    pub backups: Vec<Value>,
    pub statuses: BTreeMap<StatusArea, StatusMessage>,
    pub pending: Option<PendingOperation>,
    pub presets: PresetCatalog,
    pub saved_themes: Vec<Value>,
}

impl WizardModel {
    pub fn status(&self, area: StatusArea) -> Option<&StatusMessage> {
        self.statuses.get(&area)
    }

    fn with_status(mut self, area: StatusArea, message: StatusMessage) -> Self {
        self.statuses.insert(area, message);
        self
    }

    pub fn can_go_back(&self) -> bool {
        self.step != WizardStep::Launcher
    }

    pub fn can_go_next(&self) -> bool {
        self.step != WizardStep::Finalize
    }

    /// `{name, config}` body shared by save and export. Media is sent as the replaced asset paths.
    fn theme_config_payload(&self, name: &str) -> Value {
        let media_paths: Vec<&String> = self.media.keys().collect();
        let music: Vec<MusicTrack> = self.music.iter().map(|entry| entry.track.clone()).collect();
        json!({
            "name": name,
            "config": {
                "colors": self.colors,
                "media": media_paths,
                "music": music,
            }
        })
    }
}

/// One-shot backend actions whose only model effect is a status message and an optional list refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    DetectLauncher,
    InitSession { asar_path: String },
    BrowseForAsar,
    UseExtract { path: String },
    DeleteExtract { path: String },
    CreateBackup { name: String },
    RestoreBackup { path: String },
    DeleteBackup { path: String },
    OpenBackupsFolder,
    OpenExtractionsFolder,
    Repack,
    CompileChanges,
    TestLauncher,
    DeployTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRefresh {
    Extracts,
    Backups,
}

/// `Backup - <local time>`, the name given to backups made from the wizard.
pub fn backup_name(at: &DateTime<Local>) -> String {
    format!("Backup - {}", at.format("%Y-%m-%d %H:%M:%S"))
}

impl WizardAction {
    pub fn create_backup() -> Self {
        Self::CreateBackup {
            name: backup_name(&Local::now()),
        }
    }

    fn request(&self) -> ApiRequest {
        match self {
            Self::DetectLauncher => ApiRequest::new(ApiEndpoint::DetectLauncher),
            Self::InitSession { asar_path } => {
                ApiRequest::json(ApiEndpoint::Init, json!({ "asarPath": asar_path }))
            }
            Self::BrowseForAsar => ApiRequest::new(ApiEndpoint::BrowseForAsar),
            Self::UseExtract { path } => {
                ApiRequest::json(ApiEndpoint::UseExtract, json!({ "path": path }))
            }
            Self::DeleteExtract { path } => {
                ApiRequest::json(ApiEndpoint::DeleteExtract, json!({ "path": path }))
            }
            Self::CreateBackup { name } => {
                ApiRequest::json(ApiEndpoint::CreateBackup, json!({ "name": name }))
            }
            Self::RestoreBackup { path } => {
                ApiRequest::json(ApiEndpoint::RestoreBackup, json!({ "path": path }))
            }
            Self::DeleteBackup { path } => {
                ApiRequest::json(ApiEndpoint::DeleteBackup, json!({ "path": path }))
            }
            Self::OpenBackupsFolder => ApiRequest::new(ApiEndpoint::OpenBackupsFolder),
            Self::OpenExtractionsFolder => ApiRequest::new(ApiEndpoint::OpenExtractionsFolder),
            Self::Repack => ApiRequest::new(ApiEndpoint::Repack),
            Self::CompileChanges => ApiRequest::new(ApiEndpoint::CompileChanges),
            Self::TestLauncher => ApiRequest::new(ApiEndpoint::TestLauncher),
            Self::DeployTheme => ApiRequest::new(ApiEndpoint::DeployTheme),
        }
    }

    fn area(&self) -> StatusArea {
        match self {
            Self::DetectLauncher | Self::InitSession { .. } | Self::BrowseForAsar => {
                StatusArea::Launcher
            }
            Self::UseExtract { .. } | Self::DeleteExtract { .. } | Self::OpenExtractionsFolder => {
                StatusArea::Extract
            }
            Self::CreateBackup { .. }
            | Self::RestoreBackup { .. }
            | Self::DeleteBackup { .. }
            | Self::OpenBackupsFolder => StatusArea::Backup,
            Self::Repack | Self::CompileChanges | Self::TestLauncher | Self::DeployTheme => {
                StatusArea::Finalize
            }
        }
    }

    fn progress_text(&self) -> &'static str {
        match self {
            Self::DetectLauncher => "Detecting launcher...",
            Self::InitSession { .. } => "Initializing session...",
            Self::BrowseForAsar => "Opening file browser...",
            Self::UseExtract { .. } => "Using selected extracted folder...",
            Self::DeleteExtract { .. } => "Deleting extracted folder...",
            Self::CreateBackup { .. } => "Creating backup...",
            Self::RestoreBackup { .. } => "Restoring backup...",
            Self::DeleteBackup { .. } => "Deleting backup...",
            Self::OpenBackupsFolder => "Opening backups folder...",
            Self::OpenExtractionsFolder => "Opening extractions folder...",
            Self::Repack => "Repacking archive...",
            Self::CompileChanges => "Compiling changes...",
            Self::TestLauncher => "Packing theme and launching the launcher...",
            Self::DeployTheme => "Deploying theme...",
        }
    }

    fn success_text(&self) -> &'static str {
        match self {
            Self::DetectLauncher => "✓ Launcher detected",
            Self::InitSession { .. } => "✓ Session initialized",
            Self::BrowseForAsar => "✓ Archive selected",
            Self::UseExtract { .. } => "✓ Using selected extracted folder",
            Self::DeleteExtract { .. } => "✓ Extracted folder deleted",
            Self::CreateBackup { .. } => "✓ Backup created",
            Self::RestoreBackup { .. } => "✓ Backup restored",
            Self::DeleteBackup { .. } => "✓ Backup deleted",
            Self::OpenBackupsFolder | Self::OpenExtractionsFolder => "✓ Folder opened",
            Self::Repack => "✓ Archive repacked",
            Self::CompileChanges => "✓ Changes compiled",
            Self::TestLauncher => "✓ Launcher started with test theme",
            Self::DeployTheme => "✓ Theme deployed successfully",
        }
    }

    fn refresh(&self) -> Option<ListRefresh> {
        match self {
            Self::UseExtract { .. } | Self::DeleteExtract { .. } => Some(ListRefresh::Extracts),
            Self::CreateBackup { .. } | Self::RestoreBackup { .. } | Self::DeleteBackup { .. } => {
                Some(ListRefresh::Backups)
            }
            _ => None,
        }
    }
}

/// Identifies which request a response belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestTag {
    ExtractedList,
    Backups,
    DefaultMusic,
    Extract,
    ApplyColors(ColorMap),
    MediaUpload { index: usize },
    ClearMusic,
    MusicUpload { index: usize },
    UpdateMusicCode,
    SaveTheme { name: String },
    ExportTheme { name: String },
    SavedThemes,
    LoadTheme,
    LauncherStatus { asar_path: String },
    Action(WizardAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Api { tag: RequestTag, request: ApiRequest },
    UploadFile {
        tag: RequestTag,
        target_path: String,
        source: PathBuf,
    },
    SyncPreview(PreviewState),
    PollOperation { operation: String },
    WriteThemeFile(ThemeDocument),
    LoadPresets,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Next,
    Back,
    GoTo(WizardStep),
    LoadPresets,
    PresetsLoaded {
        catalog: PresetCatalog,
        warnings: Vec<String>,
    },
    SetColor { token: String, value: String },
    RemoveColor { token: String },
    ApplyPreset(Preset),
    ApplyColors,
    SetMedia { asset_path: String, replacement: String },
    RemoveMedia { asset_path: String },
    ApplyMedia,
    AddTrack { name: String, file: PathBuf },
    RemoveTrack { index: usize },
    LoadDefaultMusic,
    ApplyMusic,
    Extract,
    ImportTheme { text: String },
    ExportTheme { name: String },
    SaveTheme { name: String },
    ListThemes,
    LoadTheme { filename: String },
    Action(WizardAction),
    Response {
        tag: RequestTag,
        result: Result<Value, WizardError>,
    },
    OperationProgress(ProgressUpdate),
    OperationFinished(Result<OperationStatus, WizardError>),
    ThemeWritten(Result<PathBuf, WizardError>),
}

pub fn update(model: &WizardModel, msg: Msg) -> (WizardModel, Vec<Effect>) {
    let model = model.clone();
    match msg {
        Msg::Next => {
            let step = model.step.next();
            navigate(model, step)
        }
        Msg::Back => {
            let step = model.step.previous();
            navigate(model, step)
        }
        Msg::GoTo(step) => navigate(model, step),
        Msg::LoadPresets => (model, vec![Effect::LoadPresets]),
        Msg::PresetsLoaded { catalog, warnings } => presets_loaded(model, catalog, &warnings),
        Msg::SetColor { token, value } => set_color(model, token, value),
        Msg::RemoveColor { token } => {
            let mut next = model;
            next.colors.remove(&token);
            sync_preview_with_colors(next)
        }
        Msg::ApplyPreset(preset) => apply_preset(model, preset),
        Msg::ApplyColors => apply_colors(model),
        Msg::SetMedia {
            asset_path,
            replacement,
        } => {
            let mut next = model;
            let change = MediaMap::from([(asset_path.clone(), replacement.clone())]);
            next.media.insert(asset_path, replacement);
            next.preview = next.preview.merge_media(&change);
            let preview = next.preview.clone();
            (next, vec![Effect::SyncPreview(preview)])
        }
        Msg::RemoveMedia { asset_path } => {
            let mut next = model;
            next.media.remove(&asset_path);
            (next, Vec::new())
        }
        Msg::ApplyMedia => apply_media(model),
        Msg::AddTrack { name, file } => {
            let mut next = model;
            next.music.push(WizardTrack {
                track: MusicTrack {
                    name,
                    is_default: false,
                },
                file: Some(file),
            });
            (next, Vec::new())
        }
        Msg::RemoveTrack { index } => {
            let mut next = model;
            if index < next.music.len() {
                next.music.remove(index);
            }
            (next, Vec::new())
        }
        Msg::LoadDefaultMusic => (
            model,
            vec![Effect::Api {
                tag: RequestTag::DefaultMusic,
                request: ApiRequest::new(ApiEndpoint::DefaultMusic),
            }],
        ),
        Msg::ApplyMusic => apply_music(model),
        Msg::Extract => (
            model.with_status(StatusArea::Extract, StatusMessage::info("Extracting archive...")),
            vec![Effect::Api {
                tag: RequestTag::Extract,
                request: ApiRequest::new(ApiEndpoint::Extract),
            }],
        ),
        Msg::ImportTheme { text } => import_theme(model, &text),
        Msg::ExportTheme { name } => export_theme(model, name),
        Msg::SaveTheme { name } => save_theme(model, name),
        Msg::ListThemes => (
            model.with_status(StatusArea::Finalize, StatusMessage::info("Loading saved themes...")),
            vec![Effect::Api {
                tag: RequestTag::SavedThemes,
                request: ApiRequest::new(ApiEndpoint::ConfigList),
            }],
        ),
        Msg::LoadTheme { filename } => (
            model.with_status(StatusArea::Finalize, StatusMessage::info("Loading theme...")),
            vec![Effect::Api {
                tag: RequestTag::LoadTheme,
                request: ApiRequest::json(ApiEndpoint::ConfigLoad, json!({ "filename": filename })),
            }],
        ),
        Msg::Action(WizardAction::InitSession { asar_path }) => init_session(model, asar_path),
        Msg::Action(action) => run_action(model, action),
        Msg::Response { tag, result } => handle_response(model, tag, result),
        Msg::OperationProgress(progress) => {
            let Some(pending) = model.pending.clone() else {
                return (model, Vec::new());
            };
            if pending.operation != progress.operation {
                return (model, Vec::new());
            }
            let text = format!("{}% - {}", progress.percent, progress.message);
            (model.with_status(pending.area, StatusMessage::info(text)), Vec::new())
        }
        Msg::OperationFinished(result) => finish_operation(model, result),
        Msg::ThemeWritten(result) => {
            let message = match result {
                Ok(path) => {
                    let file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    StatusMessage::success(format!("✓ Theme exported: {file_name}"))
                }
                Err(error) => StatusMessage::error(error.to_string()),
            };
            (model.with_status(StatusArea::Finalize, message), Vec::new())
        }
    }
}

fn navigate(model: WizardModel, step: WizardStep) -> (WizardModel, Vec<Effect>) {
    let mut next = model;
    next.step = step;
    if step == WizardStep::Colors && !next.colors.is_empty() {
        next.preview = next.preview.with_colors(&next.colors);
    }

    let mut effects = vec![Effect::SyncPreview(next.preview.clone())];
    match step {
        WizardStep::Launcher => {
            effects.push(list_request(ListRefresh::Extracts));
            effects.push(list_request(ListRefresh::Backups));
        }
        WizardStep::Music if next.music.is_empty() => effects.push(Effect::Api {
            tag: RequestTag::DefaultMusic,
            request: ApiRequest::new(ApiEndpoint::DefaultMusic),
        }),
        WizardStep::Backup => effects.push(list_request(ListRefresh::Backups)),
        _ => {}
    }
    (next, effects)
}

fn list_request(list: ListRefresh) -> Effect {
    match list {
        ListRefresh::Extracts => Effect::Api {
            tag: RequestTag::ExtractedList,
            request: ApiRequest::new(ApiEndpoint::ExtractedList),
        },
        ListRefresh::Backups => Effect::Api {
            tag: RequestTag::Backups,
            request: ApiRequest::new(ApiEndpoint::ListBackups),
        },
    }
}

fn run_action(model: WizardModel, action: WizardAction) -> (WizardModel, Vec<Effect>) {
    let request = action.request();
    let next = model.with_status(action.area(), StatusMessage::info(action.progress_text()));
    (
        next,
        vec![Effect::Api {
            tag: RequestTag::Action(action),
            request,
        }],
    )
}

/// An empty path is refused locally; otherwise the launcher must not be running before init.
fn init_session(model: WizardModel, asar_path: String) -> (WizardModel, Vec<Effect>) {
    let asar_path = asar_path.trim().to_string();
    if asar_path.is_empty() {
        let error = WizardError::Validation("Please enter asar path".to_string());
        return (
            model.with_status(StatusArea::Launcher, StatusMessage::error(error.to_string())),
            Vec::new(),
        );
    }
    (
        model.with_status(StatusArea::Launcher, StatusMessage::info("Checking launcher status...")),
        vec![Effect::Api {
            tag: RequestTag::LauncherStatus { asar_path },
            request: ApiRequest::new(ApiEndpoint::LauncherStatus),
        }],
    )
}

/// Stores the catalog and seeds an untouched color mapping and the preview from `rsi`.
fn presets_loaded(
    model: WizardModel,
    catalog: PresetCatalog,
    warnings: &[String],
) -> (WizardModel, Vec<Effect>) {
    let base = catalog.default_preset().cloned();
    let mut next = model;
    next.presets = catalog;

    let Some(base) = base else {
        let detail = warnings.first().map(String::as_str).unwrap_or("no presets found");
        let text = format!("Color presets unavailable ({detail})");
        return (next.with_status(StatusArea::Colors, StatusMessage::error(text)), Vec::new());
    };
    if next.colors.is_empty() {
        next.colors = base.colors;
    }
    next.preview = next
        .preview
        .with_colors(&next.colors)
        .merge_media(&base.media);
    let preview = next.preview.clone();
    (next, vec![Effect::SyncPreview(preview)])
}

fn extraction_finished(model: WizardModel, message: StatusMessage) -> (WizardModel, Vec<Effect>) {
    let (next, mut effects) = navigate(
        model.with_status(StatusArea::Extract, message),
        WizardStep::Colors,
    );
    effects.push(list_request(ListRefresh::Extracts));
    (next, effects)
}

fn sync_preview_with_colors(model: WizardModel) -> (WizardModel, Vec<Effect>) {
    let mut next = model;
    next.preview = next.preview.with_colors(&next.colors);
    let preview = next.preview.clone();
    (next, vec![Effect::SyncPreview(preview)])
}

fn set_color(model: WizardModel, token: String, value: String) -> (WizardModel, Vec<Effect>) {
    let token = token.trim().to_string();
    if token.is_empty() {
        let error = WizardError::Validation("Color token must not be empty".to_string());
        return (
            model.with_status(StatusArea::Colors, StatusMessage::error(error.to_string())),
            Vec::new(),
        );
    }
    let mut next = model;
    next.colors.insert(token, value.trim().to_string());
    sync_preview_with_colors(next)
}

fn apply_preset(model: WizardModel, preset: Preset) -> (WizardModel, Vec<Effect>) {
    let mut next = model.with_status(
        StatusArea::Colors,
        StatusMessage::info(format!("Applying {} preset...", preset.id)),
    );
    next.colors = preset.colors;
    next.preview = next
        .preview
        .with_colors(&next.colors)
        .merge_media(&preset.media);
    let preview = next.preview.clone();
    (next, vec![Effect::SyncPreview(preview)])
}

fn apply_colors(model: WizardModel) -> (WizardModel, Vec<Effect>) {
    if model.colors.is_empty() {
        let error = WizardError::Validation("Please add at least one color mapping".to_string());
        return (
            model.with_status(StatusArea::Colors, StatusMessage::error(error.to_string())),
            Vec::new(),
        );
    }

    let colors = model.colors.clone();
    let request = ApiRequest::json(ApiEndpoint::ApplyColors, json!({ "colors": colors }));
    (
        model.with_status(StatusArea::Colors, StatusMessage::info("Starting color application...")),
        vec![Effect::Api {
            tag: RequestTag::ApplyColors(colors),
            request,
        }],
    )
}

fn media_upload_effect(model: &WizardModel, index: usize) -> Option<Effect> {
    let (asset_path, replacement) = model.media.iter().nth(index)?;
    Some(Effect::UploadFile {
        tag: RequestTag::MediaUpload { index },
        target_path: asset_path.clone(),
        source: PathBuf::from(replacement),
    })
}

fn apply_media(model: WizardModel) -> (WizardModel, Vec<Effect>) {
    let Some(first) = media_upload_effect(&model, 0) else {
        let error = WizardError::Validation("Please add at least one media replacement".to_string());
        return (
            model.with_status(StatusArea::Media, StatusMessage::error(error.to_string())),
            Vec::new(),
        );
    };
    (
        model.with_status(StatusArea::Media, StatusMessage::info("Uploading media files...")),
        vec![first],
    )
}

fn apply_music(model: WizardModel) -> (WizardModel, Vec<Effect>) {
    if model.music.is_empty() {
        let error = WizardError::Validation(
            "Please add at least one music file or load defaults".to_string(),
        );
        return (
            model.with_status(StatusArea::Music, StatusMessage::error(error.to_string())),
            Vec::new(),
        );
    }
    (
        model.with_status(StatusArea::Music, StatusMessage::info("Uploading music files...")),
        vec![Effect::Api {
            tag: RequestTag::ClearMusic,
            request: ApiRequest::new(ApiEndpoint::ClearMusic),
        }],
    )
}

/// Next upload at or after `from`; once every track is handled, the launcher code update.
fn next_music_effect(model: &mut WizardModel, from: usize) -> Effect {
    for (index, entry) in model.music.iter().enumerate().skip(from) {
        if !entry.needs_upload() {
            continue;
        }
        match &entry.file {
            Some(file) => {
                return Effect::UploadFile {
                    tag: RequestTag::MusicUpload { index },
                    target_path: format!("{MUSIC_ASSET_DIR}/{}", entry.track.name),
                    source: file.clone(),
                };
            }
            None => {
                let text = format!("Skipping {} - no file available", entry.track.name);
                model.statuses.insert(StatusArea::Music, StatusMessage::error(text));
            }
        }
    }

    let music_files: Vec<String> = model
        .music
        .iter()
        .map(|entry| format!("{MUSIC_ROUTE_PREFIX}{}", entry.track.name))
        .collect();
    Effect::Api {
        tag: RequestTag::UpdateMusicCode,
        request: ApiRequest::json(
            ApiEndpoint::UpdateMusicCode,
            json!({ "musicFiles": music_files }),
        ),
    }
}

fn import_theme(model: WizardModel, text: &str) -> (WizardModel, Vec<Effect>) {
    let theme = match theme_file::parse_theme(text) {
        Ok(theme) => theme,
        Err(error) => {
            return (
                model.with_status(
                    StatusArea::Finalize,
                    StatusMessage::error(format!("Import failed: {error}")),
                ),
                Vec::new(),
            );
        }
    };

    let display_name = theme.display_name().to_string();
    let mut next = model;
    next.colors = theme.colors;
    if let Some(media) = theme.media {
        next.media = media;
    }
    if let Some(music) = theme.music {
        next.music = music
            .into_iter()
            .map(|track| WizardTrack { track, file: None })
            .collect();
    }
    next.theme_name = Some(display_name.clone());
    let next = next.with_status(
        StatusArea::Finalize,
        StatusMessage::success(format!("✓ Theme imported: {display_name}")),
    );
    sync_preview_with_colors(next)
}

fn theme_name_or_error(name: String) -> Result<String, WizardError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(WizardError::Validation("Theme name must not be empty".to_string()));
    }
    Ok(name)
}

fn save_theme(model: WizardModel, name: String) -> (WizardModel, Vec<Effect>) {
    let name = match theme_name_or_error(name) {
        Ok(name) => name,
        Err(error) => {
            return (
                model.with_status(StatusArea::Finalize, StatusMessage::error(error.to_string())),
                Vec::new(),
            );
        }
    };
    let request = ApiRequest::json(ApiEndpoint::ConfigSave, model.theme_config_payload(&name));
    (
        model.with_status(StatusArea::Finalize, StatusMessage::info("Saving theme...")),
        vec![Effect::Api {
            tag: RequestTag::SaveTheme { name },
            request,
        }],
    )
}

/// The backend builds the exported document; the runner then writes it to disk.
fn export_theme(model: WizardModel, name: String) -> (WizardModel, Vec<Effect>) {
    let name = match theme_name_or_error(name) {
        Ok(name) => name,
        Err(error) => {
            return (
                model.with_status(StatusArea::Finalize, StatusMessage::error(error.to_string())),
                Vec::new(),
            );
        }
    };
    let request = ApiRequest::json(ApiEndpoint::ConfigExport, model.theme_config_payload(&name));
    (
        model.with_status(StatusArea::Finalize, StatusMessage::info("Exporting theme...")),
        vec![Effect::Api {
            tag: RequestTag::ExportTheme { name },
            request,
        }],
    )
}

fn returned_theme(result: Result<Value, WizardError>) -> Result<ThemeDocument, WizardError> {
    result.and_then(|payload| {
        theme_file::theme_from_value(payload.get("theme").cloned().unwrap_or(Value::Null))
    })
}

fn value_list(payload: &Value, key: &str) -> Vec<Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn response_message(payload: &Value) -> Option<String> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

fn is_async(payload: &Value) -> bool {
    payload.get("async").and_then(Value::as_bool) == Some(true)
}

fn handle_response(
    model: WizardModel,
    tag: RequestTag,
    result: Result<Value, WizardError>,
) -> (WizardModel, Vec<Effect>) {
    match tag {
        RequestTag::DefaultMusic => {
            let files: Vec<String> = result
                .ok()
                .map(|payload| value_list(&payload, "files"))
                .unwrap_or_default()
                .iter()
                .filter_map(|file| file.as_str().map(str::to_string))
                .collect();
            let mut next = model;
            next.music = if files.is_empty() {
                FALLBACK_MUSIC.iter().map(|name| WizardTrack::bundled(name)).collect()
            } else {
                files.iter().map(|name| WizardTrack::bundled(name)).collect()
            };
            (
                next.with_status(
                    StatusArea::Music,
                    StatusMessage::success("✓ Loaded default music playlist"),
                ),
                Vec::new(),
            )
        }
        RequestTag::ExtractedList => match result {
            Ok(payload) => {
                let mut next = model;
                next.extracts = value_list(&payload, "extracts");
                (next, Vec::new())
            }
            Err(error) => (
                model.with_status(StatusArea::Extract, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::Backups => match result {
            Ok(payload) => {
                let mut next = model;
                next.backups = value_list(&payload, "backups");
                (next, Vec::new())
            }
            Err(error) => (
                model.with_status(StatusArea::Backup, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::Extract => match result {
            Ok(payload) if is_async(&payload) => {
                let mut next = model;
                next.pending = Some(PendingOperation {
                    operation: EXTRACT_OPERATION.to_string(),
                    area: StatusArea::Extract,
                    commit: PendingCommit::Extraction,
                });
                (
                    next,
                    vec![Effect::PollOperation {
                        operation: EXTRACT_OPERATION.to_string(),
                    }],
                )
            }
            Ok(_) => extraction_finished(model, StatusMessage::success("✓ Archive extracted")),
            Err(error) => (
                model.with_status(StatusArea::Extract, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::ApplyColors(colors) => match result {
            Ok(payload) if is_async(&payload) => {
                let mut next = model;
                next.pending = Some(PendingOperation {
                    operation: APPLY_COLORS_OPERATION.to_string(),
                    area: StatusArea::Colors,
                    commit: PendingCommit::Colors(colors),
                });
                (
                    next,
                    vec![Effect::PollOperation {
                        operation: APPLY_COLORS_OPERATION.to_string(),
                    }],
                )
            }
            Ok(_) => {
                let next = commit_colors(model, colors)
                    .with_status(StatusArea::Colors, StatusMessage::success("✓ Colors applied successfully"));
                let preview = next.preview.clone();
                (next, vec![Effect::SyncPreview(preview)])
            }
            Err(error) => (
                model.with_status(StatusArea::Colors, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::MediaUpload { index } => match result {
            Ok(_) => match media_upload_effect(&model, index + 1) {
                Some(effect) => {
                    let total = model.media.len();
                    let text = format!("Uploaded {} of {total} media files...", index + 1);
                    (model.with_status(StatusArea::Media, StatusMessage::info(text)), vec![effect])
                }
                None => {
                    let mut next = model;
                    next.applied.media = next.media.clone();
                    (
                        next.with_status(
                            StatusArea::Media,
                            StatusMessage::success("✓ Media files applied successfully"),
                        ),
                        Vec::new(),
                    )
                }
            },
            Err(error) => (
                model.with_status(StatusArea::Media, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::ClearMusic => match result {
            Ok(_) => {
                let mut next = model;
                let effect = next_music_effect(&mut next, 0);
                (next, vec![effect])
            }
            Err(error) => (
                model.with_status(StatusArea::Music, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::MusicUpload { index } => match result {
            Ok(_) => {
                let mut next = model;
                let effect = next_music_effect(&mut next, index + 1);
                (next, vec![effect])
            }
            Err(error) => (
                model.with_status(StatusArea::Music, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::UpdateMusicCode => match result {
            Ok(_) => {
                let mut next = model;
                next.applied.music = next.music.iter().map(|entry| entry.track.name.clone()).collect();
                let count = next.music.len();
                let plural = if count == 1 { "" } else { "s" };
                (
                    next.with_status(
                        StatusArea::Music,
                        StatusMessage::success(format!(
                            "✓ Applied {count} music track{plural} successfully"
                        )),
                    ),
                    Vec::new(),
                )
            }
            Err(error) => (
                model.with_status(StatusArea::Music, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::SaveTheme { name } => match result {
            Ok(payload) => {
                let mut next = model;
                next.theme_name = Some(name.clone());
                let detail = response_message(&payload).unwrap_or(name);
                (
                    next.with_status(
                        StatusArea::Finalize,
                        StatusMessage::success(format!("✓ Theme saved: {detail}")),
                    ),
                    Vec::new(),
                )
            }
            Err(error) => (
                model.with_status(StatusArea::Finalize, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::ExportTheme { name } => match returned_theme(result) {
            Ok(mut document) => {
                document.name = Some(name);
                (model, vec![Effect::WriteThemeFile(document)])
            }
            Err(error) => (
                model.with_status(StatusArea::Finalize, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::SavedThemes => match result {
            Ok(payload) => {
                let mut next = model;
                next.saved_themes = value_list(&payload, "themes");
                if next.saved_themes.is_empty() {
                    let text = "No saved themes found. Save a theme first!";
                    (next.with_status(StatusArea::Finalize, StatusMessage::info(text)), Vec::new())
                } else {
                    next.statuses.remove(&StatusArea::Finalize);
                    (next, Vec::new())
                }
            }
            Err(error) => (
                model.with_status(StatusArea::Finalize, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::LoadTheme => match returned_theme(result) {
            Ok(theme) => {
                let mut next = model;
                next.colors = theme.colors;
                if theme.name.is_some() {
                    next.theme_name = theme.name;
                }
                let loaded = next.theme_name.clone().unwrap_or_default();
                let next = next.with_status(
                    StatusArea::Finalize,
                    StatusMessage::success(format!("✓ Theme loaded: {loaded}")),
                );
                sync_preview_with_colors(next)
            }
            Err(error) => (
                model.with_status(StatusArea::Finalize, StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
        RequestTag::LauncherStatus { asar_path } => {
            // An unreachable status check does not block init.
            let running = result
                .ok()
                .and_then(|payload| payload.get("isRunning").and_then(Value::as_bool))
                .unwrap_or(false);
            if running {
                (
                    model.with_status(StatusArea::Launcher, StatusMessage::error(LAUNCHER_RUNNING_TEXT)),
                    Vec::new(),
                )
            } else {
                run_action(model, WizardAction::InitSession { asar_path })
            }
        }
        RequestTag::Action(action) => match result {
            Ok(_) => (
                model.with_status(action.area(), StatusMessage::success(action.success_text())),
                action.refresh().map(list_request).into_iter().collect(),
            ),
            Err(error) => (
                model.with_status(action.area(), StatusMessage::error(error.to_string())),
                Vec::new(),
            ),
        },
    }
}

fn commit_colors(model: WizardModel, colors: ColorMap) -> WizardModel {
    let mut next = model;
    next.preview = next.preview.with_colors(&colors);
    next.applied.colors = colors;
    next
}

fn finish_operation(
    model: WizardModel,
    result: Result<OperationStatus, WizardError>,
) -> (WizardModel, Vec<Effect>) {
    let mut next = model;
    let Some(pending) = next.pending.take() else {
        return (next, Vec::new());
    };

    match result {
        Ok(status) => {
            let text = format!("✓ {}", status.message);
            match pending.commit {
                PendingCommit::Colors(colors) => {
                    let next = commit_colors(next, colors)
                        .with_status(pending.area, StatusMessage::success(text));
                    let preview = next.preview.clone();
                    (next, vec![Effect::SyncPreview(preview)])
                }
                PendingCommit::Extraction => extraction_finished(next, StatusMessage::success(text)),
            }
        }
        Err(error) => (
            next.with_status(pending.area, StatusMessage::error(error.to_string())),
            Vec::new(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation_status::OperationState;
    use chrono::TimeZone;

    fn colors(pairs: &[(&str, &str)]) -> ColorMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(model: &WizardModel, msgs: Vec<Msg>) -> (WizardModel, Vec<Effect>) {
        let mut current = model.clone();
        let mut effects = Vec::new();
        for msg in msgs {
            let (next, emitted) = update(&current, msg);
            current = next;
            effects = emitted;
        }
        (current, effects)
    }

    #[test]
    fn navigation_is_bounded_to_six_steps() {
        let model = WizardModel::default();
        let (model, _) = update(&model, Msg::Back);
        assert_eq!(model.step, WizardStep::Launcher);
        assert!(!model.can_go_back());

        let mut current = model;
        for _ in 0..10 {
            current = update(&current, Msg::Next).0;
        }
        assert_eq!(current.step, WizardStep::Finalize);
        assert_eq!(current.step.number(), 6);
        assert!(!current.can_go_next());
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(7), None);
    }

    #[test]
    fn entering_launcher_step_loads_lists() {
        let model = WizardModel {
            step: WizardStep::Colors,
            ..WizardModel::default()
        };
        let (_, effects) = update(&model, Msg::Back);
        assert!(matches!(effects[0], Effect::SyncPreview(_)));
        assert!(effects.iter().any(|effect| matches!(
            effect,
            Effect::Api { tag: RequestTag::ExtractedList, request } if request.endpoint == ApiEndpoint::ExtractedList
        )));
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, Effect::Api { tag: RequestTag::Backups, .. })));
    }

    #[test]
    fn entering_music_step_loads_defaults_only_when_empty() {
        let (_, effects) = update(&WizardModel::default(), Msg::GoTo(WizardStep::Music));
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, Effect::Api { tag: RequestTag::DefaultMusic, .. })));

        let populated = WizardModel {
            music: vec![WizardTrack::bundled("GrimHex.ogg")],
            ..WizardModel::default()
        };
        let (_, effects) = update(&populated, Msg::GoTo(WizardStep::Music));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn apply_colors_with_empty_mapping_is_rejected_without_request() {
        let (model, effects) = update(&WizardModel::default(), Msg::ApplyColors);
        assert!(effects.is_empty());
        let status = model.status(StatusArea::Colors).expect("status");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "Please add at least one color mapping");
    }

    #[test]
    fn synchronous_apply_colors_sets_preview_to_exactly_that_mapping() {
        let start = WizardModel {
            preview: PreviewState::default().with_colors(&colors(&[("--old", "#123456")])),
            ..WizardModel::default()
        };
        let (model, effects) = run(
            &start,
            vec![Msg::SetColor {
                token: "--primary".to_string(),
                value: "#ff0000".to_string(),
            }],
        );
        assert_eq!(effects.len(), 1);

        let (model, effects) = update(&model, Msg::ApplyColors);
        let expected = colors(&[("--primary", "#ff0000")]);
        let Some(Effect::Api { tag, request }) = effects.first() else {
            panic!("expected an api effect, got {effects:?}");
        };
        assert_eq!(request.endpoint, ApiEndpoint::ApplyColors);
        assert_eq!(
            request.body,
            crate::backend_api::ApiBody::Json(json!({"colors": {"--primary": "#ff0000"}}))
        );

        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true})),
            },
        );
        assert_eq!(model.preview.colors, expected);
        assert_eq!(model.applied.colors, expected);
        assert_eq!(effects, vec![Effect::SyncPreview(model.preview.clone())]);
        assert_eq!(model.status(StatusArea::Colors).map(|s| s.kind), Some(StatusKind::Success));
    }

    #[test]
    fn async_apply_colors_commits_only_when_operation_is_done() {
        let model = WizardModel {
            colors: colors(&[("--primary", "#ff0000")]),
            ..WizardModel::default()
        };
        let (model, effects) = update(&model, Msg::ApplyColors);
        let Some(Effect::Api { tag, .. }) = effects.first() else {
            panic!("expected an api effect");
        };
        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true, "async": true})),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::PollOperation {
                operation: APPLY_COLORS_OPERATION.to_string()
            }]
        );
        assert!(model.applied.colors.is_empty());

        let (model, _) = update(
            &model,
            Msg::OperationProgress(ProgressUpdate {
                operation: APPLY_COLORS_OPERATION.to_string(),
                percent: 99,
                message: "Writing CSS".to_string(),
            }),
        );
        assert_eq!(
            model.status(StatusArea::Colors).map(|s| s.text.as_str()),
            Some("99% - Writing CSS")
        );

        let (model, effects) = update(
            &model,
            Msg::OperationFinished(Ok(OperationStatus {
                operation: Some(APPLY_COLORS_OPERATION.to_string()),
                state: OperationState::Done,
                message: "Colors applied".to_string(),
                progress: Some(100.0),
                last_error: None,
            })),
        );
        assert_eq!(model.applied.colors, colors(&[("--primary", "#ff0000")]));
        assert_eq!(model.preview.colors, model.applied.colors);
        assert!(model.pending.is_none());
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn failed_operation_reports_error_and_clears_pending() {
        let model = WizardModel {
            pending: Some(PendingOperation {
                operation: APPLY_COLORS_OPERATION.to_string(),
                area: StatusArea::Colors,
                commit: PendingCommit::Colors(colors(&[("--primary", "#ff0000")])),
            }),
            ..WizardModel::default()
        };
        let (model, effects) =
            update(&model, Msg::OperationFinished(Err(WizardError::OperationTimeout { attempts: 600 })));
        assert!(effects.is_empty());
        assert!(model.pending.is_none());
        assert!(model.applied.colors.is_empty());
        assert_eq!(
            model.status(StatusArea::Colors).map(|s| s.text.as_str()),
            Some("Operation timed out after 600 status checks")
        );
    }

    #[test]
    fn import_without_colors_leaves_model_untouched() {
        let model = WizardModel {
            colors: colors(&[("--primary", "#54adf7")]),
            theme_name: Some("Current".to_string()),
            ..WizardModel::default()
        };
        let (next, effects) = update(
            &model,
            Msg::ImportTheme {
                text: r#"{"name": "Broken", "media": {"a": "b"}}"#.to_string(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(next.colors, model.colors);
        assert_eq!(next.media, model.media);
        assert_eq!(next.theme_name, model.theme_name);
        assert_eq!(
            next.status(StatusArea::Finalize).map(|s| s.text.as_str()),
            Some("Import failed: Invalid theme file: missing colors")
        );
    }

    #[test]
    fn import_replaces_colors_media_music_and_name() {
        let model = WizardModel {
            media: MediaMap::from([("keep".to_string(), "me".to_string())]),
            ..WizardModel::default()
        };
        let (next, effects) = update(
            &model,
            Msg::ImportTheme {
                text: r##"{"colors": {"--primary": "#ff0000"}, "music": [{"name": "mine.ogg"}]}"##
                    .to_string(),
            },
        );
        assert_eq!(next.colors, colors(&[("--primary", "#ff0000")]));
        assert_eq!(next.media, model.media);
        assert_eq!(next.music.len(), 1);
        assert_eq!(next.theme_name.as_deref(), Some("Imported Theme"));
        assert_eq!(effects, vec![Effect::SyncPreview(next.preview.clone())]);
    }

    #[test]
    fn default_music_falls_back_on_error_or_empty_list() {
        for result in [
            Err(WizardError::Network("offline".to_string())),
            Ok(json!({"files": []})),
        ] {
            let (model, _) = update(
                &WizardModel::default(),
                Msg::Response {
                    tag: RequestTag::DefaultMusic,
                    result,
                },
            );
            let names: Vec<&str> = model.music.iter().map(|t| t.track.name.as_str()).collect();
            assert_eq!(names, FALLBACK_MUSIC.to_vec());
            assert!(model.music.iter().all(|t| t.track.is_default));
        }

        let (model, _) = update(
            &WizardModel::default(),
            Msg::Response {
                tag: RequestTag::DefaultMusic,
                result: Ok(json!({"files": ["Theme.ogg"]})),
            },
        );
        assert_eq!(model.music, vec![WizardTrack::bundled("Theme.ogg")]);
    }

    #[test]
    fn apply_music_uploads_user_tracks_then_updates_code() {
        let (model, effects) = update(&WizardModel::default(), Msg::ApplyMusic);
        assert!(effects.is_empty());
        assert_eq!(model.status(StatusArea::Music).map(|s| s.kind), Some(StatusKind::Error));

        let model = WizardModel {
            music: vec![
                WizardTrack::bundled("GrimHex.ogg"),
                WizardTrack {
                    track: MusicTrack {
                        name: "mine.ogg".to_string(),
                        is_default: false,
                    },
                    file: Some(PathBuf::from("/music/mine.ogg")),
                },
            ],
            ..WizardModel::default()
        };
        let (model, effects) = update(&model, Msg::ApplyMusic);
        assert!(matches!(effects[0], Effect::Api { tag: RequestTag::ClearMusic, .. }));

        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: RequestTag::ClearMusic,
                result: Ok(json!({"success": true})),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::UploadFile {
                tag: RequestTag::MusicUpload { index: 1 },
                target_path: "assets/musics/mine.ogg".to_string(),
                source: PathBuf::from("/music/mine.ogg"),
            }]
        );

        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: RequestTag::MusicUpload { index: 1 },
                result: Ok(json!({"success": true})),
            },
        );
        let Some(Effect::Api { tag, request }) = effects.first() else {
            panic!("expected update-music-code request");
        };
        assert_eq!(
            request.body,
            crate::backend_api::ApiBody::Json(
                json!({"musicFiles": ["/musics/GrimHex.ogg", "/musics/mine.ogg"]})
            )
        );

        let (model, _) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true})),
            },
        );
        assert_eq!(model.applied.music, vec!["GrimHex.ogg", "mine.ogg"]);
        assert_eq!(
            model.status(StatusArea::Music).map(|s| s.text.as_str()),
            Some("✓ Applied 2 music tracks successfully")
        );
    }

    #[test]
    fn apply_media_requires_a_replacement_and_uploads_in_order() {
        let (_, effects) = update(&WizardModel::default(), Msg::ApplyMedia);
        assert!(effects.is_empty());

        let (model, effects) = run(
            &WizardModel::default(),
            vec![
                Msg::SetMedia {
                    asset_path: "assets/images/b.jpg".to_string(),
                    replacement: "/tmp/b.jpg".to_string(),
                },
                Msg::SetMedia {
                    asset_path: "assets/images/a.jpg".to_string(),
                    replacement: "/tmp/a.jpg".to_string(),
                },
            ],
        );
        assert_eq!(model.preview.media.len(), 2);
        assert!(matches!(effects[0], Effect::SyncPreview(_)));

        let (model, effects) = update(&model, Msg::ApplyMedia);
        assert!(matches!(
            &effects[0],
            Effect::UploadFile { target_path, .. } if target_path == "assets/images/a.jpg"
        ));
        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: RequestTag::MediaUpload { index: 0 },
                result: Ok(json!({"success": true})),
            },
        );
        assert_eq!(effects.len(), 1);
        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: RequestTag::MediaUpload { index: 1 },
                result: Ok(json!({"success": true})),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(model.applied.media, model.media);
    }

    #[test]
    fn backup_actions_refresh_the_backup_list() {
        let action = WizardAction::CreateBackup {
            name: "Backup - 2026-10-18 09:30:00".to_string(),
        };
        let (model, effects) = update(&WizardModel::default(), Msg::Action(action));
        assert_eq!(model.status(StatusArea::Backup).map(|s| s.kind), Some(StatusKind::Info));
        let Some(Effect::Api { tag, request }) = effects.first() else {
            panic!("expected api effect");
        };
        assert_eq!(request.endpoint, ApiEndpoint::CreateBackup);
        assert_eq!(
            request.body,
            crate::backend_api::ApiBody::Json(json!({"name": "Backup - 2026-10-18 09:30:00"}))
        );

        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true})),
            },
        );
        assert_eq!(model.status(StatusArea::Backup).map(|s| s.kind), Some(StatusKind::Success));
        assert!(matches!(effects[0], Effect::Api { tag: RequestTag::Backups, .. }));

        let (model, _) = update(
            &model,
            Msg::Response {
                tag: RequestTag::Backups,
                result: Ok(json!({"backups": [{"name": "b1"}]})),
            },
        );
        assert_eq!(model.backups.len(), 1);
    }

    #[test]
    fn backup_name_uses_local_timestamp() {
        let at = Local
            .with_ymd_and_hms(2026, 10, 18, 9, 30, 5)
            .single()
            .expect("valid local time");
        assert_eq!(backup_name(&at), "Backup - 2026-10-18 09:30:05");
        assert!(matches!(
            WizardAction::create_backup(),
            WizardAction::CreateBackup { name } if name.starts_with("Backup - ")
        ));
    }

    #[test]
    fn export_asks_backend_for_the_document_then_writes_it() {
        let model = WizardModel {
            colors: colors(&[("--primary", "#ff0000")]),
            media: MediaMap::from([("assets/images/bg.jpg".to_string(), "/tmp/bg.jpg".to_string())]),
            music: vec![WizardTrack::bundled("GrimHex.ogg")],
            ..WizardModel::default()
        };
        let (_, effects) = update(&model, Msg::ExportTheme { name: "  ".to_string() });
        assert!(effects.is_empty());

        let (model, effects) = update(
            &model,
            Msg::ExportTheme {
                name: "My Theme".to_string(),
            },
        );
        let Some(Effect::Api { tag, request }) = effects.first() else {
            panic!("expected export request");
        };
        assert_eq!(request.endpoint, ApiEndpoint::ConfigExport);
        assert_eq!(
            request.body,
            crate::backend_api::ApiBody::Json(json!({
                "name": "My Theme",
                "config": {
                    "colors": {"--primary": "#ff0000"},
                    "media": ["assets/images/bg.jpg"],
                    "music": [{"name": "GrimHex.ogg", "isDefault": true}],
                }
            }))
        );

        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true, "theme": {"colors": {"--primary": "#ff0000"}}})),
            },
        );
        let Some(Effect::WriteThemeFile(document)) = effects.first() else {
            panic!("expected write effect");
        };
        assert_eq!(document.display_name(), "My Theme");
        assert_eq!(document.colors, model.colors);

        let (model, _) = update(
            &model,
            Msg::ThemeWritten(Ok(PathBuf::from("/exports/My-Theme.theme.json"))),
        );
        assert_eq!(
            model.status(StatusArea::Finalize).map(|s| s.text.as_str()),
            Some("✓ Theme exported: My-Theme.theme.json")
        );
    }

    #[test]
    fn init_session_requires_a_path_and_checks_the_launcher_first() {
        let (model, effects) = update(
            &WizardModel::default(),
            Msg::Action(WizardAction::InitSession {
                asar_path: "   ".to_string(),
            }),
        );
        assert!(effects.is_empty());
        assert_eq!(
            model.status(StatusArea::Launcher),
            Some(&StatusMessage::error("Please enter asar path"))
        );

        let (model, effects) = update(
            &model,
            Msg::Action(WizardAction::InitSession {
                asar_path: " C:/RSI/app.asar ".to_string(),
            }),
        );
        let Some(Effect::Api { tag, request }) = effects.first() else {
            panic!("expected launcher status request");
        };
        assert_eq!(request.endpoint, ApiEndpoint::LauncherStatus);

        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"isRunning": true})),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(model.status(StatusArea::Launcher).map(|s| s.kind), Some(StatusKind::Error));

        let (_, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"isRunning": false})),
            },
        );
        let Some(Effect::Api { request, .. }) = effects.first() else {
            panic!("expected init request");
        };
        assert_eq!(request.endpoint, ApiEndpoint::Init);
        assert_eq!(
            request.body,
            crate::backend_api::ApiBody::Json(json!({"asarPath": "C:/RSI/app.asar"}))
        );
    }

    #[test]
    fn synchronous_extract_moves_to_colors_and_refreshes_extracts() {
        let (model, effects) = update(&WizardModel::default(), Msg::Extract);
        let Some(Effect::Api { tag, .. }) = effects.first() else {
            panic!("expected extract request");
        };
        let (model, effects) = update(
            &model,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true})),
            },
        );
        assert_eq!(model.step, WizardStep::Colors);
        assert_eq!(model.status(StatusArea::Extract).map(|s| s.kind), Some(StatusKind::Success));
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, Effect::Api { tag: RequestTag::ExtractedList, .. })));
    }

    #[test]
    fn loaded_presets_seed_empty_colors_from_rsi() {
        let rsi = Preset {
            id: "rsi".to_string(),
            colors: colors(&[("--primary", "#54adf7")]),
            media: MediaMap::from([("logo".to_string(), "assets/logos/cig-logo.svg".to_string())]),
        };
        let catalog = PresetCatalog::from_raw(&BTreeMap::from([(
            "rsi".to_string(),
            crate::color_presets::RawPreset {
                base: None,
                colors: rsi.colors.clone(),
                media: Some(rsi.media.clone()),
            },
        )]));

        let (model, effects) = update(
            &WizardModel::default(),
            Msg::PresetsLoaded {
                catalog: catalog.clone(),
                warnings: Vec::new(),
            },
        );
        assert_eq!(model.colors, rsi.colors);
        assert_eq!(model.preview.media["logo"], "assets/logos/cig-logo.svg");
        assert!(model.media.is_empty());
        assert_eq!(effects, vec![Effect::SyncPreview(model.preview.clone())]);

        let edited = WizardModel {
            colors: colors(&[("--primary", "#ff0000")]),
            ..WizardModel::default()
        };
        let (model, _) = update(
            &edited,
            Msg::PresetsLoaded {
                catalog,
                warnings: Vec::new(),
            },
        );
        assert_eq!(model.colors, edited.colors);

        let (model, effects) = update(
            &WizardModel::default(),
            Msg::PresetsLoaded {
                catalog: PresetCatalog::default(),
                warnings: vec!["Preset file not found: rsi (404)".to_string()],
            },
        );
        assert!(effects.is_empty());
        assert_eq!(model.status(StatusArea::Colors).map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn load_theme_without_colors_is_rejected() {
        let (model, effects) = update(
            &WizardModel::default(),
            Msg::LoadTheme {
                filename: "Dusk.json".to_string(),
            },
        );
        let Some(Effect::Api { tag, request }) = effects.first() else {
            panic!("expected load request");
        };
        assert_eq!(
            request.body,
            crate::backend_api::ApiBody::Json(json!({"filename": "Dusk.json"}))
        );

        let start = WizardModel {
            colors: colors(&[("--primary", "#54adf7")]),
            ..model
        };
        let (model, effects) = update(
            &start,
            Msg::Response {
                tag: tag.clone(),
                result: Ok(json!({"success": true, "theme": {"name": "Dusk"}})),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(model.colors, start.colors);
        assert_eq!(
            model.status(StatusArea::Finalize).map(|s| s.text.as_str()),
            Some("Invalid theme file: missing colors")
        );
    }

    #[test]
    fn empty_saved_theme_list_says_so() {
        let (model, effects) = update(&WizardModel::default(), Msg::ListThemes);
        assert!(matches!(
            effects.as_slice(),
            [Effect::Api { tag: RequestTag::SavedThemes, request }] if request.endpoint == ApiEndpoint::ConfigList
        ));
        let (model, _) = update(
            &model,
            Msg::Response {
                tag: RequestTag::SavedThemes,
                result: Ok(json!({"success": true, "themes": []})),
            },
        );
        assert!(model.saved_themes.is_empty());
        assert_eq!(
            model.status(StatusArea::Finalize).map(|s| s.text.as_str()),
            Some("No saved themes found. Save a theme first!")
        );
    }

    #[test]
    fn applying_preset_replaces_colors_and_merges_preview_media() {
        let preset = Preset {
            id: "drake-interplanetary".to_string(),
            colors: colors(&[("--primary", "#ffaa00")]),
            media: MediaMap::from([("logo".to_string(), "assets/logos/drake.svg".to_string())]),
        };
        let model = WizardModel {
            colors: colors(&[("--old", "#000000")]),
            ..WizardModel::default()
        };
        let (model, effects) = update(&model, Msg::ApplyPreset(preset));
        assert_eq!(model.colors, colors(&[("--primary", "#ffaa00")]));
        assert_eq!(model.preview.media["logo"], "assets/logos/drake.svg");
        assert!(model.media.is_empty());
        assert_eq!(effects.len(), 1);
    }
}
