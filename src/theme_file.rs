use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    color_presets::{ColorMap, MediaMap},
    wizard_error::WizardError,
};

pub const THEME_FILE_SUFFIX: &str = ".theme.json";
pub const IMPORTED_THEME_NAME: &str = "Imported Theme";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl MusicTrack {
    pub fn bundled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_default: true,
        }
    }
}

/// A saved or exported theme. Only `colors` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub colors: ColorMap,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_media"
    )]
    pub media: Option<MediaMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<Vec<MusicTrack>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaField {
    Map(MediaMap),
    // Older exports only listed the replaced asset paths.
    List(Vec<String>),
}

fn deserialize_media<'de, D>(deserializer: D) -> Result<Option<MediaMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<MediaField>::deserialize(deserializer)?;
    Ok(field.map(|field| match field {
        MediaField::Map(map) => map,
        MediaField::List(paths) => paths.into_iter().map(|path| (path.clone(), path)).collect(),
    }))
}

impl ThemeDocument {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(IMPORTED_THEME_NAME)
    }
}

/// Parses and validates a theme file. Nothing is applied here, so a rejected file changes no state.
pub fn parse_theme(text: &str) -> Result<ThemeDocument, WizardError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|error| WizardError::InvalidTheme(format!("not valid JSON ({error})")))?;
    theme_from_value(value)
}

/// Same validation as `parse_theme`, for a theme the backend already returned as JSON.
pub fn theme_from_value(value: Value) -> Result<ThemeDocument, WizardError> {
    let Some(object) = value.as_object() else {
        return Err(WizardError::InvalidTheme("expected a JSON object".to_string()));
    };
    match object.get("colors") {
        None | Some(Value::Null) => {
            return Err(WizardError::InvalidTheme("missing colors".to_string()));
        }
        Some(Value::Object(_)) => {}
        Some(_) => {
            return Err(WizardError::InvalidTheme(
                "colors must be an object of token to color".to_string(),
            ));
        }
    }

    serde_json::from_value(value).map_err(|error| WizardError::InvalidTheme(error.to_string()))
}

pub fn theme_slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

pub fn theme_file_name(name: &str) -> String {
    format!("{}{THEME_FILE_SUFFIX}", theme_slug(name))
}

pub fn write_theme_file(dir: &Path, theme: &ThemeDocument) -> Result<PathBuf, WizardError> {
    let path = dir.join(theme_file_name(theme.display_name()));
    let serialized = serde_json::to_string_pretty(theme)
        .map_err(|error| WizardError::Io(format!("failed to serialize theme: {error}")))?;
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, serialized))
        .map_err(|error| WizardError::Io(format!("{}: {error}", path.display())))?;
    Ok(path)
}

pub fn read_theme_file(path: &Path) -> Result<ThemeDocument, WizardError> {
    let text = fs::read_to_string(path)
        .map_err(|error| WizardError::Io(format!("{}: {error}", path.display())))?;
    parse_theme(&text)
}
