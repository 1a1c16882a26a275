use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use serde::Deserialize;

pub type ColorMap = BTreeMap<String, String>;
pub type MediaMap = BTreeMap<String, String>;

pub const BASE_PRESET_ID: &str = "rsi";
/// Where the backend serves the preset files.
pub const PRESET_ROUTE_PREFIX: &str = "/presets/";

pub const PRESET_IDS: &[&str] = &[
    "rsi",
    "aegis-dynamics",
    "anvil-aerospace",
    "origin-jumpworks",
    "drake-interplanetary",
    "crusader-industries",
    "misc",
    "consolidated-outland",
    "banu",
    "esperia",
    "kruger",
    "argo",
    "aopoa",
    "tumbril",
    "greycat",
    "vanduul",
    "gatac",
    "c3rb",
];

pub fn preset_file_name(preset_id: &str) -> String {
    format!("color-mapping-{preset_id}.json")
}

fn default_preset_media() -> MediaMap {
    MediaMap::from([
        ("logo".to_string(), "assets/logos/cig-logo.svg".to_string()),
        (
            "background".to_string(),
            "assets/images/sc_bg_fallback.jpg".to_string(),
        ),
    ])
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPreset {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub colors: ColorMap,
    #[serde(default)]
    pub media: Option<MediaMap>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub id: String,
    pub colors: ColorMap,
    pub media: MediaMap,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Preset>,
}

impl PresetCatalog {
    /// Resolves inheritance: base-preset colors, then the named base, then the preset's own colors.
    /// Presets without an explicit base inherit from `rsi`.
    pub fn from_raw(loaded: &BTreeMap<String, RawPreset>) -> Self {
        let rsi_colors = loaded
            .get(BASE_PRESET_ID)
            .map(|preset| preset.colors.clone())
            .unwrap_or_default();

        let presets = loaded
            .iter()
            .map(|(id, raw)| {
                let base_id = raw
                    .base
                    .clone()
                    .or_else(|| (id != BASE_PRESET_ID).then(|| BASE_PRESET_ID.to_string()));
                let base_colors = base_id
                    .as_deref()
                    .and_then(|base| loaded.get(base))
                    .map(|base| base.colors.clone())
                    .unwrap_or_default();

                let mut colors = rsi_colors.clone();
                colors.extend(base_colors);
                colors.extend(raw.colors.clone());

                let preset = Preset {
                    id: id.clone(),
                    colors,
                    media: raw.media.clone().unwrap_or_else(default_preset_media),
                };
                (id.clone(), preset)
            })
            .collect();

        Self { presets }
    }

    /// Loads every known preset through `read`, which maps a file name to its text.
    /// Missing or broken files are reported as warnings, not errors.
    pub fn load_with<F>(mut read: F) -> (Self, Vec<String>)
    where
        F: FnMut(&str) -> Result<String, String>,
    {
        let mut loaded = BTreeMap::new();
        let mut warnings = Vec::new();

        for preset_id in PRESET_IDS {
            let text = match read(&preset_file_name(preset_id)) {
                Ok(text) => text,
                Err(error) => {
                    warnings.push(format!("Preset file not found: {preset_id} ({error})"));
                    continue;
                }
            };
            match serde_json::from_str::<RawPreset>(&text) {
                Ok(raw) => {
                    loaded.insert((*preset_id).to_string(), raw);
                }
                Err(error) => warnings.push(format!("Failed to load preset {preset_id}: {error}")),
            }
        }

        (Self::from_raw(&loaded), warnings)
    }

    /// Reads the `color-mapping-<id>.json` files from a local directory.
    pub fn load_from_dir(dir: &Path) -> (Self, Vec<String>) {
        Self::load_with(|file_name| {
            fs::read_to_string(dir.join(file_name)).map_err(|error| error.to_string())
        })
    }

    pub fn get(&self, preset_id: &str) -> Option<&Preset> {
        self.presets.get(preset_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn default_preset(&self) -> Option<&Preset> {
        self.get(BASE_PRESET_ID)
    }
}
