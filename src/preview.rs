use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    color_convert::normalize_color_to_hex,
    color_presets::{ColorMap, MediaMap},
};

pub const PREVIEW_PRIMARY: &str = "#54adf7";
pub const PREVIEW_ACCENT: &str = "#6db9f8";
pub const PREVIEW_BACKGROUND: &str = "#0a1d29";
pub const PREVIEW_SURFACE: &str = "#112534";
pub const PREVIEW_TEXT: &str = "#e0e0e0";
pub const PREVIEW_MUTED: &str = "#9fb1bf";

/// What the embedded preview frame currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub colors: ColorMap,
    pub media: MediaMap,
}

impl PreviewState {
    pub fn with_colors(&self, colors: &ColorMap) -> Self {
        Self {
            colors: colors.clone(),
            media: self.media.clone(),
        }
    }

    pub fn merge_media(&self, media: &MediaMap) -> Self {
        let mut merged = self.media.clone();
        merged.extend(media.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            colors: self.colors.clone(),
            media: merged,
        }
    }

    pub fn palette(&self) -> PreviewPalette {
        PreviewPalette::from_colors(&self.colors)
    }

    /// The two messages posted to the preview frame on every sync.
    pub fn frame_messages(&self) -> [Value; 2] {
        [
            json!({"type": "preview-colors", "colors": self.colors}),
            json!({"type": "preview-media", "media": self.media}),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewPalette {
    pub primary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub muted: String,
}

impl Default for PreviewPalette {
    fn default() -> Self {
        Self {
            primary: PREVIEW_PRIMARY.to_string(),
            accent: PREVIEW_ACCENT.to_string(),
            background: PREVIEW_BACKGROUND.to_string(),
            surface: PREVIEW_SURFACE.to_string(),
            text: PREVIEW_TEXT.to_string(),
            muted: PREVIEW_MUTED.to_string(),
        }
    }
}

impl PreviewPalette {
    /// Primary is the first parseable color, accent the second (or the first again).
    /// Values are visited in token order.
    pub fn from_colors(colors: &ColorMap) -> Self {
        let mut parsed = colors.values().filter_map(|value| normalize_color_to_hex(value));
        let first = parsed.next();
        let second = parsed.next();

        let defaults = Self::default();
        Self {
            accent: second
                .or_else(|| first.clone())
                .unwrap_or(defaults.accent),
            primary: first.unwrap_or(defaults.primary),
            ..Self::default()
        }
    }
}
