//! Color-format helpers shared by the color editor and the preview palette.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgb_string(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }
}

fn parse_hex_digits(digits: &str) -> Option<Rgb> {
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(Rgb {
        r: u8::from_str_radix(&digits[0..2], 16).ok()?,
        g: u8::from_str_radix(&digits[2..4], 16).ok()?,
        b: u8::from_str_radix(&digits[4..6], 16).ok()?,
    })
}

/// Strict `#rrggbb` parse, as used by the RGB editor.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    parse_hex_digits(hex.trim().strip_prefix('#')?)
}

/// RGB editor output: uppercase `#RRGGBB`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_hex()
}

/// Splits `"r, g, b"` / `"r g b"` into three decimal channels of at most three digits.
fn parse_channel_values(raw: &str) -> Option<[u16; 3]> {
    let mut channels = [0_u16; 3];
    let mut count = 0;
    for value in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
    {
        if count == 3 || value.len() > 3 || !value.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        channels[count] = value.parse().ok()?;
        count += 1;
    }
    (count == 3).then_some(channels)
}

fn rgb_from_channels([r, g, b]: [u16; 3]) -> Rgb {
    let clamp = |value: u16| value.min(255) as u8;
    Rgb {
        r: clamp(r),
        g: clamp(g),
        b: clamp(b),
    }
}

/// Parses `"r, g, b"` / `"r g b"`; values above 255 are rejected.
pub fn parse_rgb_string(raw: &str) -> Option<Rgb> {
    parse_channel_values(raw)
        .filter(|channels| channels.iter().all(|value| *value <= 255))
        .map(rgb_from_channels)
}

/// Accepts `#rgb`, `#rrggbb`, `r g b`, `r,g,b` and `rgb(r, g, b)`; returns lowercase `#rrggbb`.
///
/// Channel values in the decimal forms are clamped to 255.
pub fn normalize_color_to_hex(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(digits) = trimmed.strip_prefix('#') {
        let expanded = if digits.len() == 3 {
            digits.chars().flat_map(|c| [c, c]).collect::<String>()
        } else {
            digits.to_string()
        };
        return parse_hex_digits(&expanded).map(|rgb| rgb.to_hex().to_ascii_lowercase());
    }

    let lowered = trimmed.to_ascii_lowercase();
    let body = match lowered.strip_prefix("rgb(") {
        Some(rest) => {
            let inner = rest.strip_suffix(')')?;
            if inner.split(',').count() != 3 {
                return None;
            }
            inner.to_string()
        }
        None => lowered,
    };

    parse_channel_values(&body).map(|channels| rgb_from_channels(channels).to_hex().to_ascii_lowercase())
}
