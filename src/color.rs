//! Color names, hex parsing and the fixed color pairs used by diagram shapes.

/// 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("white", Color::rgb(255, 255, 255)),
    ("black", Color::rgb(0, 0, 0)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("pink", Color::rgb(255, 192, 203)),
    ("brown", Color::rgb(165, 42, 42)),
    // Defaults of the simple flowchart tools.
    ("lightblue", Color::rgb(173, 216, 230)),
    ("lightgreen", Color::rgb(144, 238, 144)),
    ("lightyellow", Color::rgb(255, 255, 224)),
];

const TRANSPARENT: &str = "transparent";

/// Parse a `#RRGGBB` string.
pub fn parse_hex_rgb(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::rgb(r, g, b))
}

/// Resolve a color name or hex string, falling back to white.
///
/// Never fails: an unknown name is substituted, not rejected.
pub fn resolve_color(value: &str) -> Color {
    let trimmed = value.trim();
    if trimmed.starts_with('#') {
        return parse_hex_rgb(trimmed).unwrap_or_else(|| {
            log::debug!(target: "canvas", "malformed hex color {:?}, using white", value);
            Color::WHITE
        });
    }

    let lower = trimmed.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, color)| *color)
        .unwrap_or_else(|| {
            log::debug!(target: "canvas", "unrecognized color {:?}, using white", value);
            Color::WHITE
        })
}

/// Resolve a paint argument. `None` means "do not paint" (the transparent sentinel).
pub fn resolve_paint(value: &str) -> Option<Color> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(TRANSPARENT) {
        None
    } else {
        Some(resolve_color(trimmed))
    }
}

/// Fill and outline pair used by the fixed-style diagram shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub fill: Color,
    pub outline: Color,
}

const fn pair(fill: Color, outline: Color) -> ColorPair {
    ColorPair { fill, outline }
}

pub const PROCESS_COLORS: ColorPair =
    pair(Color::rgb(0xE3, 0xF2, 0xFD), Color::rgb(0x19, 0x76, 0xD2));
pub const DECISION_COLORS: ColorPair =
    pair(Color::rgb(0xFF, 0xF9, 0xC4), Color::rgb(0xF5, 0x7C, 0x00));
pub const TERMINAL_COLORS: ColorPair =
    pair(Color::rgb(0xC8, 0xE6, 0xC9), Color::rgb(0x38, 0x8E, 0x3C));
pub const INPUT_COLORS: ColorPair =
    pair(Color::rgb(0xE1, 0xBE, 0xE7), Color::rgb(0x7B, 0x1F, 0xA2));
pub const OUTPUT_COLORS: ColorPair =
    pair(Color::rgb(0xFF, 0xCC, 0xBC), Color::rgb(0xE6, 0x4A, 0x19));
pub const DATABASE_COLORS: ColorPair =
    pair(Color::rgb(0xE8, 0xF5, 0xE9), Color::rgb(0x38, 0x8E, 0x3C));
pub const CLOUD_COLORS: ColorPair =
    pair(Color::rgb(0xFF, 0xF3, 0xE0), Color::rgb(0xE6, 0x51, 0x00));

pub const SUBTITLE_TEXT: Color = Color::rgb(0x42, 0x42, 0x42);

/// Architecture component categories, each with its own color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentKind {
    /// API, microservice, backend (blue)
    #[default]
    Service,
    /// SQL or NoSQL databases (green)
    Database,
    /// Frontend, mobile app, user (purple)
    Client,
    /// Third-party services and external APIs (orange)
    External,
    /// Message queues and event streams (yellow)
    Queue,
    /// Redis, Memcached (pink)
    Cache,
    /// File and object storage (brown)
    Storage,
}

impl ComponentKind {
    /// Lenient lookup; anything unknown is treated as a service.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "database" => Self::Database,
            "client" => Self::Client,
            "external" => Self::External,
            "queue" => Self::Queue,
            "cache" => Self::Cache,
            "storage" => Self::Storage,
            _ => Self::Service,
        }
    }

    pub fn colors(self) -> ColorPair {
        match self {
            Self::Service => PROCESS_COLORS,
            Self::Database => DATABASE_COLORS,
            Self::Client => pair(Color::rgb(0xF3, 0xE5, 0xF5), Color::rgb(0x7B, 0x1F, 0xA2)),
            Self::External => CLOUD_COLORS,
            Self::Queue => pair(Color::rgb(0xFF, 0xFD, 0xE7), Color::rgb(0xF5, 0x7F, 0x17)),
            Self::Cache => pair(Color::rgb(0xFC, 0xE4, 0xEC), Color::rgb(0xC2, 0x18, 0x5B)),
            Self::Storage => pair(Color::rgb(0xEF, 0xEB, 0xE9), Color::rgb(0x5D, 0x40, 0x37)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_are_case_insensitive() {
        assert_eq!(resolve_color("Orange"), Color::rgb(255, 165, 0));
        assert_eq!(resolve_color("BROWN"), Color::rgb(165, 42, 42));
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(resolve_color("#8B4513"), Color::rgb(0x8B, 0x45, 0x13));
        assert_eq!(resolve_color("#87ceeb"), Color::rgb(0x87, 0xCE, 0xEB));
    }

    #[test]
    fn unknown_and_malformed_fall_back_to_white() {
        assert_eq!(resolve_color("chartreuse-ish"), Color::WHITE);
        assert_eq!(resolve_color("#12"), Color::WHITE);
        assert_eq!(resolve_color("#GGGGGG"), Color::WHITE);
    }

    #[test]
    fn transparent_means_no_paint() {
        assert_eq!(resolve_paint("transparent"), None);
        assert_eq!(resolve_paint("Transparent"), None);
        assert_eq!(resolve_paint(""), None);
        assert_eq!(resolve_paint("black"), Some(Color::BLACK));
    }

    #[test]
    fn unknown_component_kind_is_service() {
        assert_eq!(ComponentKind::from_name("load-balancer"), ComponentKind::Service);
        assert_eq!(ComponentKind::from_name("Cache"), ComponentKind::Cache);
        assert_eq!(ComponentKind::Cache.colors().outline, Color::rgb(0xC2, 0x18, 0x5B));
    }
}
