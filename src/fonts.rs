use std::num::NonZeroUsize;
use std::path::Path;

use cosmic_text::fontdb::Database;
use cosmic_text::{Attrs, Buffer, Command, Family, FontSystem, Metrics, Shaping, SwashCache};
use lru::LruCache;
use tiny_skia::PathBuilder;

const MEASURE_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(1024).unwrap();

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
}

/// Single-line text measurement, in pixels.
pub trait TextMeasure {
    /// Returns `(width, height)` of `text` laid out on one line.
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32);
}

/// Load system fonts plus anything under a local `fonts/` directory.
pub fn load_font_database() -> Database {
    let mut db = Database::new();
    db.load_system_fonts();

    let local_fonts = Path::new("fonts");
    if local_fonts.is_dir() {
        db.load_fonts_dir(local_fonts);
    }

    configure_sans_fallback(&mut db);
    log::debug!(target: "fonts", "loaded {} font faces", db.len());
    db
}

/// Point the generic sans-serif family at an installed face: the first
/// family with "sans" in its name, else the first family found.
fn configure_sans_fallback(db: &mut Database) {
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for face in db.faces() {
        for (family, _) in &face.families {
            if first_family.is_none() {
                first_family = Some(family.clone());
            }
            if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
                sans_family = Some(family.clone());
            }
        }
    }

    if let Some(family) = sans_family.or(first_family) {
        log::debug!(target: "fonts", "sans-serif family: {family}");
        db.set_sans_serif_family(family);
    }
}

/// Shapes, measures and outlines text with cosmic-text.
pub struct Typesetter {
    font_system: FontSystem,
    swash_cache: SwashCache,
    cache: LruCache<MeasureKey, (f32, f32)>,
}

impl Typesetter {
    pub fn new(db: Database) -> Self {
        Self {
            font_system: FontSystem::new_with_locale_and_db("en".to_string(), db),
            swash_cache: SwashCache::new(),
            cache: LruCache::new(MEASURE_CACHE_SIZE),
        }
    }

    /// `None` for sizes cosmic-text cannot lay out (zero, negative, non-finite).
    fn layout(&mut self, text: &str, font_size: f32) -> Option<Buffer> {
        if !(font_size.is_finite() && font_size > 0.0) {
            log::debug!(target: "fonts", "skipping text at font size {font_size}");
            return None;
        }
        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height: font_size * 1.2,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(Family::SansSerif);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);
        Some(buffer)
    }

    /// Glyph outlines of `text` with its layout box's top-left corner at `(x, y)`.
    ///
    /// Returns `None` when nothing visible was shaped (empty text, whitespace,
    /// or no usable font).
    pub fn outline(&mut self, text: &str, font_size: f32, x: f32, y: f32) -> Option<tiny_skia::Path> {
        let buffer = self.layout(text, font_size)?;
        let mut builder = PathBuilder::new();

        for run in buffer.layout_runs() {
            let baseline = y + run.line_y;
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((x, baseline), 1.0);
                let glyph_x = x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = baseline + glyph.y - glyph.font_size * glyph.y_offset;

                let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical.cache_key)
                else {
                    continue;
                };

                // Font outlines are y-up.
                for command in commands {
                    match command {
                        Command::MoveTo(p) => builder.move_to(glyph_x + p.x, glyph_y - p.y),
                        Command::LineTo(p) => builder.line_to(glyph_x + p.x, glyph_y - p.y),
                        Command::QuadTo(ctrl, end) => builder.quad_to(
                            glyph_x + ctrl.x,
                            glyph_y - ctrl.y,
                            glyph_x + end.x,
                            glyph_y - end.y,
                        ),
                        Command::CurveTo(c1, c2, end) => builder.cubic_to(
                            glyph_x + c1.x,
                            glyph_y - c1.y,
                            glyph_x + c2.x,
                            glyph_y - c2.y,
                            glyph_x + end.x,
                            glyph_y - end.y,
                        ),
                        Command::Close => builder.close(),
                    }
                }
            }
        }

        builder.finish()
    }
}

impl TextMeasure for Typesetter {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let Some(buffer) = self.layout(text, font_size) else {
            return (0.0, 0.0);
        };
        let mut total_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            total_width = total_width.max(run.line_w);
            total_height += run.line_height;
        }

        let measured = (total_width, total_height);
        self.cache.put(key, measured);
        measured
    }
}

/// Fixed-advance measure for layout tests: every char is `advance * font_size` wide.
#[cfg(test)]
pub(crate) struct FixedMeasure {
    pub advance: f32,
}

#[cfg(test)]
impl TextMeasure for FixedMeasure {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        (
            text.chars().count() as f32 * self.advance * font_size,
            font_size * 1.2,
        )
    }
}
