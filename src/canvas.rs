//! Raster canvas: an owned RGBA pixmap plus the typesetter used to draw text on it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cosmic_text::fontdb::Database;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::color::Color;
use crate::error::{DrawError, DrawResult};
use crate::fonts::{TextMeasure, Typesetter};
use crate::geometry::{Bounds, Point};

pub const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub color: Color,
    pub width: f32,
}

impl Outline {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

pub struct Canvas {
    pixmap: Pixmap,
    typesetter: Typesetter,
    background: Option<Color>,
}

impl Canvas {
    /// Create a canvas filled with `background`, or fully transparent when `None`.
    pub fn new(width: u32, height: u32, background: Option<Color>, fonts: Database) -> DrawResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DrawError::InvalidDimensions { width, height });
        }

        let mut pixmap =
            Pixmap::new(width, height).ok_or(DrawError::InvalidDimensions { width, height })?;
        if let Some(color) = background {
            pixmap.fill(color.to_skia());
        }

        log::debug!(target: "canvas", "new canvas {}x{} background {:?}", width, height, background);
        Ok(Self {
            pixmap,
            typesetter: Typesetter::new(fonts),
            background,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Straight-alpha color of one pixel, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color {
            r: pixel.red(),
            g: pixel.green(),
            b: pixel.blue(),
            a: pixel.alpha(),
        })
    }

    pub fn fill_path(&mut self, path: &Path, color: Color) {
        let paint = solid_paint(color);
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    pub fn stroke_path(&mut self, path: &Path, outline: Outline) {
        if !(outline.width.is_finite() && outline.width > 0.0) {
            return;
        }
        let paint = solid_paint(outline.color);
        let stroke = Stroke {
            width: outline.width,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }

    /// Fill then outline a closed path. Either part may be skipped.
    pub fn paint_path(&mut self, path: &Path, fill: Option<Color>, outline: Option<Outline>) {
        if let Some(color) = fill {
            self.fill_path(path, color);
        }
        if let Some(outline) = outline {
            self.stroke_path(path, outline);
        }
    }

    pub fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        if let Some(path) = rect_path(bounds) {
            self.fill_path(&path, color);
        }
    }

    pub fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        log::debug!(target: "canvas", "line {} -> {} width {}", from, to, width);
        if let Some(path) = polyline_path(&[from, to]) {
            self.stroke_path(&path, Outline::new(color, width));
        }
    }

    /// Draw `text` with the top-left of its layout box at `origin`.
    pub fn draw_text(&mut self, text: &str, origin: Point, font_size: f32, color: Color) {
        log::debug!(target: "canvas", "text {:?} at {} size {}", text, origin, font_size);
        if let Some(path) = self.typesetter.outline(text, font_size, origin.x, origin.y) {
            self.fill_path(&path, color);
        }
    }

    pub fn text_bounds(&mut self, text: &str, origin: Point, font_size: f32) -> Bounds {
        let (width, height) = self.measure_text(text, font_size);
        Bounds::new(origin.x, origin.y, width, height)
    }

    pub fn encode_png(&self) -> DrawResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| DrawError::Encode(e.to_string()))
    }

    pub fn to_base64_png(&self) -> DrawResult<String> {
        Ok(STANDARD.encode(self.encode_png()?))
    }
}

impl TextMeasure for Canvas {
    fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.typesetter.measure_text(text, font_size)
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint {
        anti_alias: true,
        ..Default::default()
    };
    paint.set_color(color.to_skia());
    paint
}

pub fn rect_path(bounds: Bounds) -> Option<Path> {
    let rect = Rect::from_xywh(bounds.x, bounds.y, bounds.width, bounds.height)?;
    Some(PathBuilder::from_rect(rect))
}

pub fn ellipse_path(bounds: Bounds) -> Option<Path> {
    let rect = Rect::from_xywh(bounds.x, bounds.y, bounds.width, bounds.height)?;
    PathBuilder::from_oval(rect)
}

/// Rectangle with quadratic corners; the radius is clamped to half the shorter side.
pub fn rounded_rect_path(bounds: Bounds, radius: f32) -> Option<Path> {
    let Bounds {
        x,
        y,
        width,
        height,
    } = bounds;
    let r = radius.max(0.0).min(width / 2.0).min(height / 2.0);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + width - r, y);
    pb.quad_to(x + width, y, x + width, y + r);
    pb.line_to(x + width, y + height - r);
    pb.quad_to(x + width, y + height, x + width - r, y + height);
    pb.line_to(x + r, y + height);
    pb.quad_to(x, y + height, x, y + height - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

pub fn polygon_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

pub fn polyline_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// Catmull-Rom spline through every point, emitted as cubic segments.
pub fn smooth_curve_path(points: &[Point]) -> Option<Path> {
    if points.len() < 3 {
        return polyline_path(points);
    }

    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x, points[0].y);
    for i in 0..points.len() - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];

        let c1 = Point::new(p1.x + (p2.x - p0.x) / 6.0, p1.y + (p2.y - p0.y) / 6.0);
        let c2 = Point::new(p2.x - (p3.x - p1.x) / 6.0, p2.y - (p3.y - p1.y) / 6.0);
        pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p2.x, p2.y);
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width: u32, height: u32, background: Option<Color>) -> Canvas {
        Canvas::new(width, height, background, Database::new()).unwrap()
    }

    #[test]
    fn new_canvas_is_filled_with_background() {
        let c = canvas(40, 30, Some(Color::WHITE));
        assert_eq!(c.width(), 40);
        assert_eq!(c.height(), 30);
        assert_eq!(c.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(c.pixel(39, 29), Some(Color::WHITE));
        assert_eq!(c.pixel(40, 0), None);
    }

    #[test]
    fn transparent_background_leaves_alpha_zero() {
        let c = canvas(10, 10, None);
        assert_eq!(c.pixel(5, 5).map(|p| p.a), Some(0));
    }

    #[test]
    fn rejects_zero_and_oversized_dimensions() {
        assert!(matches!(
            Canvas::new(0, 10, None, Database::new()),
            Err(DrawError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(Canvas::new(MAX_DIMENSION + 1, 10, None, Database::new()).is_err());
    }

    #[test]
    fn fill_rect_paints_interior() {
        let mut c = canvas(50, 50, Some(Color::WHITE));
        c.fill_rect(Bounds::new(10.0, 10.0, 20.0, 20.0), Color::rgb(255, 0, 0));
        assert_eq!(c.pixel(20, 20), Some(Color::rgb(255, 0, 0)));
        assert_eq!(c.pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn shapes_outside_the_canvas_clip_silently() {
        let mut c = canvas(20, 20, Some(Color::WHITE));
        c.fill_rect(Bounds::new(-50.0, -50.0, 60.0, 60.0), Color::BLACK);
        assert_eq!(c.pixel(5, 5), Some(Color::BLACK));
        assert_eq!(c.pixel(15, 15), Some(Color::WHITE));
        c.draw_line(Point::new(-100.0, 500.0), Point::new(500.0, 600.0), Color::BLACK, 2.0);
    }

    #[test]
    fn zero_width_outline_draws_nothing() {
        let mut c = canvas(20, 20, Some(Color::WHITE));
        let path = rect_path(Bounds::new(2.0, 2.0, 10.0, 10.0)).unwrap();
        c.stroke_path(&path, Outline::new(Color::BLACK, 0.0));
        assert_eq!(c.pixel(2, 2), Some(Color::WHITE));
    }

    #[test]
    fn non_finite_stroke_width_draws_nothing() {
        let mut c = canvas(20, 20, Some(Color::WHITE));
        c.draw_line(Point::new(0.0, 10.0), Point::new(20.0, 10.0), Color::BLACK, f32::INFINITY);
        c.draw_line(Point::new(0.0, 10.0), Point::new(20.0, 10.0), Color::BLACK, f32::NAN);
        assert_eq!(c.pixel(10, 10), Some(Color::WHITE));
    }

    #[test]
    fn png_export_has_signature() {
        let c = canvas(8, 8, Some(Color::WHITE));
        let png = c.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(c.to_base64_png().unwrap().starts_with("iVBORw0KGgo"));
    }

    #[test]
    fn path_helpers_reject_empty_input() {
        assert!(polygon_path(&[]).is_none());
        assert!(rect_path(Bounds::new(0.0, 0.0, -5.0, 10.0)).is_none());
    }
}
