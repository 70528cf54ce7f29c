//! Basic and advanced shapes shared by every palette.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{
    MAX_FONT_SIZE, Shape, default_fill_black, default_line_width, default_outline,
    default_outline_width, invalid, outline, require_at_most, require_finite, require_positive,
};
use crate::canvas::{
    Canvas, Outline, ellipse_path, polygon_path, polyline_path, rect_path, smooth_curve_path,
};
use crate::color::{resolve_color, resolve_paint};
use crate::error::{DrawError, DrawResult};
use crate::geometry::{
    Bounds, MAX_VERTEX_COUNT, Point, PointInput, arc_points, gradient_ratio, lerp_color,
    normalize_points, regular_polygon_vertices, star_vertices,
};

fn default_zero() -> f32 {
    0.0
}

fn default_hundred() -> f32 {
    100.0
}

fn default_blue() -> String {
    "blue".to_string()
}

fn default_red() -> String {
    "red".to_string()
}

fn default_green() -> String {
    "green".to_string()
}

fn default_yellow() -> String {
    "yellow".to_string()
}

fn default_orange() -> String {
    "orange".to_string()
}

fn default_font_size() -> f32 {
    20.0
}

fn default_star_points() -> u32 {
    5
}

fn default_direction() -> String {
    "vertical".to_string()
}

/// Axis-aligned rectangle from its top-left corner.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Rectangle {
    #[serde(default = "default_zero")]
    pub x: f32,
    #[serde(default = "default_zero")]
    pub y: f32,
    #[serde(default = "default_hundred")]
    pub width: f32,
    #[serde(default = "default_hundred")]
    pub height: f32,
    /// Fill color name or #RRGGBB, "transparent" for none
    #[serde(default = "default_blue")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
    #[serde(default = "default_outline_width")]
    pub outline_width: f32,
}

impl Shape for Rectangle {
    const NAME: &'static str = "add_rectangle";
    const DESCRIPTION: &'static str = "Draw a filled rectangle. Specify position (x,y), size (width, height), fill color, and outline color. Use outline_width for outline thickness.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("x", self.x), ("y", self.y), ("outline_width", self.outline_width)])?;
        require_positive::<Self>(&[("width", self.width), ("height", self.height)])?;

        let bounds = Bounds::new(self.x, self.y, self.width, self.height);
        if let Some(path) = rect_path(bounds) {
            canvas.paint_path(
                &path,
                resolve_paint(&self.fill),
                outline(&self.outline, self.outline_width),
            );
        }
        Ok(format!(
            "Rectangle drawn at ({},{}) with size {}x{}, fill={}",
            self.x, self.y, self.width, self.height, self.fill
        ))
    }
}

/// Circle from its center and radius.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    #[serde(default = "default_red")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
    #[serde(default = "default_outline_width")]
    pub outline_width: f32,
}

impl Shape for Circle {
    const NAME: &'static str = "add_circle";
    const DESCRIPTION: &'static str = "Draw a filled circle. Specify center position (x,y), radius, fill color, and outline color.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("x", self.x), ("y", self.y), ("outline_width", self.outline_width)])?;
        require_positive::<Self>(&[("radius", self.radius)])?;

        let bounds = Bounds::around(Point::new(self.x, self.y), self.radius, self.radius);
        if let Some(path) = ellipse_path(bounds) {
            canvas.paint_path(
                &path,
                resolve_paint(&self.fill),
                outline(&self.outline, self.outline_width),
            );
        }
        Ok(format!(
            "Circle drawn at ({},{}) with radius {}, fill={}",
            self.x, self.y, self.radius, self.fill
        ))
    }
}

/// Ellipse from its center and two radii.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Ellipse {
    pub x: f32,
    pub y: f32,
    /// Horizontal radius
    pub rx: f32,
    /// Vertical radius
    pub ry: f32,
    #[serde(default = "default_blue")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
    #[serde(default = "default_outline_width")]
    pub outline_width: f32,
}

impl Shape for Ellipse {
    const NAME: &'static str = "add_ellipse";
    const DESCRIPTION: &'static str = "Draw an ellipse (oval). Specify center (x,y), horizontal radius (rx), vertical radius (ry). Useful for eggs, eyes, leaves.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("x", self.x), ("y", self.y), ("outline_width", self.outline_width)])?;
        require_positive::<Self>(&[("rx", self.rx), ("ry", self.ry)])?;

        let bounds = Bounds::around(Point::new(self.x, self.y), self.rx, self.ry);
        if let Some(path) = ellipse_path(bounds) {
            canvas.paint_path(
                &path,
                resolve_paint(&self.fill),
                outline(&self.outline, self.outline_width),
            );
        }
        Ok(format!(
            "Ellipse drawn at ({},{}) with radii ({},{}), fill={}",
            self.x, self.y, self.rx, self.ry, self.fill
        ))
    }
}

/// Closed polygon through a list of points.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Polygon {
    /// Vertices as [[x1, y1], [x2, y2], ...]; at least 3
    #[schemars(with = "Vec<[f32; 2]>")]
    pub points: Vec<PointInput>,
    #[serde(default = "default_green")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
    #[serde(default = "default_outline_width")]
    pub outline_width: f32,
}

impl Shape for Polygon {
    const NAME: &'static str = "add_polygon";
    const DESCRIPTION: &'static str = "Draw a polygon from a list of points like [[x1,y1], [x2,y2], [x3,y3]].";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("outline_width", self.outline_width)])?;
        let points = normalize_points(&self.points);
        if points.len() < 3 {
            return Err(DrawError::InsufficientPoints {
                shape: "polygon",
                required: 3,
                got: points.len(),
            });
        }

        if let Some(path) = polygon_path(&points) {
            canvas.paint_path(
                &path,
                resolve_paint(&self.fill),
                outline(&self.outline, self.outline_width),
            );
        }
        Ok(format!(
            "Polygon drawn with {} points, fill={}",
            points.len(),
            self.fill
        ))
    }
}

/// Straight line segment.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Line color
    #[serde(default = "default_fill_black")]
    pub fill: String,
    #[serde(default = "default_line_width")]
    pub width: f32,
}

impl Shape for Line {
    const NAME: &'static str = "add_line";
    const DESCRIPTION: &'static str = "Draw a line from point (x1,y1) to (x2,y2). Useful for stems, branches, borders, connections.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[
            ("x1", self.x1),
            ("y1", self.y1),
            ("x2", self.x2),
            ("y2", self.y2),
            ("width", self.width),
        ])?;
        canvas.draw_line(
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y2),
            resolve_color(&self.fill),
            self.width,
        );
        Ok(format!(
            "Line drawn from ({},{}) to ({},{}), color={}, width={}",
            self.x1, self.y1, self.x2, self.y2, self.fill, self.width
        ))
    }
}

/// Bounding box and sweep shared by arcs, chords and pie slices.
///
/// Angles are degrees, 0 at 3 o'clock, increasing clockwise on screen.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
pub struct ArcBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl ArcBox {
    fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    fn points(&self) -> Vec<Point> {
        arc_points(self.bounds(), self.start_angle, self.end_angle)
    }

    fn validate<S: Shape>(&self) -> DrawResult<()> {
        require_finite::<S>(&[
            ("x", self.x),
            ("y", self.y),
            ("start_angle", self.start_angle),
            ("end_angle", self.end_angle),
        ])?;
        require_positive::<S>(&[("width", self.width), ("height", self.height)])
    }
}

/// Stroked elliptic arc.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Arc {
    #[serde(flatten)]
    pub arc: ArcBox,
    /// Stroke color
    #[serde(default = "default_fill_black")]
    pub fill: String,
    /// Stroke width in pixels
    #[serde(default = "default_line_width")]
    pub width_px: f32,
}

impl Shape for Arc {
    const NAME: &'static str = "add_arc";
    const DESCRIPTION: &'static str = "Draw an arc (curved line) within a bounding box. Angles in degrees. Start=0 is 3 o'clock, angles increase clockwise.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        self.arc.validate::<Self>()?;
        require_finite::<Self>(&[("width_px", self.width_px)])?;
        if let Some(path) = polyline_path(&self.arc.points()) {
            canvas.stroke_path(&path, Outline::new(resolve_color(&self.fill), self.width_px));
        }
        let a = &self.arc;
        Ok(format!(
            "Arc drawn in box ({},{},{},{}), angles={}-{}",
            a.x, a.y, a.width, a.height, a.start_angle, a.end_angle
        ))
    }
}

/// Arc closed by the straight chord between its ends.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Chord {
    #[serde(flatten)]
    pub arc: ArcBox,
    #[serde(default = "default_yellow")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for Chord {
    const NAME: &'static str = "add_chord";
    const DESCRIPTION: &'static str = "Draw a chord (arc closed by a straight line). Useful for wedges, partial circles.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        self.arc.validate::<Self>()?;
        if let Some(path) = polygon_path(&self.arc.points()) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 1.0));
        }
        Ok(format!(
            "Chord drawn, angles={}-{}, fill={}",
            self.arc.start_angle, self.arc.end_angle, self.fill
        ))
    }
}

/// Arc closed through the ellipse center.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PieSlice {
    #[serde(flatten)]
    pub arc: ArcBox,
    #[serde(default = "default_orange")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for PieSlice {
    const NAME: &'static str = "add_pieslice";
    const DESCRIPTION: &'static str = "Draw a pieslice (filled wedge from the center). Like a pizza slice. Useful for pie charts.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        self.arc.validate::<Self>()?;
        let mut points = vec![self.arc.bounds().center()];
        points.extend(self.arc.points());
        if let Some(path) = polygon_path(&points) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 1.0));
        }
        Ok(format!(
            "Pieslice drawn, angles={}-{}, fill={}",
            self.arc.start_angle, self.arc.end_angle, self.fill
        ))
    }
}

/// Free text anchored at its top-left corner.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Text {
    pub x: f32,
    pub y: f32,
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_fill_black")]
    pub fill: String,
}

impl Shape for Text {
    const NAME: &'static str = "add_text";
    const DESCRIPTION: &'static str = "Draw text at position (x,y), the top-left corner of the text. Use this to add labels or writing to the canvas.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("x", self.x), ("y", self.y)])?;
        require_positive::<Self>(&[("font_size", self.font_size)])?;
        if self.font_size > MAX_FONT_SIZE {
            return Err(invalid::<Self>(format!(
                "font_size must be at most {MAX_FONT_SIZE}, got {}",
                self.font_size
            )));
        }

        canvas.draw_text(
            &self.text,
            Point::new(self.x, self.y),
            self.font_size,
            resolve_color(&self.fill),
        );
        Ok(format!("Text \"{}\" drawn at ({},{})", self.text, self.x, self.y))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub outer_radius: f32,
    pub inner_radius: f32,
    /// Number of star points; 5 is the classic star
    #[serde(default = "default_star_points")]
    pub points: u32,
    #[serde(default = "default_yellow")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for Star {
    const NAME: &'static str = "add_star";
    const DESCRIPTION: &'static str = "Draw a star shape with N points centered at (x,y). Outer radius and inner radius control the star shape. N=5 is a typical star.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        if self.points < 2 {
            return Err(DrawError::InsufficientPoints {
                shape: "star",
                required: 2,
                got: self.points as usize,
            });
        }
        require_at_most::<Self>("points", self.points, MAX_VERTEX_COUNT)?;
        require_finite::<Self>(&[
            ("x", self.x),
            ("y", self.y),
            ("outer_radius", self.outer_radius),
            ("inner_radius", self.inner_radius),
        ])?;

        let vertices = star_vertices(
            Point::new(self.x, self.y),
            self.outer_radius,
            self.inner_radius,
            self.points,
        );
        if let Some(path) = polygon_path(&vertices) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 1.0));
        }
        Ok(format!(
            "Star with {} points drawn at ({},{}), fill={}",
            self.points, self.x, self.y, self.fill
        ))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RegularPolygon {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Number of sides: 3 is a triangle, 6 a hexagon
    pub sides: u32,
    /// Rotation in degrees; 0 puts a vertex straight up
    #[serde(default = "default_zero")]
    pub rotation: f32,
    #[serde(default = "default_blue")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for RegularPolygon {
    const NAME: &'static str = "add_regular_polygon";
    const DESCRIPTION: &'static str = "Draw a regular polygon (equal sides) with N sides. N=3 is a triangle, N=6 is a hexagon, etc.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        if self.sides < 3 {
            return Err(DrawError::InsufficientPoints {
                shape: "regular polygon",
                required: 3,
                got: self.sides as usize,
            });
        }
        require_at_most::<Self>("sides", self.sides, MAX_VERTEX_COUNT)?;
        require_finite::<Self>(&[
            ("x", self.x),
            ("y", self.y),
            ("radius", self.radius),
            ("rotation", self.rotation),
        ])?;

        let vertices = regular_polygon_vertices(
            Point::new(self.x, self.y),
            self.radius,
            self.sides,
            self.rotation,
        );
        if let Some(path) = polygon_path(&vertices) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 1.0));
        }
        Ok(format!(
            "Regular {}-sided polygon drawn at ({},{}), fill={}",
            self.sides, self.x, self.y, self.fill
        ))
    }
}

/// Full-canvas linear gradient, painted one row or column at a time.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Gradient {
    pub start_color: String,
    pub end_color: String,
    /// "vertical" (top to bottom) or "horizontal" (left to right)
    #[serde(default = "default_direction")]
    pub direction: String,
}

impl Shape for Gradient {
    const NAME: &'static str = "add_gradient";
    const DESCRIPTION: &'static str = "Fill the canvas with a gradient (vertical or horizontal). Use for sky, sunsets, realistic backgrounds.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let start = resolve_color(&self.start_color);
        let end = resolve_color(&self.end_color);
        let (width, height) = (canvas.width(), canvas.height());
        let horizontal = self.direction.trim().eq_ignore_ascii_case("horizontal");

        let steps = if horizontal { width } else { height };
        for i in 0..steps {
            let color = lerp_color(start, end, gradient_ratio(i, steps));
            let strip = if horizontal {
                Bounds::new(i as f32, 0.0, 1.0, height as f32)
            } else {
                Bounds::new(0.0, i as f32, width as f32, 1.0)
            };
            canvas.fill_rect(strip, color);
        }

        let direction = if horizontal { "horizontal" } else { "vertical" };
        Ok(format!(
            "Gradient from {} to {} ({}) applied",
            self.start_color, self.end_color, direction
        ))
    }
}

/// Smooth curve through a list of points.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CurvedLine {
    /// Points the curve passes through, as [[x1, y1], [x2, y2], ...]; at least 2
    #[schemars(with = "Vec<[f32; 2]>")]
    pub points: Vec<PointInput>,
    #[serde(default = "default_fill_black")]
    pub fill: String,
    #[serde(default = "default_line_width")]
    pub width: f32,
}

impl Shape for CurvedLine {
    const NAME: &'static str = "add_curved_line";
    const DESCRIPTION: &'static str = "Draw a smooth curved line through points. Great for organic shapes, paths.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("width", self.width)])?;
        let points = normalize_points(&self.points);
        if points.len() < 2 {
            return Err(DrawError::InsufficientPoints {
                shape: "curved line",
                required: 2,
                got: points.len(),
            });
        }

        if let Some(path) = smooth_curve_path(&points) {
            canvas.stroke_path(&path, Outline::new(resolve_color(&self.fill), self.width));
        }
        Ok(format!("Curved line drawn through {} points", points.len()))
    }
}
