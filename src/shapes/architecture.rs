//! Architecture diagram shapes: category-colored components, connections,
//! databases, clouds and free labels.

use schemars::JsonSchema;
use serde::Deserialize;

use super::flowchart::{
    DIAGRAM_OUTLINE_WIDTH, Frame, paint_arrow_head, paint_padded_label, require_finite_segment,
};
use super::{Connectable, Shape, require_finite};
use crate::canvas::{Canvas, Outline, ellipse_path, rect_path};
use crate::color::{CLOUD_COLORS, Color, ColorPair, ComponentKind, DATABASE_COLORS, SUBTITLE_TEXT};
use crate::error::DrawResult;
use crate::geometry::{
    Bounds, DASH_GAP, DASH_LENGTH, DIAGRAM_ARROW_LENGTH, Point, cloud_parts, cylinder_parts,
    dash_segments,
};
use crate::wrap::{BOX_FONT_SIZE, BoxMargins, layout_in_box};

const CONNECTION_WIDTH: f32 = 2.0;

fn default_component_type() -> String {
    "service".to_string()
}

fn default_style() -> String {
    "solid".to_string()
}

fn default_size() -> String {
    "normal".to_string()
}

fn paint_pieces(canvas: &mut Canvas, pieces: &[Option<tiny_skia::Path>], colors: ColorPair) {
    for path in pieces.iter().flatten() {
        canvas.paint_path(
            path,
            Some(colors.fill),
            Some(Outline::new(colors.outline, DIAGRAM_OUTLINE_WIDTH)),
        );
    }
}

fn paint_wrapped(canvas: &mut Canvas, text: &str, bounds: Bounds, margins: BoxMargins) {
    for line in layout_in_box(canvas, text, bounds, margins) {
        canvas.draw_text(&line.text, line.origin, BOX_FONT_SIZE, Color::BLACK);
    }
}

/// A box whose colors come from its component category.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Component {
    #[serde(flatten)]
    pub frame: Frame,
    /// Label; wraps automatically, keep it short
    pub text: String,
    /// Accepted for compatibility; colors follow component_type
    #[serde(default)]
    pub color: Option<String>,
    /// One of: service, database, client, external, queue, cache, storage
    #[serde(default = "default_component_type")]
    pub component_type: String,
}

impl Connectable for Component {
    fn bounds(&self) -> Bounds {
        self.frame.bounds()
    }
}

impl Shape for Component {
    const NAME: &'static str = "draw_component";
    const DESCRIPTION: &'static str = "Draw a component box with text. Returns connection points. Text wraps automatically.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        let colors = ComponentKind::from_name(&self.component_type).colors();
        paint_pieces(canvas, &[rect_path(bounds)], colors);
        paint_wrapped(canvas, &self.text, bounds, BoxMargins::COMPONENT);

        Ok(format!(
            "Component '{}' at ({},{}). Connections: {}",
            self.text,
            self.frame.x,
            self.frame.y,
            self.connection_points()
        ))
    }
}

/// Solid or dashed arrow between two components.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Connection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(default)]
    pub label: String,
    /// "solid" or "dashed"
    #[serde(default = "default_style")]
    pub style: String,
    /// true for two-way communication
    #[serde(default)]
    pub bidirectional: bool,
}

impl Connection {
    fn is_dashed(&self) -> bool {
        self.style.trim().eq_ignore_ascii_case("dashed")
    }
}

impl Shape for Connection {
    const NAME: &'static str = "draw_connection";
    const DESCRIPTION: &'static str = "Draw an arrow between components. Use for data flow, API calls. Style is solid or dashed.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite_segment::<Self>(self.x1, self.y1, self.x2, self.y2)?;
        let from = Point::new(self.x1, self.y1);
        let to = Point::new(self.x2, self.y2);

        if self.is_dashed() {
            for (start, end) in dash_segments(from, to, DASH_LENGTH, DASH_GAP) {
                canvas.draw_line(start, end, Color::BLACK, CONNECTION_WIDTH);
            }
        } else {
            canvas.draw_line(from, to, Color::BLACK, CONNECTION_WIDTH);
        }

        paint_arrow_head(canvas, from, to, Color::BLACK, DIAGRAM_ARROW_LENGTH);
        if self.bidirectional {
            paint_arrow_head(canvas, to, from, Color::BLACK, DIAGRAM_ARROW_LENGTH);
        }

        if !self.label.is_empty() {
            let mid = Point::new(
                ((self.x1 + self.x2) / 2.0).floor(),
                ((self.y1 + self.y2) / 2.0).floor(),
            );
            paint_padded_label(canvas, &self.label, mid, 3.0);
        }

        let mut message = format!(
            "Connection drawn from ({},{}) to ({},{})",
            self.x1, self.y1, self.x2, self.y2
        );
        if !self.label.is_empty() {
            message.push_str(&format!(" [{}]", self.label));
        }
        Ok(message)
    }
}

/// Cylinder: two elliptic caps around a rectangular body.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Database {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
}

impl Connectable for Database {
    fn bounds(&self) -> Bounds {
        self.frame.bounds()
    }
}

impl Shape for Database {
    const NAME: &'static str = "draw_database";
    const DESCRIPTION: &'static str = "Draw a cylinder shape for databases. Returns top and bottom connection points.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        let parts = cylinder_parts(bounds);
        paint_pieces(
            canvas,
            &[
                ellipse_path(parts.top_cap),
                rect_path(parts.body),
                ellipse_path(parts.bottom_cap),
            ],
            DATABASE_COLORS,
        );
        paint_wrapped(
            canvas,
            &self.text,
            bounds,
            BoxMargins::database(parts.cap_height),
        );

        let points = self.connection_points();
        Ok(format!(
            "Database '{}' at ({},{}). Connections: top={}, bottom={}",
            self.text, self.frame.x, self.frame.y, points.top, points.bottom
        ))
    }
}

/// Cloud: three overlapping lobes over a flat base.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Cloud {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
}

impl Connectable for Cloud {
    fn bounds(&self) -> Bounds {
        self.frame.bounds()
    }
}

impl Shape for Cloud {
    const NAME: &'static str = "draw_cloud";
    const DESCRIPTION: &'static str = "Draw a cloud shape for cloud services. Returns connection points.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        let parts = cloud_parts(bounds);
        let [left, center, right] = parts.lobes;
        paint_pieces(
            canvas,
            &[
                ellipse_path(left),
                ellipse_path(center),
                ellipse_path(right),
                rect_path(parts.base),
            ],
            CLOUD_COLORS,
        );
        paint_wrapped(canvas, &self.text, bounds, BoxMargins::CLOUD);

        Ok(format!(
            "Cloud '{}' at ({},{}). Connections: {}",
            self.text,
            self.frame.x,
            self.frame.y,
            self.connection_points()
        ))
    }
}

/// Free-standing diagram text.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Label {
    pub x: f32,
    pub y: f32,
    pub text: String,
    /// "title", "subtitle" or "normal"
    #[serde(default = "default_size")]
    pub size: String,
}

impl Label {
    fn style(&self) -> (f32, Color) {
        match self.size.trim().to_ascii_lowercase().as_str() {
            "title" => (20.0, Color::BLACK),
            "subtitle" => (14.0, SUBTITLE_TEXT),
            _ => (BOX_FONT_SIZE, Color::BLACK),
        }
    }
}

impl Shape for Label {
    const NAME: &'static str = "add_label";
    const DESCRIPTION: &'static str = "Add a text label for architecture diagrams (size: title, subtitle or normal).";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite::<Self>(&[("x", self.x), ("y", self.y)])?;
        let (font_size, color) = self.style();
        canvas.draw_text(&self.text, Point::new(self.x, self.y), font_size, color);
        Ok(format!("Label '{}' added at ({},{})", self.text, self.x, self.y))
    }
}
