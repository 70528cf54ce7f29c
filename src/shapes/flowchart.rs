//! Flowchart shapes: the simple, color-configurable set of the creative
//! palette and the fixed-style set that follows the layout planner.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{Shape, default_fill_black, default_outline, outline, require_finite, require_positive};
use crate::canvas::{Canvas, Outline, polygon_path, rect_path, rounded_rect_path};
use crate::color::{
    Color, ColorPair, DECISION_COLORS, INPUT_COLORS, OUTPUT_COLORS, PROCESS_COLORS,
    TERMINAL_COLORS, resolve_color, resolve_paint,
};
use crate::error::DrawResult;
use crate::geometry::{
    Bounds, CREATIVE_ARROW_LENGTH, DIAGRAM_ARROW_LENGTH, Point, arrow_head, diamond_vertices,
    parallelogram_vertices,
};
use crate::wrap::{BOX_FONT_SIZE, centered_origin};

/// Stroke width of every fixed-style diagram shape.
pub(crate) const DIAGRAM_OUTLINE_WIDTH: f32 = 3.0;
const ARROW_LINE_WIDTH: f32 = 2.0;
const INPUT_OUTPUT_SKEW: f32 = 20.0;

fn default_lightblue() -> String {
    "lightblue".to_string()
}

fn default_lightyellow() -> String {
    "lightyellow".to_string()
}

fn default_lightgreen() -> String {
    "lightgreen".to_string()
}

fn default_true() -> bool {
    true
}

/// Box geometry shared by every labeled flowchart shape.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Bounds of a drawable box: finite corner, positive size.
    pub(crate) fn validated<S: Shape>(&self) -> DrawResult<Bounds> {
        require_finite::<S>(&[("x", self.x), ("y", self.y)])?;
        require_positive::<S>(&[("width", self.width), ("height", self.height)])?;
        Ok(self.bounds())
    }
}

pub(super) fn require_finite_segment<S: Shape>(x1: f32, y1: f32, x2: f32, y2: f32) -> DrawResult<()> {
    require_finite::<S>(&[("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2)])
}

/// Black label text centered on the middle of `bounds`.
fn draw_centered_label(canvas: &mut Canvas, text: &str, bounds: Bounds) {
    let origin = centered_origin(canvas, text, BOX_FONT_SIZE, bounds.center());
    canvas.draw_text(text, origin, BOX_FONT_SIZE, Color::BLACK);
}

/// Line with a filled arrow head at `to`.
pub(crate) fn paint_arrow(canvas: &mut Canvas, from: Point, to: Point, color: Color, head_length: f32) {
    canvas.draw_line(from, to, color, ARROW_LINE_WIDTH);
    paint_arrow_head(canvas, from, to, color, head_length);
}

pub(crate) fn paint_arrow_head(canvas: &mut Canvas, from: Point, tip: Point, color: Color, head_length: f32) {
    if let Some(path) = polygon_path(&arrow_head(from, tip, head_length)) {
        canvas.fill_path(&path, color);
    }
}

/// Black text over a white box padded around its layout bounds.
pub(crate) fn paint_padded_label(canvas: &mut Canvas, text: &str, origin: Point, padding: f32) {
    let pad = canvas.text_bounds(text, origin, BOX_FONT_SIZE).with_padding(padding);
    canvas.fill_rect(pad, Color::WHITE);
    canvas.draw_text(text, origin, BOX_FONT_SIZE, Color::BLACK);
}

fn paint_pair(canvas: &mut Canvas, path: Option<tiny_skia::Path>, colors: ColorPair) {
    if let Some(path) = path {
        canvas.paint_path(
            &path,
            Some(colors.fill),
            Some(Outline::new(colors.outline, DIAGRAM_OUTLINE_WIDTH)),
        );
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SimpleProcess {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
    #[serde(default = "default_lightblue")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for SimpleProcess {
    const NAME: &'static str = "add_flowchart_process";
    const DESCRIPTION: &'static str = "Draw a flowchart process box (rectangle) with centered text inside.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        if let Some(path) = rect_path(bounds) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 2.0));
        }
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Process box \"{}\" drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SimpleDecision {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
    #[serde(default = "default_lightyellow")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for SimpleDecision {
    const NAME: &'static str = "add_flowchart_decision";
    const DESCRIPTION: &'static str = "Draw a flowchart decision diamond with centered text inside.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        if let Some(path) = polygon_path(&diamond_vertices(bounds)) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 1.0));
        }
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Decision diamond \"{}\" drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

/// Rounded start/end box; corner radius is a quarter of the shorter side.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SimpleTerminal {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
    #[serde(default = "default_lightgreen")]
    pub fill: String,
    #[serde(default = "default_outline")]
    pub outline: String,
}

impl Shape for SimpleTerminal {
    const NAME: &'static str = "add_flowchart_terminal";
    const DESCRIPTION: &'static str = "Draw a flowchart start/end terminal (rounded rectangle) with text.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        let radius = (bounds.width.min(bounds.height) / 4.0).floor();
        if let Some(path) = rounded_rect_path(bounds, radius) {
            canvas.paint_path(&path, resolve_paint(&self.fill), outline(&self.outline, 2.0));
        }
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Terminal \"{}\" drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SimpleArrow {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(default)]
    pub label: String,
    /// Line, head and label color
    #[serde(default = "default_fill_black")]
    pub fill: String,
}

impl Shape for SimpleArrow {
    const NAME: &'static str = "add_flowchart_arrow";
    const DESCRIPTION: &'static str = "Draw a flowchart arrow from (x1,y1) to (x2,y2) with an arrowhead. Use for connecting flowchart elements.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite_segment::<Self>(self.x1, self.y1, self.x2, self.y2)?;
        let from = Point::new(self.x1, self.y1);
        let to = Point::new(self.x2, self.y2);
        let color = resolve_color(&self.fill);
        paint_arrow(canvas, from, to, color, CREATIVE_ARROW_LENGTH);

        if !self.label.is_empty() {
            let mid = from.midpoint(to);
            let origin = Point::new(mid.x.floor() + 5.0, mid.y.floor() - 10.0);
            canvas.draw_text(&self.label, origin, BOX_FONT_SIZE, color);
        }

        let mut message = format!(
            "Arrow drawn from ({},{}) to ({},{})",
            self.x1, self.y1, self.x2, self.y2
        );
        if !self.label.is_empty() {
            message.push_str(&format!(" with label \"{}\"", self.label));
        }
        Ok(message)
    }
}

/// Light blue process box with a thick blue outline.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Process {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
}

impl Shape for Process {
    const NAME: &'static str = "draw_process";
    const DESCRIPTION: &'static str = "Draw a process rectangle for flowcharts.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        paint_pair(canvas, rect_path(bounds), PROCESS_COLORS);
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Process '{}' drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Decision {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
}

impl Shape for Decision {
    const NAME: &'static str = "draw_decision";
    const DESCRIPTION: &'static str = "Draw a decision diamond for flowcharts. Arrows leave from its left and right side points.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        paint_pair(canvas, polygon_path(&diamond_vertices(bounds)), DECISION_COLORS);
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Decision '{}' drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

/// Stadium-shaped terminal: corner radius is half the height.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Terminal {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
}

impl Shape for Terminal {
    const NAME: &'static str = "draw_terminal";
    const DESCRIPTION: &'static str = "Draw a start/end terminal for flowcharts.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        let radius = (bounds.height / 2.0).floor();
        paint_pair(canvas, rounded_rect_path(bounds, radius), TERMINAL_COLORS);
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Terminal '{}' drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Arrow {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(default)]
    pub label: String,
}

impl Arrow {
    /// Label origin: above horizontal arrows, right of vertical ones.
    fn label_origin(&self) -> Point {
        let mid_x = ((self.x1 + self.x2) / 2.0).floor();
        let mid_y = ((self.y1 + self.y2) / 2.0).floor();
        if (self.x2 - self.x1).abs() > (self.y2 - self.y1).abs() {
            Point::new(mid_x, mid_y - 15.0)
        } else {
            Point::new(mid_x + 10.0, mid_y)
        }
    }
}

impl Shape for Arrow {
    const NAME: &'static str = "draw_arrow";
    const DESCRIPTION: &'static str = "Draw an arrow for flowcharts. Use the exact coordinates from plan_flowchart.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        require_finite_segment::<Self>(self.x1, self.y1, self.x2, self.y2)?;
        paint_arrow(
            canvas,
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y2),
            Color::BLACK,
            DIAGRAM_ARROW_LENGTH,
        );

        if !self.label.trim().is_empty() {
            paint_padded_label(canvas, &self.label, self.label_origin(), 2.0);
        }

        let mut message = format!(
            "Arrow drawn from ({},{}) to ({},{})",
            self.x1, self.y1, self.x2, self.y2
        );
        if !self.label.is_empty() {
            message.push_str(&format!(" [{}]", self.label));
        }
        Ok(message)
    }
}

/// Parallelogram for data entering or leaving the flow.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InputOutput {
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
    /// true for input (purple), false for output (orange)
    #[serde(default = "default_true")]
    pub is_input: bool,
}

impl Shape for InputOutput {
    const NAME: &'static str = "draw_input_output";
    const DESCRIPTION: &'static str = "Draw an input/output parallelogram for flowcharts.";

    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String> {
        let bounds = self.frame.validated::<Self>()?;
        let colors = if self.is_input { INPUT_COLORS } else { OUTPUT_COLORS };
        paint_pair(
            canvas,
            polygon_path(&parallelogram_vertices(bounds, INPUT_OUTPUT_SKEW)),
            colors,
        );
        draw_centered_label(canvas, &self.text, bounds);
        Ok(format!(
            "Input/Output '{}' drawn at ({},{})",
            self.text, self.frame.x, self.frame.y
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmic_text::fontdb::Database;

    fn canvas() -> Canvas {
        Canvas::new(300, 200, Some(Color::WHITE), Database::new()).unwrap()
    }

    fn parse<S: Shape>(json: &str) -> S {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn process_uses_fixed_colors() {
        let mut c = canvas();
        let process: Process = parse(r#"{"x": 20, "y": 20, "width": 150, "height": 50, "text": ""}"#);
        assert_eq!(process.draw(&mut c).unwrap(), "Process '' drawn at (20,20)");
        assert_eq!(c.pixel(40, 60), Some(PROCESS_COLORS.fill));
        assert_eq!(c.pixel(20, 45), Some(PROCESS_COLORS.outline));
    }

    #[test]
    fn decision_fills_the_diamond_center_only() {
        let mut c = canvas();
        let decision: Decision = parse(r#"{"x": 0, "y": 0, "width": 160, "height": 90, "text": ""}"#);
        decision.draw(&mut c).unwrap();
        assert_eq!(c.pixel(80, 45), Some(DECISION_COLORS.fill));
        assert_eq!(c.pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn output_parallelogram_switches_palette() {
        let mut c = canvas();
        let io: InputOutput = parse(
            r#"{"x": 10, "y": 10, "width": 120, "height": 60, "text": "", "is_input": false}"#,
        );
        assert_eq!(io.draw(&mut c).unwrap(), "Input/Output '' drawn at (10,10)");
        assert_eq!(c.pixel(70, 40), Some(OUTPUT_COLORS.fill));
        // Skewed corner stays background.
        assert_eq!(c.pixel(13, 13), Some(Color::WHITE));
    }

    #[test]
    fn arrow_label_sits_above_horizontal_and_beside_vertical() {
        let horizontal: Arrow = parse(r#"{"x1": 0, "y1": 100, "x2": 200, "y2": 100, "label": "Yes"}"#);
        assert_eq!(horizontal.label_origin(), Point::new(100.0, 85.0));
        let vertical: Arrow = parse(r#"{"x1": 50, "y1": 0, "x2": 50, "y2": 100, "label": "No"}"#);
        assert_eq!(vertical.label_origin(), Point::new(60.0, 50.0));
    }

    #[test]
    fn arrow_messages_include_label() {
        let mut c = canvas();
        let arrow: Arrow = parse(r#"{"x1": 10, "y1": 10, "x2": 10, "y2": 90, "label": "Yes"}"#);
        assert_eq!(arrow.draw(&mut c).unwrap(), "Arrow drawn from (10,10) to (10,90) [Yes]");
        assert_eq!(c.pixel(10, 89), Some(Color::BLACK));

        let simple: SimpleArrow = parse(r#"{"x1": 100, "y1": 10, "x2": 200, "y2": 10}"#);
        assert_eq!(simple.draw(&mut c).unwrap(), "Arrow drawn from (100,10) to (200,10)");
    }

    #[test]
    fn simple_terminal_respects_custom_fill() {
        let mut c = canvas();
        let terminal: SimpleTerminal = parse(
            r#"{"x": 10, "y": 10, "width": 140, "height": 50, "text": "", "fill": "pink"}"#,
        );
        terminal.draw(&mut c).unwrap();
        assert_eq!(c.pixel(80, 35), Some(Color::rgb(255, 192, 203)));
    }
}
