//! Per-request drawing session.
//!
//! A session owns the (optional) canvas that tool calls paint onto and
//! dispatches calls by name against its variant's palette.

use cosmic_text::fontdb::Database;
use serde::Deserialize;
use serde_json::Value;

use crate::canvas::Canvas;
use crate::color::resolve_paint;
use crate::error::{DrawError, DrawResult};
use crate::planner::{PlanRequest, PlannerLayout, plan_flowchart};
use crate::tools::{Action, CreateCanvas, Variant, parse_args};

/// A single tool invocation, as produced by the model or a render script.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// One executed call and what it reported back.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub tool: String,
    pub ok: bool,
    pub message: String,
}

pub struct DrawingSession {
    variant: Variant,
    fonts: Database,
    layout: PlannerLayout,
    canvas: Option<Canvas>,
    transcript: Vec<TranscriptEntry>,
}

impl DrawingSession {
    /// Start a session. Variants that draw onto a fixed canvas get it here.
    pub fn new(variant: Variant, fonts: Database, layout: PlannerLayout) -> DrawResult<Self> {
        let mut session = Self {
            variant,
            fonts,
            layout,
            canvas: None,
            transcript: Vec::new(),
        };
        if let Some(args) = variant.precreated_canvas() {
            session.create_canvas(&args)?;
        }
        Ok(session)
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Execute a tool call and return the confirmation or error.
    pub fn call(&mut self, name: &str, arguments: Value) -> DrawResult<String> {
        let tool = self
            .variant
            .find(name)
            .ok_or_else(|| DrawError::UnknownTool(name.to_string()))?;

        match tool.action {
            Action::CreateCanvas => {
                let args: CreateCanvas = parse_args(name, arguments)?;
                self.create_canvas(&args)
            }
            Action::PlanFlowchart => {
                let request: PlanRequest = parse_args(name, arguments)?;
                Ok(plan_flowchart(&request, &self.layout)?.to_string())
            }
            Action::Draw(draw) => {
                let canvas = self.canvas.as_mut().ok_or(DrawError::CanvasNotInitialized)?;
                draw(canvas, arguments)
            }
        }
    }

    /// Execute a tool call and render the outcome as the text handed back to
    /// the model. Failures are prefixed with `ERROR: `.
    pub fn invoke(&mut self, call: &ToolCall) -> String {
        let outcome = self.call(&call.name, call.arguments.clone());
        let (ok, message) = match outcome {
            Ok(message) => (true, message),
            Err(err) => (false, format!("ERROR: {err}")),
        };
        log::debug!(target: "session", "{} -> {}", call.name, message);
        self.transcript.push(TranscriptEntry {
            tool: call.name.clone(),
            ok,
            message: message.clone(),
        });
        message
    }

    /// Drop the canvas and the transcript.
    pub fn clear(&mut self) {
        self.canvas = None;
        self.transcript.clear();
    }

    /// The canvas as base64 PNG, or `None` if nothing was ever created.
    pub fn export_png_base64(&self) -> DrawResult<Option<String>> {
        self.canvas.as_ref().map(Canvas::to_base64_png).transpose()
    }

    fn create_canvas(&mut self, args: &CreateCanvas) -> DrawResult<String> {
        let background = resolve_paint(&args.background_color);
        let canvas = Canvas::new(args.width, args.height, background, self.fonts.clone())?;
        self.canvas = Some(canvas);
        Ok(format!(
            "Canvas created with size {}x{}, background={}",
            args.width, args.height, args.background_color
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use proptest::prelude::*;
    use serde_json::json;

    fn session(variant: Variant) -> DrawingSession {
        DrawingSession::new(variant, Database::new(), PlannerLayout::default()).unwrap()
    }

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn shapes_require_a_canvas() {
        let mut s = session(Variant::Creative);
        let out = s.invoke(&call("add_circle", json!({"x": 10, "y": 10, "radius": 5})));
        assert_eq!(out, "ERROR: Canvas not created. Call create_canvas first");
        assert!(s.canvas().is_none());
        assert!(s.export_png_base64().unwrap().is_none());
    }

    #[test]
    fn missing_canvas_reported_before_bad_arguments() {
        let mut s = session(Variant::Creative);
        let err = s.call("add_circle", json!({"radius": "big"})).unwrap_err();
        assert!(matches!(err, DrawError::CanvasNotInitialized));
    }

    #[test]
    fn create_then_draw() {
        let mut s = session(Variant::Creative);
        let out = s.invoke(&call(
            "create_canvas",
            json!({"width": 100, "height": 80, "background_color": "black"}),
        ));
        assert_eq!(out, "Canvas created with size 100x80, background=black");
        let out = s.invoke(&call(
            "add_rectangle",
            json!({"x": 10, "y": 10, "width": 20, "height": 20, "fill": "red"}),
        ));
        assert!(out.starts_with("Rectangle drawn at (10,10)"));
        let canvas = s.canvas().unwrap();
        assert_eq!(canvas.pixel(20, 20), Some(Color::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(50, 50), Some(Color::BLACK));
        assert!(s.export_png_base64().unwrap().is_some());
        assert_eq!(s.transcript().len(), 2);
        assert!(s.transcript().iter().all(|e| e.ok));
    }

    #[test]
    fn transparent_background_stays_clear() {
        let mut s = session(Variant::Creative);
        s.call("create_canvas", json!({"width": 10, "height": 10, "background_color": "transparent"}))
            .unwrap();
        let canvas = s.canvas().unwrap();
        assert_eq!(canvas.background(), None);
        assert_eq!(canvas.pixel(5, 5).map(|c| c.a), Some(0));
    }

    #[test]
    fn tools_outside_the_palette_are_unknown() {
        let mut s = session(Variant::Creative);
        let out = s.invoke(&call("draw_component", json!({})));
        assert_eq!(out, "ERROR: Unknown tool: draw_component");
        assert!(!s.transcript()[0].ok);
    }

    #[test]
    fn invalid_arguments_are_reported() {
        let mut s = session(Variant::Creative);
        s.call("create_canvas", Value::Null).unwrap();
        let out = s.invoke(&call("add_circle", json!({"x": 1})));
        assert!(out.starts_with("ERROR: Invalid arguments for add_circle"), "{out}");
    }

    #[test]
    fn planner_works_without_canvas() {
        let mut s = session(Variant::Diagram);
        let out = s
            .call("plan_flowchart", json!({"num_main_elements": 2, "has_decision": true}))
            .unwrap();
        assert!(out.starts_with("=== FLOWCHART LAYOUT GUIDE ==="));
        assert!(s.canvas().is_none());
    }

    #[test]
    fn retrieval_sessions_start_with_canvas() {
        let s = session(Variant::Retrieval);
        let canvas = s.canvas().unwrap();
        assert_eq!((canvas.width(), canvas.height()), (800, 600));
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn polygon_point_errors_surface_as_text() {
        let mut s = session(Variant::Retrieval);
        let out = s.invoke(&call("add_polygon", json!({"points": [[0, 0], [10, 0]]})));
        assert_eq!(out, "ERROR: Need at least 3 points for polygon, got 2");
    }

    #[test]
    fn degenerate_numbers_come_back_as_errors() {
        let mut s = session(Variant::Creative);
        s.call("create_canvas", json!({"width": 64, "height": 64})).unwrap();
        let cases = [
            ("add_arc", json!({"x": 0, "y": 0, "width": 50, "height": 50, "start_angle": 1e39, "end_angle": 0})),
            ("add_chord", json!({"x": 0, "y": 0, "width": 0, "height": 50, "start_angle": 0, "end_angle": 90})),
            ("add_star", json!({"x": 5, "y": 5, "outer_radius": 4, "inner_radius": 2, "points": 3_000_000_000u32})),
            ("add_regular_polygon", json!({"x": 5, "y": 5, "radius": 4, "sides": 4_000_000_000u32})),
            ("add_text", json!({"x": 5, "y": 5, "text": "hi", "font_size": 0})),
            ("add_rectangle", json!({"x": 10, "y": 10, "width": -5, "height": 10})),
            ("add_circle", json!({"x": 10, "y": 10, "radius": 0})),
            ("add_line", json!({"x1": 0, "y1": 0, "x2": 1e39, "y2": 0})),
            ("add_flowchart_process", json!({"x": 0, "y": 0, "width": 0, "height": 10, "text": "a"})),
        ];
        for (tool, args) in cases {
            let out = s.invoke(&call(tool, args));
            assert!(out.starts_with(&format!("ERROR: Invalid arguments for {tool}")), "{out}");
        }
        assert_eq!(s.canvas().unwrap().pixel(12, 12), Some(Color::WHITE));
    }

    #[test]
    fn diagram_tools_reject_degenerate_numbers() {
        let mut s = session(Variant::Diagram);
        s.call("create_canvas", json!({"width": 64, "height": 64})).unwrap();
        let cases = [
            ("draw_process", json!({"x": 0, "y": 0, "width": 10, "height": -10, "text": "a"})),
            ("draw_database", json!({"x": 0, "y": 0, "width": 10, "height": 0, "text": "a"})),
            ("draw_connection", json!({"x1": 0, "y1": 0, "x2": 1e39, "y2": 0, "style": "dashed"})),
            ("draw_arrow", json!({"x1": 0, "y1": -1e39, "x2": 5, "y2": 5})),
            ("plan_flowchart", json!({"num_main_elements": 4_000_000_000u32})),
        ];
        for (tool, args) in cases {
            let out = s.invoke(&call(tool, args));
            assert!(out.starts_with(&format!("ERROR: Invalid arguments for {tool}")), "{out}");
        }
    }

    fn check_numeric_call_returns(tool: &str, a: f32, b: f32, c: f32, count: u32) -> Result<(), TestCaseError> {
        let mut s = session(Variant::Creative);
        s.call("create_canvas", json!({"width": 32, "height": 32})).unwrap();
        let args = json!({
            "x": a, "y": b, "x1": a, "y1": b, "x2": c, "y2": a,
            "width": c, "height": b, "radius": c, "rx": a, "ry": c,
            "outer_radius": a, "inner_radius": b, "points": count, "sides": count,
            "start_angle": a, "end_angle": c, "rotation": b,
            "font_size": c, "width_px": b, "outline_width": a, "text": "ab"
        });
        let out = s.invoke(&call(tool, args));
        prop_assert!(!out.is_empty());
        prop_assert_eq!(s.transcript().len(), 1);
        Ok(())
    }

    fn awkward_number() -> impl Strategy<Value = f32> {
        prop_oneof![
            Just(f32::INFINITY),
            Just(f32::NEG_INFINITY),
            Just(0.0),
            Just(-1.0),
            Just(1e6),
            Just(1e12),
            -2000.0f32..2000.0,
        ]
    }

    proptest! {
        #[test]
        fn numeric_tools_never_panic(
            tool in prop::sample::select(vec![
                "add_rectangle", "add_circle", "add_ellipse", "add_line", "add_arc",
                "add_chord", "add_pieslice", "add_text", "add_star", "add_regular_polygon",
                "add_flowchart_process", "add_flowchart_decision", "add_flowchart_terminal",
                "add_flowchart_arrow",
            ]),
            a in awkward_number(),
            b in awkward_number(),
            c in awkward_number(),
            count in prop_oneof![Just(u32::MAX), Just(0u32), 0u32..2000],
        ) {
            check_numeric_call_returns(tool, a, b, c, count)?;
        }
    }

    #[test]
    fn clear_drops_canvas() {
        let mut s = session(Variant::Retrieval);
        s.clear();
        assert!(s.canvas().is_none());
        assert!(s.transcript().is_empty());
    }
}
