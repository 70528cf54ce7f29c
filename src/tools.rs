//! Tool catalogue: names, descriptions, parameter schemas and the palettes
//! each variant exposes to the model.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::canvas::Canvas;
use crate::error::{DrawError, DrawResult};
use crate::planner::PlanRequest;
use crate::shapes::Shape;
use crate::shapes::architecture::{Cloud, Component, Connection, Database, Label};
use crate::shapes::flowchart::{
    Arrow, Decision, InputOutput, Process, SimpleArrow, SimpleDecision, SimpleProcess,
    SimpleTerminal, Terminal,
};
use crate::shapes::primitives::{
    Arc, Chord, Circle, CurvedLine, Ellipse, Gradient, Line, PieSlice, Polygon, Rectangle,
    RegularPolygon, Star, Text,
};

pub const CREATE_CANVAS: &str = "create_canvas";
pub const PLAN_FLOWCHART: &str = "plan_flowchart";

fn default_canvas_width() -> u32 {
    800
}

fn default_canvas_height() -> u32 {
    600
}

fn default_background() -> String {
    "white".to_string()
}

/// Arguments of `create_canvas`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateCanvas {
    /// Canvas width in pixels
    #[serde(default = "default_canvas_width")]
    pub width: u32,
    /// Canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub height: u32,
    /// Background color name or #RRGGBB, or "transparent"
    #[serde(default = "default_background")]
    pub background_color: String,
}

impl Default for CreateCanvas {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            background_color: default_background(),
        }
    }
}

/// What invoking a tool does.
#[derive(Clone, Copy)]
pub enum Action {
    /// Replace the session canvas.
    CreateCanvas,
    /// Compute a layout guide; needs no canvas.
    PlanFlowchart,
    /// Parse arguments and paint onto the existing canvas.
    Draw(fn(&mut Canvas, Value) -> DrawResult<String>),
}

/// One tool as offered to the model.
#[derive(Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub action: Action,
    schema: fn() -> Value,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec").field("name", &self.name).finish()
    }
}

impl ToolSpec {
    fn shape<S: Shape>() -> Self {
        Self {
            name: S::NAME,
            description: S::DESCRIPTION,
            action: Action::Draw(draw_with::<S>),
            schema: parameters_schema::<S>,
        }
    }

    fn create_canvas() -> Self {
        Self {
            name: CREATE_CANVAS,
            description: "Create a new blank canvas. Call this first, before drawing anything. \
                          Replaces any existing canvas.",
            action: Action::CreateCanvas,
            schema: parameters_schema::<CreateCanvas>,
        }
    }

    fn plan_flowchart() -> Self {
        Self {
            name: PLAN_FLOWCHART,
            description: "Plan a flowchart layout before drawing it. Returns exact coordinates \
                          for every shape and arrow. Call this FIRST for any flowchart.",
            action: Action::PlanFlowchart,
            schema: parameters_schema::<PlanRequest>,
        }
    }

    /// JSON schema of the tool's arguments object.
    pub fn parameters(&self) -> Value {
        (self.schema)()
    }

    /// The tool in OpenAI function-calling format.
    pub fn to_openai(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters(),
            }
        })
    }
}

/// Deserialize tool arguments, treating a missing arguments object as `{}`.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> DrawResult<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|err| DrawError::InvalidArguments {
        tool: tool.to_string(),
        reason: err.to_string(),
    })
}

fn draw_with<S: Shape>(canvas: &mut Canvas, args: Value) -> DrawResult<String> {
    let shape: S = parse_args(S::NAME, args)?;
    shape.draw(canvas)
}

fn parameters_schema<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(&schema).unwrap_or_else(|_| json!({ "type": "object" }));
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    value
}

/// A tool palette paired with its system prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Layered realistic drawings from basic and advanced shapes.
    Creative,
    /// Architecture diagrams, planned flowcharts and simple drawings.
    #[default]
    Diagram,
    /// Drawings of extracted objects, enriched with knowledge-base text.
    Retrieval,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Creative => "creative",
            Variant::Diagram => "diagram",
            Variant::Retrieval => "retrieval",
        }
    }

    /// Whether sessions of this variant start with a canvas already in place.
    pub fn precreated_canvas(self) -> Option<CreateCanvas> {
        match self {
            Variant::Retrieval => Some(CreateCanvas::default()),
            _ => None,
        }
    }

    pub fn tools(self) -> Vec<ToolSpec> {
        match self {
            Variant::Creative => vec![
                ToolSpec::create_canvas(),
                ToolSpec::shape::<Rectangle>(),
                ToolSpec::shape::<Circle>(),
                ToolSpec::shape::<Ellipse>(),
                ToolSpec::shape::<Polygon>(),
                ToolSpec::shape::<Line>(),
                ToolSpec::shape::<Arc>(),
                ToolSpec::shape::<Chord>(),
                ToolSpec::shape::<PieSlice>(),
                ToolSpec::shape::<Text>(),
                ToolSpec::shape::<Star>(),
                ToolSpec::shape::<RegularPolygon>(),
                ToolSpec::shape::<Gradient>(),
                ToolSpec::shape::<CurvedLine>(),
                ToolSpec::shape::<SimpleProcess>(),
                ToolSpec::shape::<SimpleDecision>(),
                ToolSpec::shape::<SimpleArrow>(),
                ToolSpec::shape::<SimpleTerminal>(),
            ],
            Variant::Diagram => vec![
                ToolSpec::create_canvas(),
                ToolSpec::shape::<Rectangle>(),
                ToolSpec::shape::<Circle>(),
                ToolSpec::shape::<Ellipse>(),
                ToolSpec::shape::<Polygon>(),
                ToolSpec::shape::<Line>(),
                ToolSpec::shape::<Star>(),
                ToolSpec::shape::<RegularPolygon>(),
                ToolSpec::shape::<Gradient>(),
                ToolSpec::shape::<Text>(),
                ToolSpec::shape::<Component>(),
                ToolSpec::shape::<Connection>(),
                ToolSpec::shape::<Database>(),
                ToolSpec::shape::<Cloud>(),
                ToolSpec::shape::<Label>(),
                ToolSpec::plan_flowchart(),
                ToolSpec::shape::<Process>(),
                ToolSpec::shape::<Decision>(),
                ToolSpec::shape::<Terminal>(),
                ToolSpec::shape::<Arrow>(),
                ToolSpec::shape::<InputOutput>(),
            ],
            Variant::Retrieval => vec![
                ToolSpec::shape::<Rectangle>(),
                ToolSpec::shape::<Circle>(),
                ToolSpec::shape::<Ellipse>(),
                ToolSpec::shape::<Polygon>(),
                ToolSpec::shape::<Line>(),
                ToolSpec::shape::<Arc>(),
                ToolSpec::shape::<Chord>(),
                ToolSpec::shape::<PieSlice>(),
                ToolSpec::shape::<Text>(),
                ToolSpec::shape::<Star>(),
                ToolSpec::shape::<RegularPolygon>(),
                ToolSpec::shape::<Gradient>(),
            ],
        }
    }

    /// Look up a tool by name within this palette.
    pub fn find(self, name: &str) -> Option<ToolSpec> {
        self.tools().into_iter().find(|tool| tool.name == name)
    }

    /// Every tool of the palette in OpenAI function-calling format.
    pub fn openai_tools(self) -> Vec<Value> {
        self.tools().iter().map(ToolSpec::to_openai).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn palettes_have_unique_names() {
        for variant in [Variant::Creative, Variant::Diagram, Variant::Retrieval] {
            let tools = variant.tools();
            let names: HashSet<_> = tools.iter().map(|t| t.name).collect();
            assert_eq!(names.len(), tools.len(), "{variant:?}");
        }
    }

    #[test]
    fn palette_membership() {
        assert!(Variant::Creative.find("add_curved_line").is_some());
        assert!(Variant::Creative.find("draw_component").is_none());
        assert!(Variant::Diagram.find(PLAN_FLOWCHART).is_some());
        assert!(Variant::Diagram.find("add_flowchart_process").is_none());
        assert!(Variant::Retrieval.find(CREATE_CANVAS).is_none());
        assert!(Variant::Retrieval.precreated_canvas().is_some());
        assert!(Variant::Diagram.precreated_canvas().is_none());
    }

    #[test]
    fn schema_lists_required_fields_without_defaults() {
        let circle = Variant::Creative.find("add_circle").unwrap().parameters();
        assert_eq!(circle["type"], "object");
        assert!(circle.get("$schema").is_none());
        let required: Vec<&str> = circle["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"radius"));
        assert!(!required.contains(&"fill"));
        assert!(circle["properties"]["fill"].is_object());
    }

    #[test]
    fn flattened_frames_appear_in_schema() {
        let process = Variant::Diagram.find("draw_process").unwrap().parameters();
        for field in ["x", "y", "width", "height", "text"] {
            assert!(process["properties"][field].is_object(), "missing {field}");
        }
    }

    #[test]
    fn openai_format_wraps_function() {
        let tool = Variant::Diagram.find(PLAN_FLOWCHART).unwrap().to_openai();
        assert_eq!(tool["type"], "function");
        assert_eq!(tool["function"]["name"], PLAN_FLOWCHART);
        assert!(tool["function"]["parameters"]["properties"]["num_main_elements"].is_object());
    }

    #[test]
    fn null_arguments_use_defaults() {
        let args: CreateCanvas = parse_args(CREATE_CANVAS, Value::Null).unwrap();
        assert_eq!((args.width, args.height), (800, 600));
        assert_eq!(args.background_color, "white");
    }

    #[test]
    fn bad_arguments_name_the_tool() {
        let err = parse_args::<PlanRequest>(PLAN_FLOWCHART, json!({ "num_main_elements": "x" }))
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments for plan_flowchart"));
    }

    #[test]
    fn variants_parse_lowercase() {
        let v: Variant = serde_json::from_value(json!("retrieval")).unwrap();
        assert_eq!(v, Variant::Retrieval);
        assert_eq!(Variant::default().name(), "diagram");
    }
}
