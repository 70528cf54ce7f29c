//! Tool argument types and how each one paints itself.
//!
//! Every drawing tool is a deserializable argument struct implementing
//! [`Shape`]. The struct's field docs double as the parameter descriptions the
//! model sees, so keep them short and concrete.

pub mod architecture;
pub mod flowchart;
pub mod primitives;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::canvas::{Canvas, Outline};
use crate::color::resolve_paint;
use crate::error::{DrawError, DrawResult};
use crate::geometry::{Bounds, ConnectionPoints};

/// A drawing tool: named, self-describing, and able to paint onto a canvas.
pub trait Shape: DeserializeOwned + JsonSchema {
    /// Tool name as exposed to the model.
    const NAME: &'static str;
    /// One-line tool description.
    const DESCRIPTION: &'static str;

    /// Paint onto `canvas` and return a short confirmation.
    fn draw(&self, canvas: &mut Canvas) -> DrawResult<String>;
}

/// Shapes whose side midpoints are reported back for chaining arrows.
pub trait Connectable {
    fn bounds(&self) -> Bounds;

    fn connection_points(&self) -> ConnectionPoints {
        ConnectionPoints::from_bounds(self.bounds())
    }
}

/// Largest font size free text may be drawn at.
pub const MAX_FONT_SIZE: f32 = 1000.0;

fn invalid<S: Shape>(reason: String) -> DrawError {
    DrawError::InvalidArguments {
        tool: S::NAME.to_string(),
        reason,
    }
}

fn require_finite<S: Shape>(values: &[(&str, f32)]) -> DrawResult<()> {
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(invalid::<S>(format!("{name} must be a finite number, got {value}"))),
        None => Ok(()),
    }
}

/// Finite and strictly greater than zero.
fn require_positive<S: Shape>(values: &[(&str, f32)]) -> DrawResult<()> {
    require_finite::<S>(values)?;
    match values.iter().find(|(_, value)| *value <= 0.0) {
        Some((name, value)) => Err(invalid::<S>(format!("{name} must be positive, got {value}"))),
        None => Ok(()),
    }
}

fn require_at_most<S: Shape>(name: &str, value: u32, max: u32) -> DrawResult<()> {
    if value > max {
        return Err(invalid::<S>(format!("{name} must be at most {max}, got {value}")));
    }
    Ok(())
}

/// Outline from a color argument; `None` for transparent or zero width.
fn outline(color: &str, width: f32) -> Option<Outline> {
    resolve_paint(color)
        .filter(|_| width > 0.0)
        .map(|color| Outline::new(color, width))
}

fn default_fill_black() -> String {
    "black".to_string()
}

fn default_outline() -> String {
    "black".to_string()
}

fn default_outline_width() -> f32 {
    1.0
}

fn default_line_width() -> f32 {
    2.0
}
