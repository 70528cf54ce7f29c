//! Coordinate math for the drawing primitives; nothing here touches a canvas.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, PI, TAU};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Back-vertex offset of the arrow head, measured from the reversed direction.
pub const ARROW_HEAD_ANGLE: f32 = FRAC_PI_6;
pub const DIAGRAM_ARROW_LENGTH: f32 = 12.0;
pub const CREATIVE_ARROW_LENGTH: f32 = 10.0;

pub const DASH_LENGTH: f32 = 10.0;
pub const DASH_GAP: f32 = 5.0;
/// Dashes emitted per segment at most; enough to cross the largest canvas diagonally.
pub const MAX_DASHES: usize = 1200;

/// Largest star point count or regular polygon side count.
pub const MAX_VERTEX_COUNT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn midpoint(self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A point as supplied by a caller: `[x, y]` or `{"x": .., "y": ..}`.
///
/// Anything else is kept as `Malformed` so a list with a few bad entries can
/// still be normalized instead of failing to parse as a whole.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PointInput {
    Pair([f32; 2]),
    Map { x: f32, y: f32 },
    Malformed(serde_json::Value),
}

impl PointInput {
    /// `None` for malformed entries and non-finite coordinates.
    pub fn to_point(&self) -> Option<Point> {
        let (x, y) = match self {
            PointInput::Pair([x, y]) => (*x, *y),
            PointInput::Map { x, y } => (*x, *y),
            PointInput::Malformed(_) => return None,
        };
        (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
    }
}

pub fn normalize_points(inputs: &[PointInput]) -> Vec<Point> {
    inputs.iter().filter_map(PointInput::to_point).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn around(center: Point, rx: f32, ry: f32) -> Self {
        Self::new(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    pub fn with_padding(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPoints {
    pub top: Point,
    pub bottom: Point,
    pub left: Point,
    pub right: Point,
}

impl ConnectionPoints {
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self {
            top: Point::new(bounds.center_x(), bounds.y),
            bottom: Point::new(bounds.center_x(), bounds.bottom()),
            left: Point::new(bounds.x, bounds.center_y()),
            right: Point::new(bounds.right(), bounds.center_y()),
        }
    }
}

impl fmt::Display for ConnectionPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top={}, bottom={}, left={}, right={}",
            self.top, self.bottom, self.left, self.right
        )
    }
}

/// Star outline: `2 * points` vertices alternating outer and inner radius,
/// starting straight up. Empty above [`MAX_VERTEX_COUNT`] points.
pub fn star_vertices(center: Point, outer_radius: f32, inner_radius: f32, points: u32) -> Vec<Point> {
    let count = match points.checked_mul(2) {
        Some(count) if points > 0 && points <= MAX_VERTEX_COUNT => count,
        _ => return Vec::new(),
    };

    let step = PI / points as f32;
    (0..count)
        .map(|i| {
            let angle = i as f32 * step - FRAC_PI_2;
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Regular polygon vertices. With `rotation_degrees == 0` the first vertex
/// points straight up.
pub fn regular_polygon_vertices(
    center: Point,
    radius: f32,
    sides: u32,
    rotation_degrees: f32,
) -> Vec<Point> {
    if sides == 0 || sides > MAX_VERTEX_COUNT {
        return Vec::new();
    }

    let step = TAU / sides as f32;
    let start = rotation_degrees.to_radians();
    (0..sides)
        .map(|i| {
            let angle = i as f32 * step + start - FRAC_PI_2;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

pub fn arrow_head(from: Point, tip: Point, length: f32) -> [Point; 3] {
    let angle = (tip.y - from.y).atan2(tip.x - from.x);
    let back = |offset: f32| {
        Point::new(
            tip.x - length * (angle + offset).cos(),
            tip.y - length * (angle + offset).sin(),
        )
    };
    [back(-ARROW_HEAD_ANGLE), tip, back(ARROW_HEAD_ANGLE)]
}

/// Split a segment into dashes of `dash` pixels separated by `gap` pixels.
///
/// Only whole dash periods are emitted: `floor(distance / (dash + gap))`
/// dashes, capped at [`MAX_DASHES`].
pub fn dash_segments(from: Point, to: Point, dash: f32, gap: f32) -> Vec<(Point, Point)> {
    let distance = from.distance(to);
    let period = dash + gap;
    if !distance.is_finite() || distance <= 0.0 || period <= 0.0 {
        return Vec::new();
    }

    let count = ((distance / period).floor() as usize).min(MAX_DASHES);
    (0..count)
        .map(|i| {
            let start = i as f32 * period;
            (
                from.lerp(to, start / distance),
                from.lerp(to, (start + dash) / distance),
            )
        })
        .collect()
}

/// Linear interpolation of the RGB channels; alpha is taken from `start`.
pub fn lerp_color(start: Color, end: Color, ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| -> u8 {
        let value = a as f32 + (b as f32 - a as f32) * ratio;
        value.round().clamp(0.0, 255.0) as u8
    };
    Color {
        r: channel(start.r, end.r),
        g: channel(start.g, end.g),
        b: channel(start.b, end.b),
        a: start.a,
    }
}

/// Position of gradient step `index` out of `steps`, spanning exactly `[0, 1]`.
pub fn gradient_ratio(index: u32, steps: u32) -> f32 {
    if steps <= 1 {
        0.0
    } else {
        index as f32 / (steps - 1) as f32
    }
}

/// Point on the ellipse inscribed in `bounds`. Degrees, 0 at 3 o'clock,
/// increasing clockwise on screen.
pub fn ellipse_point(bounds: Bounds, angle_degrees: f32) -> Point {
    let angle = angle_degrees.to_radians();
    Point::new(
        bounds.center_x() + bounds.width / 2.0 * angle.cos(),
        bounds.center_y() + bounds.height / 2.0 * angle.sin(),
    )
}

/// Clockwise sweep from `start` to `end` degrees. An `end` before `start`
/// wraps around the full turn; the sweep never exceeds one turn.
pub fn arc_sweep(start_degrees: f32, end_degrees: f32) -> f32 {
    let delta = end_degrees - start_degrees;
    if delta >= 0.0 {
        delta.min(360.0)
    } else {
        delta.rem_euclid(360.0)
    }
}

/// Sample an elliptic arc from `start` to `end` degrees, every 5 degrees at
/// most. Empty for non-finite angles.
pub fn arc_points(bounds: Bounds, start_degrees: f32, end_degrees: f32) -> Vec<Point> {
    if !start_degrees.is_finite() || !end_degrees.is_finite() {
        return Vec::new();
    }
    let sweep = arc_sweep(start_degrees, end_degrees);
    if !sweep.is_finite() {
        return Vec::new();
    }
    let segments = ((sweep / 5.0).ceil() as usize).max(1);

    (0..=segments)
        .map(|i| {
            let angle = start_degrees + sweep * i as f32 / segments as f32;
            ellipse_point(bounds, angle)
        })
        .collect()
}

/// Diamond touching the midpoints of each side: top, right, bottom, left.
pub fn diamond_vertices(bounds: Bounds) -> [Point; 4] {
    let cx = bounds.x + (bounds.width / 2.0).floor();
    let cy = bounds.y + (bounds.height / 2.0).floor();
    [
        Point::new(cx, bounds.y),
        Point::new(bounds.right(), cy),
        Point::new(cx, bounds.bottom()),
        Point::new(bounds.x, cy),
    ]
}

pub fn parallelogram_vertices(bounds: Bounds, skew: f32) -> [Point; 4] {
    [
        Point::new(bounds.x + skew, bounds.y),
        Point::new(bounds.right(), bounds.y),
        Point::new(bounds.right() - skew, bounds.bottom()),
        Point::new(bounds.x, bounds.bottom()),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParts {
    pub top_cap: Bounds,
    pub body: Bounds,
    pub bottom_cap: Bounds,
    pub cap_height: f32,
}

pub fn cylinder_parts(bounds: Bounds) -> CylinderParts {
    let cap = (bounds.height / 5.0).floor();
    let half_cap = (cap / 2.0).floor();
    CylinderParts {
        top_cap: Bounds::new(bounds.x, bounds.y, bounds.width, cap),
        body: Bounds::new(
            bounds.x,
            bounds.y + half_cap,
            bounds.width,
            bounds.height - half_cap * 2.0,
        ),
        bottom_cap: Bounds::new(bounds.x, bounds.bottom() - cap, bounds.width, cap),
        cap_height: cap,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudParts {
    pub lobes: [Bounds; 3],
    pub base: Bounds,
}

pub fn cloud_parts(bounds: Bounds) -> CloudParts {
    let side = (bounds.height / 3.0).floor();
    let middle = (bounds.height / 2.0).floor();
    let left = Bounds::new(bounds.x, bounds.y + side, side * 2.0, side * 2.0);
    let center = Bounds::new(
        bounds.x + (bounds.width / 3.0).floor(),
        bounds.y,
        middle * 2.0,
        middle * 2.0,
    );
    let right = Bounds::new(bounds.right() - side * 2.0, bounds.y + side, side * 2.0, side * 2.0);
    let base = Bounds::new(
        bounds.x + side,
        bounds.bottom() - side,
        bounds.width - side * 2.0,
        side,
    );
    CloudParts {
        lobes: [left, center, right],
        base,
    }
}
