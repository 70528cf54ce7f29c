//! Flowchart layout planner.
//!
//! Computes exact coordinates for a top-to-bottom flowchart so the model can
//! draw shapes and arrows that line up, without touching any canvas.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::canvas::MAX_DIMENSION;
use crate::error::{DrawError, DrawResult};
use crate::geometry::{Bounds, Point};

/// Spacing and size constants for planned flowcharts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerLayout {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub bottom_margin: f32,
    pub start_y: f32,
    /// Vertical gap between stacked shapes.
    pub spacing: f32,
    pub terminal_width: f32,
    pub terminal_height: f32,
    pub process_width: f32,
    pub process_height: f32,
    pub decision_width: f32,
    pub decision_height: f32,
    pub branch_width: f32,
    pub branch_height: f32,
    /// Left edge of the "yes" box, right of center.
    pub yes_offset: f32,
    /// Left edge of the "no" box, left of center.
    pub no_offset: f32,
    /// Diamond bottom to branch box top.
    pub branch_gap: f32,
    /// Branch box bottom to merge line.
    pub merge_gap: f32,
    /// Merge line to end terminal top.
    pub end_gap: f32,
}

impl Default for PlannerLayout {
    fn default() -> Self {
        Self {
            canvas_width: 700.0,
            canvas_height: 800.0,
            bottom_margin: 40.0,
            start_y: 50.0,
            spacing: 100.0,
            terminal_width: 140.0,
            terminal_height: 50.0,
            process_width: 150.0,
            process_height: 50.0,
            decision_width: 160.0,
            decision_height: 90.0,
            branch_width: 140.0,
            branch_height: 50.0,
            yes_offset: 100.0,
            no_offset: 250.0,
            branch_gap: 80.0,
            merge_gap: 80.0,
            end_gap: 60.0,
        }
    }
}

/// Arguments of the `plan_flowchart` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PlanRequest {
    /// Number of main elements, counting the start terminal
    pub num_main_elements: u32,
    /// Whether the flow contains a decision diamond
    #[serde(default)]
    pub has_decision: bool,
    /// Whether the decision splits into yes/no branch boxes
    #[serde(default)]
    pub has_branches: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedKind {
    Terminal,
    Process,
    Decision,
}

impl PlannedKind {
    /// The drawing tool that renders this kind.
    pub fn tool(self) -> &'static str {
        match self {
            PlannedKind::Terminal => "draw_terminal",
            PlannedKind::Process => "draw_process",
            PlannedKind::Decision => "draw_decision",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedShape {
    pub kind: PlannedKind,
    pub bounds: Bounds,
    pub text: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedArrow {
    pub title: String,
    pub from: Point,
    pub to: Point,
    pub label: String,
    pub note: String,
}

/// A complete flowchart plan: shapes first, then the arrows joining them.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowchartPlan {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub center_x: f32,
    pub shapes: Vec<PlannedShape>,
    pub arrows: Vec<PlannedArrow>,
}

struct Builder<'a> {
    layout: &'a PlannerLayout,
    center_x: f32,
    shapes: Vec<PlannedShape>,
    arrows: Vec<PlannedArrow>,
}

impl Builder<'_> {
    fn shape(&mut self, kind: PlannedKind, bounds: Bounds, text: &str, notes: Vec<String>) {
        self.shapes.push(PlannedShape {
            kind,
            bounds,
            text: text.to_string(),
            notes,
        });
    }

    fn arrow(&mut self, title: &str, from: Point, to: Point, label: &str, note: &str) {
        self.arrows.push(PlannedArrow {
            title: title.to_string(),
            from,
            to,
            label: label.to_string(),
            note: note.to_string(),
        });
    }

    fn terminal(&mut self, y: f32, text: &str) -> Bounds {
        let l = self.layout;
        let bounds = Bounds::new(
            self.center_x - l.terminal_width / 2.0,
            y,
            l.terminal_width,
            l.terminal_height,
        );
        self.shape(PlannedKind::Terminal, bounds, text, Vec::new());
        bounds
    }

    fn branch(&mut self, x: f32, y: f32, text: &str, name: &str) -> Bounds {
        let l = self.layout;
        let bounds = Bounds::new(x, y, l.branch_width, l.branch_height);
        let notes = vec![
            format!(
                "{name} box: LEFT x={}, CENTER x={}, RIGHT x={}",
                bounds.x,
                bounds.center_x(),
                bounds.right()
            ),
            format!(
                "{name} box: TOP y={}, CENTER y={}, BOTTOM y={}",
                bounds.y,
                bounds.center_y(),
                bounds.bottom()
            ),
        ];
        self.shape(PlannedKind::Process, bounds, text, notes);
        bounds
    }
}

/// Most main elements whose process boxes still start on the largest canvas.
pub fn max_main_elements(layout: &PlannerLayout) -> u32 {
    let pitch = layout.process_height + layout.spacing;
    let room = MAX_DIMENSION as f32 - layout.start_y;
    (room / pitch).floor().clamp(0.0, MAX_DIMENSION as f32) as u32 + 1
}

/// Plan a vertical flowchart.
///
/// The start terminal counts as the first main element; every further element
/// becomes a process box stacked below it. A decision follows the last box.
/// With branches it splits into yes/no boxes that merge back above the end
/// terminal; without branches it flows straight down into the end terminal.
pub fn plan_flowchart(request: &PlanRequest, layout: &PlannerLayout) -> DrawResult<FlowchartPlan> {
    let limit = max_main_elements(layout);
    if request.num_main_elements > limit {
        return Err(DrawError::InvalidArguments {
            tool: "plan_flowchart".to_string(),
            reason: format!(
                "num_main_elements must be at most {limit}, got {}",
                request.num_main_elements
            ),
        });
    }

    let center_x = (layout.canvas_width / 2.0).floor();
    let mut b = Builder {
        layout,
        center_x,
        shapes: Vec::new(),
        arrows: Vec::new(),
    };

    let mut y = layout.start_y;
    let start = b.terminal(y, "Start");
    y = start.bottom() + layout.spacing;

    let mut previous = start;
    let mut previous_name = "start";
    let steps = request.num_main_elements.saturating_sub(1);
    for step in 0..steps {
        let bounds = Bounds::new(
            center_x - layout.process_width / 2.0,
            y,
            layout.process_width,
            layout.process_height,
        );
        let text = if step == 0 {
            "Input data".to_string()
        } else {
            format!("Step {}", step + 1)
        };
        let note = format!("This box: TOP at y={}, BOTTOM at y={}", bounds.y, bounds.bottom());
        b.shape(PlannedKind::Process, bounds, &text, vec![note]);

        let title = if step == 0 {
            "Start to First".to_string()
        } else {
            format!("Step {} to Step {}", step, step + 1)
        };
        b.arrow(
            &title,
            Point::new(center_x, previous.bottom()),
            Point::new(center_x, bounds.y),
            "",
            &format!("VERTICAL: from {previous_name} BOTTOM to this box TOP"),
        );

        previous = bounds;
        previous_name = "previous box";
        y = bounds.bottom() + layout.spacing;
    }

    let end_y = if request.has_decision {
        let diamond = Bounds::new(
            center_x - layout.decision_width / 2.0,
            y,
            layout.decision_width,
            layout.decision_height,
        );
        let mid_y = diamond.center_y();
        b.shape(
            PlannedKind::Decision,
            diamond,
            "condition?",
            vec![
                format!(
                    "Diamond: TOP y={}, CENTER y={}, BOTTOM y={}",
                    diamond.y,
                    mid_y,
                    diamond.bottom()
                ),
                format!(
                    "Diamond: LEFT x={}, CENTER x={}, RIGHT x={}",
                    diamond.x,
                    center_x,
                    diamond.right()
                ),
            ],
        );
        b.arrow(
            "Into Decision",
            Point::new(center_x, previous.bottom()),
            Point::new(center_x, diamond.y),
            "",
            &format!("VERTICAL: from {previous_name} BOTTOM to decision TOP"),
        );

        if request.has_branches {
            let branch_y = diamond.bottom() + layout.branch_gap;
            let yes = b.branch(center_x + layout.yes_offset, branch_y, "True case", "YES");
            let no = b.branch(center_x - layout.no_offset, branch_y, "False case", "NO");
            let merge_y = branch_y + layout.branch_height + layout.merge_gap;
            let end_y = merge_y + layout.end_gap;
            b.terminal(end_y, "End");

            let (yes_x, no_x) = (yes.center_x(), no.center_x());
            b.arrow(
                "Decision to YES box (going RIGHT)",
                Point::new(diamond.right(), mid_y),
                Point::new(yes_x, mid_y),
                "",
                "HORIZONTAL right from the decision side point",
            );
            b.arrow(
                "Down into YES box",
                Point::new(yes_x, mid_y),
                Point::new(yes_x, yes.y),
                "Yes",
                "VERTICAL down to YES box TOP",
            );
            b.arrow(
                "Decision to NO box (going LEFT)",
                Point::new(diamond.x, mid_y),
                Point::new(no_x, mid_y),
                "",
                "HORIZONTAL left from the decision side point",
            );
            b.arrow(
                "Down into NO box",
                Point::new(no_x, mid_y),
                Point::new(no_x, no.y),
                "No",
                "VERTICAL down to NO box TOP",
            );
            b.arrow(
                "YES box to merge point",
                Point::new(yes_x, yes.bottom()),
                Point::new(yes_x, merge_y),
                "",
                "VERTICAL: from YES box BOTTOM down to merge level",
            );
            b.arrow(
                "NO box to merge point",
                Point::new(no_x, no.bottom()),
                Point::new(no_x, merge_y),
                "",
                "VERTICAL: from NO box BOTTOM down to merge level",
            );
            b.arrow(
                "YES branch merge to center",
                Point::new(yes_x, merge_y),
                Point::new(center_x, merge_y),
                "",
                "HORIZONTAL: from YES merge point to center",
            );
            b.arrow(
                "NO branch merge to center",
                Point::new(no_x, merge_y),
                Point::new(center_x, merge_y),
                "",
                "HORIZONTAL: from NO merge point to center",
            );
            b.arrow(
                "Merge to End",
                Point::new(center_x, merge_y),
                Point::new(center_x, end_y),
                "",
                "VERTICAL: from merge point down to END terminal TOP",
            );
            end_y
        } else {
            let end_y = diamond.bottom() + layout.spacing;
            b.terminal(end_y, "End");
            b.arrow(
                "Decision to End",
                Point::new(center_x, diamond.bottom()),
                Point::new(center_x, end_y),
                "",
                "VERTICAL: from decision BOTTOM to END terminal TOP",
            );
            end_y
        }
    } else {
        b.terminal(y, "End");
        b.arrow(
            "Into End",
            Point::new(center_x, previous.bottom()),
            Point::new(center_x, y),
            "",
            &format!("VERTICAL: from {previous_name} BOTTOM to END terminal TOP"),
        );
        y
    };

    let needed_height = end_y + layout.terminal_height + layout.bottom_margin;
    Ok(FlowchartPlan {
        canvas_width: layout.canvas_width,
        canvas_height: layout.canvas_height.max(needed_height),
        center_x,
        shapes: b.shapes,
        arrows: b.arrows,
    })
}

impl fmt::Display for FlowchartPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== FLOWCHART LAYOUT GUIDE ===")?;
        writeln!(f)?;
        writeln!(
            f,
            "Canvas: {}x{}, Center X: {}",
            self.canvas_width, self.canvas_height, self.center_x
        )?;
        writeln!(f)?;
        writeln!(f, "**CRITICAL: Follow this EXACT sequence and coordinates!**")?;
        writeln!(f)?;

        for (i, shape) in self.shapes.iter().enumerate() {
            let b = shape.bounds;
            writeln!(
                f,
                "STEP {}: {}({}, {}, {}, {}, '{}')",
                i + 1,
                shape.kind.tool(),
                b.x,
                b.y,
                b.width,
                b.height,
                shape.text
            )?;
            for note in &shape.notes {
                writeln!(f, "// {note}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "=== ARROWS (draw AFTER all shapes) ===")?;
        writeln!(f)?;
        for (i, arrow) in self.arrows.iter().enumerate() {
            writeln!(f, "ARROW {}: {}", i + 1, arrow.title)?;
            writeln!(
                f,
                "draw_arrow({}, {}, {}, {}, '{}')",
                arrow.from.x, arrow.from.y, arrow.to.x, arrow.to.y, arrow.label
            )?;
            writeln!(f, "// {}", arrow.note)?;
            writeln!(f)?;
        }

        writeln!(f, "**CRITICAL RULES:**")?;
        writeln!(f, "1. Use EXACT coordinates provided above")?;
        writeln!(
            f,
            "2. For decision diamonds: arrows go to/from the SIDE POINTS (left/right), not corners"
        )?;
        writeln!(f, "3. Branch arrows: horizontal from decision, then vertical down to boxes")?;
        writeln!(f, "4. All vertical arrows should have SAME X coordinate")?;
        writeln!(f, "5. All horizontal arrows should have SAME Y coordinate")?;
        writeln!(f, "6. Draw shapes FIRST, then ALL arrows")?;
        write!(f, "7. Keep text SHORT (3-6 words max)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn request(n: u32, has_decision: bool, has_branches: bool) -> PlanRequest {
        PlanRequest {
            num_main_elements: n,
            has_decision,
            has_branches,
        }
    }

    fn plan(n: u32, has_decision: bool, has_branches: bool) -> FlowchartPlan {
        plan_flowchart(&request(n, has_decision, has_branches), &PlannerLayout::default()).unwrap()
    }

    #[test]
    fn linear_plan_matches_reference_coordinates() {
        let p = plan(2, false, false);
        assert_eq!(p.center_x, 350.0);
        assert_eq!(p.shapes.len(), 3);
        assert_eq!(p.shapes[0].bounds, Bounds::new(280.0, 50.0, 140.0, 50.0));
        assert_eq!(p.shapes[1].bounds, Bounds::new(275.0, 200.0, 150.0, 50.0));
        assert_eq!(p.shapes[2].bounds, Bounds::new(280.0, 350.0, 140.0, 50.0));
        assert_eq!(p.arrows[0].from, Point::new(350.0, 100.0));
        assert_eq!(p.arrows[0].to, Point::new(350.0, 200.0));
        assert_eq!(p.arrows[1].from, Point::new(350.0, 250.0));
        assert_eq!(p.arrows[1].to, Point::new(350.0, 350.0));
    }

    #[test]
    fn branching_plan_matches_reference_coordinates() {
        let p = plan(2, true, true);
        let decision = &p.shapes[2];
        assert_eq!(decision.kind, PlannedKind::Decision);
        assert_eq!(decision.bounds, Bounds::new(270.0, 350.0, 160.0, 90.0));

        // Yes box at center + 100, no box at center - 250, both 80 below the diamond.
        assert_eq!(p.shapes[3].bounds, Bounds::new(450.0, 520.0, 140.0, 50.0));
        assert_eq!(p.shapes[4].bounds, Bounds::new(100.0, 520.0, 140.0, 50.0));
        // Merge at 650, end terminal 60 below.
        assert_eq!(p.shapes[5].bounds.y, 710.0);
        assert_eq!(p.canvas_height, 800.0);

        let yes_right = &p.arrows[2];
        assert_eq!(yes_right.from, Point::new(430.0, 395.0));
        assert_eq!(yes_right.to, Point::new(520.0, 395.0));
        assert_eq!(p.arrows[3].label, "Yes");
        assert_eq!(p.arrows[5].label, "No");
        assert_eq!(p.arrows.last().map(|a| a.to), Some(Point::new(350.0, 710.0)));
    }

    #[test]
    fn decision_without_branches_flows_into_end() {
        let p = plan(1, true, false);
        let kinds: Vec<_> = p.shapes.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![PlannedKind::Terminal, PlannedKind::Decision, PlannedKind::Terminal]
        );
        let last = p.arrows.last().unwrap();
        assert_eq!(last.from, Point::new(350.0, 290.0));
        assert_eq!(last.to, Point::new(350.0, 390.0));
    }

    #[test]
    fn guide_text_lists_steps_then_arrows() {
        let text = plan(2, false, false).to_string();
        assert!(text.starts_with("=== FLOWCHART LAYOUT GUIDE ===\n\nCanvas: 700x800, Center X: 350"));
        assert!(text.contains("STEP 1: draw_terminal(280, 50, 140, 50, 'Start')"));
        assert!(text.contains("STEP 2: draw_process(275, 200, 150, 50, 'Input data')"));
        assert!(text.contains("draw_arrow(350, 250, 350, 350, '')"));
        let steps_at = text.find("STEP 3").unwrap();
        let arrows_at = text.find("=== ARROWS").unwrap();
        assert!(steps_at < arrows_at);
    }

    #[test]
    fn tall_plans_grow_the_canvas() {
        let p = plan(8, true, true);
        let end = p.shapes.last().unwrap().bounds;
        assert!(p.canvas_height >= end.bottom());
    }

    #[test]
    fn element_count_is_bounded_by_the_largest_canvas() {
        let layout = PlannerLayout::default();
        assert_eq!(max_main_elements(&layout), 55);

        let p = plan(55, true, true);
        assert_eq!(p.shapes.len(), 1 + 54 + 1 + 2 + 1);

        let err = plan_flowchart(&request(56, false, false), &layout).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid arguments for plan_flowchart: num_main_elements must be at most 55, got 56"
        );
        assert!(plan_flowchart(&request(u32::MAX, true, true), &layout).is_err());
    }

    #[test]
    fn degenerate_layout_still_bounds_elements() {
        let layout = PlannerLayout {
            process_height: 0.0,
            spacing: 0.0,
            ..PlannerLayout::default()
        };
        assert_eq!(max_main_elements(&layout), MAX_DIMENSION + 1);
        let layout = PlannerLayout {
            spacing: -500.0,
            ..PlannerLayout::default()
        };
        assert_eq!(max_main_elements(&layout), 1);
    }

    fn check_arrows_connect_vertically(n: u32, has_decision: bool, has_branches: bool) -> Result<(), TestCaseError> {
        let p = plan(n, has_decision, has_branches);
        for arrow in &p.arrows {
            let vertical = arrow.from.x == arrow.to.x;
            let horizontal = arrow.from.y == arrow.to.y;
            prop_assert!(vertical || horizontal, "diagonal arrow {:?}", arrow);
        }
        for pair in p.shapes.windows(2) {
            if pair[0].kind != PlannedKind::Decision && pair[1].bounds.y > pair[0].bounds.y {
                prop_assert!(pair[1].bounds.y >= pair[0].bounds.bottom());
            }
        }
        prop_assert_eq!(p.shapes.first().map(|s| s.text.as_str()), Some("Start"));
        prop_assert_eq!(p.shapes.last().map(|s| s.text.as_str()), Some("End"));
        Ok(())
    }

    proptest! {
        #[test]
        fn plans_are_axis_aligned_and_ordered(n in 0u32..12, d in any::<bool>(), br in any::<bool>()) {
            check_arrows_connect_vertically(n, d, br)?;
        }
    }
}
