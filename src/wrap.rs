//! Word wrapping and centering of text inside shape boxes.

use crate::fonts::TextMeasure;
use crate::geometry::{Bounds, Point};

pub const LINE_HEIGHT: f32 = 15.0;
pub const BOX_FONT_SIZE: f32 = 12.0;

/// How much of a box is off-limits to wrapped text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMargins {
    /// Subtracted from the box width to get the wrap width.
    pub horizontal: f32,
    /// Subtracted from the available height before counting lines.
    pub vertical: f32,
    /// Height taken by decorations (database caps) that text must avoid.
    pub reserved: f32,
}

impl BoxMargins {
    pub const COMPONENT: BoxMargins = BoxMargins {
        horizontal: 20.0,
        vertical: 20.0,
        reserved: 0.0,
    };

    pub const CLOUD: BoxMargins = BoxMargins {
        horizontal: 40.0,
        vertical: 30.0,
        reserved: 0.0,
    };

    pub fn database(cap_height: f32) -> BoxMargins {
        BoxMargins {
            reserved: cap_height * 2.0,
            ..BoxMargins::COMPONENT
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub origin: Point,
}

/// Greedy wrap: a word joins the current line while the joined line fits
/// `max_width`. A word wider than `max_width` gets a line of its own.
pub fn wrap_words<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        let (width, _) = measure.measure_text(&candidate, font_size);
        if width <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Number of lines that fit, never less than one.
pub fn max_lines(available_height: f32, vertical_margin: f32) -> usize {
    let fitting = ((available_height - vertical_margin) / LINE_HEIGHT).floor();
    if fitting >= 1.0 { fitting as usize } else { 1 }
}

/// Wrap `text` into `bounds`, truncate to the lines that fit and center the
/// block both ways.
pub fn layout_in_box<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    bounds: Bounds,
    margins: BoxMargins,
) -> Vec<PlacedLine> {
    let mut lines = wrap_words(
        measure,
        text,
        BOX_FONT_SIZE,
        bounds.width - margins.horizontal,
    );
    lines.truncate(max_lines(
        bounds.height - margins.reserved,
        margins.vertical,
    ));

    let block_height = lines.len() as f32 * LINE_HEIGHT;
    let start_y = bounds.y + ((bounds.height - block_height) / 2.0).floor();

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let (width, _) = measure.measure_text(&line, BOX_FONT_SIZE);
            let x = bounds.x + ((bounds.width - width) / 2.0).floor();
            PlacedLine {
                text: line,
                origin: Point::new(x, start_y + i as f32 * LINE_HEIGHT),
            }
        })
        .collect()
}

pub fn centered_origin<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    font_size: f32,
    center: Point,
) -> Point {
    let (width, height) = measure.measure_text(text, font_size);
    Point::new(
        center.x - (width / 2.0).floor(),
        center.y - (height / 2.0).floor(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedMeasure;
    use proptest::prelude::*;

    // 6px per character at the box font size.
    fn measure() -> FixedMeasure {
        FixedMeasure {
            advance: 6.0 / BOX_FONT_SIZE,
        }
    }

    #[test]
    fn wraps_greedily_at_the_width_limit() {
        let lines = wrap_words(&mut measure(), "aaa bbb ccc dd", BOX_FONT_SIZE, 42.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc dd"]);
    }

    #[test]
    fn overlong_word_sits_alone() {
        let lines = wrap_words(
            &mut measure(),
            "a extraordinarily b",
            BOX_FONT_SIZE,
            30.0,
        );
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_words(&mut measure(), "   ", BOX_FONT_SIZE, 100.0).is_empty());
        assert!(
            layout_in_box(
                &mut measure(),
                "",
                Bounds::new(0.0, 0.0, 100.0, 60.0),
                BoxMargins::COMPONENT
            )
            .is_empty()
        );
    }

    #[test]
    fn short_boxes_still_get_one_line() {
        assert_eq!(max_lines(10.0, 20.0), 1);
        assert_eq!(max_lines(60.0, 20.0), 2);
        assert_eq!(max_lines(80.0, 20.0), 4);
    }

    #[test]
    fn lines_are_centered_in_the_box() {
        let bounds = Bounds::new(100.0, 100.0, 160.0, 60.0);
        let placed = layout_in_box(&mut measure(), "API Gateway", bounds, BoxMargins::COMPONENT);
        assert_eq!(placed.len(), 1);
        // 11 chars * 6px = 66px wide, 15px block.
        assert_eq!(placed[0].origin, Point::new(147.0, 122.0));
    }

    #[test]
    fn database_caps_reduce_the_line_budget() {
        let bounds = Bounds::new(0.0, 0.0, 60.0, 100.0);
        let text = "one two three four five six seven";
        let plain = layout_in_box(&mut measure(), text, bounds, BoxMargins::COMPONENT);
        let capped = layout_in_box(&mut measure(), text, bounds, BoxMargins::database(20.0));
        assert_eq!(plain.len(), 5);
        assert_eq!(capped.len(), 2);
    }

    fn check_wrap_respects_width(words: Vec<String>, max_width: f32) -> Result<(), TestCaseError> {
        let text = words.join(" ");
        let mut m = measure();
        let lines = wrap_words(&mut m, &text, BOX_FONT_SIZE, max_width);

        for line in &lines {
            let (width, _) = m.measure_text(line, BOX_FONT_SIZE);
            prop_assert!(width <= max_width || !line.contains(' '));
        }
        prop_assert_eq!(lines.join(" "), text);
        Ok(())
    }

    fn check_layout_stays_within_budget(
        words: Vec<String>,
        height: f32,
    ) -> Result<(), TestCaseError> {
        let text = words.join(" ");
        let bounds = Bounds::new(0.0, 0.0, 120.0, height);
        let placed = layout_in_box(&mut measure(), &text, bounds, BoxMargins::COMPONENT);
        prop_assert!(placed.len() <= max_lines(height, 20.0));
        for pair in placed.windows(2) {
            prop_assert_eq!(pair[1].origin.y - pair[0].origin.y, LINE_HEIGHT);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn wrapped_lines_fit_unless_single_word(
            words in prop::collection::vec("[a-z]{1,12}", 1..20),
            max_width in 20.0f32..200.0,
        ) {
            check_wrap_respects_width(words, max_width)?;
        }

        #[test]
        fn layout_never_exceeds_line_budget(
            words in prop::collection::vec("[a-z]{1,8}", 0..30),
            height in 10.0f32..200.0,
        ) {
            check_layout_stays_within_budget(words, height)?;
        }
    }
}
