//! Fixed-ratio text metrics used for widget layout.

use kurbo::Size;

const ADVANCE_RATIO: f64 = 0.6;
const LINE_RATIO: f64 = 1.2;

/// Width of a single line of text.
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * ADVANCE_RATIO
}

pub fn line_height(font_size: f64) -> f64 {
    font_size * LINE_RATIO
}

/// Bounding size of possibly multi-line text.
pub fn measure_text(text: &str, font_size: f64) -> Size {
    let (width, lines) = text
        .split('\n')
        .fold((0.0_f64, 0usize), |(width, lines), line| {
            (width.max(text_width(line, font_size)), lines + 1)
        });
    Size::new(width, lines as f64 * line_height(font_size))
}
