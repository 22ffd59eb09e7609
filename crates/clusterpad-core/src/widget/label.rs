//! Static multi-line text.

use super::text::{line_height, measure_text};
use super::{Widget, WidgetBase, WidgetStyle};
use crate::palette::{self, Rgba};
use crate::render::Surface;
use kurbo::{Point, Rect};

/// Text keeps its color while hovered or pressed; only disabling changes it.
fn text_style(color: Rgba) -> WidgetStyle {
    WidgetStyle::new(color).with_hover(color).with_active(color)
}

/// Text drawn line by line from its top-left corner.
///
/// The rectangle always matches the measured text.
#[derive(Debug)]
pub struct Label {
    base: WidgetBase,
    text: String,
    font_size: f64,
}

impl Label {
    pub fn new(text: impl Into<String>, font_size: f64, position: Point) -> Self {
        Self::with_color(text, font_size, position, palette::BLACK)
    }

    pub fn with_color(text: impl Into<String>, font_size: f64, position: Point, color: Rgba) -> Self {
        let text = text.into();
        let rect = Rect::from_origin_size(position, measure_text(&text, font_size));
        Self {
            base: WidgetBase::new(rect, text_style(color)),
            text,
            font_size,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and re-measure.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.remeasure();
    }

    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    pub fn set_color(&mut self, color: Rgba) {
        let disabled = self.base.style().disabled;
        self.base.set_style(text_style(color).with_disabled(disabled));
    }

    fn remeasure(&mut self) {
        let rect = Rect::from_origin_size(
            self.base.rect().origin(),
            measure_text(&self.text, self.font_size),
        );
        self.base.set_rect(rect);
    }
}

impl Widget for Label {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let color = self.color();
        let origin = self.base.rect().origin();
        let step = line_height(self.font_size);
        for (i, line) in self.text.split('\n').enumerate() {
            let at = Point::new(origin.x, origin.y + i as f64 * step);
            surface.draw_text(line, at, self.font_size, color);
        }
    }
}
