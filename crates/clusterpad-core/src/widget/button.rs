//! Clickable rectangle with an optional caption and image.

use super::{Label, Widget, WidgetBase, WidgetStyle};
use crate::context::UiContext;
use crate::palette::{self, Rgba};
use crate::render::{Bitmap, Surface};
use kurbo::Rect;
use std::path::Path;

const OUTLINE_WIDTH: f64 = 2.0;

#[derive(Debug)]
pub struct Button {
    base: WidgetBase,
    label: Option<Label>,
    image: Option<Bitmap>,
}

impl Button {
    pub fn new(rect: Rect, color: Rgba) -> Self {
        Self {
            base: WidgetBase::new(rect, WidgetStyle::new(color)),
            label: None,
            image: None,
        }
    }

    /// Attach a caption, centered on the button.
    pub fn with_label(mut self, text: &str, font_size: f64, color: Rgba) -> Self {
        let label = Label::with_color(text, font_size, self.base.rect().origin(), color);
        self.label = Some(label);
        self.layout_changed();
        self
    }

    /// Load an image scaled to the button. Failure leaves the button without one.
    pub fn with_image(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let size = self.base.rect().size();
        match Bitmap::load(path, size.width.round() as u32, size.height.round() as u32) {
            Ok(bitmap) => self.image = Some(bitmap),
            Err(e) => {
                log::error!("Failed to load image '{}': {}", path.display(), e);
                self.image = None;
            }
        }
        self
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Change the caption text, keeping it centered.
    pub fn set_label_text(&mut self, text: &str) {
        if let Some(label) = &mut self.label {
            label.set_text(text);
        }
        self.layout_changed();
    }
}

impl Widget for Button {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn layout_changed(&mut self) {
        let center = self.base.rect().center();
        if let Some(label) = &mut self.label {
            label.center_on(center);
        }
    }

    fn update(&mut self, ctx: &UiContext) {
        self.base.update(ctx.pointer());
        if let Some(label) = &mut self.label {
            label.update(ctx);
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let rect = self.base.rect();
        surface.fill_rect(rect, self.color());
        surface.stroke_rect(rect, palette::BLACK, OUTLINE_WIDTH);
        if let Some(image) = &self.image {
            surface.draw_image(image, rect);
        }
        if let Some(label) = &self.label {
            label.draw(surface);
        }
    }
}
