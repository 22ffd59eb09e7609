//! Single-line editable text field.

use super::text::{line_height, text_width};
use super::{Widget, WidgetBase, WidgetStyle};
use crate::context::UiContext;
use crate::input::{InputEvent, Key};
use crate::palette::{self, Rgba};
use crate::render::Surface;
use kurbo::{Point, Rect};
use std::time::Duration;

/// Time between caret visibility toggles.
pub const CARET_BLINK: Duration = Duration::from_millis(500);
const PADDING: f64 = 5.0;
const CARET_WIDTH: f64 = 2.0;

/// Editable text with a caret and horizontal scrolling.
///
/// Keys are only honored while the box holds focus. Clicking inside focuses
/// it, clicking elsewhere or pressing Escape releases it.
#[derive(Debug)]
pub struct TextBox {
    base: WidgetBase,
    text: String,
    /// Caret position as a char index into `text`.
    caret: usize,
    scroll_offset: f64,
    font_size: f64,
    text_color: Rgba,
    caret_visible: bool,
    blink_elapsed: Duration,
}

impl TextBox {
    pub fn new(text: impl Into<String>, font_size: f64, rect: Rect) -> Self {
        let text = text.into();
        let caret = text.chars().count();
        let mut text_box = Self {
            base: WidgetBase::new(rect, WidgetStyle::new(palette::WHITE).with_hover(palette::LIGHT_GRAY)),
            text,
            caret,
            scroll_offset: 0.0,
            font_size,
            text_color: palette::BLACK,
            caret_visible: true,
            blink_elapsed: Duration::ZERO,
        };
        text_box.ensure_caret_visible();
        text_box
    }

    pub fn with_text_color(mut self, color: Rgba) -> Self {
        self.text_color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the contents and move the caret to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.char_count();
        self.ensure_caret_visible();
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, caret: usize) -> usize {
        self.text
            .char_indices()
            .nth(caret)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn caret_x(&self) -> f64 {
        let end = self.byte_index(self.caret);
        text_width(&self.text[..end], self.font_size)
    }

    fn visible_width(&self) -> f64 {
        (self.base.rect().width() - 2.0 * PADDING).max(0.0)
    }

    fn ensure_caret_visible(&mut self) {
        let caret_x = self.caret_x();
        let max_x = self.visible_width();
        if caret_x - self.scroll_offset > max_x {
            self.scroll_offset = caret_x - max_x;
        } else if caret_x < self.scroll_offset {
            self.scroll_offset = caret_x;
        }
    }

    fn restart_blink(&mut self) {
        self.caret_visible = true;
        self.blink_elapsed = Duration::ZERO;
    }

    fn insert(&mut self, text: &str) {
        let printable: String = text.chars().filter(|c| !c.is_control()).collect();
        if printable.is_empty() {
            return;
        }
        let at = self.byte_index(self.caret);
        self.text.insert_str(at, &printable);
        self.caret += printable.chars().count();
    }

    fn handle_key(&mut self, key: Key, text: Option<&str>, ctx: &mut UiContext) {
        match key {
            Key::Backspace => {
                if self.caret > 0 {
                    let at = self.byte_index(self.caret - 1);
                    self.text.remove(at);
                    self.caret -= 1;
                }
            }
            Key::Delete => {
                if self.caret < self.char_count() {
                    let at = self.byte_index(self.caret);
                    self.text.remove(at);
                }
            }
            Key::Left => self.caret = self.caret.saturating_sub(1),
            Key::Right => self.caret = (self.caret + 1).min(self.char_count()),
            Key::Home => self.caret = 0,
            Key::End => self.caret = self.char_count(),
            Key::Escape => {
                ctx.focus_mut().clear_focus();
                return;
            }
            Key::Enter => {}
            Key::Other => {
                if let Some(text) = text {
                    self.insert(text);
                }
            }
        }
        self.ensure_caret_visible();
        self.restart_blink();
    }
}

impl Widget for TextBox {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn layout_changed(&mut self) {
        self.ensure_caret_visible();
    }

    fn update(&mut self, ctx: &UiContext) {
        self.base.update(ctx.pointer());
        if !self.base.state().focused {
            self.restart_blink();
            return;
        }
        self.blink_elapsed += ctx.frame_delta();
        while self.blink_elapsed >= CARET_BLINK {
            self.blink_elapsed -= CARET_BLINK;
            self.caret_visible = !self.caret_visible;
        }
    }

    fn execute(&mut self, event: &InputEvent, ctx: &mut UiContext) {
        let was_focused = self.base.state().focused;
        self.base.process(event, ctx);
        let focused = self.base.state().focused;
        if focused && !was_focused {
            self.restart_blink();
        }

        if let InputEvent::KeyDown { key, text } = event {
            if focused && self.base.state().enabled {
                self.handle_key(*key, text.as_deref(), ctx);
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let rect = self.base.rect();
        let focused = self.base.state().focused;
        surface.fill_rect(rect, self.color());
        let outline = if focused { palette::PRIMARY } else { palette::BLACK };
        surface.stroke_rect(rect, outline, 2.0);

        let inner = rect.inset(-PADDING);
        let text_height = line_height(self.font_size);
        let top = rect.center().y - text_height / 2.0;

        surface.push_clip(inner);
        surface.draw_text(
            &self.text,
            Point::new(inner.x0 - self.scroll_offset, top),
            self.font_size,
            self.text_color,
        );
        if focused && self.caret_visible {
            let x = inner.x0 + self.caret_x() - self.scroll_offset;
            surface.fill_rect(
                Rect::new(x, top, x + CARET_WIDTH, top + text_height),
                self.text_color,
            );
        }
        surface.pop_clip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use crate::render::{DrawCommand, RecordingSurface};

    fn focused_box(text: &str) -> (TextBox, UiContext) {
        let mut ctx = UiContext::new();
        let mut text_box = TextBox::new(text, 10.0, Rect::new(0.0, 0.0, 70.0, 30.0));
        let click = InputEvent::ButtonDown {
            button: MouseButton::Left,
            position: Point::new(10.0, 10.0),
        };
        ctx.handle_event(&click);
        text_box.execute(&click, &mut ctx);
        assert!(text_box.state().focused);
        (text_box, ctx)
    }

    fn key(text_box: &mut TextBox, ctx: &mut UiContext, key: Key) {
        text_box.execute(&InputEvent::KeyDown { key, text: None }, ctx);
    }

    fn type_text(text_box: &mut TextBox, ctx: &mut UiContext, text: &str) {
        text_box.execute(
            &InputEvent::KeyDown {
                key: Key::Other,
                text: Some(text.to_string()),
            },
            ctx,
        );
    }

    #[test]
    fn test_editing_keys() {
        let (mut text_box, mut ctx) = focused_box("Hello");
        assert_eq!(text_box.caret(), 5);

        key(&mut text_box, &mut ctx, Key::Backspace);
        assert_eq!(text_box.text(), "Hell");

        key(&mut text_box, &mut ctx, Key::Home);
        type_text(&mut text_box, &mut ctx, "¡");
        assert_eq!(text_box.text(), "¡Hell");
        assert_eq!(text_box.caret(), 1);

        key(&mut text_box, &mut ctx, Key::Delete);
        assert_eq!(text_box.text(), "¡ell");

        key(&mut text_box, &mut ctx, Key::Right);
        key(&mut text_box, &mut ctx, Key::Right);
        key(&mut text_box, &mut ctx, Key::Left);
        assert_eq!(text_box.caret(), 2);

        key(&mut text_box, &mut ctx, Key::End);
        assert_eq!(text_box.caret(), 4);
        key(&mut text_box, &mut ctx, Key::Right);
        assert_eq!(text_box.caret(), 4);
    }

    #[test]
    fn test_control_characters_are_not_inserted() {
        let (mut text_box, mut ctx) = focused_box("");
        type_text(&mut text_box, &mut ctx, "\u{8}\r");
        assert_eq!(text_box.text(), "");
    }

    #[test]
    fn test_keys_ignored_without_focus() {
        let mut ctx = UiContext::new();
        let mut text_box = TextBox::new("abc", 10.0, Rect::new(0.0, 0.0, 70.0, 30.0));
        type_text(&mut text_box, &mut ctx, "x");
        key(&mut text_box, &mut ctx, Key::Backspace);
        assert_eq!(text_box.text(), "abc");
    }

    #[test]
    fn test_escape_and_outside_click_release_focus() {
        let (mut text_box, mut ctx) = focused_box("abc");
        key(&mut text_box, &mut ctx, Key::Escape);
        assert!(!text_box.state().focused);
        assert_eq!(ctx.focus().focused(), None);

        let (mut text_box, mut ctx) = focused_box("abc");
        let outside = InputEvent::ButtonDown {
            button: MouseButton::Left,
            position: Point::new(500.0, 500.0),
        };
        text_box.execute(&outside, &mut ctx);
        assert!(!text_box.state().focused);
    }

    #[test]
    fn test_scroll_keeps_caret_visible() {
        // 60px visible at 6px per char.
        let (mut text_box, mut ctx) = focused_box("");
        type_text(&mut text_box, &mut ctx, "abcdefghijklmno");
        assert!((text_box.scroll_offset() - 30.0).abs() < 1e-9);

        key(&mut text_box, &mut ctx, Key::Home);
        assert_eq!(text_box.scroll_offset(), 0.0);
    }

    #[test]
    fn test_caret_blinks_every_interval() {
        let (mut text_box, mut ctx) = focused_box("abc");
        assert!(text_box.caret_visible());

        ctx.begin_frame(Duration::from_millis(300));
        text_box.update(&ctx);
        assert!(text_box.caret_visible());

        ctx.begin_frame(Duration::from_millis(300));
        text_box.update(&ctx);
        assert!(!text_box.caret_visible());

        ctx.begin_frame(Duration::from_millis(500));
        text_box.update(&ctx);
        assert!(text_box.caret_visible());
    }

    #[test]
    fn test_draw_clips_text_and_caret() {
        let (text_box, _ctx) = focused_box("hi");
        let mut surface = RecordingSurface::new();
        text_box.draw(&mut surface);

        assert!(matches!(surface.commands[2], DrawCommand::PushClip(_)));
        assert_eq!(surface.texts(), vec!["hi"]);
        assert!(matches!(surface.commands.last(), Some(DrawCommand::PopClip)));
        // Fill, outline, clip, text, caret, unclip.
        assert_eq!(surface.commands.len(), 6);
    }
}
