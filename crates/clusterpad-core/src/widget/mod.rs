//! Widget system: shared interaction state plus the concrete widgets.
//!
//! Every widget owns a [`WidgetBase`] holding its geometry, colors, flags and
//! [`Signal`](crate::signal::Signal). The [`Widget`] trait layers drawing and
//! positioning on top of that base.

mod base;
mod button;
mod label;
mod state;
mod text;
mod text_box;

pub use base::WidgetBase;
pub use button::Button;
pub use label::Label;
pub use state::{Visual, WidgetState, WidgetStyle};
pub use text::{line_height, measure_text, text_width};
pub use text_box::TextBox;

use crate::context::UiContext;
use crate::input::InputEvent;
use crate::notify::{Severity, show_message};
use crate::palette::Rgba;
use crate::render::Surface;
use crate::signal::{CallbackResult, ConnectionId, EventKind, EventPayload, SignalError};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A drawable, interactive element.
pub trait Widget {
    fn base(&self) -> &WidgetBase;
    fn base_mut(&mut self) -> &mut WidgetBase;

    /// Render the widget.
    fn draw(&self, surface: &mut dyn Surface);

    /// Called after the widget's rectangle moved or resized.
    fn layout_changed(&mut self) {}

    /// Per-frame state refresh against the current pointer.
    fn update(&mut self, ctx: &UiContext) {
        self.base_mut().update(ctx.pointer());
    }

    /// Process one input event.
    fn execute(&mut self, event: &InputEvent, ctx: &mut UiContext) {
        self.base_mut().process(event, ctx);
    }

    fn id(&self) -> WidgetId {
        self.base().id()
    }

    fn rect(&self) -> Rect {
        self.base().rect()
    }

    fn state(&self) -> WidgetState {
        self.base().state()
    }

    /// Currently displayed color.
    fn color(&self) -> Rgba {
        self.base().color()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.base_mut().set_enabled(enabled);
    }

    fn connect<F>(&mut self, kind: EventKind, callback: F) -> ConnectionId
    where
        Self: Sized,
        F: FnMut(&EventPayload) -> CallbackResult + 'static,
    {
        let id = self.base_mut().signal_mut().connect(kind, callback);
        show_message(
            Severity::Success,
            &format!("Connected {} signal {} on widget {}", kind, id, self.id()),
        );
        id
    }

    /// Register a callback by event name. Unknown names are logged and rejected.
    fn connect_named<F>(&mut self, name: &str, callback: F) -> Result<ConnectionId, SignalError>
    where
        Self: Sized,
        F: FnMut(&EventPayload) -> CallbackResult + 'static,
    {
        let id = self.base_mut().signal_mut().connect_named(name, callback)?;
        show_message(
            Severity::Success,
            &format!("Connected {} signal {} on widget {}", name, id, self.id()),
        );
        Ok(id)
    }

    fn disconnect(&mut self, kind: EventKind, id: ConnectionId) -> Result<(), SignalError> {
        let widget = self.id();
        self.base_mut().signal_mut().disconnect(kind, id)?;
        show_message(
            Severity::Success,
            &format!("Disconnected {} signal {} from widget {}", kind, id, widget),
        );
        Ok(())
    }

    /// Move the top-left corner to `position`.
    fn set_position(&mut self, position: Point) -> &mut Self
    where
        Self: Sized,
    {
        if self.base_mut().set_position(position) {
            self.layout_changed();
        }
        self
    }

    /// Center the widget on `center`.
    fn center_on(&mut self, center: Point) -> &mut Self
    where
        Self: Sized,
    {
        if self.base_mut().center_on(center) {
            self.layout_changed();
        }
        self
    }

    fn center_x(&mut self, x: f64) -> &mut Self
    where
        Self: Sized,
    {
        if self.base_mut().center_x(x) {
            self.layout_changed();
        }
        self
    }

    fn center_y(&mut self, y: f64) -> &mut Self
    where
        Self: Sized,
    {
        if self.base_mut().center_y(y) {
            self.layout_changed();
        }
        self
    }

    /// Translate by `(dx, dy)`.
    fn move_by(&mut self, dx: f64, dy: f64) -> &mut Self
    where
        Self: Sized,
    {
        if self.base_mut().move_by(dx, dy) {
            self.layout_changed();
        }
        self
    }

    /// Change the size, keeping the top-left corner.
    fn resize(&mut self, size: Size) -> &mut Self
    where
        Self: Sized,
    {
        if self.base_mut().resize(size) {
            self.layout_changed();
        }
        self
    }
}
