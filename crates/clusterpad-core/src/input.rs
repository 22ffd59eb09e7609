//! Input events and the pointer state folded from them.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl MouseButton {
    /// The button that drives click/focus transitions.
    pub const PRIMARY: MouseButton = MouseButton::Left;
}

/// Keys the text editing protocol understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Enter,
    Escape,
    /// Any other key; its printable text (if any) travels with the event.
    Other,
}

/// A discrete input event delivered by the platform layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Quit,
    PointerMoved {
        position: Point,
    },
    ButtonDown {
        button: MouseButton,
        position: Point,
    },
    ButtonUp {
        button: MouseButton,
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
    KeyDown {
        key: Key,
        /// Printable text produced by the key press, if any.
        text: Option<String>,
    },
}

impl InputEvent {
    /// Pointer position carried by the event, if it has one.
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::PointerMoved { position }
            | InputEvent::ButtonDown { position, .. }
            | InputEvent::ButtonUp { position, .. }
            | InputEvent::Scroll { position, .. } => Some(*position),
            InputEvent::Quit | InputEvent::KeyDown { .. } => None,
        }
    }

    /// Whether this is a press of the primary button.
    pub fn is_primary_down(&self) -> bool {
        matches!(
            self,
            InputEvent::ButtonDown { button, .. } if *button == MouseButton::PRIMARY
        )
    }

    /// Whether this is a release of the primary button.
    pub fn is_primary_up(&self) -> bool {
        matches!(
            self,
            InputEvent::ButtonUp { button, .. } if *button == MouseButton::PRIMARY
        )
    }
}

/// Pointer position and primary-drag origin folded from the event stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Current pointer position in window coordinates.
    pub pointer_position: Point,
    /// Where the primary button went down, while it is held.
    pub drag_start: Option<Point>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an event into the tracked state.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let Some(position) = event.position() {
            self.pointer_position = position;
        }
        if event.is_primary_down() && self.drag_start.is_none() {
            self.drag_start = Some(self.pointer_position);
        } else if event.is_primary_up() {
            self.drag_start = None;
        }
    }

    /// Offset of the pointer from where the primary drag started.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(button: MouseButton, x: f64, y: f64) -> InputEvent {
        InputEvent::ButtonDown {
            button,
            position: Point::new(x, y),
        }
    }

    #[test]
    fn test_drag_tracking() {
        let mut input = InputState::new();

        input.handle_event(&down(MouseButton::Left, 100.0, 100.0));
        input.handle_event(&InputEvent::PointerMoved {
            position: Point::new(150.0, 120.0),
        });

        let delta = input.drag_delta().unwrap();
        assert!((delta.x - 50.0).abs() < f64::EPSILON);
        assert!((delta.y - 20.0).abs() < f64::EPSILON);

        input.handle_event(&InputEvent::ButtonUp {
            button: MouseButton::Left,
            position: Point::new(150.0, 120.0),
        });
        assert_eq!(input.drag_delta(), None);
    }

    #[test]
    fn test_secondary_button_does_not_start_drag() {
        let mut input = InputState::new();
        input.handle_event(&down(MouseButton::Right, 10.0, 10.0));

        assert_eq!(input.pointer_position, Point::new(10.0, 10.0));
        assert_eq!(input.drag_start, None);
    }

    #[test]
    fn test_scroll_and_keys_track_pointer_only() {
        let mut input = InputState::new();
        input.handle_event(&InputEvent::Scroll {
            position: Point::new(30.0, 40.0),
            delta: Vec2::new(0.0, 10.0),
        });
        input.handle_event(&InputEvent::KeyDown {
            key: Key::Other,
            text: Some("a".to_string()),
        });

        assert_eq!(input.pointer_position, Point::new(30.0, 40.0));
        assert_eq!(input.drag_start, None);
    }

    #[test]
    fn test_primary_helpers() {
        let right = down(MouseButton::Right, 0.0, 0.0);
        assert!(down(MouseButton::Left, 0.0, 0.0).is_primary_down());
        assert!(!right.is_primary_down());
        assert_eq!(InputEvent::Quit.position(), None);
    }
}
