//! Translation of winit window events into widget input events.

use clusterpad_core::{InputEvent, Key, MouseButton};
use kurbo::{Point, Vec2};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};

/// Pixels scrolled per wheel line.
const LINE_SCROLL: f64 = 20.0;

pub fn map_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n),
    }
}

pub fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::Backspace) => Key::Backspace,
        WinitKey::Named(NamedKey::Delete) => Key::Delete,
        WinitKey::Named(NamedKey::ArrowLeft) => Key::Left,
        WinitKey::Named(NamedKey::ArrowRight) => Key::Right,
        WinitKey::Named(NamedKey::Home) => Key::Home,
        WinitKey::Named(NamedKey::End) => Key::End,
        WinitKey::Named(NamedKey::Enter) => Key::Enter,
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        _ => Key::Other,
    }
}

fn scroll_delta(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(x as f64, y as f64) * LINE_SCROLL,
        MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x, pos.y),
    }
}

/// Tracks the cursor so button and wheel events carry a position.
#[derive(Debug, Default)]
pub struct EventTranslator {
    cursor: Point,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Translate one window event; events the widgets do not consume map to `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(InputEvent::Quit),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x, position.y);
                Some(InputEvent::PointerMoved {
                    position: self.cursor,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_button(*button);
                let position = self.cursor;
                Some(match state {
                    ElementState::Pressed => InputEvent::ButtonDown { button, position },
                    ElementState::Released => InputEvent::ButtonUp { button, position },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll {
                position: self.cursor,
                delta: scroll_delta(*delta),
            }),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                Some(InputEvent::KeyDown {
                    key: map_key(&event.logical_key),
                    text: event.text.as_ref().map(|t| t.to_string()),
                })
            }
            _ => None,
        }
    }
}
