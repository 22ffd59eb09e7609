//! The interaction context shared by every widget in a frame.

use crate::focus::FocusManager;
use crate::input::{InputEvent, InputState};
use kurbo::Point;
use std::time::Duration;

/// Explicit owner of the cross-widget state.
///
/// The application shell creates one and passes it to every
/// `update`/`execute` call; nothing reaches it through globals.
#[derive(Debug, Default)]
pub struct UiContext {
    focus: FocusManager,
    input: InputState,
    frame_delta: Duration,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time since the previous frame.
    pub fn begin_frame(&mut self, delta: Duration) {
        self.frame_delta = delta;
    }

    /// Fold an event into the tracked input state.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input.handle_event(event);
    }

    /// Move the tracked pointer without a discrete event.
    pub fn set_pointer(&mut self, position: Point) {
        self.input.pointer_position = position;
    }

    pub fn pointer(&self) -> Point {
        self.input.pointer_position
    }

    pub fn frame_delta(&self) -> Duration {
        self.frame_delta
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusManager {
        &mut self.focus
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }
}
