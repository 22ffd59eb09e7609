//! Single-focus arbitration between widgets.

use crate::widget::{WidgetId, WidgetState};
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// A widget's claim ticket for focus.
///
/// Holds a weak link to the widget's shared flags so the manager can reset
/// the previous holder without owning it.
#[derive(Debug, Clone)]
pub struct FocusHandle {
    id: WidgetId,
    state: Weak<Cell<WidgetState>>,
}

impl FocusHandle {
    pub(crate) fn new(id: WidgetId, state: &Rc<Cell<WidgetState>>) -> Self {
        Self {
            id,
            state: Rc::downgrade(state),
        }
    }

    /// The widget this handle belongs to.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    fn acquire(&self) {
        if let Some(state) = self.state.upgrade() {
            let mut flags = state.get();
            flags.focused = true;
            state.set(flags);
        }
    }

    fn release(&self) {
        if let Some(state) = self.state.upgrade() {
            let mut flags = state.get();
            flags.focused = false;
            flags.active = false;
            state.set(flags);
        }
    }
}

/// Tracks the one widget that currently holds input focus.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<FocusHandle>,
}

impl FocusManager {
    /// Create a manager with nothing focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give focus to `handle`, clearing any other holder first.
    pub fn set_focus(&mut self, handle: FocusHandle) {
        if let Some(current) = self.focused.take() {
            if current.id != handle.id {
                log::debug!("Focus moves from {} to {}", current.id, handle.id);
                current.release();
            }
        }
        handle.acquire();
        self.focused = Some(handle);
    }

    /// Clear the current holder, if any.
    pub fn clear_focus(&mut self) {
        if let Some(current) = self.focused.take() {
            log::debug!("Focus cleared from {}", current.id);
            current.release();
        }
    }

    /// The focused widget, if it is still alive.
    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
            .as_ref()
            .filter(|handle| handle.is_alive())
            .map(FocusHandle::id)
    }

    /// Check if a specific widget holds focus.
    pub fn is_focused(&self, id: WidgetId) -> bool {
        self.focused() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> (WidgetId, Rc<Cell<WidgetState>>) {
        (WidgetId::new(), Rc::new(Cell::new(WidgetState::default())))
    }

    #[test]
    fn test_set_focus_marks_holder() {
        let mut focus = FocusManager::new();
        let (id, state) = shared();

        focus.set_focus(FocusHandle::new(id, &state));

        assert!(state.get().focused);
        assert_eq!(focus.focused(), Some(id));
    }

    #[test]
    fn test_switching_focus_resets_previous_holder() {
        let mut focus = FocusManager::new();
        let (a, a_state) = shared();
        let (b, b_state) = shared();

        focus.set_focus(FocusHandle::new(a, &a_state));
        a_state.set(WidgetState {
            active: true,
            ..a_state.get()
        });

        focus.set_focus(FocusHandle::new(b, &b_state));

        assert!(!a_state.get().focused);
        assert!(!a_state.get().active);
        assert!(b_state.get().focused);
        assert!(focus.is_focused(b));
    }

    #[test]
    fn test_refocusing_same_widget_keeps_active() {
        let mut focus = FocusManager::new();
        let (a, a_state) = shared();

        focus.set_focus(FocusHandle::new(a, &a_state));
        a_state.set(WidgetState {
            active: true,
            ..a_state.get()
        });
        focus.set_focus(FocusHandle::new(a, &a_state));

        assert!(a_state.get().active);
        assert!(a_state.get().focused);
    }

    #[test]
    fn test_clear_focus() {
        let mut focus = FocusManager::new();
        let (a, a_state) = shared();
        focus.set_focus(FocusHandle::new(a, &a_state));
        a_state.set(WidgetState {
            active: true,
            ..a_state.get()
        });

        focus.clear_focus();

        assert_eq!(focus.focused(), None);
        assert!(!a_state.get().focused);
        assert!(!a_state.get().active);
    }

    #[test]
    fn test_dropped_holder_is_not_reported() {
        let mut focus = FocusManager::new();
        let (a, a_state) = shared();
        focus.set_focus(FocusHandle::new(a, &a_state));

        drop(a_state);

        assert_eq!(focus.focused(), None);
        focus.clear_focus();
    }
}
