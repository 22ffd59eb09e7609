//! Widget state definitions.

use crate::palette::{self, Rgba};
use serde::{Deserialize, Serialize};

/// The four interaction flags of a widget.
///
/// Only [`WidgetBase`](super::WidgetBase) and the
/// [`FocusManager`](crate::focus::FocusManager) write these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetState {
    pub enabled: bool,
    pub hovered: bool,
    /// Currently being pressed. Only valid while focused.
    pub active: bool,
    pub focused: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            enabled: true,
            hovered: false,
            active: false,
            focused: false,
        }
    }
}

impl WidgetState {
    /// Collapse the flags into the state that decides the displayed color.
    pub fn visual(&self) -> Visual {
        if !self.enabled {
            Visual::Disabled
        } else if self.active {
            Visual::Active
        } else if self.hovered {
            Visual::Hovered
        } else {
            Visual::Normal
        }
    }
}

/// The display state of a widget, in color priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visual {
    /// Normal display state - no interaction.
    #[default]
    Normal,
    /// Pointer is over the widget.
    Hovered,
    /// Widget is being pressed.
    Active,
    /// Widget ignores input.
    Disabled,
}

/// Colors a widget shows in each [`Visual`] state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetStyle {
    pub base: Rgba,
    pub hover: Rgba,
    pub active: Rgba,
    pub disabled: Rgba,
}

impl Default for WidgetStyle {
    fn default() -> Self {
        Self::new(palette::LIGHT_BLUE)
    }
}

impl WidgetStyle {
    /// Style with the given base color and the stock hover/active/disabled colors.
    pub fn new(base: Rgba) -> Self {
        Self {
            base,
            hover: palette::DEEP_SKY_BLUE,
            active: palette::STEEL_BLUE,
            disabled: palette::DIM_GRAY,
        }
    }

    pub fn with_hover(mut self, hover: Rgba) -> Self {
        self.hover = hover;
        self
    }

    pub fn with_active(mut self, active: Rgba) -> Self {
        self.active = active;
        self
    }

    pub fn with_disabled(mut self, disabled: Rgba) -> Self {
        self.disabled = disabled;
        self
    }

    /// The color to display for a flag tuple.
    pub fn resolve(&self, state: &WidgetState) -> Rgba {
        match state.visual() {
            Visual::Disabled => self.disabled,
            Visual::Active => self.active,
            Visual::Hovered => self.hover,
            Visual::Normal => self.base,
        }
    }
}
