//! Colors used by widgets and the cluster recoloring palette.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color.
///
/// Widgets carry this type instead of `peniko::Color` so colors can be
/// compared for equality and serialized; renderers convert at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
pub const LIGHT_GRAY: Rgba = Rgba::rgb(211, 211, 211);
pub const DIM_GRAY: Rgba = Rgba::rgb(105, 105, 105);
pub const LIGHT_BLUE: Rgba = Rgba::rgb(173, 216, 230);
pub const DEEP_SKY_BLUE: Rgba = Rgba::rgb(0, 191, 255);
pub const STEEL_BLUE: Rgba = Rgba::rgb(70, 130, 180);
pub const RED: Rgba = Rgba::rgb(255, 0, 0);
pub const LIME: Rgba = Rgba::rgb(0, 255, 0);
pub const BLUE: Rgba = Rgba::rgb(0, 0, 255);
pub const CYAN: Rgba = Rgba::rgb(0, 255, 255);
pub const MAGENTA: Rgba = Rgba::rgb(255, 0, 255);
pub const ORANGE: Rgba = Rgba::rgb(255, 165, 0);
pub const GREEN_YELLOW: Rgba = Rgba::rgb(173, 255, 47);
pub const DEEP_PINK: Rgba = Rgba::rgb(255, 20, 147);
pub const BROWN: Rgba = Rgba::rgb(165, 42, 42);

/// Accent colors for the shell's controls.
pub const PRIMARY: Rgba = Rgba::rgb(59, 130, 246);
pub const SECONDARY: Rgba = Rgba::rgb(148, 163, 184);
pub const WARNING: Rgba = Rgba::rgb(250, 204, 21);
pub const ADD: Rgba = Rgba::rgb(74, 222, 128);
pub const BACKGROUND: Rgba = Rgba::rgb(30, 41, 59);

/// Ordered palette used to recolor points by cluster label.
pub const CLUSTER_PALETTE: [Rgba; 10] = [
    RED,
    LIME,
    BLUE,
    CYAN,
    MAGENTA,
    ORANGE,
    GREEN_YELLOW,
    DEEP_PINK,
    STEEL_BLUE,
    BROWN,
];

/// Pick the palette entry for a cluster label, cycling when the label
/// exceeds the palette size. Empty palettes fall back to [`CLUSTER_PALETTE`].
pub fn cluster_color(palette: &[Rgba], label: usize) -> Rgba {
    if palette.is_empty() {
        return CLUSTER_PALETTE[label % CLUSTER_PALETTE.len()];
    }
    palette[label % palette.len()]
}
