//! Renderer trait abstraction.

use clusterpad_core::{Rgba, Surface};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    pub background_color: Color,
}

impl RenderContext {
    pub fn new(viewport_size: Size) -> Self {
        Self {
            viewport_size,
            background_color: Rgba::rgb(250, 250, 250).into(),
        }
    }

    pub fn with_background(mut self, color: impl Into<Color>) -> Self {
        self.background_color = color.into();
        self
    }
}

/// A [`Surface`] that is rebuilt every frame.
pub trait Renderer: Surface {
    /// Drop the previous frame and paint the background.
    fn begin_frame(&mut self, ctx: &RenderContext);
}
