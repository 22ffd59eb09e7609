//! ClusterPad Render Library
//!
//! Frame setup shared by renderers and the Vello implementation of the core
//! [`Surface`](clusterpad_core::Surface) trait.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
