//! ClusterPad Core Library
//!
//! Widget interaction engine and point canvas for ClusterPad: signals, focus,
//! the widget state machine, the concrete widgets and the clustering cache.
//! Rendering goes through the [`render::Surface`] trait so everything here is
//! platform-agnostic and testable headless.

pub mod canvas;
pub mod cluster;
pub mod context;
pub mod focus;
pub mod hull;
pub mod input;
pub mod notify;
pub mod palette;
pub mod render;
pub mod signal;
pub mod widget;

pub use canvas::{Canvas, CanvasPoint, ClusterSummary, HOVER_RADIUS};
pub use cluster::{ClusterError, ClusterResult, ClusterRoutine, Clustering, KMeans};
pub use context::UiContext;
pub use focus::{FocusHandle, FocusManager};
pub use hull::convex_hull;
pub use input::{InputEvent, InputState, Key, MouseButton};
pub use notify::{Severity, show_message};
pub use palette::Rgba;
pub use render::{Bitmap, DrawCommand, RecordingSurface, Surface};
pub use signal::{CallbackError, CallbackResult, ConnectionId, EventKind, EventPayload, Signal, SignalError};
pub use widget::{Button, Label, TextBox, Widget, WidgetBase, WidgetId, WidgetState, WidgetStyle};
