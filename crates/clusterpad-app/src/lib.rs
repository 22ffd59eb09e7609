//! ClusterPad Application
//!
//! The application shell: configuration, the run-once guard, widget wiring
//! and the winit/vello front end.

mod config;
mod event_handler;
mod guard;
mod shell;

#[cfg(feature = "native")]
mod app;

#[cfg(feature = "native")]
pub use app::App;
pub use config::{AppConfig, CONFIG_ENV, ConfigError};
pub use event_handler::{EventTranslator, map_button, map_key};
pub use guard::{AppError, SessionGuard};
pub use shell::Shell;
