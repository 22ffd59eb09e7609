//! Application errors and the run-once session guard.

use crate::config::ConfigError;
use clusterpad_core::{Severity, show_message};
use clusterpad_render::RendererError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("ClusterPad is already running!")]
    AlreadyRunning,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Renderer(#[from] RendererError),
}

/// Allows exactly one session to start over the guard's lifetime.
#[derive(Debug, Default)]
pub struct SessionGuard {
    started: bool,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session as started. Every later call fails and is logged.
    pub fn start(&mut self) -> Result<(), AppError> {
        if self.started {
            let err = AppError::AlreadyRunning;
            show_message(Severity::Error, &err.to_string());
            return Err(err);
        }
        self.started = true;
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
