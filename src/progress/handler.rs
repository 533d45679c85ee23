//! Progress handler trait and events

use std::time::Duration;

/// Events emitted during an orchestration run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Catalog loaded, run started
    Started { manifest: String, services: usize },

    /// A service's resolve/probe/build step started
    ServiceStarted { service: String },

    /// A service's step finished
    ServiceCompleted {
        service: String,
        success: bool,
        reference: String,
        duration: Duration,
    },

    /// Override document written
    OverridesWritten { path: String },

    /// Composition engine brought the stack up
    StackActivated,

    /// Run completed successfully
    Completed {
        services: usize,
        total_time: Duration,
    },

    /// Run failed
    Failed { error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {
        // Intentionally empty
    }
}
