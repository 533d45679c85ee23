//! Typed errors for the orchestration pipeline
//!
//! Per-service failures (`Resolution`, `BuildFailure`, `PullFailure`) are
//! converted into failed outcomes by the orchestrator and never abort the
//! service loop. `MalformedManifest` aborts before any build is attempted;
//! `AggregateFailure` aborts after all services have been processed.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Cannot read manifest {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("Cannot resolve revision at {path}: {reason}")]
    Resolution { path: PathBuf, reason: String },

    #[error("Build failed for service '{service}': {reason}")]
    BuildFailure { service: String, reason: String },

    #[error("Failed to pull image '{image}': {reason}")]
    PullFailure { image: String, reason: String },

    #[error("Source sync failed for {path}: {reason}")]
    SourceSync { path: PathBuf, reason: String },

    #[error("Failed to write override document {path}: {reason}")]
    OverrideWrite { path: PathBuf, reason: String },

    #[error("Failed to bring the stack up: {0}")]
    Deploy(String),

    #[error("{failed} of {total} service(s) failed; override document left untouched")]
    AggregateFailure { failed: usize, total: usize },
}
