//! Container-runtime collaborator
//!
//! The pipeline needs three operations from the local runtime: an exact
//! image:tag existence probe, a Dockerfile build, and a registry pull.
//! The probe never builds, pulls, or mutates; absence is `false`, not an
//! error.

mod docker;
mod mock;

pub use docker::DockerRuntime;
pub use mock::MockRuntime;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Exact name:tag match against the local image index
    async fn image_exists(&self, reference: &str) -> Result<bool>;

    /// Build the Dockerfile at `context` and tag the result `reference`
    async fn build(&self, context: &Path, reference: &str) -> Result<()>;

    /// Pull `reference` from its registry
    async fn pull(&self, reference: &str) -> Result<()>;
}
