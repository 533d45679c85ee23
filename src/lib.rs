//! stackpin - compose stack builder pinning services to revision tags
//!
//! This library maps named services in a composition manifest to source
//! repositories, builds container images tagged by source revision, and
//! regenerates an override document pinning each service to its freshly
//! built (or pulled) image tag before the stack is brought up.
//!
//! # Core Concepts
//!
//! - **Service catalog**: the manifest's `services` mapping parsed into
//!   immutable descriptors (name, image, optional source tree)
//! - **Revision tag**: short content-derived id of a source tree's tip
//!   commit, recomputed every run
//! - **Build strategies**: custom `build.sh` entry point, `Makefile`, or
//!   the default Dockerfile build, probed in strict priority order with
//!   mandatory post-build verification of the expected tag
//! - **Override document**: derived manifest layered atop the base
//!   composition manifest, regenerated wholesale on fully successful runs
//!
//! # Example Usage
//!
//! ```ignore
//! use stackpin::orchestrator::{Orchestrator, RunOptions};
//! use stackpin::{DockerCompose, DockerRuntime, GitCli, RealFileSystem};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! async fn pin_stack() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(
//!         Arc::new(RealFileSystem::new()),
//!         Arc::new(DockerRuntime::connect()?),
//!         Arc::new(GitCli::new()),
//!         Arc::new(DockerCompose::new()),
//!     );
//!     let report = orchestrator
//!         .run(&RunOptions {
//!             manifest_path: PathBuf::from("docker-compose.yml"),
//!             override_path: PathBuf::from("docker-compose.override.yml"),
//!             project_root: PathBuf::from("."),
//!             write_overrides: true,
//!             deploy: true,
//!         })
//!         .await?;
//!     println!("{} service(s) ready", report.outcomes.len());
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`catalog`]: manifest parsing into service descriptors
//! - [`strategy`]: build-strategy selection and execution
//! - [`orchestrator`]: the linear pipeline driver
//! - [`git`], [`runtime`], [`compose`]: collaborator traits with real and
//!   mock implementations

// Public modules
pub mod catalog;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod orchestrator;
pub mod overrides;
pub mod progress;
pub mod runtime;
pub mod strategy;

// Re-export key types for convenient access
pub use catalog::{ServiceCatalog, ServiceDescriptor};
pub use compose::{ComposeEngine, DockerCompose, RecordingCompose};
pub use config::{ConfigError, StackpinConfig};
pub use error::OrchestrationError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use git::{GitCli, MockVersionControl, VersionControl};
pub use orchestrator::{BuildOutcome, Orchestrator, RunOptions, RunReport};
pub use overrides::{OverrideDocument, OverrideService};
pub use runtime::{ContainerRuntime, DockerRuntime, MockRuntime};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
