//! Build-strategy selection
//!
//! Three strategies are probed at the source root in strict priority
//! order, first match wins: a custom `build.sh` entry point, a `Makefile`,
//! and the default Dockerfile build through the container runtime. After
//! whichever strategy runs, the artifact is re-verified under `image:tag`;
//! a clean exit without the expected tag is still a failure.

mod container;
mod make;
mod script;

pub use container::ContainerBuild;
pub use make::MakeBuild;
pub use script::ScriptBuild;

use crate::fs::FileSystem;
use crate::runtime::ContainerRuntime;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Everything a strategy needs to produce `image:tag` from a source tree
pub struct BuildRequest<'a> {
    pub src: &'a Path,
    pub image: &'a str,
    pub tag: &'a str,
    pub runtime: &'a dyn ContainerRuntime,
    /// Signals sub-builds that they run under orchestration, so custom
    /// scripts can skip their own deploy or prompt steps
    pub orchestrated: bool,
}

impl BuildRequest<'_> {
    pub fn reference(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

#[async_trait]
pub trait BuildStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Filesystem probe deciding whether this strategy applies
    fn matches(&self, fs: &dyn FileSystem, src: &Path) -> bool;

    async fn build(&self, request: &BuildRequest<'_>) -> Result<()>;
}

static SCRIPT: ScriptBuild = ScriptBuild;
static MAKE: MakeBuild = MakeBuild;
static CONTAINER: ContainerBuild = ContainerBuild;

/// First match wins; the container build is the unconditional fallback
pub fn select(fs: &dyn FileSystem, src: &Path) -> &'static dyn BuildStrategy {
    let ordered: [&'static dyn BuildStrategy; 2] = [&SCRIPT, &MAKE];
    for strategy in ordered {
        if strategy.matches(fs, src) {
            return strategy;
        }
    }
    &CONTAINER
}

/// Run the matching strategy, then verify the artifact actually exists
/// under `image:tag`
pub async fn execute(fs: &dyn FileSystem, request: &BuildRequest<'_>) -> Result<()> {
    let strategy = select(fs, request.src);
    debug!(
        strategy = strategy.name(),
        src = %request.src.display(),
        reference = %request.reference(),
        "selected build strategy"
    );

    strategy.build(request).await?;

    let reference = request.reference();
    if !request.runtime.image_exists(&reference).await? {
        bail!("build completed but {reference} is not present in the local image index");
    }
    Ok(())
}
