//! Default container-build strategy

use super::{BuildRequest, BuildStrategy};
use crate::fs::FileSystem;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Fallback strategy: hand the source tree to the container runtime as a
/// Dockerfile build context, tagged `image:tag`
pub struct ContainerBuild;

#[async_trait]
impl BuildStrategy for ContainerBuild {
    fn name(&self) -> &'static str {
        "container"
    }

    fn matches(&self, fs: &dyn FileSystem, src: &Path) -> bool {
        fs.is_file(&src.join("Dockerfile"))
    }

    async fn build(&self, request: &BuildRequest<'_>) -> Result<()> {
        request
            .runtime
            .build(request.src, &request.reference())
            .await
    }
}
