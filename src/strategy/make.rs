//! Generic build-tool strategy

use super::{BuildRequest, BuildStrategy};
use crate::fs::FileSystem;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Runs `make` in a source tree carrying a Makefile, with the target
/// image and tag passed as variables
pub struct MakeBuild;

#[async_trait]
impl BuildStrategy for MakeBuild {
    fn name(&self) -> &'static str {
        "make"
    }

    fn matches(&self, fs: &dyn FileSystem, src: &Path) -> bool {
        fs.is_file(&src.join("Makefile")) || fs.is_file(&src.join("makefile"))
    }

    async fn build(&self, request: &BuildRequest<'_>) -> Result<()> {
        let status = Command::new("make")
            .arg(format!("IMAGE={}", request.image))
            .arg(format!("TAG={}", request.tag))
            .current_dir(request.src)
            .status()
            .await
            .with_context(|| format!("failed to run make in {}", request.src.display()))?;

        if !status.success() {
            bail!("make exited with {status}");
        }
        Ok(())
    }
}
