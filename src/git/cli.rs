use super::VersionControl;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Git CLI client; every invocation carries its working tree via `git -C`
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }

    async fn git(&self, path: &Path, args: &[&str]) -> Result<String> {
        debug!(tree = %path.display(), ?args, "running git");
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(args)
            .output()
            .await
            .with_context(|| format!("failed to spawn git in {}", path.display()))?;

        if !output.status.success() {
            bail!(
                "git {} failed in {}: {}",
                args.first().copied().unwrap_or(""),
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn short_rev(&self, path: &Path) -> Result<String> {
        self.git(path, &["rev-parse", "--short", "HEAD"]).await
    }

    async fn pull_ff_only(&self, path: &Path) -> Result<()> {
        self.git(path, &["pull", "--ff-only"]).await?;
        Ok(())
    }

    async fn changed_subtrees(&self, root: &Path, subtrees: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut dirty = Vec::new();
        for subtree in subtrees {
            let tree = root.join(subtree);
            let status = self.git(&tree, &["status", "--porcelain"]).await?;
            if !status.is_empty() {
                dirty.push(subtree.clone());
            }
        }
        Ok(dirty)
    }

    async fn commit_and_push(&self, path: &Path, message: &str) -> Result<()> {
        self.git(path, &["add", "-A"]).await?;
        self.git(path, &["commit", "-m", message]).await?;
        self.git(path, &["push"]).await?;
        Ok(())
    }
}
