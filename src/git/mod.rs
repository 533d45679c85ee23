//! Version-control collaborator
//!
//! The pipeline consumes four narrow operations: short tip-revision id,
//! fast-forward-only pull, dirty sub-tree enumeration, and commit+push of
//! a sub-tree. Working directories are always passed explicitly to the
//! tool; nothing here mutates the process-global current directory.

mod cli;
mod mock;

pub use cli::GitCli;
pub use mock::MockVersionControl;

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Short unambiguous id of the tip commit of the working tree at `path`
    ///
    /// Read-only; fails when the path is not a repository or has no commits.
    async fn short_rev(&self, path: &Path) -> Result<String>;

    /// Fast-forward-only pull of the tree at `path`
    async fn pull_ff_only(&self, path: &Path) -> Result<()>;

    /// Sub-trees (relative to `root`) with uncommitted changes
    async fn changed_subtrees(&self, root: &Path, subtrees: &[PathBuf]) -> Result<Vec<PathBuf>>;

    /// Stage everything in `path`, commit with `message`, and push
    async fn commit_and_push(&self, path: &Path, message: &str) -> Result<()>;
}
