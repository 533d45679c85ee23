//! Composition-engine collaborator
//!
//! One operation is consumed: bring the stack up using the base manifest
//! layered with the override document.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::process::Command;

#[async_trait]
pub trait ComposeEngine: Send + Sync {
    async fn up(&self, base: &Path, override_file: &Path) -> Result<()>;
}

/// `docker compose` CLI engine
pub struct DockerCompose;

impl DockerCompose {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DockerCompose {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComposeEngine for DockerCompose {
    async fn up(&self, base: &Path, override_file: &Path) -> Result<()> {
        let status = Command::new("docker")
            .args(["compose", "-f"])
            .arg(base)
            .arg("-f")
            .arg(override_file)
            .args(["up", "-d", "--remove-orphans"])
            .status()
            .await
            .context("failed to spawn docker compose")?;

        if !status.success() {
            bail!("docker compose up exited with {status}");
        }
        Ok(())
    }
}

/// Records `up` invocations for tests
#[derive(Default)]
pub struct RecordingCompose {
    invocations: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingCompose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<(PathBuf, PathBuf)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComposeEngine for RecordingCompose {
    async fn up(&self, base: &Path, override_file: &Path) -> Result<()> {
        self.invocations
            .lock()
            .unwrap()
            .push((base.to_path_buf(), override_file.to_path_buf()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_engine_captures_both_files() {
        let engine = RecordingCompose::new();
        engine
            .up(
                Path::new("docker-compose.yml"),
                Path::new("docker-compose.override.yml"),
            )
            .await
            .unwrap();

        assert_eq!(
            engine.invocations(),
            vec![(
                PathBuf::from("docker-compose.yml"),
                PathBuf::from("docker-compose.override.yml"),
            )]
        );
    }
}
