//! Custom build-script strategy

use super::{BuildRequest, BuildStrategy};
use crate::fs::FileSystem;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

pub const BUILD_SCRIPT: &str = "build.sh";

/// Orchestration flag set in the script's environment so it can suppress
/// its own recursive orchestration steps
pub const ORCHESTRATION_ENV: &str = "STACKPIN_ORCHESTRATED";

/// Runs a `build.sh` found at the source root, passing the target image
/// and tag as arguments
pub struct ScriptBuild;

#[async_trait]
impl BuildStrategy for ScriptBuild {
    fn name(&self) -> &'static str {
        "script"
    }

    fn matches(&self, fs: &dyn FileSystem, src: &Path) -> bool {
        fs.is_file(&src.join(BUILD_SCRIPT))
    }

    async fn build(&self, request: &BuildRequest<'_>) -> Result<()> {
        let mut command = Command::new("sh");
        command
            .arg(BUILD_SCRIPT)
            .arg(request.image)
            .arg(request.tag)
            .current_dir(request.src);
        if request.orchestrated {
            command.env(ORCHESTRATION_ENV, "1");
        }

        let status = command.status().await.with_context(|| {
            format!(
                "failed to run {BUILD_SCRIPT} in {}",
                request.src.display()
            )
        })?;

        if !status.success() {
            bail!("{BUILD_SCRIPT} exited with {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use std::fs;
    use tempfile::TempDir;

    fn request<'a>(src: &'a Path, runtime: &'a MockRuntime) -> BuildRequest<'a> {
        BuildRequest {
            src,
            image: "acme/web",
            tag: "a1b2c3d",
            runtime,
            orchestrated: true,
        }
    }

    #[tokio::test]
    async fn test_script_receives_image_tag_and_flag() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(BUILD_SCRIPT),
            "printf '%s %s %s' \"$1\" \"$2\" \"$STACKPIN_ORCHESTRATED\" > invoked.txt\n",
        )
        .unwrap();

        let runtime = MockRuntime::new();
        ScriptBuild
            .build(&request(temp.path(), &runtime))
            .await
            .unwrap();

        let recorded = fs::read_to_string(temp.path().join("invoked.txt")).unwrap();
        assert_eq!(recorded, "acme/web a1b2c3d 1");
    }

    #[tokio::test]
    async fn test_flag_absent_outside_orchestration() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(BUILD_SCRIPT),
            "printf '%s' \"${STACKPIN_ORCHESTRATED:-unset}\" > flag.txt\n",
        )
        .unwrap();

        let runtime = MockRuntime::new();
        let mut req = request(temp.path(), &runtime);
        req.orchestrated = false;
        ScriptBuild.build(&req).await.unwrap();

        let flag = fs::read_to_string(temp.path().join("flag.txt")).unwrap();
        assert_eq!(flag, "unset");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(BUILD_SCRIPT), "exit 3\n").unwrap();

        let runtime = MockRuntime::new();
        let err = ScriptBuild
            .build(&request(temp.path(), &runtime))
            .await
            .unwrap_err();
        assert!(err.to_string().contains(BUILD_SCRIPT));
    }
}
