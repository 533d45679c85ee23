use super::ContainerRuntime;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bollard::image::{BuildImageOptions, CreateImageOptions};
use bollard::Docker;
use futures_util::StreamExt;
use std::path::Path;
use tracing::debug;

/// Docker Engine API client over the local socket
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("failed to connect to the Docker daemon")?;
        Ok(Self { docker })
    }

    // The create-image endpoint pulls every tag of the image when the
    // tag is left empty, so a bare reference gets the conventional
    // `latest` the existence probe inspects. A colon inside a registry
    // host:port segment is not a tag separator.
    fn pull_options(reference: &str) -> CreateImageOptions<String> {
        let (from_image, tag) = match reference.rsplit_once(':') {
            Some((repo, tag)) if !tag.contains('/') => (repo.to_string(), tag.to_string()),
            _ => (reference.to_string(), "latest".to_string()),
        };
        CreateImageOptions {
            from_image,
            tag,
            ..Default::default()
        }
    }

    // The build endpoint takes the context as a tar stream
    fn tar_context(context: &Path) -> Result<bytes::Bytes> {
        let mut builder = tar::Builder::new(Vec::new());
        builder.append_dir_all(".", context).with_context(|| {
            format!("failed to archive build context {}", context.display())
        })?;
        let archive = builder
            .into_inner()
            .context("failed to finalize build context archive")?;
        Ok(archive.into())
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn image_exists(&self, reference: &str) -> Result<bool> {
        match self.docker.inspect_image(reference).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(e).context(format!("failed to inspect image {reference}")),
        }
    }

    async fn build(&self, context: &Path, reference: &str) -> Result<()> {
        let body = Self::tar_context(context)?;
        let options = BuildImageOptions {
            dockerfile: "Dockerfile".to_string(),
            t: reference.to_string(),
            rm: true,
            ..Default::default()
        };

        let mut stream = self.docker.build_image(options, None, Some(body));
        while let Some(item) = stream.next().await {
            let info = item.context("docker build stream error")?;
            if let Some(error) = info.error {
                bail!("docker build failed: {error}");
            }
            if let Some(message) = info.stream {
                let message = message.trim_end();
                if !message.is_empty() {
                    debug!(target: "docker_build", "{message}");
                }
            }
        }
        Ok(())
    }

    async fn pull(&self, reference: &str) -> Result<()> {
        let options = Self::pull_options(reference);
        let mut stream = self.docker.create_image(Some(options), None, None);
        while let Some(item) = stream.next().await {
            let info = item.with_context(|| format!("failed to pull image {reference}"))?;
            if let Some(status) = info.status {
                debug!(target: "docker_pull", image = reference, "{status}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tar_context_includes_dockerfile() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("Dockerfile"), "FROM scratch\n").unwrap();
        fs::write(temp.path().join("app.txt"), "payload").unwrap();

        let body = DockerRuntime::tar_context(temp.path()).unwrap();

        let mut archive = tar::Archive::new(&body[..]);
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().display().to_string())
            .collect();
        assert!(names.iter().any(|n| n.ends_with("Dockerfile")));
        assert!(names.iter().any(|n| n.ends_with("app.txt")));
    }

    #[test]
    fn test_pull_options_bare_reference_gets_latest() {
        let options = DockerRuntime::pull_options("redis");
        assert_eq!(options.from_image, "redis");
        assert_eq!(options.tag, "latest");
    }

    #[test]
    fn test_pull_options_explicit_tag_is_kept() {
        let options = DockerRuntime::pull_options("acme/web:a1b2c3d");
        assert_eq!(options.from_image, "acme/web");
        assert_eq!(options.tag, "a1b2c3d");
    }

    #[test]
    fn test_pull_options_registry_port_is_not_a_tag() {
        let options = DockerRuntime::pull_options("localhost:5000/redis");
        assert_eq!(options.from_image, "localhost:5000/redis");
        assert_eq!(options.tag, "latest");
    }

    #[test]
    fn test_tar_context_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(DockerRuntime::tar_context(&missing).is_err());
    }
}
