//! Pipeline driver
//!
//! A linear run: load the catalog, then for each service resolve its
//! revision, probe the image index, and build or pull as needed. All
//! services are attempted so failures surface together; only after the
//! loop does the aggregate decide whether to write the override document
//! and bring the stack up. On any failure the prior override document is
//! left untouched.

use crate::catalog::{ServiceCatalog, ServiceDescriptor};
use crate::compose::ComposeEngine;
use crate::error::OrchestrationError;
use crate::fs::FileSystem;
use crate::git::VersionControl;
use crate::overrides;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::runtime::ContainerRuntime;
use crate::strategy::{self, BuildRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of one service's resolve/probe/build-or-pull step
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub service: ServiceDescriptor,
    pub success: bool,
    /// `image:tag` for source-backed services, the bare image otherwise
    pub resolved_reference: String,
}

/// Aggregated result of a fully successful run
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<BuildOutcome>,
    /// Set when the override document was written
    pub override_path: Option<PathBuf>,
    pub deployed: bool,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub manifest_path: PathBuf,
    pub override_path: PathBuf,
    /// Root the per-service `src` paths are resolved against
    pub project_root: PathBuf,
    /// Write the override document after a fully successful pass; a
    /// deploy always writes, so the engine never layers a stale document
    pub write_overrides: bool,
    /// Bring the stack up after the override document is written
    pub deploy: bool,
}

impl RunOptions {
    fn source_path(&self, src: &Path) -> PathBuf {
        if src.is_absolute() {
            src.to_path_buf()
        } else {
            self.project_root.join(src)
        }
    }
}

pub struct Orchestrator {
    fs: Arc<dyn FileSystem>,
    runtime: Arc<dyn ContainerRuntime>,
    vcs: Arc<dyn VersionControl>,
    engine: Arc<dyn ComposeEngine>,
    progress: Arc<dyn ProgressHandler>,
}

impl Orchestrator {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runtime: Arc<dyn ContainerRuntime>,
        vcs: Arc<dyn VersionControl>,
        engine: Arc<dyn ComposeEngine>,
    ) -> Self {
        Self {
            fs,
            runtime,
            vcs,
            engine,
            progress: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Load the catalog without running the pipeline
    pub fn load_services(
        &self,
        options: &RunOptions,
    ) -> Result<Vec<ServiceDescriptor>, OrchestrationError> {
        ServiceCatalog::new(&options.manifest_path).load(self.fs.as_ref())
    }

    /// Drive the full pipeline
    pub async fn run(&self, options: &RunOptions) -> Result<RunReport, OrchestrationError> {
        let start = Instant::now();
        let services = self.load_services(options)?;
        info!(
            "loaded {} service(s) from {}",
            services.len(),
            options.manifest_path.display()
        );
        self.progress.on_progress(&ProgressEvent::Started {
            manifest: options.manifest_path.display().to_string(),
            services: services.len(),
        });

        let mut outcomes = Vec::with_capacity(services.len());
        for service in services {
            self.progress.on_progress(&ProgressEvent::ServiceStarted {
                service: service.name.clone(),
            });

            let step_start = Instant::now();
            let outcome = self.process_service(&service, options).await;
            self.progress.on_progress(&ProgressEvent::ServiceCompleted {
                service: service.name.clone(),
                success: outcome.success,
                reference: outcome.resolved_reference.clone(),
                duration: step_start.elapsed(),
            });
            outcomes.push(outcome);
        }

        let failed = outcomes.iter().filter(|o| !o.success).count();
        if failed > 0 {
            let error = OrchestrationError::AggregateFailure {
                failed,
                total: outcomes.len(),
            };
            self.progress.on_progress(&ProgressEvent::Failed {
                error: error.to_string(),
            });
            return Err(error);
        }

        let mut override_path = None;
        if options.write_overrides || options.deploy {
            let document = overrides::generate(&outcomes);
            let yaml = document
                .to_yaml()
                .map_err(|e| OrchestrationError::OverrideWrite {
                    path: options.override_path.clone(),
                    reason: format!("{e:#}"),
                })?;
            self.fs
                .write_string(&options.override_path, &yaml)
                .map_err(|e| OrchestrationError::OverrideWrite {
                    path: options.override_path.clone(),
                    reason: format!("{e:#}"),
                })?;
            info!("wrote {}", options.override_path.display());
            self.progress.on_progress(&ProgressEvent::OverridesWritten {
                path: options.override_path.display().to_string(),
            });
            override_path = Some(options.override_path.clone());
        }

        let mut deployed = false;
        if options.deploy {
            self.engine
                .up(&options.manifest_path, &options.override_path)
                .await
                .map_err(|e| OrchestrationError::Deploy(format!("{e:#}")))?;
            self.progress.on_progress(&ProgressEvent::StackActivated);
            deployed = true;
        }

        self.progress.on_progress(&ProgressEvent::Completed {
            services: outcomes.len(),
            total_time: start.elapsed(),
        });
        Ok(RunReport {
            outcomes,
            override_path,
            deployed,
        })
    }

    /// Fast-forward pull every source tree in the catalog
    pub async fn update_sources(
        &self,
        options: &RunOptions,
    ) -> Result<usize, OrchestrationError> {
        let services = self.load_services(options)?;
        let mut updated = 0;
        for service in &services {
            let Some(src) = &service.src else { continue };
            let tree = options.source_path(src);
            self.vcs
                .pull_ff_only(&tree)
                .await
                .map_err(|e| OrchestrationError::SourceSync {
                    path: tree.clone(),
                    reason: format!("{e:#}"),
                })?;
            info!("updated {}", tree.display());
            updated += 1;
        }
        Ok(updated)
    }

    /// Commit and push every dirty source tree, returning the trees pushed
    pub async fn push_sources(
        &self,
        options: &RunOptions,
        message: &str,
    ) -> Result<Vec<PathBuf>, OrchestrationError> {
        let services = self.load_services(options)?;
        let subtrees: Vec<PathBuf> = services
            .iter()
            .filter_map(|s| s.src.clone())
            .collect();

        let dirty = self
            .vcs
            .changed_subtrees(&options.project_root, &subtrees)
            .await
            .map_err(|e| OrchestrationError::SourceSync {
                path: options.project_root.clone(),
                reason: format!("{e:#}"),
            })?;

        for subtree in &dirty {
            let tree = options.source_path(subtree);
            self.vcs
                .commit_and_push(&tree, message)
                .await
                .map_err(|e| OrchestrationError::SourceSync {
                    path: tree.clone(),
                    reason: format!("{e:#}"),
                })?;
            info!("pushed {}", tree.display());
        }
        Ok(dirty)
    }

    // Per-service failures become failed outcomes; the loop never aborts
    async fn process_service(
        &self,
        service: &ServiceDescriptor,
        options: &RunOptions,
    ) -> BuildOutcome {
        match self.try_service(service, options).await {
            Ok(reference) => BuildOutcome {
                service: service.clone(),
                success: true,
                resolved_reference: reference,
            },
            Err(error) => {
                warn!(service = %service.name, "service failed: {error}");
                BuildOutcome {
                    service: service.clone(),
                    success: false,
                    resolved_reference: service.image.clone(),
                }
            }
        }
    }

    async fn try_service(
        &self,
        service: &ServiceDescriptor,
        options: &RunOptions,
    ) -> Result<String, OrchestrationError> {
        match &service.src {
            Some(src) => {
                let src = options.source_path(src);
                let tag = self.vcs.short_rev(&src).await.map_err(|e| {
                    OrchestrationError::Resolution {
                        path: src.clone(),
                        reason: format!("{e:#}"),
                    }
                })?;
                let reference = format!("{}:{}", service.image, tag);

                let present = self
                    .runtime
                    .image_exists(&reference)
                    .await
                    .map_err(|e| OrchestrationError::BuildFailure {
                        service: service.name.clone(),
                        reason: format!("{e:#}"),
                    })?;
                if present {
                    debug!("artifact {reference} already present, skipping build");
                    return Ok(reference);
                }

                let request = BuildRequest {
                    src: &src,
                    image: &service.image,
                    tag: &tag,
                    runtime: self.runtime.as_ref(),
                    orchestrated: true,
                };
                strategy::execute(self.fs.as_ref(), &request)
                    .await
                    .map_err(|e| OrchestrationError::BuildFailure {
                        service: service.name.clone(),
                        reason: format!("{e:#}"),
                    })?;
                Ok(reference)
            }
            None => {
                let present = self
                    .runtime
                    .image_exists(&service.image)
                    .await
                    .map_err(|e| OrchestrationError::PullFailure {
                        image: service.image.clone(),
                        reason: format!("{e:#}"),
                    })?;
                if !present {
                    self.runtime.pull(&service.image).await.map_err(|e| {
                        OrchestrationError::PullFailure {
                            image: service.image.clone(),
                            reason: format!("{e:#}"),
                        }
                    })?;
                }
                Ok(service.image.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::RecordingCompose;
    use crate::fs::MockFileSystem;
    use crate::git::MockVersionControl;
    use crate::runtime::MockRuntime;

    fn options() -> RunOptions {
        RunOptions {
            manifest_path: PathBuf::from("docker-compose.yml"),
            override_path: PathBuf::from("docker-compose.override.yml"),
            project_root: PathBuf::from("."),
            write_overrides: true,
            deploy: false,
        }
    }

    fn harness(manifest: &str) -> (Arc<MockFileSystem>, Arc<MockRuntime>, Arc<MockVersionControl>, Orchestrator) {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("docker-compose.yml", manifest);
        let runtime = Arc::new(MockRuntime::new());
        let vcs = Arc::new(MockVersionControl::new());
        let orchestrator = Orchestrator::new(
            fs.clone(),
            runtime.clone(),
            vcs.clone(),
            Arc::new(RecordingCompose::new()),
        );
        (fs, runtime, vcs, orchestrator)
    }

    #[tokio::test]
    async fn test_malformed_manifest_aborts_before_any_build() {
        let (_, runtime, _, orchestrator) = harness(
            r#"
services:
  broken:
    src: ./broken
"#,
        );

        let err = orchestrator.run(&options()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::MalformedManifest(_)));
        assert_eq!(runtime.build_count(), 0);
    }

    #[tokio::test]
    async fn test_present_sourceless_image_is_not_repulled() {
        let (_, runtime, _, orchestrator) = harness(
            r#"
services:
  cache:
    image: redis
"#,
        );
        runtime.add_image("redis");

        let report = orchestrator.run(&options()).await.unwrap();
        assert!(report.outcomes[0].success);
        assert_eq!(runtime.pull_count(), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_source_fails_only_that_service() {
        let (fs, runtime, vcs, orchestrator) = harness(
            r#"
services:
  cache:
    image: redis
  web:
    image: acme/web
    src: web
"#,
        );
        fs.add_file("web/Dockerfile", "FROM scratch");
        // no rev registered for web: resolution fails
        let _ = vcs;

        let err = orchestrator.run(&options()).await.unwrap_err();
        match err {
            OrchestrationError::AggregateFailure { failed, total } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 2);
            }
            other => panic!("expected AggregateFailure, got {other:?}"),
        }
        // cache was still attempted and pulled
        assert_eq!(runtime.pulls(), vec!["redis".to_string()]);
    }

    #[tokio::test]
    async fn test_update_sources_pulls_each_tree() {
        let (_, _, vcs, orchestrator) = harness(
            r#"
services:
  cache:
    image: redis
  web:
    image: acme/web
    src: web
  api:
    image: acme/api
    src: api
"#,
        );
        vcs.set_rev("./web", "a1b2c3d");
        vcs.set_rev("./api", "feed123");

        let updated = orchestrator.update_sources(&options()).await.unwrap();
        assert_eq!(updated, 2);
        assert_eq!(vcs.pulled().len(), 2);
    }

    #[tokio::test]
    async fn test_push_sources_only_touches_dirty_trees() {
        let (_, _, vcs, orchestrator) = harness(
            r#"
services:
  web:
    image: acme/web
    src: web
  api:
    image: acme/api
    src: api
"#,
        );
        vcs.set_rev("./web", "a1b2c3d");
        vcs.set_rev("./api", "feed123");
        vcs.mark_dirty("./web");

        let pushed = orchestrator
            .push_sources(&options(), "sync")
            .await
            .unwrap();
        assert_eq!(pushed, vec![PathBuf::from("web")]);
        assert_eq!(vcs.pushed().len(), 1);
    }
}
