use super::ContainerRuntime;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory runtime double: a set of present image references plus call
/// recording
///
/// By default a build produces the requested tag, the way a well-behaved
/// Dockerfile build does. `set_untagged_builds` simulates a build that
/// exits cleanly without producing the expected tag, which the selector's
/// post-build verification must catch.
pub struct MockRuntime {
    state: Mutex<MockRuntimeState>,
}

struct MockRuntimeState {
    images: HashSet<String>,
    builds: Vec<(PathBuf, String)>,
    pulls: Vec<String>,
    fail_builds: bool,
    fail_pulls: bool,
    untagged_builds: bool,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockRuntimeState {
                images: HashSet::new(),
                builds: Vec::new(),
                pulls: Vec::new(),
                fail_builds: false,
                fail_pulls: false,
                untagged_builds: false,
            }),
        }
    }

    pub fn add_image(&self, reference: &str) {
        self.state
            .lock()
            .unwrap()
            .images
            .insert(reference.to_string());
    }

    pub fn set_fail_builds(&self, fail: bool) {
        self.state.lock().unwrap().fail_builds = fail;
    }

    pub fn set_fail_pulls(&self, fail: bool) {
        self.state.lock().unwrap().fail_pulls = fail;
    }

    pub fn set_untagged_builds(&self, untagged: bool) {
        self.state.lock().unwrap().untagged_builds = untagged;
    }

    pub fn builds(&self) -> Vec<(PathBuf, String)> {
        self.state.lock().unwrap().builds.clone()
    }

    pub fn pulls(&self) -> Vec<String> {
        self.state.lock().unwrap().pulls.clone()
    }

    pub fn build_count(&self) -> usize {
        self.state.lock().unwrap().builds.len()
    }

    pub fn pull_count(&self) -> usize {
        self.state.lock().unwrap().pulls.len()
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn image_exists(&self, reference: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().images.contains(reference))
    }

    async fn build(&self, context: &Path, reference: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .builds
            .push((context.to_path_buf(), reference.to_string()));
        if state.fail_builds {
            bail!("mock build failure for {reference}");
        }
        if !state.untagged_builds {
            state.images.insert(reference.to_string());
        }
        Ok(())
    }

    async fn pull(&self, reference: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.pulls.push(reference.to_string());
        if state.fail_pulls {
            bail!("mock pull failure for {reference}");
        }
        state.images.insert(reference.to_string());
        Ok(())
    }
}
