use super::VersionControl;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// In-memory version-control double with per-path revisions and call
/// recording
#[derive(Default)]
pub struct MockVersionControl {
    state: Mutex<MockVcsState>,
}

#[derive(Default)]
struct MockVcsState {
    revs: HashMap<PathBuf, String>,
    dirty: HashSet<PathBuf>,
    pulls: Vec<PathBuf>,
    pushes: Vec<(PathBuf, String)>,
}

// `.` components are stripped so "./web" and "web" name the same tree
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| *c != Component::CurDir)
        .collect()
}

impl MockVersionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rev(&self, path: impl AsRef<Path>, rev: &str) {
        self.state
            .lock()
            .unwrap()
            .revs
            .insert(normalize(path.as_ref()), rev.to_string());
    }

    pub fn mark_dirty(&self, path: impl AsRef<Path>) {
        self.state
            .lock()
            .unwrap()
            .dirty
            .insert(normalize(path.as_ref()));
    }

    pub fn pulled(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().pulls.clone()
    }

    pub fn pushed(&self) -> Vec<(PathBuf, String)> {
        self.state.lock().unwrap().pushes.clone()
    }
}

#[async_trait]
impl VersionControl for MockVersionControl {
    async fn short_rev(&self, path: &Path) -> Result<String> {
        let state = self.state.lock().unwrap();
        match state.revs.get(&normalize(path)) {
            Some(rev) => Ok(rev.clone()),
            None => bail!("not a repository: {}", path.display()),
        }
    }

    async fn pull_ff_only(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let tree = normalize(path);
        if !state.revs.contains_key(&tree) {
            bail!("not a repository: {}", path.display());
        }
        state.pulls.push(tree);
        Ok(())
    }

    async fn changed_subtrees(&self, root: &Path, subtrees: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        Ok(subtrees
            .iter()
            .filter(|sub| state.dirty.contains(&normalize(&root.join(sub))))
            .cloned()
            .collect())
    }

    async fn commit_and_push(&self, path: &Path, message: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let tree = normalize(path);
        state.dirty.remove(&tree);
        state.pushes.push((tree, message.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_short_rev_known_tree() {
        let vcs = MockVersionControl::new();
        vcs.set_rev("./web", "a1b2c3d");

        assert_eq!(vcs.short_rev(Path::new("web")).await.unwrap(), "a1b2c3d");
        assert_eq!(
            vcs.short_rev(Path::new("././web")).await.unwrap(),
            "a1b2c3d"
        );
    }

    #[tokio::test]
    async fn test_short_rev_unknown_tree_fails() {
        let vcs = MockVersionControl::new();
        assert!(vcs.short_rev(Path::new("nowhere")).await.is_err());
    }

    #[tokio::test]
    async fn test_pull_is_recorded() {
        let vcs = MockVersionControl::new();
        vcs.set_rev("web", "a1b2c3d");

        vcs.pull_ff_only(Path::new("web")).await.unwrap();
        assert_eq!(vcs.pulled(), vec![PathBuf::from("web")]);
    }

    #[tokio::test]
    async fn test_changed_subtrees_filters_dirty() {
        let vcs = MockVersionControl::new();
        vcs.mark_dirty("repo/web");

        let subtrees = vec![PathBuf::from("web"), PathBuf::from("api")];
        let dirty = vcs
            .changed_subtrees(Path::new("repo"), &subtrees)
            .await
            .unwrap();
        assert_eq!(dirty, vec![PathBuf::from("web")]);
    }

    #[tokio::test]
    async fn test_commit_and_push_clears_dirty() {
        let vcs = MockVersionControl::new();
        vcs.mark_dirty("repo/web");

        vcs.commit_and_push(Path::new("repo/web"), "update")
            .await
            .unwrap();

        let dirty = vcs
            .changed_subtrees(Path::new("repo"), &[PathBuf::from("web")])
            .await
            .unwrap();
        assert!(dirty.is_empty());
        assert_eq!(
            vcs.pushed(),
            vec![(PathBuf::from("repo/web"), "update".to_string())]
        );
    }
}
