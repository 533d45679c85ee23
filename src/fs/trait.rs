//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// Abstraction over file system operations for testability
///
/// The orchestrator only ever probes for files, reads the manifest, and
/// writes the override document, so the surface stays deliberately small.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string contents, replacing any existing file
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;
}
