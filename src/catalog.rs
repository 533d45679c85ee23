//! Service catalog parsed from the composition manifest
//!
//! The manifest is a YAML document with a `services` mapping. Each entry
//! carries an `image` (required, registry/repo form without a tag) and an
//! optional `src` pointing at a locally checked-out source tree. Any other
//! per-service fields are ignored, so a full compose file works as-is.

use crate::error::OrchestrationError;
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One named service from the composition manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub name: String,
    /// Image reference in registry/repo form, without a tag
    pub image: String,
    /// Relative path to the source tree, when the image is built locally
    /// rather than pulled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<PathBuf>,
}

impl ServiceDescriptor {
    pub fn is_source_backed(&self) -> bool {
        self.src.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    services: BTreeMap<String, RawService>,
}

#[derive(Debug, Deserialize)]
struct RawService {
    image: Option<String>,
    src: Option<PathBuf>,
}

pub struct ServiceCatalog {
    manifest_path: PathBuf,
}

impl ServiceCatalog {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Parse the manifest into descriptors, in name order
    ///
    /// Fails before any build is attempted when an entry has no `image`.
    pub fn load(&self, fs: &dyn FileSystem) -> Result<Vec<ServiceDescriptor>, OrchestrationError> {
        let raw = fs.read_to_string(&self.manifest_path).map_err(|e| {
            OrchestrationError::ManifestRead {
                path: self.manifest_path.clone(),
                reason: format!("{e:#}"),
            }
        })?;

        let manifest: RawManifest = serde_yaml::from_str(&raw).map_err(|e| {
            OrchestrationError::MalformedManifest(format!(
                "{}: {e}",
                self.manifest_path.display()
            ))
        })?;

        let mut descriptors = Vec::with_capacity(manifest.services.len());
        for (name, service) in manifest.services {
            let image = match service.image {
                Some(image) if !image.is_empty() => image,
                _ => {
                    return Err(OrchestrationError::MalformedManifest(format!(
                        "service '{name}' has no image field"
                    )))
                }
            };
            descriptors.push(ServiceDescriptor {
                name,
                image,
                src: service.src,
            });
        }
        Ok(descriptors)
    }
}
