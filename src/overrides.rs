//! Override document generation
//!
//! A pure transformation from per-service outcomes to the override
//! document the composition engine layers atop the base manifest.
//! Source-backed services are pinned to their revision tag; sourceless
//! services keep the bare manifest image, tracking whatever tag the pull
//! step applied.

use crate::orchestrator::BuildOutcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

pub const OVERRIDE_VERSION: &str = "3.8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideDocument {
    pub version: String,
    pub services: BTreeMap<String, OverrideService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideService {
    pub image: String,
}

impl OverrideDocument {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize override document")
    }
}

/// Deterministic: identical outcome sequences yield byte-identical
/// documents (services are keyed through a BTreeMap)
pub fn generate(outcomes: &[BuildOutcome]) -> OverrideDocument {
    let services = outcomes
        .iter()
        .map(|outcome| {
            let image = if outcome.service.is_source_backed() {
                outcome.resolved_reference.clone()
            } else {
                outcome.service.image.clone()
            };
            (outcome.service.name.clone(), OverrideService { image })
        })
        .collect();

    OverrideDocument {
        version: OVERRIDE_VERSION.to_string(),
        services,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServiceDescriptor;
    use std::path::PathBuf;

    fn outcome(name: &str, image: &str, src: Option<&str>, reference: &str) -> BuildOutcome {
        BuildOutcome {
            service: ServiceDescriptor {
                name: name.to_string(),
                image: image.to_string(),
                src: src.map(PathBuf::from),
            },
            success: true,
            resolved_reference: reference.to_string(),
        }
    }

    #[test]
    fn test_source_backed_services_are_pinned() {
        let outcomes = vec![outcome("web", "acme/web", Some("./web"), "acme/web:a1b2c3d")];
        let document = generate(&outcomes);

        assert_eq!(
            document.services["web"].image,
            "acme/web:a1b2c3d".to_string()
        );
    }

    #[test]
    fn test_sourceless_services_keep_bare_image() {
        let outcomes = vec![outcome("cache", "redis", None, "redis")];
        let document = generate(&outcomes);

        assert_eq!(document.services["cache"].image, "redis".to_string());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let outcomes = vec![
            outcome("web", "acme/web", Some("./web"), "acme/web:a1b2c3d"),
            outcome("cache", "redis", None, "redis"),
        ];

        let first = generate(&outcomes).to_yaml().unwrap();
        let second = generate(&outcomes).to_yaml().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_outcome_order_does_not_change_output() {
        let web = outcome("web", "acme/web", Some("./web"), "acme/web:a1b2c3d");
        let cache = outcome("cache", "redis", None, "redis");

        let forward = generate(&[web.clone(), cache.clone()]).to_yaml().unwrap();
        let reversed = generate(&[cache, web]).to_yaml().unwrap();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_yaml_shape() {
        let outcomes = vec![
            outcome("web", "acme/web", Some("./web"), "acme/web:a1b2c3d"),
            outcome("cache", "redis", None, "redis"),
        ];
        let yaml = generate(&outcomes).to_yaml().unwrap();

        assert!(yaml.contains("version:"));
        assert!(yaml.contains("image: acme/web:a1b2c3d"));
        assert!(yaml.contains("image: redis"));
    }
}
