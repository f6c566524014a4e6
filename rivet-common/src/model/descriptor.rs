// The artifact descriptor: declared direct dependencies, managed versions
// and extra repositories, published next to the artifact as
// `<artifact>-<version>.rivet.json`.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::coordinate::{ConflictId, Coordinate};
use crate::model::scope::{DependencyEdge, Scope};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub optional: bool,
}

impl DeclaredDependency {
    pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
        Self {
            coordinate,
            scope,
            optional: false,
        }
    }

    pub fn edge(&self) -> DependencyEdge {
        DependencyEdge {
            scope: self.scope,
            optional: self.optional,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
    /// Version overrides for transitive dependencies, keyed by the
    /// `group:artifact:classifier:extension` conflict-id string.
    #[serde(default)]
    pub managed_versions: HashMap<String, String>,
    /// Additional repository endpoints to consult when resolving this
    /// artifact's own dependencies.
    #[serde(default)]
    pub repositories: Vec<String>,
}

impl ArtifactDescriptor {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            dependencies: Vec::new(),
            managed_versions: HashMap::new(),
            repositories: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, dependency: DeclaredDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn managed_version(&self, id: &ConflictId) -> Option<&str> {
        self.managed_versions.get(&id.to_string()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_json_round_trip() {
        let descriptor = ArtifactDescriptor::new("g:root:1.0".parse().unwrap())
            .with_dependency(DeclaredDependency::new(
                "g:child:2.0".parse().unwrap(),
                Scope::Runtime,
            ));
        let json = serde_json::to_string(&descriptor).unwrap();
        let parsed: ArtifactDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.coordinate, descriptor.coordinate);
        assert_eq!(parsed.dependencies, descriptor.dependencies);
    }

    #[test]
    fn missing_fields_default() {
        let json = r#"{
            "coordinate": {"group_id": "g", "artifact_id": "a", "version": "1.0"},
            "dependencies": [
                {"coordinate": {"group_id": "g", "artifact_id": "b", "version": "1.0"}}
            ]
        }"#;
        let parsed: ArtifactDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.coordinate.extension, "jar");
        assert_eq!(parsed.dependencies[0].scope, Scope::Compile);
        assert!(!parsed.dependencies[0].optional);
        assert!(parsed.managed_versions.is_empty());
    }

    #[test]
    fn managed_version_lookup_by_conflict_id() {
        let mut descriptor = ArtifactDescriptor::new("g:root:1.0".parse().unwrap());
        let coord: Coordinate = "g:dep:9.9".parse().unwrap();
        descriptor
            .managed_versions
            .insert(coord.conflict_id().to_string(), "3.1".to_string());
        assert_eq!(descriptor.managed_version(&coord.conflict_id()), Some("3.1"));
    }
}
