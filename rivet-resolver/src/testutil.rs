// In-memory RepositorySystem fixture for graph tests: descriptors and
// payload paths are registered up front, nothing touches disk or network
// unless a test plants a real path.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rivet_common::error::{Result, RivetError};
use rivet_common::model::{
    ArtifactDescriptor, Coordinate, DeclaredDependency, Scope, Version, VersionQuery,
};

use crate::repository::RepositorySystem;

#[derive(Default)]
pub struct MemoryRepository {
    descriptors: Mutex<HashMap<Coordinate, ArtifactDescriptor>>,
    files: Mutex<HashMap<Coordinate, PathBuf>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, descriptor: ArtifactDescriptor) {
        self.descriptors
            .lock()
            .unwrap()
            .insert(descriptor.coordinate.clone(), descriptor);
    }

    /// Register an artifact with no dependencies of its own.
    pub fn leaf(&self, coordinate: &str) {
        self.add(ArtifactDescriptor::new(coordinate.parse().unwrap()));
    }

    /// Register an artifact depending on `deps` at compile scope.
    pub fn with_deps(&self, coordinate: &str, deps: &[&str]) {
        let mut descriptor = ArtifactDescriptor::new(coordinate.parse().unwrap());
        for dep in deps {
            descriptor
                .dependencies
                .push(DeclaredDependency::new(dep.parse().unwrap(), Scope::Compile));
        }
        self.add(descriptor);
    }

    pub fn add_file(&self, coordinate: &str, path: impl Into<PathBuf>) {
        self.files
            .lock()
            .unwrap()
            .insert(coordinate.parse().unwrap(), path.into());
    }
}

impl RepositorySystem for MemoryRepository {
    fn resolve_file(&self, coordinate: &Coordinate, _extra: &[String]) -> Result<PathBuf> {
        self.files
            .lock()
            .unwrap()
            .get(coordinate)
            .cloned()
            .ok_or_else(|| RivetError::Resolution {
                coordinate: coordinate.to_string(),
                reason: "no file registered".to_string(),
            })
    }

    fn read_descriptor(
        &self,
        coordinate: &Coordinate,
        _extra: &[String],
    ) -> Result<ArtifactDescriptor> {
        self.descriptors
            .lock()
            .unwrap()
            .get(coordinate)
            .cloned()
            .ok_or_else(|| RivetError::Descriptor {
                coordinate: coordinate.to_string(),
                reason: "no descriptor registered".to_string(),
            })
    }

    fn resolve_version_range(
        &self,
        coordinate: &Coordinate,
        query: &VersionQuery,
    ) -> Result<Vec<Version>> {
        let id = coordinate.conflict_id();
        let mut matching: Vec<Version> = self
            .descriptors
            .lock()
            .unwrap()
            .keys()
            .filter(|c| c.conflict_id() == id)
            .map(|c| c.parsed_version())
            .filter(|v| query.contains(v))
            .collect();
        matching.sort();
        if matching.is_empty() {
            return Ok(vec![coordinate.parsed_version()]);
        }
        Ok(matching)
    }

    fn install(&self, coordinate: &Coordinate, file: &Path) -> Result<PathBuf> {
        self.files
            .lock()
            .unwrap()
            .insert(coordinate.clone(), file.to_path_buf());
        Ok(file.to_path_buf())
    }
}
