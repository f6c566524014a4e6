// rivet-resolver/src/collector.rs
// Transitive dependency collection: descriptors in, a rooted dependency
// tree out. Conflict mediation happens later, in the transform pass; the
// collector's tree may still contain the same identity at several versions.
use std::collections::HashMap;
use std::sync::Arc;

use rivet_common::error::{Result, RivetError};
use rivet_common::model::{ConflictId, Coordinate, DeclaredDependency};
use tracing::{debug, warn};

use crate::graph::DependencyNode;
use crate::repository::RepositorySystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectMode {
    /// Everything the root declares, transitives at compile/runtime scope.
    Build,
    /// Only the runtime closure: compile/runtime edges, never optional,
    /// at every level including the root's direct dependencies.
    Runtime,
}

#[derive(Clone)]
pub struct GraphCollector {
    repo: Arc<dyn RepositorySystem>,
}

impl GraphCollector {
    pub fn new(repo: Arc<dyn RepositorySystem>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn RepositorySystem> {
        &self.repo
    }

    /// Collect the full transitive graph rooted at `root`, reading the
    /// root's own descriptor for its direct dependencies.
    pub fn collect(&self, root: &Coordinate) -> Result<DependencyNode> {
        debug!("Collecting dependency graph for '{}'", root);
        let descriptor = self
            .repo
            .read_descriptor(root, &[])
            .map_err(|e| wrap_collection(root, e))?;
        self.collect_descriptor(root, &descriptor.dependencies, &descriptor, CollectMode::Build)
    }

    /// Collect from an explicit direct-dependency list instead of a read
    /// descriptor; used when dependencies are supplied programmatically.
    pub fn collect_with(
        &self,
        root: &Coordinate,
        direct: &[DeclaredDependency],
    ) -> Result<DependencyNode> {
        debug!(
            "Collecting dependency graph for '{}' from {} explicit direct dependencies",
            root,
            direct.len()
        );
        let empty = rivet_common::model::ArtifactDescriptor::new(root.clone());
        self.collect_descriptor(root, direct, &empty, CollectMode::Build)
    }

    /// The runtime closure of a single artifact, collected fresh. This is
    /// what the application-classpath projection substitutes for injected
    /// platform dependencies.
    pub fn collect_runtime(&self, root: &Coordinate) -> Result<DependencyNode> {
        debug!("Collecting runtime closure for '{}'", root);
        let descriptor = self
            .repo
            .read_descriptor(root, &[])
            .map_err(|e| wrap_collection(root, e))?;
        self.collect_descriptor(
            root,
            &descriptor.dependencies,
            &descriptor,
            CollectMode::Runtime,
        )
    }

    fn collect_descriptor(
        &self,
        root: &Coordinate,
        direct: &[DeclaredDependency],
        root_descriptor: &rivet_common::model::ArtifactDescriptor,
        mode: CollectMode,
    ) -> Result<DependencyNode> {
        let mut node = DependencyNode::root(root.clone());
        node.repositories = root_descriptor.repositories.clone();

        let mut path = vec![root.conflict_id()];
        for decl in direct {
            if !keep_direct(decl, mode) {
                debug!(
                    "Skipping direct dependency '{}' ({}) for runtime closure",
                    decl.coordinate, decl.scope
                );
                continue;
            }
            if let Some(child) = self.build_subtree(
                decl,
                2,
                &mut path,
                &root_descriptor.managed_versions,
                &node.repositories,
            )? {
                node.children.push(child);
            }
        }
        debug!(
            "Collected {} nodes under '{}'",
            node.node_count() - 1,
            root
        );
        Ok(node)
    }

    fn build_subtree(
        &self,
        decl: &DeclaredDependency,
        depth: usize,
        path: &mut Vec<ConflictId>,
        managed: &HashMap<String, String>,
        inherited_repositories: &[String],
    ) -> Result<Option<DependencyNode>> {
        let mut coordinate = decl.coordinate.clone();
        // Managed versions override transitive declarations only; direct
        // dependencies keep their declared versions.
        if depth > 2 {
            if let Some(version) = managed.get(&coordinate.conflict_id().to_string()) {
                if version != &coordinate.version {
                    debug!(
                        "Managed version override for '{}': {} -> {}",
                        coordinate, coordinate.version, version
                    );
                    coordinate = coordinate.with_version(version.clone());
                }
            }
        }

        let conflict_id = coordinate.conflict_id();
        if path.contains(&conflict_id) {
            warn!(
                "Dependency cycle at '{}' (already on path); pruning descent",
                coordinate
            );
            return Ok(None);
        }

        let descriptor = self
            .repo
            .read_descriptor(&coordinate, inherited_repositories)
            .map_err(|e| wrap_collection(&coordinate, e))?;

        let mut node = DependencyNode::child(coordinate.clone(), decl.edge());
        node.repositories = inherited_repositories.to_vec();
        for repo in &descriptor.repositories {
            if !node.repositories.contains(repo) {
                node.repositories.push(repo.clone());
            }
        }

        path.push(conflict_id);
        for child_decl in &descriptor.dependencies {
            if !child_decl.scope.is_transitive() || child_decl.optional {
                continue;
            }
            if let Some(child) =
                self.build_subtree(child_decl, depth + 1, path, managed, &node.repositories)?
            {
                node.children.push(child);
            }
        }
        path.pop();

        Ok(Some(node))
    }
}

fn keep_direct(decl: &DeclaredDependency, mode: CollectMode) -> bool {
    match mode {
        CollectMode::Build => true,
        CollectMode::Runtime => decl.scope.is_runtime() && !decl.optional,
    }
}

fn wrap_collection(coordinate: &Coordinate, err: RivetError) -> RivetError {
    match err {
        already @ RivetError::DependencyCollection { .. } => already,
        other => RivetError::collection(coordinate, other),
    }
}
