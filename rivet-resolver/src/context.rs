// rivet-resolver/src/context.rs
// The per-visit handle a dependency processor sees. One context is built
// for each visit and discarded afterwards; a policy cannot retain it past
// the visit, so stale-context bugs are ruled out by construction.
use std::path::Path;

use rivet_common::error::{Result, RivetError};
use rivet_common::model::{Coordinate, DependencyEdge, Scope};
use tracing::debug;

use crate::collector::GraphCollector;
use crate::graph::{DependencyNode, NodeFlags};
use crate::repository::RepositorySystem;

/// A pluggable, per-node processing policy.
///
/// `process` may inject children or replace the node wholesale, or leave it
/// untouched. It must be idempotent to a fixpoint: re-applied to a node it
/// previously left untouched, it must leave it untouched again, because the
/// transformer re-walks the graph once after any mutation.
pub trait DependencyProcessor {
    fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<()>;
}

/// Processor that touches nothing; useful when only conflict resolution is
/// wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

impl DependencyProcessor for NoopProcessor {
    fn process(&self, _ctx: &mut ProcessingContext<'_>) -> Result<()> {
        Ok(())
    }
}

pub struct ProcessingContext<'a> {
    node: &'a mut DependencyNode,
    collector: &'a GraphCollector,
    updated: bool,
    reprocess: bool,
}

impl<'a> ProcessingContext<'a> {
    pub(crate) fn new(node: &'a mut DependencyNode, collector: &'a GraphCollector) -> Self {
        Self {
            node,
            collector,
            updated: false,
            reprocess: false,
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        self.node.coordinate()
    }

    pub fn group_id(&self) -> &str {
        &self.node.coordinate().group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.node.coordinate().artifact_id
    }

    pub fn classifier(&self) -> Option<&str> {
        self.node.coordinate().classifier.as_deref()
    }

    pub fn extension(&self) -> &str {
        &self.node.coordinate().extension
    }

    pub fn version(&self) -> &str {
        &self.node.coordinate().version
    }

    /// Whether the node already has a direct child with this coordinate.
    /// Idempotent processors use this to recognize their own earlier
    /// injections on a re-walk.
    pub fn has_child(&self, coordinate: &Coordinate) -> bool {
        self.node
            .children
            .iter()
            .any(|c| c.coordinate() == coordinate)
    }

    /// Resolve the current node's file, fetching it on first use and
    /// caching the result on the node.
    pub fn path(&mut self) -> Result<&Path> {
        if !self.node.artifact.is_resolved() {
            let coordinate = self.node.coordinate().clone();
            let path = self
                .collector
                .repository()
                .resolve_file(&coordinate, &self.node.repositories)?;
            self.node.artifact.set_path(path);
        }
        self.node
            .artifact
            .path()
            .ok_or_else(|| RivetError::Generic("artifact path vanished after resolution".into()))
    }

    /// Collect `coordinate`'s transitive graph and append it as a new child
    /// of the current node, after its pre-existing children. The injected
    /// subtree root is flagged so the application-classpath projection can
    /// later re-derive its runtime closure.
    pub fn inject_child(&mut self, coordinate: &Coordinate) -> Result<()> {
        debug!(
            "Injecting '{}' as child of '{}'",
            coordinate,
            self.node.coordinate()
        );
        let mut subtree = self.collector.collect(coordinate)?;
        subtree.edge = Some(DependencyEdge::new(Scope::Runtime));
        subtree.flags |= NodeFlags::INJECTED_PLATFORM;
        self.node.children.push(subtree);
        self.updated = true;
        Ok(())
    }

    /// Collect `coordinate`'s transitive graph and overwrite the current
    /// node's artifact and children with it. The walker re-applies the
    /// processor to the node's new identity before descending into the new
    /// children, so a policy never matches against stale data.
    pub fn replace_with(&mut self, coordinate: &Coordinate) -> Result<()> {
        debug!(
            "Replacing '{}' with '{}'",
            self.node.coordinate(),
            coordinate
        );
        let replacement = self.collector.collect(coordinate)?;
        self.node.artifact = replacement.artifact;
        self.node.children = replacement.children;
        for repo in replacement.repositories {
            if !self.node.repositories.contains(&repo) {
                self.node.repositories.push(repo);
            }
        }
        self.reprocess = true;
        Ok(())
    }

    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub(crate) fn finish(self) -> (bool, bool) {
        (self.updated || self.reprocess, self.reprocess)
    }
}
