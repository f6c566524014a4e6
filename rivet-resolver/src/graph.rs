// The collected dependency graph. Trees, not general graphs: a node owns
// its children exclusively, and the same artifact identity may appear in
// several places (that duplication is what conflict resolution prunes).
use std::fmt;

use bitflags::bitflags;
use rivet_common::model::{Artifact, Coordinate, DependencyEdge, Scope};

bitflags! {
    /// Out-of-band markers carried on a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Subtree root injected by a dependency processor; the
        /// application-classpath projection re-derives its runtime closure.
        const INJECTED_PLATFORM = 0b00000001;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    pub artifact: Artifact,
    /// Edge this node was reached through. `None` for the root.
    pub edge: Option<DependencyEdge>,
    pub children: Vec<DependencyNode>,
    /// Repository endpoints inherited for resolving this node's own
    /// dependencies.
    pub repositories: Vec<String>,
    pub flags: NodeFlags,
}

impl DependencyNode {
    pub fn root(coordinate: Coordinate) -> Self {
        Self {
            artifact: Artifact::new(coordinate),
            edge: None,
            children: Vec::new(),
            repositories: Vec::new(),
            flags: NodeFlags::empty(),
        }
    }

    pub fn child(coordinate: Coordinate, edge: DependencyEdge) -> Self {
        Self {
            artifact: Artifact::new(coordinate),
            edge: Some(edge),
            children: Vec::new(),
            repositories: Vec::new(),
            flags: NodeFlags::empty(),
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        self.artifact.coordinate()
    }

    pub fn scope(&self) -> Scope {
        self.edge.map(|e| e.scope).unwrap_or(Scope::Compile)
    }

    pub fn is_optional(&self) -> bool {
        self.edge.map(|e| e.optional).unwrap_or(false)
    }

    /// Post-order flatten into classpath entries, children before parent.
    /// The root carries no incoming edge and is not itself a classpath
    /// entry; only its closure is.
    pub fn flatten(&self) -> Vec<ClasspathEntry> {
        let mut entries = Vec::new();
        self.flatten_into(&mut entries, true);
        entries
    }

    fn flatten_into(&self, entries: &mut Vec<ClasspathEntry>, is_root: bool) {
        for child in &self.children {
            child.flatten_into(entries, false);
        }
        if !is_root {
            entries.push(ClasspathEntry {
                artifact: self.artifact.clone(),
                scope: self.scope(),
                optional: self.is_optional(),
            });
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DependencyNode::node_count).sum::<usize>()
    }

    /// Pre-order search by artifact id, used mostly by tests and the tree
    /// printer.
    pub fn find(&self, artifact_id: &str) -> Option<&DependencyNode> {
        if self.coordinate().artifact_id == artifact_id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(artifact_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathEntry {
    pub artifact: Artifact,
    pub scope: Scope,
    pub optional: bool,
}

impl fmt::Display for ClasspathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.artifact, self.scope)?;
        if self.optional {
            write!(f, ", optional")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use rivet_common::model::DependencyEdge;

    use super::*;

    fn coord(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    #[test]
    fn flatten_is_post_order_and_skips_root() {
        let mut root = DependencyNode::root(coord("g:app:1.0"));
        let mut a = DependencyNode::child(coord("g:a:1.0"), DependencyEdge::new(Scope::Compile));
        a.children.push(DependencyNode::child(
            coord("g:leaf:1.0"),
            DependencyEdge::new(Scope::Runtime),
        ));
        root.children.push(a);
        root.children.push(DependencyNode::child(
            coord("g:b:1.0"),
            DependencyEdge::new(Scope::Compile),
        ));

        let ids: Vec<_> = root
            .flatten()
            .iter()
            .map(|e| e.artifact.coordinate().artifact_id.clone())
            .collect();
        assert_eq!(ids, vec!["leaf", "a", "b"]);
    }

    #[test]
    fn node_count_includes_root() {
        let mut root = DependencyNode::root(coord("g:app:1.0"));
        root.children.push(DependencyNode::child(
            coord("g:a:1.0"),
            DependencyEdge::default(),
        ));
        assert_eq!(root.node_count(), 2);
    }
}
