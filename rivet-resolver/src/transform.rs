// rivet-resolver/src/transform.rs
// Version mediation. Nodes are grouped by conflict id; per group exactly
// one version survives (nearest to the root wins, equal depth resolved to
// the highest version) and every losing node is pruned subtree-and-all,
// not merely marked.
use std::collections::{HashMap, HashSet, VecDeque};

use rivet_common::error::Result;
use rivet_common::model::{ConflictId, Version};
use tracing::debug;

use crate::graph::DependencyNode;

/// A whole-graph transform step. The stock delegate is `ConflictResolver`;
/// callers may wrap or replace it.
pub trait GraphTransform {
    fn transform(&self, graph: DependencyNode) -> Result<DependencyNode>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    /// The mark pass: assign each conflict group its winning version.
    /// Breadth-first so that depth decides before version does.
    pub fn mark(graph: &DependencyNode) -> HashMap<ConflictId, Version> {
        let mut winners: HashMap<ConflictId, (usize, Version)> = HashMap::new();
        let mut queue: VecDeque<(&DependencyNode, usize)> = VecDeque::new();
        queue.push_back((graph, 0));

        while let Some((node, depth)) = queue.pop_front() {
            let id = node.coordinate().conflict_id();
            let version = node.coordinate().parsed_version();
            match winners.get(&id) {
                Some((best_depth, best_version))
                    if *best_depth < depth
                        || (*best_depth == depth && *best_version >= version) => {}
                _ => {
                    winners.insert(id, (depth, version));
                }
            }
            for child in &node.children {
                queue.push_back((child, depth + 1));
            }
        }

        winners
            .into_iter()
            .map(|(id, (_, version))| (id, version))
            .collect()
    }
}

impl GraphTransform for ConflictResolver {
    fn transform(&self, graph: DependencyNode) -> Result<DependencyNode> {
        let winners = Self::mark(&graph);
        debug!("Conflict marking produced {} groups", winners.len());

        let mut consumed = HashSet::new();
        // The root is the first pre-order occurrence of its own id, so it
        // always survives its own group.
        let resolved = prune(graph, &winners, &mut consumed)
            .expect("root node survives conflict resolution");
        Ok(resolved)
    }
}

fn prune(
    mut node: DependencyNode,
    winners: &HashMap<ConflictId, Version>,
    consumed: &mut HashSet<ConflictId>,
) -> Option<DependencyNode> {
    let id = node.coordinate().conflict_id();
    let version = node.coordinate().parsed_version();
    match winners.get(&id) {
        Some(winner) if *winner == version && !consumed.contains(&id) => {
            consumed.insert(id);
        }
        _ => {
            debug!(
                "Pruning '{}' (lost mediation or duplicate occurrence)",
                node.coordinate()
            );
            return None;
        }
    }

    let children = std::mem::take(&mut node.children);
    node.children = children
        .into_iter()
        .filter_map(|child| prune(child, winners, consumed))
        .collect();
    Some(node)
}
