// rivet-resolver/src/transformer.rs
// Orchestrates the transform pipeline: delegate transform, processor walk,
// and at most one corrective conflict pass after a mutation. The walk is
// not reentrant; invoking the transformer from inside a processor fails
// fast instead of corrupting the walk.
use std::cell::Cell;
use std::sync::Arc;

use rivet_common::error::{Result, RivetError};
use tracing::debug;

use crate::collected::CollectedDependencies;
use crate::collector::GraphCollector;
use crate::context::{DependencyProcessor, ProcessingContext};
use crate::graph::DependencyNode;
use crate::transform::{ConflictResolver, GraphTransform};

/// Upper bound on replace_with chains applied to a single node during one
/// walk. A policy that keeps replacing its own replacement is broken, not
/// converging.
const MAX_NODE_REPLACEMENTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Walking,
}

pub struct GraphTransformer {
    collector: GraphCollector,
    delegate: Arc<dyn GraphTransform>,
    phase: Cell<Phase>,
}

impl GraphTransformer {
    pub fn new(collector: GraphCollector) -> Self {
        Self::with_delegate(collector, Arc::new(ConflictResolver::new()))
    }

    pub fn with_delegate(collector: GraphCollector, delegate: Arc<dyn GraphTransform>) -> Self {
        Self {
            collector,
            delegate,
            phase: Cell::new(Phase::Idle),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Run the full transform over a collected graph.
    ///
    /// Partial mutation is not rolled back on error; a failed transform
    /// leaves the input graph unusable.
    pub fn transform(
        &self,
        graph: DependencyNode,
        processor: &dyn DependencyProcessor,
    ) -> Result<CollectedDependencies> {
        if self.phase.get() == Phase::Walking {
            return Err(RivetError::Reentrancy);
        }
        self.phase.set(Phase::Walking);
        let _guard = PhaseGuard(&self.phase);

        let mut graph = self.delegate.transform(graph)?;

        let mut updates = 0u32;
        self.walk(&mut graph, processor, &mut updates)?;
        debug!("Processor walk applied {} update(s)", updates);

        if updates > 0 {
            // Newly injected subtrees need conflict ids before old and new
            // nodes can be mediated together. One corrective pass only.
            let groups = ConflictResolver::mark(&graph);
            debug!(
                "Re-resolving conflicts across {} group(s) after injection",
                groups.len()
            );
            graph = self.delegate.transform(graph)?;
        }

        Ok(CollectedDependencies::new(
            graph,
            updates,
            self.collector.clone(),
            Arc::clone(&self.delegate),
        ))
    }

    fn walk(
        &self,
        node: &mut DependencyNode,
        processor: &dyn DependencyProcessor,
        updates: &mut u32,
    ) -> Result<()> {
        let mut replacements = 0usize;
        loop {
            let coordinate = node.coordinate().to_string();
            let mut ctx = ProcessingContext::new(node, &self.collector);
            processor.process(&mut ctx).map_err(|e| match e {
                already @ RivetError::DependencyProcessing { .. } => already,
                other => RivetError::processing(&coordinate, other),
            })?;
            let (updated, reprocess) = ctx.finish();
            if updated {
                *updates += 1;
            }
            if !reprocess {
                break;
            }
            // The node has a new identity; apply the processor to it again
            // before descending into the new children.
            replacements += 1;
            if replacements > MAX_NODE_REPLACEMENTS {
                return Err(RivetError::processing(
                    node.coordinate(),
                    format!("more than {MAX_NODE_REPLACEMENTS} successive replacements"),
                ));
            }
        }

        for child in node.children.iter_mut() {
            self.walk(child, processor, updates)?;
        }
        Ok(())
    }
}

struct PhaseGuard<'a>(&'a Cell<Phase>);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.set(Phase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rivet_common::model::Coordinate;

    use super::*;
    use crate::context::NoopProcessor;
    use crate::testutil::MemoryRepository;

    fn coord(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    fn setup(repo: MemoryRepository) -> (GraphCollector, GraphTransformer) {
        let collector = GraphCollector::new(Arc::new(repo));
        let transformer = GraphTransformer::new(collector.clone());
        (collector, transformer)
    }

    /// Injects `injected` under the root once, recognizing its own earlier
    /// injection on re-walks.
    struct InjectOnRoot {
        root_artifact: String,
        injected: Coordinate,
    }

    impl DependencyProcessor for InjectOnRoot {
        fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<()> {
            if ctx.artifact_id() == self.root_artifact && !ctx.has_child(&self.injected) {
                ctx.inject_child(&self.injected)?;
            }
            Ok(())
        }
    }

    /// Replaces a -> b and b -> c, exercising re-processing of a replaced
    /// node's new identity.
    struct ChainReplacer;

    impl DependencyProcessor for ChainReplacer {
        fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<()> {
            match ctx.artifact_id() {
                "a" => ctx.replace_with(&coord("g:b:1.0")),
                "b" => ctx.replace_with(&coord("g:c:1.0")),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn noop_processor_reports_zero_updates() {
        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &["g:a:1.0"]);
        repo.leaf("g:a:1.0");
        let (collector, transformer) = setup(repo);

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        let collected = transformer.transform(graph, &NoopProcessor).unwrap();
        assert_eq!(collected.updates(), 0);
        assert_eq!(transformer.phase(), Phase::Idle);
    }

    #[test]
    fn transform_is_idempotent_on_its_own_output() {
        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &["g:a:1.0"]);
        repo.leaf("g:a:1.0");
        repo.leaf("g:extra:1.0");
        let (collector, transformer) = setup(repo);
        let processor = InjectOnRoot {
            root_artifact: "app".to_string(),
            injected: coord("g:extra:1.0"),
        };

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        let first = transformer.transform(graph, &processor).unwrap();
        assert_eq!(first.updates(), 1);
        let first_classpath = first.build_classpath().to_vec();

        let second = transformer
            .transform(first.graph().clone(), &processor)
            .unwrap();
        assert_eq!(second.updates(), 0);
        assert_eq!(second.build_classpath(), first_classpath.as_slice());
    }

    #[test]
    fn replacement_chain_ends_at_final_identity() {
        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &["g:a:1.0"]);
        repo.leaf("g:a:1.0");
        repo.leaf("g:b:1.0");
        repo.with_deps("g:c:1.0", &["g:c-dep:1.0"]);
        repo.leaf("g:c-dep:1.0");
        let (collector, transformer) = setup(repo);

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        let collected = transformer.transform(graph, &ChainReplacer).unwrap();

        assert!(collected.graph().find("a").is_none());
        assert!(collected.graph().find("b").is_none());
        assert!(collected.graph().find("c").is_some());
        assert!(collected.graph().find("c-dep").is_some());
    }

    #[test]
    fn injection_triggers_one_corrective_conflict_pass() {
        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &["g:a:1.0"]);
        repo.with_deps("g:a:1.0", &["g:lib:1.0"]);
        repo.leaf("g:lib:1.0");
        repo.leaf("g:lib:2.0");
        let (collector, transformer) = setup(repo);
        let processor = InjectOnRoot {
            root_artifact: "app".to_string(),
            injected: coord("g:lib:2.0"),
        };

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        let collected = transformer.transform(graph, &processor).unwrap();

        // The injected lib:2.0 sits nearer the root and wins mediation
        // against the pre-existing lib:1.0.
        let libs: Vec<_> = collected
            .build_classpath()
            .iter()
            .filter(|e| e.artifact.coordinate().artifact_id == "lib")
            .collect();
        assert_eq!(libs.len(), 1);
        assert_eq!(libs[0].artifact.coordinate().version, "2.0");
    }

    #[test]
    fn processor_failure_names_the_offending_node() {
        struct Failing;
        impl DependencyProcessor for Failing {
            fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<()> {
                if ctx.artifact_id() == "a" {
                    return Err(RivetError::Generic("policy exploded".to_string()));
                }
                Ok(())
            }
        }

        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &["g:a:1.0"]);
        repo.leaf("g:a:1.0");
        let (collector, transformer) = setup(repo);

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        let err = transformer.transform(graph, &Failing).unwrap_err();
        match err {
            RivetError::DependencyProcessing { coordinate, .. } => {
                assert_eq!(coordinate, "g:a:1.0")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transformer.phase(), Phase::Idle);
    }

    #[test]
    fn runaway_replacement_chain_is_cut_off() {
        struct SelfReplacer;
        impl DependencyProcessor for SelfReplacer {
            fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<()> {
                if ctx.artifact_id() == "a" {
                    // replaces a with a, forever
                    return ctx.replace_with(&coord("g:a:1.0"));
                }
                Ok(())
            }
        }

        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &["g:a:1.0"]);
        repo.leaf("g:a:1.0");
        let (collector, transformer) = setup(repo);

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        let err = transformer.transform(graph, &SelfReplacer).unwrap_err();
        assert!(matches!(err, RivetError::DependencyProcessing { .. }));
    }

    #[test]
    fn nested_transform_fails_with_reentrancy() {
        struct Nesting {
            transformer: Rc<GraphTransformer>,
            seen: RefCell<Option<RivetError>>,
        }
        impl DependencyProcessor for Nesting {
            fn process(&self, ctx: &mut ProcessingContext<'_>) -> Result<()> {
                if ctx.artifact_id() == "app" {
                    let inner = DependencyNode::root(coord("g:inner:1.0"));
                    let result = self.transformer.transform(inner, &NoopProcessor);
                    *self.seen.borrow_mut() = result.err();
                }
                Ok(())
            }
        }

        let repo = MemoryRepository::new();
        repo.with_deps("g:app:1.0", &[]);
        let (collector, transformer) = setup(repo);
        let transformer = Rc::new(transformer);
        let processor = Nesting {
            transformer: Rc::clone(&transformer),
            seen: RefCell::new(None),
        };

        let graph = collector.collect(&coord("g:app:1.0")).unwrap();
        transformer.transform(graph, &processor).unwrap();
        assert!(matches!(
            processor.seen.into_inner(),
            Some(RivetError::Reentrancy)
        ));
    }
}
