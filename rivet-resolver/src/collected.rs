// rivet-resolver/src/collected.rs
// The public result of collect-and-transform, and the two classpath
// projections derived from it. Build and application classpaths are
// lazily computed and cached; the caches are unsynchronized memoized
// fields, single-threaded use is a hard contract of this type.
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::unsync::OnceCell;
use rivet_common::error::Result;
use tracing::debug;

use crate::collector::GraphCollector;
use crate::graph::{ClasspathEntry, DependencyNode, NodeFlags};
use crate::platform::{self, ArtifactKind};
use crate::repository::RepositorySystem;
use crate::transform::GraphTransform;

pub struct CollectedDependencies {
    graph: DependencyNode,
    updates: u32,
    collector: GraphCollector,
    delegate: Arc<dyn GraphTransform>,
    build_classpath: OnceCell<Vec<ClasspathEntry>>,
    application_classpath: OnceCell<Vec<ClasspathEntry>>,
}

impl fmt::Debug for CollectedDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectedDependencies")
            .field("graph", &self.graph)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}

impl CollectedDependencies {
    pub(crate) fn new(
        graph: DependencyNode,
        updates: u32,
        collector: GraphCollector,
        delegate: Arc<dyn GraphTransform>,
    ) -> Self {
        Self {
            graph,
            updates,
            collector,
            delegate,
            build_classpath: OnceCell::new(),
            application_classpath: OnceCell::new(),
        }
    }

    /// The transformed graph exactly as the transformer left it.
    pub fn graph(&self) -> &DependencyNode {
        &self.graph
    }

    /// Processor-triggered mutations the transformer applied.
    pub fn updates(&self) -> u32 {
        self.updates
    }

    /// Flatten of the transformed graph; this is the closure the build
    /// tooling sees.
    pub fn build_classpath(&self) -> &[ClasspathEntry] {
        self.build_classpath
            .get_or_init(|| self.graph.flatten())
            .as_slice()
    }

    /// The deployed application's closure. Identical to the build
    /// classpath unless the transformer injected platform dependencies; in
    /// that case every injected platform node is substituted with a fresh
    /// runtime collection of the platform artifact before conflicts are
    /// re-resolved and the result flattened.
    pub fn application_classpath(&self) -> Result<&[ClasspathEntry]> {
        if self.updates == 0 {
            return Ok(self.build_classpath());
        }
        self.application_classpath
            .get_or_try_init(|| {
                debug!(
                    "Deriving application classpath ({} transform update(s))",
                    self.updates
                );
                let mut kinds: HashMap<PathBuf, ArtifactKind> = HashMap::new();
                let rebuilt = self.rebuild(&self.graph, &mut kinds)?;
                let resolved = self.delegate.transform(rebuilt)?;
                Ok(resolved.flatten())
            })
            .map(Vec::as_slice)
    }

    fn rebuild(
        &self,
        node: &DependencyNode,
        kinds: &mut HashMap<PathBuf, ArtifactKind>,
    ) -> Result<DependencyNode> {
        if node.flags.contains(NodeFlags::INJECTED_PLATFORM) {
            let coordinate = node.coordinate().clone();
            let path = match node.artifact.path() {
                Some(path) => path.to_path_buf(),
                None => self
                    .collector
                    .repository()
                    .resolve_file(&coordinate, &node.repositories)?,
            };
            let kind = match kinds.get(&path) {
                Some(kind) => kind.clone(),
                None => {
                    let kind = platform::inspect(&coordinate, &path)?;
                    kinds.insert(path.clone(), kind.clone());
                    kind
                }
            };
            if kind.is_platform() {
                debug!(
                    "Substituting runtime closure for platform artifact '{}'",
                    coordinate
                );
                let mut fresh = self.collector.collect_runtime(&coordinate)?;
                fresh.artifact = node.artifact.clone();
                fresh.edge = node.edge;
                fresh.flags = node.flags;
                fresh.repositories = node.repositories.clone();
                return Ok(fresh);
            }
        }

        let mut copy = DependencyNode {
            artifact: node.artifact.clone(),
            edge: node.edge,
            children: Vec::with_capacity(node.children.len()),
            repositories: node.repositories.clone(),
            flags: node.flags,
        };
        for child in &node.children {
            copy.children.push(self.rebuild(child, kinds)?);
        }
        Ok(copy)
    }
}
