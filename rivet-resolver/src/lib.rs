// rivet-resolver/src/lib.rs
//! Dependency collection and graph transformation for rivet.
//!
//! The pipeline: a [`repository::RepositorySystem`] resolves coordinates to
//! files and descriptors, the [`collector::GraphCollector`] builds the raw
//! transitive graph, the [`transformer::GraphTransformer`] mediates version
//! conflicts and runs a pluggable [`context::DependencyProcessor`] to a
//! bounded fixpoint, and [`collected::CollectedDependencies`] projects the
//! build and application classpaths from the transformed graph.
//!
//! Everything here is synchronous and single-threaded by contract; the
//! resolver runs once at build time, not in a serving path.
pub mod collected;
pub mod collector;
pub mod context;
pub mod graph;
pub mod platform;
pub mod repository;
pub mod transform;
pub mod transformer;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types
pub use collected::CollectedDependencies;
pub use collector::GraphCollector;
pub use context::{DependencyProcessor, NoopProcessor, ProcessingContext};
pub use graph::{ClasspathEntry, DependencyNode, NodeFlags};
pub use platform::{ArtifactKind, PlatformInfo, PLATFORM_DESCRIPTOR_PATH};
pub use repository::{Gateway, LocalRepository, RemoteClient, RepositorySystem};
pub use transform::{ConflictResolver, GraphTransform};
pub use transformer::{GraphTransformer, Phase};
