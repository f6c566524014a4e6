// src/model/mod.rs
// Declares the modules within the model directory.
pub mod coordinate;
pub mod descriptor;
pub mod scope;
pub mod version;

// Re-export
pub use coordinate::{Artifact, ConflictId, Coordinate};
pub use descriptor::{ArtifactDescriptor, DeclaredDependency};
pub use scope::{DependencyEdge, Scope};
pub use version::{Version, VersionQuery};
