// rivet-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{Result, RivetError};
pub use model::{Artifact, ArtifactDescriptor, ConflictId, Coordinate};
