// Repository access. The wire protocol and cache layout behind artifact
// resolution are consumed through the `RepositorySystem` seam; the rest of
// the resolver never touches the filesystem or network directly.
pub mod gateway;
pub mod local;
pub mod remote;

use std::path::{Path, PathBuf};

use rivet_common::error::Result;
use rivet_common::model::{ArtifactDescriptor, Coordinate, Version, VersionQuery};

pub use gateway::Gateway;
pub use local::LocalRepository;
pub use remote::RemoteClient;

/// The capability the resolver needs from an artifact repository:
/// fetch a coordinate to a file, read its declared dependencies, answer
/// version-range queries, and publish locally-built artifacts.
///
/// `extra_repositories` carries the endpoints a node inherited from its
/// ancestors' descriptors; implementations without a network backend are
/// free to ignore it.
pub trait RepositorySystem {
    /// Fetch or locate the artifact's payload file.
    /// Fails with `RivetError::Resolution` if no configured repository has it.
    fn resolve_file(&self, coordinate: &Coordinate, extra_repositories: &[String])
        -> Result<PathBuf>;

    /// Read the artifact's dependency descriptor.
    /// Fails with `RivetError::Descriptor` if the metadata is absent or unreadable.
    fn read_descriptor(
        &self,
        coordinate: &Coordinate,
        extra_repositories: &[String],
    ) -> Result<ArtifactDescriptor>;

    /// Ordered versions of the coordinate's conflict id matching `query`.
    /// An empty range is not an error: the coordinate's own version is
    /// returned unchanged, modelling "no newer version available".
    fn resolve_version_range(
        &self,
        coordinate: &Coordinate,
        query: &VersionQuery,
    ) -> Result<Vec<Version>>;

    /// Publish a locally-built artifact into the local repository so later
    /// resolution by coordinate finds it. Returns the installed path.
    fn install(&self, coordinate: &Coordinate, file: &Path) -> Result<PathBuf>;
}
