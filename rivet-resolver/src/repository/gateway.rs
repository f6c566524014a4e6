// rivet-resolver/src/repository/gateway.rs
// Local-first repository access: every remote fetch lands in the local
// layout, so repeated resolution never re-downloads.
use std::path::{Path, PathBuf};

use rivet_common::config::Config;
use rivet_common::error::{Result, RivetError};
use rivet_common::model::{ArtifactDescriptor, Coordinate, Version, VersionQuery};
use tracing::debug;

use super::local::LocalRepository;
use super::remote::RemoteClient;
use super::RepositorySystem;

#[derive(Debug, Clone)]
pub struct Gateway {
    local: LocalRepository,
    remote: RemoteClient,
}

impl Gateway {
    pub fn new(local: LocalRepository, remote: RemoteClient) -> Self {
        Self { local, remote }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let local = LocalRepository::new(config.repository_dir());
        let remote = RemoteClient::new(config.remote_repositories.clone(), config.offline)?;
        Ok(Self::new(local, remote))
    }

    pub fn local(&self) -> &LocalRepository {
        &self.local
    }
}

impl RepositorySystem for Gateway {
    fn resolve_file(
        &self,
        coordinate: &Coordinate,
        extra_repositories: &[String],
    ) -> Result<PathBuf> {
        if let Ok(path) = self.local.resolve_file(coordinate) {
            return Ok(path);
        }
        let dest = self.local.artifact_path(coordinate);
        self.remote
            .fetch(
                &LocalRepository::relative_artifact_path(coordinate),
                extra_repositories,
                &dest,
            )
            .map_err(|e| RivetError::Resolution {
                coordinate: coordinate.to_string(),
                reason: e.to_string(),
            })
    }

    fn read_descriptor(
        &self,
        coordinate: &Coordinate,
        extra_repositories: &[String],
    ) -> Result<ArtifactDescriptor> {
        if let Ok(descriptor) = self.local.read_descriptor(coordinate) {
            return Ok(descriptor);
        }
        let dest = self.local.descriptor_path(coordinate);
        self.remote
            .fetch(
                &LocalRepository::relative_descriptor_path(coordinate),
                extra_repositories,
                &dest,
            )
            .map_err(|e| RivetError::Descriptor {
                coordinate: coordinate.to_string(),
                reason: e.to_string(),
            })?;
        self.local.read_descriptor(coordinate)
    }

    fn resolve_version_range(
        &self,
        coordinate: &Coordinate,
        query: &VersionQuery,
    ) -> Result<Vec<Version>> {
        let mut matching: Vec<Version> = self
            .local
            .list_versions(coordinate)
            .map_err(|e| RivetError::VersionRange {
                coordinate: coordinate.to_string(),
                reason: e.to_string(),
            })?
            .into_iter()
            .filter(|v| query.contains(v))
            .collect();
        matching.sort();

        if matching.is_empty() {
            // Deliberate fallback: an empty range means "no newer version
            // available", answered with the input version itself.
            debug!(
                "Version range for '{}' resolved to no candidates; returning input version",
                coordinate
            );
            return Ok(vec![coordinate.parsed_version()]);
        }
        Ok(matching)
    }

    fn install(&self, coordinate: &Coordinate, file: &Path) -> Result<PathBuf> {
        self.local.install(coordinate, file)
    }
}
