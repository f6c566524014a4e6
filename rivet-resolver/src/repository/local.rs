// rivet-resolver/src/repository/local.rs
// On-disk artifact repository in a Maven-style layout:
//   <root>/<group as dirs>/<artifact>/<version>/<artifact>-<version>[-classifier].<ext>
// with the dependency descriptor alongside as <artifact>-<version>.rivet.json
// and a .sha256 sidecar written on install.
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use rivet_common::error::{Result, RivetError};
use rivet_common::model::{ArtifactDescriptor, Coordinate, Version};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn group_dir(&self, group_id: &str) -> PathBuf {
        let mut dir = self.root.clone();
        for part in group_id.split('.') {
            dir.push(part);
        }
        dir
    }

    fn version_dir(&self, coordinate: &Coordinate) -> PathBuf {
        self.group_dir(&coordinate.group_id)
            .join(&coordinate.artifact_id)
            .join(&coordinate.version)
    }

    pub fn artifact_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.version_dir(coordinate).join(coordinate.file_name())
    }

    pub fn descriptor_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.version_dir(coordinate)
            .join(coordinate.descriptor_file_name())
    }

    /// Layout-relative path of the payload, shared with remote endpoints.
    pub fn relative_artifact_path(coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/{}/{}",
            coordinate.group_id.replace('.', "/"),
            coordinate.artifact_id,
            coordinate.version,
            coordinate.file_name()
        )
    }

    pub fn relative_descriptor_path(coordinate: &Coordinate) -> String {
        format!(
            "{}/{}/{}/{}",
            coordinate.group_id.replace('.', "/"),
            coordinate.artifact_id,
            coordinate.version,
            coordinate.descriptor_file_name()
        )
    }

    pub fn resolve_file(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        let path = self.artifact_path(coordinate);
        if path.exists() {
            debug!("Resolved '{}' locally at {}", coordinate, path.display());
            Ok(path)
        } else {
            Err(RivetError::Resolution {
                coordinate: coordinate.to_string(),
                reason: format!("not present in local repository {}", self.root.display()),
            })
        }
    }

    pub fn read_descriptor(&self, coordinate: &Coordinate) -> Result<ArtifactDescriptor> {
        let path = self.descriptor_path(coordinate);
        let raw = fs::read_to_string(&path).map_err(|e| RivetError::Descriptor {
            coordinate: coordinate.to_string(),
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&raw).map_err(|e| RivetError::Descriptor {
            coordinate: coordinate.to_string(),
            reason: format!("malformed descriptor {}: {}", path.display(), e),
        })
    }

    /// All versions present for the coordinate's group/artifact, unsorted.
    /// A missing artifact directory is an empty list, not an error.
    pub fn list_versions(&self, coordinate: &Coordinate) -> Result<Vec<Version>> {
        let artifact_dir = self
            .group_dir(&coordinate.group_id)
            .join(&coordinate.artifact_id);
        if !artifact_dir.is_dir() {
            debug!(
                "No local versions of {}:{} ({} absent)",
                coordinate.group_id,
                coordinate.artifact_id,
                artifact_dir.display()
            );
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&artifact_dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        "Skipping unreadable entry in {}: {}",
                        artifact_dir.display(),
                        e
                    );
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                if let Some(version) = path.file_name().and_then(|n| n.to_str()) {
                    versions.push(Version::parse(version));
                }
            }
        }
        Ok(versions)
    }

    /// Copy a locally-built artifact into the layout and write its
    /// `.sha256` sidecar.
    pub fn install(&self, coordinate: &Coordinate, file: &Path) -> Result<PathBuf> {
        if !file.is_file() {
            return Err(RivetError::InstallError(format!(
                "'{}' is not a file",
                file.display()
            )));
        }
        let dest = self.artifact_path(coordinate);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(file, &dest)?;

        let digest = compute_sha256(&dest)?;
        fs::write(sidecar_path(&dest), &digest)?;
        debug!(
            "Installed '{}' at {} (sha256 {})",
            coordinate,
            dest.display(),
            digest
        );
        Ok(dest)
    }

    /// Publish a dependency descriptor for an installed artifact.
    pub fn install_descriptor(&self, descriptor: &ArtifactDescriptor) -> Result<PathBuf> {
        let dest = self.descriptor_path(&descriptor.coordinate);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, serde_json::to_string_pretty(descriptor)?)?;
        debug!(
            "Installed descriptor for '{}' at {}",
            descriptor.coordinate,
            dest.display()
        );
        Ok(dest)
    }
}

pub fn sidecar_path(artifact_path: &Path) -> PathBuf {
    let mut name = artifact_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".sha256");
    artifact_path.with_file_name(name)
}

pub fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = compute_sha256(path)?;
    debug!("Calculated SHA256: {}", actual);
    debug!("Expected SHA256:   {}", expected);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(RivetError::ChecksumMismatch(format!(
            "{}: expected {}, got {}",
            path.display(),
            expected.trim(),
            actual
        )))
    }
}

#[cfg(test)]
mod tests {
    use rivet_common::model::{DeclaredDependency, Scope, VersionQuery};

    use super::*;

    fn coord(s: &str) -> Coordinate {
        s.parse().unwrap()
    }

    fn repo_with_artifact(coordinate: &Coordinate) -> (tempfile::TempDir, LocalRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let payload = dir.path().join("payload.jar");
        fs::write(&payload, b"payload-bytes").unwrap();
        repo.install(coordinate, &payload).unwrap();
        (dir, repo)
    }

    #[test]
    fn install_then_resolve_round_trip() {
        let coordinate = coord("org.example:widget:1.0");
        let (_dir, repo) = repo_with_artifact(&coordinate);

        let resolved = repo.resolve_file(&coordinate).unwrap();
        assert!(resolved.ends_with("org/example/widget/1.0/widget-1.0.jar"));

        let sidecar = sidecar_path(&resolved);
        let expected = fs::read_to_string(sidecar).unwrap();
        verify_checksum(&resolved, &expected).unwrap();
    }

    #[test]
    fn resolve_missing_artifact_is_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let err = repo.resolve_file(&coord("g:missing:1.0")).unwrap_err();
        assert!(matches!(err, RivetError::Resolution { .. }));
    }

    #[test]
    fn descriptor_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let descriptor = ArtifactDescriptor::new(coord("g:a:1.0")).with_dependency(
            DeclaredDependency::new(coord("g:b:2.0"), Scope::Runtime),
        );
        repo.install_descriptor(&descriptor).unwrap();

        let read = repo.read_descriptor(&coord("g:a:1.0")).unwrap();
        assert_eq!(read.dependencies, descriptor.dependencies);
    }

    #[test]
    fn missing_descriptor_is_descriptor_error() {
        let coordinate = coord("g:a:1.0");
        let (_dir, repo) = repo_with_artifact(&coordinate);
        let err = repo.read_descriptor(&coordinate).unwrap_err();
        assert!(matches!(err, RivetError::Descriptor { .. }));
    }

    #[test]
    fn list_versions_scans_version_directories() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LocalRepository::new(dir.path());
        let payload = dir.path().join("p.jar");
        fs::write(&payload, b"x").unwrap();
        for v in ["1.0", "1.1", "2.0"] {
            repo.install(&coord(&format!("g:a:{v}")), &payload).unwrap();
        }

        let mut versions = repo.list_versions(&coord("g:a:1.0")).unwrap();
        versions.sort();
        let raw: Vec<_> = versions.iter().map(|v| v.as_str().to_string()).collect();
        assert_eq!(raw, vec!["1.0", "1.1", "2.0"]);

        let query = VersionQuery::above(Version::parse("1.0"));
        let above: Vec<_> = versions.into_iter().filter(|v| query.contains(v)).collect();
        assert_eq!(above.len(), 2);
    }
}
