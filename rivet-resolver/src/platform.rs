// rivet-resolver/src/platform.rs
// Platform-artifact detection. An artifact is a platform artifact when it
// carries the well-known descriptor resource, either as a loose file in a
// directory-form artifact or as an entry inside its jar/zip archive. The
// result is a tagged kind computed once per resolved artifact; callers
// cache it per projection instead of re-opening the archive.
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use rivet_common::error::{Result, RivetError};
use rivet_common::model::Coordinate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const PLATFORM_DESCRIPTOR_PATH: &str = "META-INF/rivet-platform.json";

/// Contents of the platform descriptor resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    Ordinary,
    Platform(PlatformInfo),
}

impl ArtifactKind {
    pub fn is_platform(&self) -> bool {
        matches!(self, ArtifactKind::Platform(_))
    }
}

/// Classify a resolved artifact. `coordinate` is only for error context.
pub fn inspect(coordinate: &Coordinate, path: &Path) -> Result<ArtifactKind> {
    if path.is_dir() {
        return inspect_directory(coordinate, path);
    }
    if path.is_file() {
        return inspect_archive(coordinate, path);
    }
    Err(RivetError::Resolution {
        coordinate: coordinate.to_string(),
        reason: format!("resolved path {} does not exist", path.display()),
    })
}

fn inspect_directory(coordinate: &Coordinate, dir: &Path) -> Result<ArtifactKind> {
    let marker = dir.join(PLATFORM_DESCRIPTOR_PATH);
    if !marker.is_file() {
        return Ok(ArtifactKind::Ordinary);
    }
    debug!(
        "'{}' is a directory-form platform artifact ({})",
        coordinate,
        marker.display()
    );
    let raw = fs::read_to_string(&marker)?;
    parse_info(coordinate, &raw)
}

fn inspect_archive(coordinate: &Coordinate, file: &Path) -> Result<ArtifactKind> {
    let handle = File::open(file)?;
    let mut archive = match zip::ZipArchive::new(handle) {
        Ok(archive) => archive,
        // Not an archive at all: an ordinary artifact, not an error.
        Err(e) => {
            debug!("'{}' is not a readable archive: {}", coordinate, e);
            return Ok(ArtifactKind::Ordinary);
        }
    };
    let mut entry = match archive.by_name(PLATFORM_DESCRIPTOR_PATH) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(ArtifactKind::Ordinary),
        Err(e) => {
            return Err(RivetError::Generic(format!(
                "failed to read {} from {}: {}",
                PLATFORM_DESCRIPTOR_PATH,
                file.display(),
                e
            )))
        }
    };
    debug!("'{}' is a jar-form platform artifact", coordinate);
    let mut raw = String::new();
    entry.read_to_string(&mut raw)?;
    parse_info(coordinate, &raw)
}

fn parse_info(coordinate: &Coordinate, raw: &str) -> Result<ArtifactKind> {
    let info: PlatformInfo = serde_json::from_str(raw).map_err(|e| RivetError::Descriptor {
        coordinate: coordinate.to_string(),
        reason: format!("malformed platform descriptor: {e}"),
    })?;
    Ok(ArtifactKind::Platform(info))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn coord() -> Coordinate {
        "g:platform:1.0".parse().unwrap()
    }

    #[test]
    fn directory_with_marker_is_platform() {
        let dir = tempfile::tempdir().unwrap();
        let meta = dir.path().join("META-INF");
        fs::create_dir_all(&meta).unwrap();
        fs::write(
            meta.join("rivet-platform.json"),
            r#"{"name": "acme", "release": "2024.1"}"#,
        )
        .unwrap();

        let kind = inspect(&coord(), dir.path()).unwrap();
        match kind {
            ArtifactKind::Platform(info) => {
                assert_eq!(info.name.as_deref(), Some("acme"));
                assert_eq!(info.release.as_deref(), Some("2024.1"));
            }
            other => panic!("expected platform, got {other:?}"),
        }
    }

    #[test]
    fn directory_without_marker_is_ordinary() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            inspect(&coord(), dir.path()).unwrap(),
            ArtifactKind::Ordinary
        );
    }

    #[test]
    fn jar_with_marker_entry_is_platform() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("platform-1.0.jar");
        let file = File::create(&jar).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(
                PLATFORM_DESCRIPTOR_PATH,
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
        writer.write_all(b"{}").unwrap();
        writer.finish().unwrap();

        assert!(inspect(&coord(), &jar).unwrap().is_platform());
    }

    #[test]
    fn plain_file_is_ordinary() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.jar");
        fs::write(&file, b"not a zip at all").unwrap();
        assert_eq!(inspect(&coord(), &file).unwrap(), ArtifactKind::Ordinary);
    }

    #[test]
    fn malformed_marker_is_descriptor_error() {
        let dir = tempfile::tempdir().unwrap();
        let meta = dir.path().join("META-INF");
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join("rivet-platform.json"), b"not json").unwrap();
        assert!(matches!(
            inspect(&coord(), dir.path()).unwrap_err(),
            RivetError::Descriptor { .. }
        ));
    }
}
