use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RivetError;
use crate::model::version::Version;

fn default_extension() -> String {
    "jar".to_string()
}

/// Full identity of an artifact: `group:artifact[:extension[:classifier]]:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: None,
            extension: default_extension(),
            version: version.into(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn parsed_version(&self) -> Version {
        Version::parse(&self.version)
    }

    /// Identity used for version mediation: everything but the version.
    pub fn conflict_id(&self) -> ConflictId {
        ConflictId {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: self.classifier.clone(),
            extension: self.extension.clone(),
        }
    }

    /// Filename of the artifact payload inside a repository layout.
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    /// Filename of the artifact's dependency descriptor.
    pub fn descriptor_file_name(&self) -> String {
        format!("{}-{}.rivet.json", self.artifact_id, self.version)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if self.extension != "jar" || self.classifier.is_some() {
            write!(f, ":{}", self.extension)?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for Coordinate {
    type Err = RivetError;

    /// Accepts `g:a:v`, `g:a:ext:v` and `g:a:ext:classifier:v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(RivetError::ValidationError(format!(
                "Coordinate '{s}' contains an empty segment"
            )));
        }
        match parts.as_slice() {
            [g, a, v] => Ok(Coordinate::new(*g, *a, *v)),
            [g, a, ext, v] => Ok(Coordinate::new(*g, *a, *v).with_extension(*ext)),
            [g, a, ext, c, v] => Ok(Coordinate::new(*g, *a, *v)
                .with_extension(*ext)
                .with_classifier(*c)),
            _ => Err(RivetError::ValidationError(format!(
                "Coordinate '{s}' must have 3 to 5 colon-separated segments"
            ))),
        }
    }
}

/// Mediation key: `groupId:artifactId:classifier:extension`, version ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConflictId {
    pub group_id: String,
    pub artifact_id: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id,
            self.artifact_id,
            self.classifier.as_deref().unwrap_or(""),
            self.extension
        )
    }
}

/// A coordinate plus the local file it resolved to, if any.
///
/// Equality is by coordinate only; `path` is set exactly once when the
/// artifact is physically fetched.
#[derive(Debug, Clone)]
pub struct Artifact {
    coordinate: Coordinate,
    path: Option<PathBuf>,
}

impl Artifact {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            path: None,
        }
    }

    pub fn resolved(coordinate: Coordinate, path: PathBuf) -> Self {
        Self {
            coordinate,
            path: Some(path),
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.path.is_some()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        if let Some(existing) = &self.path {
            if existing != &path {
                warn!(
                    "Ignoring second resolution of '{}': already at {}",
                    self.coordinate,
                    existing.display()
                );
            }
            return;
        }
        self.path = Some(path);
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
    }
}

impl Eq for Artifact {}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.coordinate.fmt(f)
    }
}
