use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RivetError;

/// Dependency scope, carried on the edge between two graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Runtime,
    Provided,
    Test,
    System,
}

impl Scope {
    /// Whether edges of this scope propagate into transitive collection.
    /// Test/provided/system dependencies of a dependency are not ours.
    pub fn is_transitive(self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime)
    }

    /// Whether an edge of this scope belongs on a deployed application's
    /// classpath.
    pub fn is_runtime(self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
            Scope::System => "system",
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Compile
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = RivetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            other => Err(RivetError::ValidationError(format!(
                "Unknown dependency scope '{other}'"
            ))),
        }
    }
}

/// Edge data between a parent and child node. Attached to the edge, not the
/// artifact: the same artifact can be reached through edges with different
/// scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub optional: bool,
}

impl DependencyEdge {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            optional: false,
        }
    }

    pub fn optional(scope: Scope) -> Self {
        Self {
            scope,
            optional: true,
        }
    }
}

impl Default for DependencyEdge {
    fn default() -> Self {
        Self::new(Scope::Compile)
    }
}
