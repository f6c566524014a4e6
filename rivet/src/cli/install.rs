// rivet/src/cli/install.rs
use std::fs;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use rivet_common::config::Config;
use rivet_common::error::{Result, RivetError};
use rivet_common::model::{ArtifactDescriptor, Coordinate};
use rivet_resolver::{Gateway, RepositorySystem};

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Coordinate to publish the file under
    pub coordinate: Coordinate,

    /// Locally-built artifact file
    pub file: PathBuf,

    /// Dependency descriptor (JSON) to publish alongside the artifact
    #[arg(long)]
    pub descriptor: Option<PathBuf>,
}

impl InstallArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let gateway = Gateway::from_config(config)?;

        let installed = gateway.install(&self.coordinate, &self.file)?;
        println!(
            "{}Installed {} at {}",
            "==> ".bold().blue(),
            self.coordinate.to_string().bold(),
            installed.display()
        );

        if let Some(descriptor_path) = &self.descriptor {
            let raw = fs::read_to_string(descriptor_path)?;
            let descriptor: ArtifactDescriptor =
                serde_json::from_str(&raw).map_err(|e| RivetError::Descriptor {
                    coordinate: self.coordinate.to_string(),
                    reason: format!("malformed descriptor {}: {}", descriptor_path.display(), e),
                })?;
            if descriptor.coordinate != self.coordinate {
                return Err(RivetError::ValidationError(format!(
                    "Descriptor coordinate '{}' does not match '{}'",
                    descriptor.coordinate, self.coordinate
                )));
            }
            let dest = gateway.local().install_descriptor(&descriptor)?;
            println!(
                "{}Installed descriptor at {}",
                "==> ".bold().blue(),
                dest.display()
            );
        }
        Ok(())
    }
}
