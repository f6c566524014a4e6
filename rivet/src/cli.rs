// rivet/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use rivet_common::config::Config;
use rivet_common::error::Result;

// Module declarations
pub mod install;
pub mod resolve;
pub mod tree;

use crate::cli::install::InstallArgs;
use crate::cli::resolve::ResolveArgs;
use crate::cli::tree::TreeArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "rivet", bin_name = "rivet")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve an artifact's dependency graph and print a classpath
    Resolve(ResolveArgs),
    /// Print an artifact's transformed dependency tree
    Tree(TreeArgs),
    /// Publish a locally-built artifact into the local repository
    Install(InstallArgs),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Resolve(command) => command.run(config),
            Self::Tree(command) => command.run(config),
            Self::Install(command) => command.run(config),
        }
    }
}
