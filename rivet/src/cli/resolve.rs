// rivet/src/cli/resolve.rs
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use rivet_common::config::Config;
use rivet_common::error::Result;
use rivet_common::model::Coordinate;
use rivet_resolver::{Gateway, GraphCollector, GraphTransformer, NoopProcessor};
use tracing::debug;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Artifact coordinate, e.g. org.example:widget:1.2.3
    pub coordinate: Coordinate,

    /// Print the application (runtime) classpath instead of the build
    /// classpath
    #[arg(long)]
    pub app: bool,
}

impl ResolveArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        debug!("Resolving '{}'", self.coordinate);
        let gateway = Gateway::from_config(config)?;
        let collector = GraphCollector::new(Arc::new(gateway));
        let transformer = GraphTransformer::new(collector.clone());

        let graph = collector.collect(&self.coordinate)?;
        let collected = transformer.transform(graph, &NoopProcessor)?;

        let entries = if self.app {
            collected.application_classpath()?
        } else {
            collected.build_classpath()
        };

        println!(
            "{}{} ({} entries)",
            "==> ".bold().blue(),
            self.coordinate.to_string().bold(),
            entries.len()
        );
        for entry in entries {
            let line = format!("{entry}");
            if entry.optional {
                println!("{}", line.dimmed());
            } else {
                println!("{line}");
            }
        }
        Ok(())
    }
}
