// rivet/src/cli/tree.rs
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use rivet_common::config::Config;
use rivet_common::error::Result;
use rivet_common::model::Coordinate;
use rivet_resolver::{
    DependencyNode, Gateway, GraphCollector, GraphTransformer, NodeFlags, NoopProcessor,
};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Artifact coordinate, e.g. org.example:widget:1.2.3
    pub coordinate: Coordinate,

    /// Print the raw collected graph without conflict resolution
    #[arg(long)]
    pub raw: bool,
}

impl TreeArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let gateway = Gateway::from_config(config)?;
        let collector = GraphCollector::new(Arc::new(gateway));

        let graph = collector.collect(&self.coordinate)?;
        if self.raw {
            print_node(&graph, 0);
            return Ok(());
        }

        let transformer = GraphTransformer::new(collector.clone());
        let collected = transformer.transform(graph, &NoopProcessor)?;
        print_node(collected.graph(), 0);
        Ok(())
    }
}

fn print_node(node: &DependencyNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{}", node.coordinate());
    if let Some(edge) = node.edge {
        line.push_str(&format!(" ({})", edge.scope));
        if edge.optional {
            line.push_str(" [optional]");
        }
    }
    if node.flags.contains(NodeFlags::INJECTED_PLATFORM) {
        println!("{} {}", line, "[injected]".yellow());
    } else {
        println!("{line}");
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
