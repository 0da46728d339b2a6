use std::{path::Path, process};

use clap::Parser;
use tracemat::{extract, Element, ExtractOptions};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser, Default)]
#[command(about = "List elements that participate in no dependency")]
pub struct Uncovered {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Output identifiers only (no headers, no colors)
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Uncovered {
    #[instrument(level = "debug", skip(self, options))]
    pub fn run(self, model: &Path, options: &ExtractOptions) -> anyhow::Result<()> {
        let graph = extract::load(model, options)?;
        let uncovered: Vec<&Element> = graph.uncovered().collect();

        if uncovered.is_empty() {
            println!(
                "{}",
                "✅ Every element participates in at least one dependency.".success()
            );
            return Ok(());
        }

        if self.quiet {
            for element in &uncovered {
                println!("{}", element.id);
            }
            process::exit(2);
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&uncovered)?,
            OutputFormat::Table => Self::output_table(&uncovered),
        }

        // Exit with a non-zero code so coverage gaps fail CI checks.
        process::exit(2);
    }

    fn output_json(uncovered: &[&Element]) -> anyhow::Result<()> {
        use serde_json::json;

        let elements: Vec<_> = uncovered
            .iter()
            .map(|element| {
                json!({
                    "id": element.id.as_str(),
                    "name": element.name,
                    "kind": element.kind.as_str(),
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&elements)?);
        Ok(())
    }

    fn output_table(uncovered: &[&Element]) {
        println!(
            "{}",
            format!("⚠️  {} elements without dependencies", uncovered.len()).warning()
        );
        println!();
        for element in uncovered {
            println!("  {}: {}", element.id, element.display_name());
        }
        println!();
        println!(
            "{}",
            "Link these elements or remove them from the model.".dim()
        );
    }
}
