use std::{collections::BTreeMap, path::Path, process};

use clap::Parser;
use tracemat::{extract, CoverageSummary, ExtractOptions};
use tracing::instrument;

use super::terminal::{is_narrow, Colorize};

#[derive(Debug, Parser, Default)]
#[command(about = "Show element counts and dependency coverage")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self, options))]
    pub fn run(self, model: &Path, options: &ExtractOptions) -> anyhow::Result<()> {
        let graph = extract::load(model, options)?;

        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for element in graph.elements() {
            *counts.entry(element.kind.as_str()).or_insert(0) += 1;
        }

        let dependency_count = graph.dependencies().len();
        let summary = CoverageSummary::of(&graph);

        if summary.total == 0 {
            println!("No use cases or requirements found in the model.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&counts, dependency_count, summary)?,
            OutputFormat::Table => {
                if self.quiet {
                    Self::output_quiet(dependency_count, summary);
                } else {
                    Self::output_table(&counts, dependency_count, summary);
                }
            }
        }

        // Exit with a non-zero code when coverage gaps exist (for CI).
        if summary.uncovered > 0 {
            process::exit(2);
        }

        Ok(())
    }

    fn output_json(
        counts: &BTreeMap<&'static str, usize>,
        dependency_count: usize,
        summary: CoverageSummary,
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let kinds: Vec<_> = counts
            .iter()
            .map(|(kind, count)| {
                json!({
                    "kind": kind,
                    "count": count,
                })
            })
            .collect();

        let output = json!({
            "kinds": kinds,
            "total": summary.total,
            "dependencies": dependency_count,
            "coverage": {
                "covered": summary.covered,
                "uncovered": summary.uncovered,
                "percentage": summary.percentage,
            }
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(dependency_count: usize, summary: CoverageSummary) {
        println!(
            "total={} dependencies={dependency_count} uncovered={} coverage={:.2}",
            summary.total, summary.uncovered, summary.percentage
        );
    }

    fn output_table(
        counts: &BTreeMap<&'static str, usize>,
        dependency_count: usize,
        summary: CoverageSummary,
    ) {
        let narrow = is_narrow();

        println!("Element counts");
        println!("{}", "──────────────".dim());

        if narrow {
            // Stacked output for narrow terminals
            for (kind, count) in counts {
                println!("{kind}: {count}");
            }
            println!("Total: {}", summary.total);
        } else {
            // Table layout
            println!("{:<14} Count", "Kind");
            for (kind, count) in counts {
                println!("{kind:<14} {count}");
            }
            println!("{:<14} {}", "Total", summary.total);
        }

        println!();
        println!("Dependencies: {dependency_count}");
        println!();
        println!("Coverage: {}", gauge(summary));

        if summary.uncovered == 0 {
            println!("Uncovered elements: {} ✅", "0".success());
        } else {
            println!(
                "Uncovered elements: {} ⚠️",
                summary.uncovered.to_string().warning()
            );
            println!("{}", "Run the 'uncovered' subcommand to list them.".dim());
        }
    }
}

/// Renders a textual coverage gauge, e.g. `[██████████░░░░░░░░░░] 50.00%`.
fn gauge(summary: CoverageSummary) -> String {
    const WIDTH: usize = 20;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((summary.percentage / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);

    format!(
        "[{}{}] {:.2}%",
        "█".repeat(filled),
        "░".repeat(WIDTH - filled),
        summary.percentage
    )
}
