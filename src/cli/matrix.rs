use std::path::Path;

use clap::Parser;
use tracemat::{extract, CoverageMatrix, DependencyRow, ExtractOptions};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser, Default)]
#[command(about = "Show the traceability matrix of retained dependencies")]
pub struct Matrix {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Include the description columns in the table output
    #[arg(long)]
    wide: bool,

    /// Render the supplier×client cross-tabulation instead of the edge list
    #[arg(long, conflicts_with = "wide")]
    cross: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Matrix {
    #[instrument(level = "debug", skip(self, options))]
    pub fn run(self, model: &Path, options: &ExtractOptions) -> anyhow::Result<()> {
        let graph = extract::load(model, options)?;

        if graph.dependencies().is_empty() {
            println!("No dependencies found in the model.");
            return Ok(());
        }

        if self.cross {
            let matrix = CoverageMatrix::of(&graph);
            match self.output {
                OutputFormat::Json => Self::output_cross_json(&matrix)?,
                OutputFormat::Table => Self::output_cross_table(&matrix),
            }
            return Ok(());
        }

        let rows = DependencyRow::rows(&graph);
        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Table => self.output_table(&rows),
        }

        Ok(())
    }

    fn output_table(&self, rows: &[DependencyRow]) {
        let columns = if self.wide { 5 } else { 3 };
        let header = &DependencyRow::HEADER[..columns];

        let mut cells: Vec<Vec<&str>> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut line = vec![
                row.id.as_str(),
                row.supplier.as_deref().unwrap_or("(unnamed)"),
                row.client.as_deref().unwrap_or("(unnamed)"),
            ];
            if self.wide {
                line.push(&row.supplier_description);
                line.push(&row.client_description);
            }
            cells.push(line);
        }

        let widths = column_widths(header, &cells);
        println!("{}", render_line(header.iter().copied(), &widths));
        println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * (columns - 1)).dim());
        for line in &cells {
            println!("{}", render_line(line.iter().copied(), &widths));
        }
    }

    fn output_cross_table(matrix: &CoverageMatrix) {
        let rendered = matrix.render();
        let cells: Vec<Vec<&str>> = rendered
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect();

        let widths = column_widths(&cells[0], &cells[1..]);
        for line in &cells {
            println!("{}", render_line(line.iter().copied(), &widths));
        }
    }

    fn output_cross_json(matrix: &CoverageMatrix) -> anyhow::Result<()> {
        use serde_json::json;

        let marked: Vec<_> = matrix
            .suppliers()
            .iter()
            .flat_map(|supplier| {
                matrix
                    .clients()
                    .iter()
                    .filter(|client| matrix.is_marked(supplier, client))
                    .map(move |client| json!([supplier, client]))
            })
            .collect();

        let output = json!({
            "suppliers": matrix.suppliers(),
            "clients": matrix.clients(),
            "marked": marked,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

/// Computes per-column display widths over a header and data rows.
fn column_widths(header: &[&str], rows: &[Vec<&str>]) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

/// Renders one row of cells padded to the column widths.
fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_cover_the_longest_cell() {
        let header = ["id", "supplier"];
        let rows = vec![vec!["D1", "Login"], vec!["LONG-ID", "A"]];
        assert_eq!(column_widths(&header, &rows), [7, 8]);
    }

    #[test]
    fn rendered_lines_are_padded_and_trimmed() {
        let widths = [7, 8];
        let line = render_line(["D1", "Login"].into_iter(), &widths);
        assert_eq!(line, "D1       Login");
    }
}
