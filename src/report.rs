use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{Dependency, TraceGraph};

/// Summary scalars for a coverage gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageSummary {
    /// Total number of elements in the registry.
    pub total: usize,
    /// Elements participating in at least one dependency edge.
    pub covered: usize,
    /// Elements with no dependency edges.
    pub uncovered: usize,
    /// Covered fraction as a percentage; 0 for an empty registry.
    pub percentage: f64,
}

impl CoverageSummary {
    /// Computes the coverage summary of a graph.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn of(graph: &TraceGraph) -> Self {
        let total = graph.len();
        let covered = graph.covered_count();
        let percentage = if total == 0 {
            0.0
        } else {
            (covered as f64 / total as f64) * 100.0
        };

        Self {
            total,
            covered,
            uncovered: total - covered,
            percentage,
        }
    }
}

/// One row of the traceability export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRow {
    /// The dependency node's identifier.
    pub id: String,
    /// Supplier name, absent for unnamed elements.
    pub supplier: Option<String>,
    /// Client name, absent for unnamed elements.
    pub client: Option<String>,
    /// Supplier description.
    pub supplier_description: String,
    /// Client description.
    pub client_description: String,
}

impl DependencyRow {
    /// Column names of the single header row.
    pub const HEADER: [&'static str; 5] = [
        "xmi:id",
        "Supplier",
        "Client",
        "Supplier Description",
        "Client Description",
    ];

    /// Builds the export rows of a graph, in edge order.
    #[must_use]
    pub fn rows(graph: &TraceGraph) -> Vec<Self> {
        graph.dependencies().iter().map(Self::from).collect()
    }
}

impl From<&Dependency> for DependencyRow {
    fn from(dependency: &Dependency) -> Self {
        Self {
            id: dependency.id.clone(),
            supplier: dependency.supplier_name.clone(),
            client: dependency.client_name.clone(),
            supplier_description: dependency.supplier_description.clone(),
            client_description: dependency.client_description.clone(),
        }
    }
}

/// A supplier×client cross-tabulation of the retained dependency edges.
///
/// Suppliers label the rows and clients the columns, each sorted and
/// de-duplicated by name; a cell is marked where that supplier→client
/// edge exists. Endpoints without a name are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMatrix {
    suppliers: Vec<String>,
    clients: Vec<String>,
    marks: BTreeSet<(String, String)>,
}

impl CoverageMatrix {
    /// The value placed in a marked cell.
    pub const MARK: &'static str = "X";

    /// Builds the cross-tabulation of a graph.
    #[must_use]
    pub fn of(graph: &TraceGraph) -> Self {
        let mut suppliers = BTreeSet::new();
        let mut clients = BTreeSet::new();
        let mut marks = BTreeSet::new();

        for dependency in graph.dependencies() {
            let supplier = dependency
                .supplier_name
                .as_deref()
                .filter(|name| !name.is_empty());
            let client = dependency
                .client_name
                .as_deref()
                .filter(|name| !name.is_empty());

            if let Some(supplier) = supplier {
                suppliers.insert(supplier.to_string());
            }
            if let Some(client) = client {
                clients.insert(client.to_string());
            }
            if let (Some(supplier), Some(client)) = (supplier, client) {
                marks.insert((supplier.to_string(), client.to_string()));
            }
        }

        Self {
            suppliers: suppliers.into_iter().collect(),
            clients: clients.into_iter().collect(),
            marks,
        }
    }

    /// The sorted supplier names labelling the rows.
    #[must_use]
    pub fn suppliers(&self) -> &[String] {
        &self.suppliers
    }

    /// The sorted client names labelling the columns.
    #[must_use]
    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    /// Returns `true` if a supplier→client edge exists for this pair.
    #[must_use]
    pub fn is_marked(&self, supplier: &str, client: &str) -> bool {
        self.marks
            .contains(&(supplier.to_string(), client.to_string()))
    }

    /// Renders the matrix as rows of cells: a header row of an empty
    /// corner plus the client names, then one row per supplier.
    #[must_use]
    pub fn render(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.suppliers.len() + 1);

        let mut header = Vec::with_capacity(self.clients.len() + 1);
        header.push(String::new());
        header.extend(self.clients.iter().cloned());
        rows.push(header);

        for supplier in &self.suppliers {
            let mut row = Vec::with_capacity(self.clients.len() + 1);
            row.push(supplier.clone());
            for client in &self.clients {
                row.push(if self.is_marked(supplier, client) {
                    Self::MARK.to_string()
                } else {
                    String::new()
                });
            }
            rows.push(row);
        }

        rows
    }
}
