//! The traceability graph produced by a single extraction pass.
//!
//! The [`TraceGraph`] knows nothing about XML. It owns the element
//! registry, the retained dependency edges, and a directed graph used to
//! derive the covered/uncovered partition. Edges whose endpoints do not
//! resolve in the registry are rejected at insertion and never stored.

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use super::{Dependency, Element, ElementId};

/// The single output structure of an extraction pass.
///
/// Elements are stored in discovery order. Dependency edges point from
/// supplier to client; each edge weight indexes into the dependency list.
#[derive(Debug, Default)]
pub struct TraceGraph {
    /// Element registry, keyed by identifier, in discovery order.
    elements: IndexMap<ElementId, Element>,

    /// Retained dependency edges, in document order.
    dependencies: Vec<Dependency>,

    /// Coverage graph. Nodes are element identifiers, edges point from
    /// supplier to client and carry the index of the dependency record.
    graph: DiGraph<ElementId, usize>,

    /// Lookup from element identifier to graph node.
    node_indices: HashMap<ElementId, NodeIndex>,
}

impl TraceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an element into the registry.
    ///
    /// On identifier collision the new element replaces the old one while
    /// keeping the original registry position. Merging use cases before
    /// requirements therefore leaves the requirement entry in place for a
    /// shared identifier.
    pub fn insert_element(&mut self, element: Element) {
        let id = element.id.clone();
        if self.elements.insert(id.clone(), element).is_some() {
            debug!(id = %id, "replaced element with duplicate identifier");
        } else {
            let index = self.graph.add_node(id.clone());
            self.node_indices.insert(id, index);
        }
    }

    /// Retrieves an element by identifier.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Returns an iterator over all elements in discovery order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Returns the number of elements in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Offers a dependency edge to the graph.
    ///
    /// The edge is retained only when both endpoint references resolve in
    /// the element registry. Endpoint names and descriptions are copied
    /// into the record at this moment. Unresolvable edges are dropped
    /// silently and `false` is returned.
    pub fn insert_dependency(&mut self, id: String, supplier: &str, client: &str) -> bool {
        let (Ok(supplier), Ok(client)) = (
            ElementId::try_from(supplier),
            ElementId::try_from(client),
        ) else {
            debug!(%id, "dropped dependency with empty endpoint reference");
            return false;
        };

        let (Some(supplier_element), Some(client_element)) =
            (self.elements.get(&supplier), self.elements.get(&client))
        else {
            debug!(%id, %supplier, %client, "dropped dependency with unresolved endpoint");
            return false;
        };

        let dependency = Dependency {
            id,
            supplier_name: supplier_element.name.clone(),
            client_name: client_element.name.clone(),
            supplier_description: supplier_element.description.clone(),
            client_description: client_element.description.clone(),
            supplier: supplier.clone(),
            client: client.clone(),
        };

        let (Some(&supplier_index), Some(&client_index)) = (
            self.node_indices.get(&supplier),
            self.node_indices.get(&client),
        ) else {
            // Unreachable: every registered element has a node.
            return false;
        };

        self.graph
            .add_edge(supplier_index, client_index, self.dependencies.len());
        self.dependencies.push(dependency);
        true
    }

    /// Returns the retained dependency edges in document order.
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Returns `true` if the element participates in at least one retained
    /// dependency edge, as supplier or client.
    #[must_use]
    pub fn is_covered(&self, id: &ElementId) -> bool {
        self.node_indices.get(id).is_some_and(|&index| {
            self.graph.neighbors_undirected(index).next().is_some()
        })
    }

    /// Returns an iterator over the elements that participate in no
    /// dependency edge, in discovery order.
    pub fn uncovered(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .filter(|element| !self.is_covered(&element.id))
    }

    /// Returns the number of covered elements.
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.elements
            .keys()
            .filter(|id| self.is_covered(id))
            .count()
    }
}
