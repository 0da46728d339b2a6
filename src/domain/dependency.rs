use super::ElementId;

/// A directed, named relationship between two elements.
///
/// The endpoint names and descriptions are snapshots taken when the edge
/// was retained, not live references into the element registry. The `id`
/// is a display key only: duplicates are permitted and preserved as
/// separate edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The dependency node's own identifier.
    pub id: String,
    /// Identifier of the supplier endpoint.
    pub supplier: ElementId,
    /// Identifier of the client endpoint.
    pub client: ElementId,
    /// Supplier name at extraction time.
    pub supplier_name: Option<String>,
    /// Client name at extraction time.
    pub client_name: Option<String>,
    /// Supplier description at extraction time.
    pub supplier_description: String,
    /// Client description at extraction time.
    pub client_description: String,
}
