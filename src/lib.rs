//! Requirements Traceability for UML Models
//!
//! Extracts use cases, requirements and the "Dependency" relationships
//! between them from a UML model serialized as an XMI document, and
//! classifies every element as covered or uncovered.

pub mod domain;
pub use domain::{Dependency, Element, ElementId, ElementKind, TraceGraph};

/// Extraction of the traceability graph from XMI interchange documents.
pub mod extract;
pub use extract::{ExtractOptions, LoadError};

/// Report shaping consumed by presentation and export layers.
pub mod report;
pub use report::{CoverageMatrix, CoverageSummary, DependencyRow};
