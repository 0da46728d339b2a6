//! The extraction pass that turns a document index into a [`TraceGraph`].

use std::{collections::HashSet, fs, io, path::Path};

use tracing::debug;

use super::document::{DocumentIndex, Node, NodeRole};
use crate::domain::{Element, ElementId, ElementKind, TraceGraph};
use crate::extract::LoadError;

/// Type discriminant marking a use case node.
const TYPE_USE_CASE: &str = "uml:UseCase";
/// Type discriminant marking a plain class node.
const TYPE_CLASS: &str = "uml:Class";
/// Type discriminant marking a dependency node.
const TYPE_DEPENDENCY: &str = "uml:Dependency";

/// Tunables of the extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Name of the marker class whose instances are requirements.
    ///
    /// Requirement elements carry no tag of their own; they reference a
    /// class of this name through their `classifier` attribute.
    pub marker: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            marker: "Exigence".to_string(),
        }
    }
}

/// Reads a model document from disk and extracts its traceability graph.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] when the file does not exist,
/// [`LoadError::Io`] on other read failures and [`LoadError::Xml`] when
/// the content is not well-formed XML.
pub fn load(path: &Path, options: &ExtractOptions) -> Result<TraceGraph, LoadError> {
    let text = fs::read_to_string(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })?;

    parse(&text, options)
}

/// Extracts the traceability graph from document text.
///
/// This is a pure function: each call produces a fresh, self-contained
/// graph and is safe to invoke from any number of callers. Per-node
/// anomalies (missing names, missing comments, dangling references)
/// degrade to a smaller-but-consistent graph and are never surfaced as
/// errors; the only failure is an unreadable document.
///
/// # Errors
///
/// Returns [`LoadError::Xml`] when the text is not well-formed XML.
pub fn parse(text: &str, options: &ExtractOptions) -> Result<TraceGraph, LoadError> {
    let index = DocumentIndex::parse(text)?;
    let mut graph = TraceGraph::new();

    // Use cases may sit at the top level or nest inside a containing
    // classifier; the same pass finds both placements.
    let use_cases = index
        .nodes()
        .iter()
        .filter(|node| node.type_is(TYPE_USE_CASE));
    merge(&mut graph, &index, use_cases, ElementKind::UseCase);

    // Requirements are reached indirectly: marker classes name the
    // requirement category, and the actual instances reference one of
    // them through their `classifier` attribute. Requirements merge
    // after use cases and win on identifier collision.
    let marker_ids: HashSet<&str> = index
        .nodes()
        .iter()
        .filter(|node| {
            node.role == NodeRole::PackagedElement
                && node.type_is(TYPE_CLASS)
                && node.name.as_deref() == Some(options.marker.as_str())
        })
        .filter_map(|node| node.id.as_deref())
        .collect();

    let requirements = index.nodes().iter().filter(|node| {
        node.role == NodeRole::PackagedElement
            && node
                .classifier
                .as_deref()
                .is_some_and(|classifier| marker_ids.contains(classifier))
    });
    merge(&mut graph, &index, requirements, ElementKind::Requirement);

    // Dependency edges, in document order. Edges with unresolvable
    // endpoints are dropped by the graph; edges without an identifier of
    // their own are dropped here and do not mark their endpoints covered.
    let dependency_nodes = index.nodes().iter().filter(|node| {
        node.role == NodeRole::PackagedElement && node.type_is(TYPE_DEPENDENCY)
    });
    for node in dependency_nodes {
        let supplier = node.supplier.as_deref().unwrap_or_default();
        let client = node.client.as_deref().unwrap_or_default();

        let Some(id) = node.id.clone() else {
            debug!(supplier, client, "skipped dependency node without an identifier");
            continue;
        };

        graph.insert_dependency(id, supplier, client);
    }

    Ok(graph)
}

/// Merges located element nodes into the registry, resolving each
/// description by re-locating the node by identifier in the index.
fn merge<'a>(
    graph: &mut TraceGraph,
    index: &DocumentIndex,
    nodes: impl Iterator<Item = &'a Node>,
    kind: ElementKind,
) {
    for node in nodes {
        let Some(id) = node
            .id
            .as_deref()
            .and_then(|id| ElementId::try_from(id).ok())
        else {
            debug!(?kind, name = ?node.name, "skipped element node without an identifier");
            continue;
        };

        let description = index.description_of(id.as_str());
        graph.insert_element(Element {
            id,
            name: node.name.clone(),
            kind,
            description,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One use case, one requirement reached through a marker class, and
    /// a dependency linking them.
    const LOGIN_MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001" xmlns:uml="http://www.omg.org/spec/UML/20131001">
  <uml:Model xmi:id="model" name="Model">
    <packagedElement xmi:type="uml:UseCase" xmi:id="UC1" name="Login"/>
    <packagedElement xmi:type="uml:Class" xmi:id="M1" name="Exigence"/>
    <packagedElement xmi:id="R1" name="AuthReq" classifier="M1"/>
    <packagedElement xmi:type="uml:Dependency" xmi:id="D1" supplier="UC1" client="R1"/>
  </uml:Model>
</xmi:XMI>
"#;

    fn ids<'a>(iter: impl Iterator<Item = &'a Element>) -> Vec<&'a str> {
        iter.map(|element| element.id.as_str()).collect()
    }

    #[test]
    fn login_model_is_fully_covered() {
        let graph = parse(LOGIN_MODEL, &ExtractOptions::default()).unwrap();

        assert_eq!(ids(graph.elements()), ["UC1", "R1"]);
        let uc1 = graph.element(&"UC1".try_into().unwrap()).unwrap();
        assert_eq!(uc1.name.as_deref(), Some("Login"));
        assert_eq!(uc1.kind, ElementKind::UseCase);
        let r1 = graph.element(&"R1".try_into().unwrap()).unwrap();
        assert_eq!(r1.name.as_deref(), Some("AuthReq"));
        assert_eq!(r1.kind, ElementKind::Requirement);

        let edges = graph.dependencies();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, "D1");
        assert_eq!(edges[0].supplier_name.as_deref(), Some("Login"));
        assert_eq!(edges[0].client_name.as_deref(), Some("AuthReq"));
        assert_eq!(edges[0].supplier_description, "");
        assert_eq!(edges[0].client_description, "");

        assert_eq!(graph.uncovered().count(), 0);
    }

    #[test]
    fn dangling_client_drops_the_edge() {
        let model = LOGIN_MODEL.replace(r#"client="R1""#, r#"client="R99""#);
        let graph = parse(&model, &ExtractOptions::default()).unwrap();

        assert!(graph.dependencies().is_empty());
        assert_eq!(ids(graph.uncovered()), ["UC1", "R1"]);
    }

    #[test]
    fn marker_class_itself_is_not_an_element() {
        let graph = parse(LOGIN_MODEL, &ExtractOptions::default()).unwrap();
        assert!(graph.element(&"M1".try_into().unwrap()).is_none());
    }

    #[test]
    fn nested_use_cases_are_found() {
        let model = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
  <packagedElement xmi:type="uml:Class" xmi:id="CL1" name="Subsystem">
    <nestedClassifier xmi:type="uml:UseCase" xmi:id="UC1" name="Nested"/>
  </packagedElement>
  <packagedElement xmi:type="uml:UseCase" xmi:id="UC2" name="TopLevel"/>
</xmi:XMI>"#;
        let graph = parse(model, &ExtractOptions::default()).unwrap();

        assert_eq!(ids(graph.elements()), ["UC1", "UC2"]);
        assert!(graph
            .elements()
            .all(|element| element.kind == ElementKind::UseCase));
    }

    #[test]
    fn descriptions_come_from_owned_comments() {
        let model = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
  <packagedElement xmi:type="uml:UseCase" xmi:id="UC1" name="Login">
    <ownedComment xmi:id="C1">
      <body>Allows a user to log in.</body>
    </ownedComment>
  </packagedElement>
  <packagedElement xmi:type="uml:UseCase" xmi:id="UC2" name="Logout"/>
  <packagedElement xmi:type="uml:Dependency" xmi:id="D1" supplier="UC1" client="UC2"/>
</xmi:XMI>"#;
        let graph = parse(model, &ExtractOptions::default()).unwrap();

        let uc1 = graph.element(&"UC1".try_into().unwrap()).unwrap();
        assert_eq!(uc1.description, "Allows a user to log in.");
        let uc2 = graph.element(&"UC2".try_into().unwrap()).unwrap();
        assert_eq!(uc2.description, "");

        let edges = graph.dependencies();
        assert_eq!(edges[0].supplier_description, "Allows a user to log in.");
        assert_eq!(edges[0].client_description, "");
    }

    #[test]
    fn shared_id_resolves_to_requirement() {
        let model = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
  <packagedElement xmi:type="uml:UseCase" xmi:id="X1" name="AsUseCase"/>
  <packagedElement xmi:type="uml:Class" xmi:id="M1" name="Exigence"/>
  <packagedElement xmi:id="X1" name="AsRequirement" classifier="M1"/>
</xmi:XMI>"#;
        let graph = parse(model, &ExtractOptions::default()).unwrap();

        assert_eq!(graph.len(), 1);
        let survivor = graph.element(&"X1".try_into().unwrap()).unwrap();
        assert_eq!(survivor.kind, ElementKind::Requirement);
        assert_eq!(survivor.name.as_deref(), Some("AsRequirement"));
    }

    #[test]
    fn dependency_without_id_is_dropped() {
        let model = LOGIN_MODEL.replace(r#"xmi:id="D1" "#, "");
        let graph = parse(&model, &ExtractOptions::default()).unwrap();

        assert!(graph.dependencies().is_empty());
        assert_eq!(ids(graph.uncovered()), ["UC1", "R1"]);
    }

    #[test]
    fn elements_without_id_are_skipped() {
        let model = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
  <packagedElement xmi:type="uml:UseCase" name="Anonymous"/>
  <packagedElement xmi:type="uml:UseCase" xmi:id="UC1" name="Named"/>
</xmi:XMI>"#;
        let graph = parse(model, &ExtractOptions::default()).unwrap();

        assert_eq!(ids(graph.elements()), ["UC1"]);
    }

    #[test]
    fn missing_name_is_none_not_empty() {
        let model = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
  <packagedElement xmi:type="uml:UseCase" xmi:id="UC1"/>
</xmi:XMI>"#;
        let graph = parse(model, &ExtractOptions::default()).unwrap();

        let uc1 = graph.element(&"UC1".try_into().unwrap()).unwrap();
        assert_eq!(uc1.name, None);
    }

    #[test]
    fn marker_name_is_configurable() {
        let model = LOGIN_MODEL.replace(r#"name="Exigence""#, r#"name="Requirement""#);

        let graph = parse(&model, &ExtractOptions::default()).unwrap();
        assert_eq!(ids(graph.elements()), ["UC1"]);

        let options = ExtractOptions {
            marker: "Requirement".to_string(),
        };
        let graph = parse(&model, &options).unwrap();
        assert_eq!(ids(graph.elements()), ["UC1", "R1"]);
    }

    #[test]
    fn instances_of_any_marker_class_are_requirements() {
        let model = r#"<xmi:XMI xmlns:xmi="http://www.omg.org/spec/XMI/20131001">
  <packagedElement xmi:type="uml:Class" xmi:id="M1" name="Exigence"/>
  <packagedElement xmi:type="uml:Class" xmi:id="M2" name="Exigence"/>
  <packagedElement xmi:id="R1" name="First" classifier="M1"/>
  <packagedElement xmi:id="R2" name="Second" classifier="M2"/>
  <packagedElement xmi:id="R3" name="Stray" classifier="M9"/>
</xmi:XMI>"#;
        let graph = parse(model, &ExtractOptions::default()).unwrap();

        assert_eq!(ids(graph.elements()), ["R1", "R2"]);
    }

    #[test]
    fn malformed_document_is_unreadable() {
        let result = parse("<xmi:XMI><packagedElement></xmi:XMI>", &ExtractOptions::default());
        assert!(matches!(result, Err(LoadError::Xml(_))));
    }

    mod load {
        use tempfile::TempDir;

        use super::*;

        #[test]
        fn reads_a_model_from_disk() {
            let tmp = TempDir::new().unwrap();
            let path = tmp.path().join("model.xmi");
            std::fs::write(&path, LOGIN_MODEL).unwrap();

            let graph = load(&path, &ExtractOptions::default()).unwrap();
            assert_eq!(graph.len(), 2);
            assert_eq!(graph.dependencies().len(), 1);
        }

        #[test]
        fn missing_file_is_not_found() {
            let tmp = TempDir::new().unwrap();
            let result = load(&tmp.path().join("absent.xmi"), &ExtractOptions::default());
            assert!(matches!(result, Err(LoadError::NotFound)));
        }
    }
}
