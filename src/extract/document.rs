//! A prepared index over the nodes of interest in an XMI document.
//!
//! The index is built in a single streaming pass and replaces repeated
//! full-tree searches: every node tagged `packagedElement` or
//! `nestedClassifier` is captured with its relevant attributes and the
//! body text of the first owned comment reachable beneath it, and can be
//! looked up by identifier afterwards in O(1).

use std::{collections::HashMap, io};

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

/// Errors that can occur when loading a model document.
#[derive(Debug, thiserror::Error)]
#[error("failed to read model document")]
pub enum LoadError {
    /// The document file was not found.
    NotFound,
    /// An I/O error occurred.
    Io(#[from] io::Error),
    /// The document is not well-formed XML.
    Xml(#[from] quick_xml::Error),
}

/// The structural role under which a node was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeRole {
    /// A `packagedElement` node.
    PackagedElement,
    /// A `nestedClassifier` node, nested inside a containing classifier.
    NestedClassifier,
}

/// A captured element node with the attributes the extraction cares about.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) role: NodeRole,
    pub(crate) xmi_type: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) classifier: Option<String>,
    pub(crate) supplier: Option<String>,
    pub(crate) client: Option<String>,
    /// Body text of the first owned comment found beneath this node.
    pub(crate) comment: Option<String>,
    /// Whether an owned comment has already been claimed for this node.
    /// Only the first one counts, even when it carries no body.
    comment_seen: bool,
}

impl Node {
    fn new(role: NodeRole) -> Self {
        Self {
            role,
            xmi_type: None,
            id: None,
            name: None,
            classifier: None,
            supplier: None,
            client: None,
            comment: None,
            comment_seen: false,
        }
    }

    /// Returns `true` if the node's type discriminant equals `xmi_type`.
    pub(crate) fn type_is(&self, xmi_type: &str) -> bool {
        self.xmi_type.as_deref() == Some(xmi_type)
    }
}

/// Classification of an opening tag.
enum Tag {
    /// A captured element node, by index into the node list.
    Element(usize),
    Comment,
    Body,
    Other,
}

/// One open XML element during the streaming pass.
#[derive(Debug)]
enum Frame {
    /// A captured element node, by index into the node list.
    Element(usize),
    /// An `ownedComment`, carrying the captured elements it describes.
    /// Empty when every enclosing element already claimed a comment.
    Comment { owners: Vec<usize>, body_seen: bool },
    /// A `body` whose text is being collected for the given owners.
    Body(Vec<usize>),
    /// Anything else.
    Other,
}

/// An index over all captured nodes of a document, in document order.
#[derive(Debug)]
pub(crate) struct DocumentIndex {
    nodes: Vec<Node>,
    /// Identifier to node index; the first node with an identifier wins.
    by_id: HashMap<String, usize>,
}

impl DocumentIndex {
    /// Builds the index from document text in a single streaming pass.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Xml`] when the text is not well-formed XML.
    pub(crate) fn parse(text: &str) -> Result<Self, LoadError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut nodes: Vec<Node> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut text_buffer = String::new();

        loop {
            match reader.read_event().map_err(quick_xml::Error::from)? {
                Event::Start(ref e) => {
                    let frame = match classify(e, &mut nodes, &mut by_id)? {
                        Tag::Element(index) => Frame::Element(index),
                        Tag::Comment => Frame::Comment {
                            owners: claim_comment(&stack, &mut nodes),
                            body_seen: false,
                        },
                        Tag::Body => {
                            text_buffer.clear();
                            Frame::Body(claim_body(&mut stack))
                        }
                        Tag::Other => Frame::Other,
                    };
                    stack.push(frame);
                }
                Event::Empty(ref e) => {
                    // Self-closing nodes carry attributes but no children.
                    match classify(e, &mut nodes, &mut by_id)? {
                        Tag::Comment => {
                            // Still claims the comment slot of its owners.
                            claim_comment(&stack, &mut nodes);
                        }
                        Tag::Body => {
                            // A body with no text resolves to an empty
                            // description, not to the next body's text.
                            for owner in claim_body(&mut stack) {
                                nodes[owner].comment.get_or_insert_with(String::new);
                            }
                        }
                        Tag::Element(_) | Tag::Other => {}
                    }
                }
                Event::Text(ref t) => {
                    if stack.iter().any(|frame| matches!(frame, Frame::Body(_))) {
                        text_buffer.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
                    }
                }
                Event::End(_) => {
                    if let Some(Frame::Body(owners)) = stack.pop() {
                        for owner in owners {
                            if nodes[owner].comment.is_none() {
                                nodes[owner].comment = Some(text_buffer.clone());
                            }
                        }
                        text_buffer.clear();
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { nodes, by_id })
    }

    /// Returns the captured nodes in document order.
    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Re-locates a node by identifier (first occurrence wins).
    pub(crate) fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).map(|&index| &self.nodes[index])
    }

    /// Resolves the description attached to the node with this identifier.
    /// Absence at any level yields the empty string, never an error.
    pub(crate) fn description_of(&self, id: &str) -> String {
        self.node_by_id(id)
            .and_then(|node| node.comment.clone())
            .unwrap_or_default()
    }
}

/// Classifies an opening tag, capturing element nodes as a side effect.
fn classify(
    e: &BytesStart<'_>,
    nodes: &mut Vec<Node>,
    by_id: &mut HashMap<String, usize>,
) -> Result<Tag, LoadError> {
    let role = match e.name().local_name().as_ref() {
        b"packagedElement" => Some(NodeRole::PackagedElement),
        b"nestedClassifier" => Some(NodeRole::NestedClassifier),
        b"ownedComment" => return Ok(Tag::Comment),
        b"body" => return Ok(Tag::Body),
        _ => None,
    };

    let Some(role) = role else {
        return Ok(Tag::Other);
    };

    let node = read_node(e, role)?;
    let index = nodes.len();
    if let Some(id) = &node.id {
        by_id.entry(id.clone()).or_insert(index);
    }
    nodes.push(node);
    Ok(Tag::Element(index))
}

/// Collects the open captured elements that have not claimed a comment
/// yet, and marks them claimed. The comment describes all of them: it is
/// the first comment reachable beneath each.
fn claim_comment(stack: &[Frame], nodes: &mut [Node]) -> Vec<usize> {
    let owners: Vec<usize> = stack
        .iter()
        .filter_map(|frame| match frame {
            Frame::Element(index) if !nodes[*index].comment_seen => Some(*index),
            _ => None,
        })
        .collect();
    for &owner in &owners {
        nodes[owner].comment_seen = true;
    }
    owners
}

/// Takes the owners of the nearest enclosing comment, if it has not seen
/// a body yet. Later bodies of the same comment are ignored.
fn claim_body(stack: &mut [Frame]) -> Vec<usize> {
    stack
        .iter_mut()
        .rev()
        .find_map(|frame| match frame {
            Frame::Comment { owners, body_seen } => Some(if *body_seen {
                Vec::new()
            } else {
                *body_seen = true;
                owners.clone()
            }),
            _ => None,
        })
        .unwrap_or_default()
}

/// Reads the attributes of interest from an element tag.
fn read_node(e: &BytesStart<'_>, role: NodeRole) -> Result<Node, LoadError> {
    let mut node = Node::new(role);

    for attribute in e.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let value = attribute
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();

        match attribute.key.as_ref() {
            b"xmi:id" => node.id = Some(value),
            b"xmi:type" => node.xmi_type = Some(value),
            b"name" => node.name = Some(value),
            b"classifier" => node.classifier = Some(value),
            b"supplier" => node.supplier = Some(value),
            b"client" => node.client = Some(value),
            _ => {}
        }
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_both_roles_with_attributes() {
        let index = DocumentIndex::parse(
            r#"<model>
                <packagedElement xmi:type="uml:UseCase" xmi:id="UC1" name="Login"/>
                <packagedElement xmi:type="uml:Class" xmi:id="CL1" name="Container">
                    <nestedClassifier xmi:type="uml:UseCase" xmi:id="UC2" name="Nested"/>
                </packagedElement>
            </model>"#,
        )
        .unwrap();

        let nodes = index.nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].role, NodeRole::PackagedElement);
        assert_eq!(nodes[0].id.as_deref(), Some("UC1"));
        assert_eq!(nodes[0].name.as_deref(), Some("Login"));
        assert!(nodes[0].type_is("uml:UseCase"));
        assert_eq!(nodes[2].role, NodeRole::NestedClassifier);
        assert_eq!(nodes[2].id.as_deref(), Some("UC2"));
    }

    #[test]
    fn comment_body_is_attached_to_the_enclosing_node() {
        let index = DocumentIndex::parse(
            r#"<model>
                <packagedElement xmi:id="E1" name="A">
                    <ownedComment xmi:id="C1">
                        <body>The description.</body>
                    </ownedComment>
                </packagedElement>
                <packagedElement xmi:id="E2" name="B"/>
            </model>"#,
        )
        .unwrap();

        assert_eq!(index.description_of("E1"), "The description.");
        assert_eq!(index.description_of("E2"), "");
        assert_eq!(index.description_of("missing"), "");
    }

    #[test]
    fn only_the_first_comment_counts() {
        // A first comment without a body claims the slot; the second
        // comment's body must not take over.
        let index = DocumentIndex::parse(
            r#"<model>
                <packagedElement xmi:id="E1" name="A">
                    <ownedComment xmi:id="C1"/>
                    <ownedComment xmi:id="C2">
                        <body>Late text.</body>
                    </ownedComment>
                </packagedElement>
            </model>"#,
        )
        .unwrap();

        assert_eq!(index.description_of("E1"), "");
    }

    #[test]
    fn only_the_first_body_counts() {
        let index = DocumentIndex::parse(
            r#"<model>
                <packagedElement xmi:id="E1" name="A">
                    <ownedComment xmi:id="C1">
                        <body/>
                        <body>Second body.</body>
                    </ownedComment>
                </packagedElement>
            </model>"#,
        )
        .unwrap();

        assert_eq!(index.description_of("E1"), "");
    }

    #[test]
    fn nested_comment_describes_unclaimed_ancestors_too() {
        // A comment beneath a nested classifier is the first comment
        // reachable from the container as well.
        let index = DocumentIndex::parse(
            r#"<model>
                <packagedElement xmi:id="CL1" name="Container">
                    <nestedClassifier xmi:type="uml:UseCase" xmi:id="UC1" name="Nested">
                        <ownedComment xmi:id="C1">
                            <body>Nested text.</body>
                        </ownedComment>
                    </nestedClassifier>
                </packagedElement>
            </model>"#,
        )
        .unwrap();

        assert_eq!(index.description_of("UC1"), "Nested text.");
        assert_eq!(index.description_of("CL1"), "Nested text.");
    }

    #[test]
    fn escaped_attribute_values_are_unescaped() {
        let index = DocumentIndex::parse(
            r#"<model><packagedElement xmi:id="E1" name="Fish &amp; Chips"/></model>"#,
        )
        .unwrap();

        assert_eq!(
            index.node_by_id("E1").unwrap().name.as_deref(),
            Some("Fish & Chips")
        );
    }

    #[test]
    fn first_node_wins_id_lookup() {
        let index = DocumentIndex::parse(
            r#"<model>
                <packagedElement xmi:id="X" name="First"/>
                <packagedElement xmi:id="X" name="Second"/>
            </model>"#,
        )
        .unwrap();

        assert_eq!(index.node_by_id("X").unwrap().name.as_deref(), Some("First"));
    }

    #[test]
    fn malformed_markup_is_an_error() {
        let result = DocumentIndex::parse("<model><packagedElement></model>");
        assert!(matches!(result, Err(LoadError::Xml(_))));
    }
}
