use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// An opaque, document-unique identifier for a model element.
///
/// Identifiers are taken verbatim from the `xmi:id` attribute of the
/// document. They are never empty for a valid node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(NonEmptyString);

impl ElementId {
    /// Creates a new `ElementId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyIdError`] if the string is empty.
    pub fn new(s: String) -> Result<Self, EmptyIdError> {
        let non_empty = NonEmptyString::new(s).map_err(|_| EmptyIdError)?;
        Ok(Self(non_empty))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ElementId {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ElementId {
    type Error = EmptyIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for ElementId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Error returned when an element identifier is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("element identifier must not be empty")]
pub struct EmptyIdError;

/// The kind of a model element, derived from the location strategy that
/// found it rather than stored on the element itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A use case, located directly by its type discriminant.
    UseCase,
    /// A requirement instance, located through its marker classifier.
    Requirement,
}

impl ElementKind {
    /// Returns the kind as a display string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UseCase => "UseCase",
            Self::Requirement => "Requirement",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A modeled element of interest: a use case or a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The element's document-unique identifier.
    pub id: ElementId,
    /// Human-readable label. `None` when the `name` attribute is absent.
    pub name: Option<String>,
    /// How the element was located.
    pub kind: ElementKind,
    /// Free text recovered from the element's attached comment node.
    /// Empty when no comment is attached.
    pub description: String,
}

impl Element {
    /// Returns the element's name, or a placeholder for unnamed elements.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}
