//! Parsed form of a level definition.
//!
//! Level files are XML documents. They are parsed into a small owned tree of [`Element`]s that
//! keeps only what the validator looks at: element names, attributes in document order and child
//! elements. Text, comments and processing instructions carry no meaning in the level format and
//! are dropped while building the tree.

use crate::validator::LevelError;

/// Element of a parsed level definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Local name of the element, without namespace.
    name: String,
    /// Attributes as `(name, value)` pairs, in document order.
    attributes: Vec<(String, String)>,
    /// Child elements, in document order.
    children: Vec<Element>,
}

impl Element {
    /// Creates an element with no attributes and no children.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the element with one more attribute appended.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Returns the element with one more child appended.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the local name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the first attribute called `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the names of all attributes, in document order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(key, _)| key.as_str())
    }

    /// Returns the child elements, in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Copies a `roxmltree` element and its element descendants into an owned tree.
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_owned(),
            attributes: node
                .attributes()
                .map(|attribute| (attribute.name().to_owned(), attribute.value().to_owned()))
                .collect(),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .map(Self::from_node)
                .collect(),
        }
    }
}

/// Parses the text of a level file into its root element.
///
/// # Errors
///
/// Returns [`LevelError::Syntax`] when the text is not well-formed XML.
pub fn parse(source: &str) -> Result<Element, LevelError> {
    let document = roxmltree::Document::parse(source)
        .map_err(|err| LevelError::Syntax(err.to_string()))?;

    Ok(Element::from_node(document.root_element()))
}
