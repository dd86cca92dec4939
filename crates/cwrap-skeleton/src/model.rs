//! Typed view of a skeleton document.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// Attribute mapping, kept in document order.
pub type Attributes = IndexMap<String, AttrValue>;

/// A scalar attribute value.
///
/// Skeletons are hand-edited, so numbers and booleans are accepted wherever
/// a string is expected and rendered the way they were written.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::String(s) => f.write_str(s),
            AttrValue::Number(n) => write!(f, "{}", n),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

/// Read a string, number or boolean as its written text.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<AttrValue>::deserialize(deserializer)?.map(|value| value.to_string()))
}

/// One element of the page tree, or an inert styling container when
/// `element` is absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Tag name
    #[serde(default)]
    pub element: Option<String>,

    /// Single class token
    #[serde(default, deserialize_with = "scalar_string")]
    pub class: Option<String>,

    /// Declaration block for the node's own selector
    #[serde(default, deserialize_with = "scalar_string")]
    pub style: Option<String>,

    /// Suffixed selectors (pseudo-classes and the like)
    #[serde(default)]
    pub extend: Vec<Extension>,

    /// Declarations scoped under `@media` blocks
    #[serde(default)]
    pub media_queries: Vec<MediaQuery>,

    /// Repeated sub-tree
    #[serde(default)]
    pub blueprint: Option<Box<Blueprint>>,

    /// Nested elements
    #[serde(default)]
    pub children: Vec<Node>,

    /// Literal HTML attributes
    #[serde(default)]
    pub attributes: Attributes,

    /// Element content
    #[serde(default, deserialize_with = "scalar_string")]
    pub text: Option<String>,
}

impl Node {
    /// Create a node for the given tag.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            element: Some(tag.into()),
            ..Default::default()
        }
    }

    /// Nodes without a tag emit nothing and contribute no selectors.
    pub fn is_inert(&self) -> bool {
        self.element.is_none()
    }
}

/// An extra selector formed by appending `extension` to the node's selector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Extension {
    #[serde(default)]
    pub extension: String,
    #[serde(default)]
    pub style: String,
}

/// Declarations applied to a selector inside `@media (query)`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub style: String,
}

/// A template sub-tree instantiated `count` times.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Blueprint {
    /// Number of instances
    pub count: Count,

    /// The template node; its fields sit next to `count` in the document
    #[serde(flatten)]
    pub template: Node,
}

/// A blueprint repeat count.
///
/// Counts inside nested blueprints may themselves reference the outer
/// index (`"count": "cwrapIndex+1"`), so a string form is accepted and
/// resolved after substitution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Literal(i64),
    Expression(String),
}

impl Default for Count {
    fn default() -> Self {
        Count::Literal(0)
    }
}

/// `<head>` contents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub title: Option<String>,

    /// One `<link>` per entry, attributes in document order
    #[serde(default)]
    pub link: Vec<Attributes>,

    /// One `<meta>` per entry, attributes in document order
    #[serde(default)]
    pub meta: Vec<Attributes>,
}

/// An `@font-face` descriptor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Font {
    #[serde(rename = "font-family", default)]
    pub font_family: String,

    #[serde(default)]
    pub src: String,

    #[serde(rename = "font-display", default)]
    pub font_display: Option<String>,
}

/// A named, reusable rule declared at the document root.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomRule {
    /// `"class"` for a `.name` selector, anything else for a bare tag name
    #[serde(rename = "type", default)]
    pub kind: String,

    pub name: String,

    #[serde(default)]
    pub style: String,

    #[serde(default)]
    pub media_queries: Vec<MediaQuery>,
}

impl ClassroomRule {
    /// The selector this rule is emitted under.
    pub fn selector(&self) -> String {
        if self.kind == "class" {
            format!(".{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// A whole route document: the root node plus root-only fields.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Skeleton {
    #[serde(flatten)]
    pub node: Node,

    #[serde(default)]
    pub head: Option<Head>,

    #[serde(default)]
    pub fonts: Vec<Font>,

    /// CSS custom properties for the `:root` block
    #[serde(default)]
    pub root: IndexMap<String, AttrValue>,

    #[serde(default)]
    pub classroom: Vec<ClassroomRule>,
}
