//! Blueprint expansion.
//!
//! A blueprint is instantiated by deep-cloning its template and replacing
//! every placeholder token (`cwrapIndex`, optionally `cwrapIndex+N`) found in
//! any string of the template, keys included, with the running index. The
//! replacement is not scoped: tokens inside nested blueprints are rewritten
//! by the outer expansion as well.

use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::model::{AttrValue, Attributes, Blueprint, Count, Extension, MediaQuery, Node};

/// Placeholder used when none is configured.
pub const DEFAULT_PLACEHOLDER: &str = "cwrapIndex";

/// Errors that can occur while expanding a blueprint.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    #[error("Malformed blueprint template: {0}")]
    MalformedTemplate(String),

    #[error("Invalid placeholder name: {0}")]
    InvalidPlaceholder(String),
}

/// Expands blueprint templates for one placeholder name.
#[derive(Debug, Clone)]
pub struct BlueprintExpander {
    placeholder: String,
    pattern: Regex,
}

impl BlueprintExpander {
    /// Create an expander for the given placeholder name.
    pub fn new(placeholder: &str) -> Result<Self, BlueprintError> {
        if placeholder.is_empty() {
            return Err(BlueprintError::InvalidPlaceholder(
                "placeholder must not be empty".to_string(),
            ));
        }

        let pattern = Regex::new(&format!(r"{}(?:\+(-?\d+))?", regex::escape(placeholder)))
            .map_err(|e| BlueprintError::InvalidPlaceholder(e.to_string()))?;

        Ok(Self {
            placeholder: placeholder.to_string(),
            pattern,
        })
    }

    /// The placeholder name this expander replaces.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Produce one concrete copy of `template` for `index`.
    pub fn expand(&self, template: &Node, index: i64) -> Result<Node, BlueprintError> {
        self.substitute_node(template, index)
    }

    /// Expand a blueprint into one node per iteration, in order.
    pub fn instances(&self, blueprint: &Blueprint) -> Result<Vec<Node>, BlueprintError> {
        let count = resolve_count(&blueprint.count)?;

        (0..count)
            .map(|index| self.expand(&blueprint.template, index))
            .collect()
    }

    /// Replace every placeholder token in `text`.
    pub fn substitute<'a>(&self, text: &'a str, index: i64) -> Result<Cow<'a, str>, BlueprintError> {
        if !self.pattern.is_match(text) {
            return Ok(Cow::Borrowed(text));
        }

        let mut failure = None;
        let replaced = self.pattern.replace_all(text, |caps: &Captures| {
            let Some(offset) = caps.get(1) else {
                return index.to_string();
            };

            match offset
                .as_str()
                .parse::<i64>()
                .ok()
                .and_then(|offset| index.checked_add(offset))
            {
                Some(value) => value.to_string(),
                None => {
                    failure.get_or_insert_with(|| {
                        format!("offset in `{}` is out of range", &caps[0])
                    });
                    String::new()
                }
            }
        });

        match failure {
            Some(message) => Err(BlueprintError::MalformedTemplate(message)),
            None => Ok(Cow::Owned(replaced.into_owned())),
        }
    }

    fn substitute_string(&self, text: &str, index: i64) -> Result<String, BlueprintError> {
        Ok(self.substitute(text, index)?.into_owned())
    }

    fn substitute_option(
        &self,
        text: &Option<String>,
        index: i64,
    ) -> Result<Option<String>, BlueprintError> {
        text.as_deref()
            .map(|t| self.substitute_string(t, index))
            .transpose()
    }

    fn substitute_attributes(
        &self,
        attributes: &Attributes,
        index: i64,
    ) -> Result<Attributes, BlueprintError> {
        attributes
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    AttrValue::String(s) => AttrValue::String(self.substitute_string(s, index)?),
                    other => other.clone(),
                };
                Ok((self.substitute_string(key, index)?, value))
            })
            .collect()
    }

    fn substitute_node(&self, node: &Node, index: i64) -> Result<Node, BlueprintError> {
        let extend = node
            .extend
            .iter()
            .map(|e| {
                Ok(Extension {
                    extension: self.substitute_string(&e.extension, index)?,
                    style: self.substitute_string(&e.style, index)?,
                })
            })
            .collect::<Result<Vec<_>, BlueprintError>>()?;

        let media_queries = node
            .media_queries
            .iter()
            .map(|m| {
                Ok(MediaQuery {
                    query: self.substitute_string(&m.query, index)?,
                    style: self.substitute_string(&m.style, index)?,
                })
            })
            .collect::<Result<Vec<_>, BlueprintError>>()?;

        let blueprint = match &node.blueprint {
            Some(inner) => Some(Box::new(Blueprint {
                count: match &inner.count {
                    Count::Literal(n) => Count::Literal(*n),
                    Count::Expression(s) => Count::Expression(self.substitute_string(s, index)?),
                },
                template: self.substitute_node(&inner.template, index)?,
            })),
            None => None,
        };

        let children = node
            .children
            .iter()
            .map(|child| self.substitute_node(child, index))
            .collect::<Result<Vec<_>, BlueprintError>>()?;

        Ok(Node {
            element: self.substitute_option(&node.element, index)?,
            class: self.substitute_option(&node.class, index)?,
            style: self.substitute_option(&node.style, index)?,
            extend,
            media_queries,
            blueprint,
            children,
            attributes: self.substitute_attributes(&node.attributes, index)?,
            text: self.substitute_option(&node.text, index)?,
        })
    }
}

impl Default for BlueprintExpander {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER).expect("Invalid default placeholder")
    }
}

/// Expand `template` once, replacing `placeholder` with `index`.
pub fn expand(template: &Node, placeholder: &str, index: i64) -> Result<Node, BlueprintError> {
    BlueprintExpander::new(placeholder)?.expand(template, index)
}

/// Resolve a repeat count. Negative counts expand to nothing.
fn resolve_count(count: &Count) -> Result<i64, BlueprintError> {
    let value = match count {
        Count::Literal(n) => *n,
        Count::Expression(s) => s.trim().parse::<i64>().map_err(|_| {
            BlueprintError::MalformedTemplate(format!("blueprint count `{}` is not an integer", s))
        })?,
    };

    Ok(value.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blueprint(json: &str) -> Blueprint {
        serde_json::from_str(json).unwrap()
    }

    fn texts(nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| n.text.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn substitutes_bare_index() {
        let expander = BlueprintExpander::default();
        let nodes = expander
            .instances(&blueprint(r#"{"count": 3, "element": "li", "text": "Item cwrapIndex"}"#))
            .unwrap();

        assert_eq!(texts(&nodes), vec!["Item 0", "Item 1", "Item 2"]);
    }

    #[test]
    fn applies_positive_offset() {
        let expander = BlueprintExpander::default();
        let nodes = expander
            .instances(&blueprint(r#"{"count": 3, "element": "li", "text": "cwrapIndex+5"}"#))
            .unwrap();

        assert_eq!(texts(&nodes), vec!["5", "6", "7"]);
    }

    #[test]
    fn applies_negative_offset() {
        let expander = BlueprintExpander::default();
        let nodes = expander
            .instances(&blueprint(r#"{"count": 2, "element": "li", "text": "cwrapIndex+-1"}"#))
            .unwrap();

        assert_eq!(texts(&nodes), vec!["-1", "0"]);
    }

    #[test]
    fn replaces_every_field_and_attribute_keys() {
        let expander = BlueprintExpander::default();
        let template: Node = serde_json::from_str(
            r#"{
                "element": "img",
                "class": "photo-cwrapIndex",
                "attributes": {"src": "img/cwrapIndex+1.png", "data-cwrapIndex": "x"},
                "extend": [{"extension": ":nth-child(cwrapIndex)", "style": "order: cwrapIndex;"}],
                "mediaQueries": [{"query": "min-width: cwrapIndex00px", "style": "x"}]
            }"#,
        )
        .unwrap();

        let node = expander.expand(&template, 4).unwrap();

        assert_eq!(node.class.as_deref(), Some("photo-4"));
        assert_eq!(node.attributes["src"].to_string(), "img/5.png");
        assert!(node.attributes.contains_key("data-4"));
        assert_eq!(node.extend[0].extension, ":nth-child(4)");
        assert_eq!(node.extend[0].style, "order: 4;");
        assert_eq!(node.media_queries[0].query, "min-width: 400px");
    }

    #[test]
    fn copies_are_independent() {
        let expander = BlueprintExpander::default();
        let template: Node =
            serde_json::from_str(r#"{"element": "p", "children": [{"element": "span", "text": "cwrapIndex"}]}"#)
                .unwrap();

        let first = expander.expand(&template, 0).unwrap();
        let second = expander.expand(&template, 1).unwrap();

        assert_eq!(first.children[0].text.as_deref(), Some("0"));
        assert_eq!(second.children[0].text.as_deref(), Some("1"));
        assert_eq!(template.children[0].text.as_deref(), Some("cwrapIndex"));
    }

    #[test]
    fn outer_expansion_rewrites_nested_blueprints() {
        let expander = BlueprintExpander::default();
        let outer = blueprint(
            r#"{
                "count": 3,
                "element": "ul",
                "blueprint": {"count": 2, "element": "li", "text": "cwrapIndex+10"}
            }"#,
        );

        let mut leaves = Vec::new();
        for node in expander.instances(&outer).unwrap() {
            let inner = node.blueprint.as_ref().unwrap();
            leaves.extend(expander.instances(inner).unwrap());
        }

        assert_eq!(leaves.len(), 6);
        assert_eq!(texts(&leaves), vec!["10", "10", "11", "11", "12", "12"]);
    }

    #[test]
    fn nested_count_can_use_outer_index() {
        let expander = BlueprintExpander::default();
        let outer = blueprint(
            r#"{"count": 3, "element": "ul", "blueprint": {"count": "cwrapIndex+1", "element": "li"}}"#,
        );

        let sizes: Vec<usize> = expander
            .instances(&outer)
            .unwrap()
            .iter()
            .map(|n| expander.instances(n.blueprint.as_ref().unwrap()).unwrap().len())
            .collect();

        assert_eq!(sizes, vec![1, 2, 3]);
    }

    #[test]
    fn non_numeric_count_is_malformed() {
        let expander = BlueprintExpander::default();
        let result = expander.instances(&blueprint(r#"{"count": "many", "element": "li"}"#));

        assert!(matches!(result, Err(BlueprintError::MalformedTemplate(_))));
    }

    #[test]
    fn overflowing_offset_is_malformed() {
        let expander = BlueprintExpander::default();
        let result = expander.substitute("cwrapIndex+99999999999999999999", 1);

        assert!(matches!(result, Err(BlueprintError::MalformedTemplate(_))));
    }

    #[test]
    fn negative_count_expands_to_nothing() {
        let expander = BlueprintExpander::default();
        let nodes = expander
            .instances(&blueprint(r#"{"count": -2, "element": "li"}"#))
            .unwrap();

        assert!(nodes.is_empty());
    }

    #[test]
    fn custom_placeholder() {
        let template = Node {
            text: Some("row-$i+2".to_string()),
            ..Node::element("tr")
        };

        let node = expand(&template, "$i", 1).unwrap();

        assert_eq!(node.text.as_deref(), Some("row-3"));
    }

    #[test]
    fn rejects_empty_placeholder() {
        assert!(matches!(
            BlueprintExpander::new(""),
            Err(BlueprintError::InvalidPlaceholder(_))
        ));
    }

    #[test]
    fn leaves_text_without_tokens_borrowed() {
        let expander = BlueprintExpander::default();
        let result = expander.substitute("plain", 3).unwrap();

        assert!(matches!(result, Cow::Borrowed("plain")));
    }
}
