//! Selector derivation and style collection.
//!
//! Walks a skeleton tree and records, for every styled node, the selector
//! path derived from its ancestors. `body`, `main` and `footer` are joined
//! as plain child combinators; `div` gets a 1-based `:nth-of-type` index
//! shared by all `div` siblings at one nesting level.

use cwrap_skeleton::{BlueprintExpander, Node};
use indexmap::IndexMap;

use crate::CompileError;

/// Tags joined without positional indexing.
const LANDMARK_TAGS: [&str; 3] = ["body", "main", "footer"];

/// Selector and media-query declarations collected for one compilation.
///
/// Both maps keep insertion order. Re-inserting a selector replaces its
/// declarations but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleAccumulator {
    rules: IndexMap<String, String>,
    media: IndexMap<String, IndexMap<String, String>>,
}

impl StyleAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the declarations for a selector.
    pub fn insert_rule(&mut self, selector: impl Into<String>, style: impl Into<String>) {
        self.rules.insert(selector.into(), style.into());
    }

    /// Set the declarations for a selector under `@media (query)`.
    pub fn insert_media(
        &mut self,
        query: impl Into<String>,
        selector: impl Into<String>,
        style: impl Into<String>,
    ) {
        self.media
            .entry(query.into())
            .or_default()
            .insert(selector.into(), style.into());
    }

    /// Selector rules in insertion order.
    pub fn rules(&self) -> &IndexMap<String, String> {
        &self.rules
    }

    /// Media queries in insertion order, each with its selector rules.
    pub fn media_queries(&self) -> &IndexMap<String, IndexMap<String, String>> {
        &self.media
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.media.is_empty()
    }
}

/// Collect the styles of a whole tree into a fresh accumulator.
pub fn collect_styles(
    root: &Node,
    expander: &BlueprintExpander,
) -> Result<StyleAccumulator, CompileError> {
    let mut styles = StyleAccumulator::new();
    let mut div_counts = Vec::new();
    collect(root, "", &mut div_counts, &mut styles, expander)?;
    Ok(styles)
}

/// Record the styles of `node` and its descendants.
///
/// Returns the node's own selector, or `parent` unchanged for inert nodes.
pub fn collect(
    node: &Node,
    parent: &str,
    div_counts: &mut Vec<usize>,
    styles: &mut StyleAccumulator,
    expander: &BlueprintExpander,
) -> Result<String, CompileError> {
    let Some(element) = node.element.as_deref() else {
        return Ok(parent.to_string());
    };

    let mut selector = parent.to_string();

    if LANDMARK_TAGS.contains(&element) {
        if !parent.is_empty() {
            selector.push_str(" > ");
        }
        selector.push_str(element);
    } else if element == "div" {
        if div_counts.is_empty() {
            div_counts.push(0);
        }
        let position = div_counts.len() - 1;
        div_counts[position] += 1;
        selector.push_str(&format!(" > div:nth-of-type({})", div_counts[position]));
    } else {
        selector.push_str(" > ");
        selector.push_str(element);
    }

    if let Some(class) = &node.class {
        selector.push('.');
        selector.push_str(class);
    }

    if let Some(style) = &node.style {
        styles.insert_rule(selector.as_str(), style.as_str());
    }

    for extension in &node.extend {
        styles.insert_rule(
            format!("{}{}", selector, extension.extension),
            extension.style.as_str(),
        );
    }

    for query in &node.media_queries {
        styles.insert_media(query.query.as_str(), selector.as_str(), query.style.as_str());
    }

    // Blueprint instances share the current nesting level.
    if let Some(blueprint) = &node.blueprint {
        let instances = expander
            .instances(blueprint)
            .map_err(|e| CompileError::template(selector.as_str(), e))?;
        for instance in &instances {
            collect(instance, &selector, div_counts, styles, expander)?;
        }
    }

    if !node.children.is_empty() {
        div_counts.push(0);
        for child in &node.children {
            collect(child, &selector, div_counts, styles, expander)?;
        }
        div_counts.pop();
    }

    Ok(selector)
}
