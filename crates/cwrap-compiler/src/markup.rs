//! Markup emission.

use cwrap_skeleton::{BlueprintExpander, Node};

use crate::CompileError;

/// Tags rendered as `<tag ... />` with no content.
pub const SELF_CLOSING_TAGS: [&str; 6] = ["img", "br", "hr", "input", "meta", "link"];

/// Location of the placeholder-substitution script, relative to the output root.
pub const CLIENT_SCRIPT_PATH: &str = "scripts/cwrapFunctions.js";

/// Render a node and its descendants.
///
/// Text, class and attribute values are written verbatim so that runtime
/// placeholders such as `cwrapGetParams[id]` reach the page untouched.
pub fn emit(node: &Node, expander: &BlueprintExpander) -> Result<String, CompileError> {
    let mut html = String::new();
    emit_into(&mut html, node, expander)?;
    Ok(html)
}

/// Render the page body followed by the client script tag.
///
/// `depth` is the number of directories between the route and the routes root.
pub fn emit_body(
    node: &Node,
    depth: usize,
    expander: &BlueprintExpander,
) -> Result<String, CompileError> {
    let mut html = emit(node, expander)?;
    html.push_str(&script_tag(depth));
    Ok(html)
}

/// The module script tag wiring in the client-side placeholder substitution.
pub fn script_tag(depth: usize) -> String {
    format!(
        r#"<script src="{}{}" type="module"></script>"#,
        "../".repeat(depth),
        CLIENT_SCRIPT_PATH
    )
}

fn emit_into(html: &mut String, node: &Node, expander: &BlueprintExpander) -> Result<(), CompileError> {
    let Some(element) = node.element.as_deref() else {
        return Ok(());
    };

    html.push('<');
    html.push_str(element);

    if let Some(class) = &node.class {
        html.push_str(&format!(r#" class="{}""#, class));
    }

    for (key, value) in &node.attributes {
        html.push_str(&format!(r#" {}="{}""#, key, value));
    }

    if SELF_CLOSING_TAGS.contains(&element) {
        html.push_str(" />");
        return Ok(());
    }

    html.push('>');

    if let Some(text) = &node.text {
        html.push_str(text);
    }

    if let Some(blueprint) = &node.blueprint {
        let instances = expander
            .instances(blueprint)
            .map_err(|e| CompileError::template(format!("<{}>", element), e))?;
        for instance in &instances {
            emit_into(html, instance, expander)?;
        }
    }

    for child in &node.children {
        emit_into(html, child, expander)?;
    }

    html.push_str("</");
    html.push_str(element);
    html.push('>');

    Ok(())
}
