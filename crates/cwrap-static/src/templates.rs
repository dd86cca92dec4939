//! Templates for the document shell and `<head>` block.

use cwrap_skeleton::{Attributes, Head};
use minijinja::{context, AutoEscape, Environment};

/// One `name="value"` pair.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Context for rendering the `<head>` block.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct HeadContext {
    /// Page title
    pub title: Option<String>,
    /// `<link>` tags, each a list of attributes
    pub links: Vec<Vec<Attr>>,
    /// `<meta>` tags, each a list of attributes
    pub metas: Vec<Vec<Attr>>,
}

impl HeadContext {
    /// Build the context from a skeleton's `head` field.
    pub fn from_head(head: Option<&Head>) -> Self {
        let Some(head) = head else {
            return Self::default();
        };

        Self {
            title: head.title.clone(),
            links: head.link.iter().map(attrs).collect(),
            metas: head.meta.iter().map(attrs).collect(),
        }
    }
}

fn attrs(attributes: &Attributes) -> Vec<Attr> {
    attributes
        .iter()
        .map(|(name, value)| Attr {
            name: name.clone(),
            value: value.to_string(),
        })
        .collect()
}

/// Template engine using minijinja.
///
/// Skeleton values are emitted verbatim, so auto-escaping is disabled.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        env.add_template("head.html", HEAD_TEMPLATE)
            .expect("Failed to add head template");
        env.add_template("page.html", PAGE_TEMPLATE)
            .expect("Failed to add page template");

        Self { env }
    }

    /// Render the `<head>` block.
    pub fn render_head(&self, head: &HeadContext) -> Result<String, minijinja::Error> {
        self.env.get_template("head.html")?.render(context! {
            title => &head.title,
            links => &head.links,
            metas => &head.metas,
        })
    }

    /// Wrap a rendered head and body into a full document.
    pub fn render_page(&self, head: &str, body: &str) -> Result<String, minijinja::Error> {
        self.env.get_template("page.html")?.render(context! {
            head => head,
            body => body,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const HEAD_TEMPLATE: &str = r##"<head>
{% if title %}<title>{{ title }}</title>
{% endif %}{% for link in links %}    <link{% for attr in link %} {{ attr.name }}="{{ attr.value }}"{% endfor %}>
{% endfor %}{% for meta in metas %}    <meta{% for attr in meta %} {{ attr.name }}="{{ attr.value }}"{% endfor %}>
{% endfor %}    <link rel="stylesheet" href="styles.css">
</head>"##;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
{{ head }}
{{ body }}
</html>
"##;
