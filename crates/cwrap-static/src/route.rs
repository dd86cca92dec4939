//! Compilation of a single route.

use std::fs;
use std::path::Path;

use cwrap_compiler::{collect_styles, emit_body, render_stylesheet};
use cwrap_skeleton::{load_skeleton, BlueprintExpander, Skeleton};

use crate::builder::BuildError;
use crate::templates::{HeadContext, TemplateEngine};

/// Output file names inside a route's output directory.
pub const HTML_FILE: &str = "index.html";
pub const CSS_FILE: &str = "styles.css";

/// The two documents produced for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRoute {
    pub html: String,
    pub css: String,
}

/// Compiles skeletons into documents.
///
/// Every call collects styles into its own accumulator, which is dropped
/// when the call returns, so one compiler can serve routes in parallel.
pub struct RouteCompiler {
    templates: TemplateEngine,
    expander: BlueprintExpander,
}

impl RouteCompiler {
    /// Create a compiler using the given blueprint expander.
    pub fn new(expander: BlueprintExpander) -> Self {
        if let Ok(prefix) = std::env::var("PAGE_URL") {
            tracing::info!("Page URL prefix: {}", prefix);
        }

        Self {
            templates: TemplateEngine::new(),
            expander,
        }
    }

    /// Compile an in-memory skeleton.
    ///
    /// `depth` is the route's distance from the routes root and only
    /// affects the client script path.
    pub fn compile(&self, skeleton: &Skeleton, depth: usize) -> Result<CompiledRoute, BuildError> {
        let styles = collect_styles(&skeleton.node, &self.expander)?;

        let head_context = HeadContext::from_head(skeleton.head.as_ref());
        let head = self
            .templates
            .render_head(&head_context)
            .map_err(|e| BuildError::Template(e.to_string()))?;

        let body = emit_body(&skeleton.node, depth, &self.expander)?;

        let html = self
            .templates
            .render_page(&head, &body)
            .map_err(|e| BuildError::Template(e.to_string()))?;

        let css = render_stylesheet(skeleton, styles);

        Ok(CompiledRoute { html, css })
    }

    /// Compile the route in `source_dir` and write its documents to `output_dir`.
    pub fn compile_route(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        depth: usize,
    ) -> Result<CompiledRoute, BuildError> {
        let skeleton = load_skeleton(source_dir)?;

        let compiled = self.compile(&skeleton, depth).map_err(|e| match e {
            BuildError::Compile(e) => BuildError::MalformedTemplate {
                path: source_dir.display().to_string(),
                message: e.to_string(),
            },
            other => other,
        })?;

        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| BuildError::WriteFailure {
                path: output_dir.display().to_string(),
                message: e.to_string(),
            })?;
            tracing::debug!("Created output directory {}", output_dir.display());
        }

        write_file(&output_dir.join(HTML_FILE), &compiled.html)?;
        write_file(&output_dir.join(CSS_FILE), &compiled.css)?;

        Ok(compiled)
    }
}

impl Default for RouteCompiler {
    fn default() -> Self {
        Self::new(BlueprintExpander::default())
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    fs::write(path, content).map_err(|e| BuildError::WriteFailure {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::info!("Generated {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cwrap_skeleton::{parse_skeleton, SkeletonError, SKELETON_FILE};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn skeleton(json: &str) -> Skeleton {
        parse_skeleton(json).unwrap()
    }

    #[test]
    fn compiles_in_memory_document() {
        let compiler = RouteCompiler::default();
        let compiled = compiler
            .compile(
                &skeleton(
                    r#"{"element": "body", "head": {"title": "Home"}, "children": [
                        {"element": "div", "style": "color:red;"},
                        {"element": "div", "style": "color:blue;"}
                    ]}"#,
                ),
                0,
            )
            .unwrap();

        assert_eq!(
            compiled.html,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<title>Home</title>
    <link rel="stylesheet" href="styles.css">
</head>
<body><div></div><div></div></body><script src="scripts/cwrapFunctions.js" type="module"></script>
</html>
"#
        );
        assert_eq!(
            compiled.css,
            "body > div:nth-of-type(1) {color:red;}\nbody > div:nth-of-type(2) {color:blue;}\n"
        );
    }

    #[test]
    fn consecutive_compilations_do_not_share_styles() {
        let compiler = RouteCompiler::default();

        let first = compiler
            .compile(
                &skeleton(
                    r#"{"element": "body", "style": "a", "mediaQueries": [{"query": "print", "style": "b"}]}"#,
                ),
                0,
            )
            .unwrap();
        let second = compiler
            .compile(&skeleton(r#"{"element": "body", "children": [{"element": "p"}]}"#), 0)
            .unwrap();

        assert!(first.css.contains("@media (print)"));
        assert_eq!(second.css, "");
    }

    #[test]
    fn writes_index_and_styles() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("routes/about");
        let output = temp.path().join("build/about");
        fs::create_dir_all(&source).unwrap();
        fs::write(
            source.join(SKELETON_FILE),
            r#"{"element": "body", "style": "margin: 0;"}"#,
        )
        .unwrap();

        let compiler = RouteCompiler::default();
        compiler.compile_route(&source, &output, 1).unwrap();

        let html = fs::read_to_string(output.join(HTML_FILE)).unwrap();
        let css = fs::read_to_string(output.join(CSS_FILE)).unwrap();
        assert!(html.contains(r#"<script src="../scripts/cwrapFunctions.js" type="module">"#));
        assert_eq!(css, "body {margin: 0;}\n");
    }

    #[test]
    fn recompiling_is_byte_identical() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("routes");
        let output = temp.path().join("build");
        fs::create_dir_all(&source).unwrap();
        fs::write(
            source.join(SKELETON_FILE),
            r#"{"element": "body", "root": {"--x": "1"}, "children": [
                {"element": "ul", "blueprint": {"count": 3, "element": "li", "text": "cwrapIndex", "style": "a"}}
            ]}"#,
        )
        .unwrap();

        let compiler = RouteCompiler::default();
        compiler.compile_route(&source, &output, 0).unwrap();
        let html = fs::read(output.join(HTML_FILE)).unwrap();
        let css = fs::read(output.join(CSS_FILE)).unwrap();

        compiler.compile_route(&source, &output, 0).unwrap();

        assert_eq!(fs::read(output.join(HTML_FILE)).unwrap(), html);
        assert_eq!(fs::read(output.join(CSS_FILE)).unwrap(), css);
    }

    #[test]
    fn missing_skeleton_writes_nothing() {
        let temp = tempdir().unwrap();
        let output = temp.path().join("build");

        let result = RouteCompiler::default().compile_route(temp.path(), &output, 0);

        assert!(matches!(
            result,
            Err(BuildError::Skeleton(SkeletonError::MissingSkeleton { .. }))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn malformed_blueprint_fails_route() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join(SKELETON_FILE),
            r#"{"element": "body", "blueprint": {"count": "x", "element": "p"}}"#,
        )
        .unwrap();

        let result = RouteCompiler::default().compile_route(temp.path(), &temp.path().join("out"), 0);

        assert!(matches!(result, Err(BuildError::MalformedTemplate { .. })));
    }
}
