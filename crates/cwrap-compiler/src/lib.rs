//! Skeleton compiler for cwrap.
//!
//! Two independent walks over the same skeleton tree: the selector collector
//! derives a CSS selector for every styled node and accumulates declarations,
//! the markup emitter renders the element tree. Both expand blueprints with
//! the shared [`BlueprintExpander`](cwrap_skeleton::BlueprintExpander).

pub mod markup;
pub mod selectors;
pub mod stylesheet;

use cwrap_skeleton::BlueprintError;

pub use markup::{emit, emit_body, script_tag, CLIENT_SCRIPT_PATH, SELF_CLOSING_TAGS};
pub use selectors::{collect, collect_styles, StyleAccumulator};
pub use stylesheet::render_stylesheet;

/// Errors that can occur while compiling a skeleton tree.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Blueprint under `{location}` could not be expanded: {source}")]
    MalformedTemplate {
        location: String,
        #[source]
        source: BlueprintError,
    },
}

impl CompileError {
    pub(crate) fn template(location: impl Into<String>, source: BlueprintError) -> Self {
        CompileError::MalformedTemplate {
            location: location.into(),
            source,
        }
    }
}
