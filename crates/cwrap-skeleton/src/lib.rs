//! Skeleton document model for cwrap.
//!
//! A skeleton is the JSON document describing one route: its element tree,
//! per-node styling, repeated "blueprint" blocks and root-level stylesheet
//! sources (fonts, custom properties, classroom rules).

pub mod blueprint;
pub mod model;
pub mod parser;

pub use blueprint::{expand, BlueprintError, BlueprintExpander, DEFAULT_PLACEHOLDER};
pub use model::{
    AttrValue, Attributes, Blueprint, ClassroomRule, Count, Extension, Font, Head, MediaQuery,
    Node, Skeleton,
};
pub use parser::{load_skeleton, parse_skeleton, SkeletonError, SKELETON_FILE};
