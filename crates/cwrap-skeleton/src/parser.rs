//! Skeleton loading.

use std::fs;
use std::path::Path;

use crate::model::Skeleton;

/// File name of the skeleton document inside a route directory.
pub const SKELETON_FILE: &str = "skeleton.json";

/// Errors that can occur when loading a skeleton.
#[derive(Debug, thiserror::Error)]
pub enum SkeletonError {
    #[error("Could not open {path}: skeleton not found")]
    MissingSkeleton { path: String },

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Malformed JSON in {path}: {message}")]
    MalformedJson { path: String, message: String },
}

/// Parse a skeleton document from JSON text.
pub fn parse_skeleton(source: &str) -> Result<Skeleton, serde_json::Error> {
    serde_json::from_str(source)
}

/// Load `skeleton.json` from a route directory.
pub fn load_skeleton(route_dir: &Path) -> Result<Skeleton, SkeletonError> {
    let path = route_dir.join(SKELETON_FILE);

    if !path.is_file() {
        return Err(SkeletonError::MissingSkeleton {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(&path).map_err(|e| SkeletonError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    parse_skeleton(&content).map_err(|e| SkeletonError::MalformedJson {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
