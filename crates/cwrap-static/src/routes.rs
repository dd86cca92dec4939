//! Route discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A route directory found under the routes root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Route directory on disk
    pub source_dir: PathBuf,

    /// Path relative to the routes root (empty for the root itself)
    pub relative_path: PathBuf,

    /// Number of directories between the route and the routes root
    pub depth: usize,
}

impl Route {
    /// Where this route's output lands under `output_root`.
    pub fn output_dir(&self, output_root: &Path) -> PathBuf {
        output_root.join(&self.relative_path)
    }

    /// Route path with `/` separators, as shown to the editor.
    pub fn url_path(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// List the routes root and every directory below it, in pre-order.
///
/// Siblings are sorted by name so that builds are reproducible.
pub fn discover_routes(routes_root: &Path) -> Vec<Route> {
    WalkDir::new(routes_root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|entry| {
            let relative_path = entry
                .path()
                .strip_prefix(routes_root)
                .unwrap_or(entry.path())
                .to_path_buf();

            Route {
                source_dir: entry.path().to_path_buf(),
                relative_path,
                depth: entry.depth(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn lists_root_then_nested_routes_in_preorder() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("routes");
        fs::create_dir_all(root.join("blog/first-post")).unwrap();
        fs::create_dir_all(root.join("about")).unwrap();
        fs::write(root.join("skeleton.json"), "{}").unwrap();

        let routes = discover_routes(&root);
        let paths: Vec<String> = routes.iter().map(Route::url_path).collect();

        assert_eq!(paths, vec!["", "about", "blog", "blog/first-post"]);
        assert_eq!(
            routes.iter().map(|r| r.depth).collect::<Vec<_>>(),
            vec![0, 1, 1, 2]
        );
    }

    #[test]
    fn mirrors_output_directory() {
        let route = Route {
            source_dir: PathBuf::from("routes/blog/post"),
            relative_path: PathBuf::from("blog/post"),
            depth: 2,
        };

        assert_eq!(
            route.output_dir(Path::new("build")),
            PathBuf::from("build/blog/post")
        );
    }

    #[test]
    fn missing_root_yields_nothing() {
        let temp = tempdir().unwrap();

        assert!(discover_routes(&temp.path().join("nope")).is_empty());
    }
}
