//! Scaffold a cwrap project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cwrap_skeleton::SKELETON_FILE;

use crate::config::project_dir;

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing cwrap...");

    scaffold(config_path, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'cwrap build' to compile the starter page.");

    Ok(())
}

fn scaffold(config_path: &Path, yes: bool) -> Result<()> {
    let root = project_dir(config_path);
    let routes_dir = root.join("routes");

    // Check if routes already exists
    if routes_dir.exists() {
        if !yes {
            tracing::warn!("routes/ directory already exists. Use --yes to overwrite.");
            return Ok(());
        }
    } else {
        fs::create_dir_all(&routes_dir).context("Failed to create routes directory")?;
    }

    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    let skeleton_path = routes_dir.join(SKELETON_FILE);
    if !skeleton_path.exists() || yes {
        fs::write(&skeleton_path, DEFAULT_SKELETON).context("Failed to write skeleton.json")?;
        tracing::info!("Created {}", skeleton_path.display());
    }

    let static_dir = root.join("static");
    if !static_dir.exists() {
        fs::create_dir_all(&static_dir).context("Failed to create static directory")?;
        tracing::info!("Created {}", static_dir.display());
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# cwrap configuration

[project]
# Route directories, one skeleton.json each
routes = "routes"

# Output directory for compiled pages
output = "build"

# Assets mirrored to <output>/static
static_dir = "static"

# Directory that may hold a custom cwrapFunctions.js
scripts = "scripts"

# Blueprint index placeholder
placeholder = "cwrapIndex"

[server]
port = 36969
host = "127.0.0.1"
open = true
"#;

const DEFAULT_SKELETON: &str = r##"{
  "element": "body",
  "style": "margin: 0; font-family: var(--font);",
  "head": {
    "title": "Welcome",
    "meta": [
      { "name": "viewport", "content": "width=device-width, initial-scale=1" }
    ]
  },
  "root": {
    "--font": "system-ui, sans-serif",
    "--accent": "#3b6ea5"
  },
  "classroom": [
    {
      "type": "class",
      "name": "card",
      "style": "padding: 1rem; border: 1px solid var(--accent);",
      "mediaQueries": [
        { "query": "max-width: 600px", "style": "padding: 0.5rem;" }
      ]
    }
  ],
  "children": [
    {
      "element": "main",
      "style": "display: grid; gap: 1rem;",
      "mediaQueries": [
        { "query": "min-width: 800px", "style": "grid-template-columns: repeat(3, 1fr);" }
      ],
      "children": [
        {
          "element": "h1",
          "text": "Hello from cwrap"
        },
        {
          "element": "div",
          "style": "display: contents;",
          "blueprint": {
            "count": 3,
            "element": "div",
            "class": "card",
            "text": "Card cwrapIndex+1",
            "attributes": { "id": "card-cwrapIndex" }
          }
        }
      ]
    },
    {
      "element": "footer",
      "extend": [
        { "extension": ":hover", "style": "color: var(--accent);" }
      ],
      "text": "Built with cwrap"
    }
  ]
}
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use cwrap_skeleton::parse_skeleton;
    use tempfile::tempdir;

    #[test]
    fn starter_skeleton_parses() {
        let skeleton = parse_skeleton(DEFAULT_SKELETON).unwrap();

        assert_eq!(skeleton.node.element.as_deref(), Some("body"));
        assert_eq!(skeleton.classroom.len(), 1);
        assert_eq!(skeleton.node.children.len(), 2);
    }

    #[test]
    fn starter_stylesheet_defines_its_variables() {
        let skeleton = parse_skeleton(DEFAULT_SKELETON).unwrap();
        let css = cwrap_static::RouteCompiler::default()
            .compile(&skeleton, 0)
            .unwrap()
            .css;

        let used: Vec<&str> = css
            .split("var(")
            .skip(1)
            .filter_map(|rest| rest.split(')').next())
            .collect();

        assert!(!used.is_empty());
        for name in used {
            assert!(
                css.contains(&format!("\n{}: ", name)),
                "{} is used but not defined in:\n{}",
                name,
                css
            );
        }
    }

    #[test]
    fn starter_config_parses() {
        let config: crate::config::ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap();

        assert_eq!(config.project.routes, "routes");
        assert_eq!(config.server.port, 36969);
    }

    #[test]
    fn scaffolds_project_layout() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("cwrap.toml");

        scaffold(&config_path, false).unwrap();

        assert!(config_path.exists());
        assert!(temp.path().join("routes").join(SKELETON_FILE).exists());
        assert!(temp.path().join("static").is_dir());
    }

    #[test]
    fn leaves_existing_routes_alone_without_yes() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("cwrap.toml");
        let skeleton = temp.path().join("routes").join(SKELETON_FILE);
        fs::create_dir_all(temp.path().join("routes")).unwrap();
        fs::write(&skeleton, "{}").unwrap();

        scaffold(&config_path, false).unwrap();

        assert_eq!(fs::read_to_string(&skeleton).unwrap(), "{}");
        assert!(!config_path.exists());
    }
}
