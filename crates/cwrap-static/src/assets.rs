//! Shared assets copied next to the compiled routes.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The bundled placeholder-substitution script.
    pub fn client_script() -> &'static str {
        CLIENT_SCRIPT
    }

    /// Mirror `source` into `destination`, returning the number of files copied.
    pub fn copy_dir(source: &Path, destination: &Path) -> io::Result<usize> {
        let mut copied = 0;

        for entry in WalkDir::new(source).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry.path().strip_prefix(source).map_err(io::Error::other)?;
            let target = destination.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
            } else {
                fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    /// Copy `static/favicon/favicon.ico` to the output root.
    ///
    /// Returns `false` when the project has no favicon.
    pub fn copy_favicon(static_dir: &Path, output_dir: &Path) -> io::Result<bool> {
        let source = static_dir.join("favicon").join("favicon.ico");
        if !source.is_file() {
            return Ok(false);
        }

        fs::copy(&source, output_dir.join("favicon.ico"))?;
        Ok(true)
    }

    /// Place `cwrapFunctions.js` under `output/scripts/`.
    ///
    /// The project's own copy wins; otherwise the bundled script is written.
    /// Returns `true` when the project's copy was used.
    pub fn write_client_script(scripts_dir: &Path, output_dir: &Path) -> io::Result<bool> {
        let target_dir = output_dir.join("scripts");
        fs::create_dir_all(&target_dir)?;
        let target = target_dir.join(CLIENT_SCRIPT_NAME);

        let source = scripts_dir.join(CLIENT_SCRIPT_NAME);
        if source.is_file() {
            fs::copy(&source, &target)?;
            Ok(true)
        } else {
            fs::write(&target, Self::client_script())?;
            Ok(false)
        }
    }
}

/// File name of the client script.
pub const CLIENT_SCRIPT_NAME: &str = "cwrapFunctions.js";

// Replaces `cwrapGetParams[key]` in text and attribute values with the
// page's query parameters (the parent frame's when embedded).
const CLIENT_SCRIPT: &str = r#"// cwrap runtime placeholders
const inFrame = window !== window.parent;
const search = inFrame ? window.parent.location.search : window.location.search;
const params = Object.fromEntries(new URLSearchParams(search).entries());
const token = /cwrapGetParams\[(.*?)\]/g;

function resolve(value) {
  return value.replace(token, (_, key) => params[key] ?? "");
}

function visit(node) {
  if (node.nodeType === Node.TEXT_NODE) {
    const next = resolve(node.nodeValue);
    if (next !== node.nodeValue) {
      node.nodeValue = next;
    }
    return;
  }

  if (node.nodeType !== Node.ELEMENT_NODE) {
    return;
  }

  for (const attr of node.attributes) {
    const next = resolve(attr.value);
    if (next !== attr.value) {
      attr.value = next;
    }
  }

  for (const child of node.childNodes) {
    visit(child);
  }
}

visit(document.body);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn client_script_resolves_get_params() {
        let js = AssetPipeline::client_script();
        assert!(js.contains("cwrapGetParams"));
        assert!(js.contains("window.parent.location.search"));
    }

    #[test]
    fn mirrors_nested_directories() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("static");
        fs::create_dir_all(source.join("img/icons")).unwrap();
        fs::write(source.join("img/logo.png"), b"png").unwrap();
        fs::write(source.join("img/icons/a.svg"), b"<svg/>").unwrap();

        let destination = temp.path().join("build/static");
        let copied = AssetPipeline::copy_dir(&source, &destination).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(destination.join("img/icons/a.svg")).unwrap(), b"<svg/>");
    }

    #[test]
    fn copies_favicon_when_present() {
        let temp = tempdir().unwrap();
        let static_dir = temp.path().join("static");
        let out = temp.path().join("build");
        fs::create_dir_all(&out).unwrap();

        assert!(!AssetPipeline::copy_favicon(&static_dir, &out).unwrap());

        fs::create_dir_all(static_dir.join("favicon")).unwrap();
        fs::write(static_dir.join("favicon/favicon.ico"), b"ico").unwrap();

        assert!(AssetPipeline::copy_favicon(&static_dir, &out).unwrap());
        assert!(out.join("favicon.ico").exists());
    }

    #[test]
    fn prefers_project_client_script() {
        let temp = tempdir().unwrap();
        let scripts = temp.path().join("scripts");
        let out = temp.path().join("build");

        assert!(!AssetPipeline::write_client_script(&scripts, &out).unwrap());
        assert_eq!(
            fs::read_to_string(out.join("scripts").join(CLIENT_SCRIPT_NAME)).unwrap(),
            CLIENT_SCRIPT
        );

        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join(CLIENT_SCRIPT_NAME), "// custom").unwrap();

        assert!(AssetPipeline::write_client_script(&scripts, &out).unwrap());
        assert_eq!(
            fs::read_to_string(out.join("scripts").join(CLIENT_SCRIPT_NAME)).unwrap(),
            "// custom"
        );
    }
}
