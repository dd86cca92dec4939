//! Project configuration (cwrap.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use cwrap_skeleton::DEFAULT_PLACEHOLDER;
use cwrap_static::BuildConfig;
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_routes")]
    pub routes: String,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_scripts")]
    pub scripts: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            output: default_output(),
            static_dir: default_static_dir(),
            scripts: default_scripts(),
            placeholder: default_placeholder(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_open")]
    pub open: bool,
    /// Directory holding the editor front-end's index.html
    pub app_dir: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            open: default_open(),
            app_dir: None,
        }
    }
}

fn default_routes() -> String {
    "routes".to_string()
}
fn default_output() -> String {
    "build".to_string()
}
fn default_static_dir() -> String {
    "static".to_string()
}
fn default_scripts() -> String {
    "scripts".to_string()
}
fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}
fn default_port() -> u16 {
    36969
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_open() -> bool {
    true
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            let config: ConfigFile = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            tracing::info!("Loaded config from {}", path.display());
            return Ok(config);
        }
        tracing::debug!("No {} found, using defaults", path.display());
        Ok(ConfigFile::default())
    }

    /// Build settings with directories resolved against `project_dir`.
    pub fn build_config(&self, project_dir: &Path) -> BuildConfig {
        BuildConfig {
            routes_dir: project_dir.join(&self.project.routes),
            output_dir: project_dir.join(&self.project.output),
            static_dir: project_dir.join(&self.project.static_dir),
            scripts_dir: project_dir.join(&self.project.scripts),
            placeholder: self.project.placeholder.clone(),
        }
    }
}

/// The directory holding the config file; relative paths are resolved from it.
pub fn project_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
