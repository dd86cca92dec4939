//! Development server command.

use std::path::Path;

use anyhow::Result;
use cwrap_server::{DevServer, DevServerConfig};

use crate::config::{project_dir, ConfigFile};

/// Run the dev server.
pub async fn run(config_path: &Path, port: Option<u16>, open: Option<bool>) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;
    let root = project_dir(config_path);
    let build = file_config.build_config(&root);

    let port = port.unwrap_or(file_config.server.port);
    tracing::info!("Starting development server on port {}", port);

    let config = DevServerConfig {
        project_dir: root.clone(),
        routes_dir: build.routes_dir,
        static_dir: build.static_dir,
        output_dir: build.output_dir,
        temp_dir: root.join("dist"),
        app_dir: file_config.server.app_dir.as_ref().map(|dir| root.join(dir)),
        build_args: rebuild_args(config_path),
        port,
        host: file_config.server.host,
        open: open.unwrap_or(file_config.server.open),
        ..Default::default()
    };

    DevServer::new(config).start().await?;

    Ok(())
}

/// Arguments for the rebuild subprocess, which runs inside the project directory.
fn rebuild_args(config_path: &Path) -> Vec<String> {
    let config_name = config_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cwrap.toml".to_string());

    vec!["--config".to_string(), config_name, "build".to_string()]
}
