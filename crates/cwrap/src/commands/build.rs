//! Static site build command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cwrap_static::{RouteOutcome, StaticBuilder};

use crate::config::{project_dir, ConfigFile};

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building static site...");

    let file_config = ConfigFile::load(config_path)?;
    let mut config = file_config.build_config(&project_dir(config_path));
    if let Some(output) = output {
        config.output_dir = output;
    }

    let builder = StaticBuilder::new(config)?;
    let report = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")??;

    for route in &report.routes {
        if let RouteOutcome::Failed(e) = &route.outcome {
            tracing::error!("{}: {}", route.route.source_dir.display(), e);
        }
    }

    tracing::info!(
        "Compiled {} routes ({} skipped, {} failed) in {}ms",
        report.compiled(),
        report.skipped(),
        report.failed(),
        report.duration_ms
    );

    tracing::info!("Output: {}", report.output_dir.display());

    if report.has_failures() {
        anyhow::bail!("{} route(s) failed to compile", report.failed());
    }

    Ok(())
}
