//! Static site builder.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use cwrap_compiler::CompileError;
use cwrap_skeleton::{BlueprintExpander, SkeletonError, DEFAULT_PLACEHOLDER};

use crate::assets::AssetPipeline;
use crate::route::RouteCompiler;
use crate::routes::{discover_routes, Route};

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Routes root holding one `skeleton.json` per route directory
    pub routes_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Static assets mirrored verbatim to `output/static`
    pub static_dir: PathBuf,

    /// Directory that may hold a custom `cwrapFunctions.js`
    pub scripts_dir: PathBuf,

    /// Blueprint index placeholder
    pub placeholder: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("routes"),
            output_dir: PathBuf::from("build"),
            static_dir: PathBuf::from("static"),
            scripts_dir: PathBuf::from("scripts"),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("Failed to compile {path}: {message}")]
    MalformedTemplate { path: String, message: String },

    #[error("Failed to render template: {0}")]
    Template(String),

    #[error("Failed to write {path}: {message}")]
    WriteFailure { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// What happened to one route.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Both documents were written
    Compiled,

    /// The directory has no skeleton
    Skipped,

    /// The route failed; siblings were still built
    Failed(BuildError),
}

/// Outcome of one route in a build.
#[derive(Debug)]
pub struct RouteReport {
    pub route: Route,
    pub outcome: RouteOutcome,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Per-route outcomes, in discovery order
    pub routes: Vec<RouteReport>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

impl BuildReport {
    pub fn compiled(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Compiled))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Failed(_)))
    }

    /// Whether any route failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&RouteOutcome) -> bool) -> usize {
        self.routes.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    compiler: RouteCompiler,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let expander = BlueprintExpander::new(&config.placeholder)
            .map_err(|e| BuildError::Config(e.to_string()))?;
        tracing::debug!("Blueprint placeholder: {}", expander.placeholder());

        Ok(Self {
            config,
            compiler: RouteCompiler::new(expander),
        })
    }

    /// Build every route.
    ///
    /// Failures are isolated per route and recorded in the report; only
    /// problems with the output root or the routes root abort the build.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        if !self.config.routes_dir.is_dir() {
            return Err(BuildError::ReadError(format!(
                "Routes directory not found: {}",
                self.config.routes_dir.display()
            )));
        }

        fs::create_dir_all(&self.config.output_dir).map_err(|e| BuildError::WriteFailure {
            path: self.config.output_dir.display().to_string(),
            message: e.to_string(),
        })?;

        self.copy_assets();

        let routes = discover_routes(&self.config.routes_dir);
        tracing::info!(
            "Processing {} route directories in {}",
            routes.len(),
            self.config.routes_dir.display()
        );

        // Each route compiles with its own style accumulator.
        let reports: Vec<RouteReport> = routes
            .into_par_iter()
            .map(|route| self.build_route(route))
            .collect();

        Ok(BuildReport {
            routes: reports,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    fn build_route(&self, route: Route) -> RouteReport {
        let output_dir = route.output_dir(&self.config.output_dir);

        let outcome = match self
            .compiler
            .compile_route(&route.source_dir, &output_dir, route.depth)
        {
            Ok(_) => RouteOutcome::Compiled,
            Err(BuildError::Skeleton(SkeletonError::MissingSkeleton { path })) => {
                tracing::warn!("Skipping {}: no skeleton at {}", route.source_dir.display(), path);
                RouteOutcome::Skipped
            }
            Err(e) => {
                tracing::error!("Route {} failed: {}", route.source_dir.display(), e);
                RouteOutcome::Failed(e)
            }
        };

        RouteReport { route, outcome }
    }

    /// Copy static files, favicon and client script. Problems are logged, not fatal.
    fn copy_assets(&self) {
        let output_dir = &self.config.output_dir;
        let static_dir = &self.config.static_dir;

        if static_dir.is_dir() {
            match AssetPipeline::copy_dir(static_dir, &output_dir.join("static")) {
                Ok(count) => tracing::info!(
                    "Copied {} static files from {}",
                    count,
                    static_dir.display()
                ),
                Err(e) => tracing::error!("Failed to copy {}: {}", static_dir.display(), e),
            }
        } else {
            tracing::warn!("Static directory {} does not exist", static_dir.display());
        }

        match AssetPipeline::copy_favicon(static_dir, output_dir) {
            Ok(true) => tracing::info!("Copied favicon.ico to {}", output_dir.display()),
            Ok(false) => tracing::warn!("No favicon found in {}", static_dir.display()),
            Err(e) => tracing::error!("Failed to copy favicon: {}", e),
        }

        match AssetPipeline::write_client_script(&self.config.scripts_dir, output_dir) {
            Ok(true) => tracing::info!("Copied client script from {}", self.config.scripts_dir.display()),
            Ok(false) => tracing::debug!("Wrote bundled client script"),
            Err(e) => tracing::error!("Failed to write client script: {}", e),
        }
    }
}
