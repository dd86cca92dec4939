//! Static site generator for cwrap projects.
//!
//! Compiles every route directory under the routes root into an
//! `index.html` and `styles.css`, mirroring the directory tree into the
//! output directory, and copies the shared assets next to them.

pub mod assets;
pub mod builder;
pub mod route;
pub mod routes;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildReport, RouteOutcome, RouteReport, StaticBuilder};
pub use route::{CompiledRoute, RouteCompiler, CSS_FILE, HTML_FILE};
pub use routes::{discover_routes, Route};
