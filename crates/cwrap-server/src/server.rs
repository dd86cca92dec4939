//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    handler::Handler,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::api;
use crate::livereload::{
    inject_reload_script, livereload_client_script, ReloadHub, ReloadMessage, LIVERELOAD_PATH,
    LIVERELOAD_SCRIPT_PATH,
};
use crate::watcher::FileWatcher;

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Project root, served as static files
    pub project_dir: PathBuf,

    /// Routes root holding the skeletons
    pub routes_dir: PathBuf,

    /// Static assets directory
    pub static_dir: PathBuf,

    /// Build output directory
    pub output_dir: PathBuf,

    /// Scratch directory for unsaved skeleton drafts
    pub temp_dir: PathBuf,

    /// Directory holding the editor front-end's `index.html`
    pub app_dir: Option<PathBuf>,

    /// Directory holding the user's `settings.json`
    pub settings_dir: PathBuf,

    /// Program run by the rebuild endpoint
    pub build_program: PathBuf,

    /// Arguments passed to `build_program`
    pub build_args: Vec<String>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            routes_dir: PathBuf::from("routes"),
            static_dir: PathBuf::from("static"),
            output_dir: PathBuf::from("build"),
            temp_dir: PathBuf::from("dist"),
            app_dir: None,
            settings_dir: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cwrap"),
            build_program: std::env::current_exe().unwrap_or_else(|_| PathBuf::from("cwrap")),
            build_args: vec!["build".to_string()],
            port: 36969,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}: {1}")]
    AddressError(String, String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// Shared server state.
pub(crate) struct ServerState {
    pub(crate) config: DevServerConfig,
    pub(crate) hub: ReloadHub,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the development server.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw_addr = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::AddressError(raw_addr, e.to_string()))?;

        let state = Arc::new(ServerState {
            config: self.config.clone(),
            hub: ReloadHub::new(),
        });

        let watch_paths = vec![
            self.config.routes_dir.clone(),
            self.config.static_dir.clone(),
            self.config.output_dir.clone(),
        ];

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let hub = state.hub.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                tracing::debug!(
                    "File changed: {:?}, reloading {} page(s)",
                    event,
                    hub.subscriber_count()
                );
                hub.send(ReloadMessage::Reload {
                    path: event.path().display().to_string(),
                });
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state);

        tracing::info!("Server running at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Please open {} in your browser ({})", url, e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the application router.
pub(crate) fn router(state: Arc<ServerState>) -> Router {
    let files = ServeDir::new(&state.config.project_dir)
        .fallback(app_index_handler.with_state(Arc::clone(&state)));

    Router::new()
        .route("/save-skeleton", post(api::save_skeleton_root))
        .route("/save-skeleton/{*sub_path}", post(api::save_skeleton))
        .route("/save-skeleton-temp", post(api::save_skeleton_temp_root))
        .route("/save-skeleton-temp/{*sub_path}", post(api::save_skeleton_temp))
        .route("/api/skeleton", get(api::get_skeleton))
        .route("/api/all-routes", get(api::all_routes))
        .route("/api/open-folder/routes", get(api::open_routes_folder))
        .route("/api/open-folder/static", get(api::open_static_folder))
        .route("/api/build", get(api::build))
        .route("/api/initial-settings", get(api::initial_settings))
        .route("/api/create-initial-settings", post(api::create_initial_settings))
        .route(LIVERELOAD_PATH, get(ws_handler))
        .route(LIVERELOAD_SCRIPT_PATH, get(livereload_script_handler))
        .fallback_service(files)
        .with_state(state)
}

/// Serve the editor front-end, or a placeholder page when none is configured.
async fn app_index_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let app_index = state
        .config
        .app_dir
        .as_ref()
        .map(|dir| dir.join("index.html"));

    let page = match app_index {
        Some(path) => match tokio::fs::read_to_string(&path).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                placeholder_page(&state.config)
            }
        },
        None => placeholder_page(&state.config),
    };

    Html(inject_reload_script(&page))
}

fn placeholder_page(config: &DevServerConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>cwrap dev</title>
</head>
<body>
  <h1>cwrap dev server</h1>
  <p>Editing skeletons in <code>{}</code>. Built pages are served from <code>/{}/</code>.</p>
</body>
</html>"#,
        config.routes_dir.display(),
        config
            .output_dir
            .strip_prefix(&config.project_dir)
            .unwrap_or(&config.output_dir)
            .display()
    )
}

/// Handler for the live-reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    let Ok(msg) = serde_json::to_string(&ReloadMessage::Connected) else {
        return;
    };
    if socket.send(Message::Text(msg.into())).await.is_err() {
        return;
    }

    while let Ok(reload) = rx.recv().await {
        let Ok(json) = serde_json::to_string(&reload) else {
            continue;
        };
        if socket.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }
}

/// Handler for the live-reload client script.
async fn livereload_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        livereload_client_script(),
    )
}

#[cfg(test)]
pub(crate) fn test_state(root: &std::path::Path) -> Arc<ServerState> {
    Arc::new(ServerState {
        config: DevServerConfig {
            project_dir: root.to_path_buf(),
            routes_dir: root.join("routes"),
            static_dir: root.join("static"),
            output_dir: root.join("build"),
            temp_dir: root.join("dist"),
            settings_dir: root.join(".cwrap"),
            open: false,
            ..Default::default()
        },
        hub: ReloadHub::new(),
    })
}
