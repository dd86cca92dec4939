//! JSON endpoints used by the skeleton editor.

use std::path::{Component, Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use cwrap_skeleton::SKELETON_FILE;
use cwrap_static::discover_routes;

use crate::server::ServerState;

const SETTINGS_FILE: &str = "settings.json";

fn failure(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": error.to_string() })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// Join `sub_path` onto `base`, refusing anything but plain path segments.
pub(crate) fn resolve_sub_path(base: &FsPath, sub_path: &str) -> Option<PathBuf> {
    let relative = FsPath::new(sub_path);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| base.join(relative))
}

/// Pretty-print `body` into `dir/skeleton.json`.
async fn write_skeleton(dir: PathBuf, body: Value) -> Response {
    let json = match serde_json::to_string_pretty(&body) {
        Ok(json) => json,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    if let Err(e) = tokio::fs::create_dir_all(&dir).await {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, e);
    }

    let path = dir.join(SKELETON_FILE);
    match tokio::fs::write(&path, json).await {
        Ok(()) => {
            tracing::info!("Saved {}", path.display());
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to save {}: {}", path.display(), e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

async fn save_into(base: &FsPath, sub_path: &str, body: Value) -> Response {
    match resolve_sub_path(base, sub_path) {
        Some(dir) => write_skeleton(dir, body).await,
        None => failure(StatusCode::BAD_REQUEST, format!("Invalid route path: {sub_path}")),
    }
}

pub(crate) async fn save_skeleton_root(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    save_into(&state.config.routes_dir, "", body).await
}

pub(crate) async fn save_skeleton(
    State(state): State<Arc<ServerState>>,
    Path(sub_path): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    save_into(&state.config.routes_dir, &sub_path, body).await
}

pub(crate) async fn save_skeleton_temp_root(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    save_into(&state.config.temp_dir, "", body).await
}

pub(crate) async fn save_skeleton_temp(
    State(state): State<Arc<ServerState>>,
    Path(sub_path): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    save_into(&state.config.temp_dir, &sub_path, body).await
}

pub(crate) async fn get_skeleton(State(state): State<Arc<ServerState>>) -> Response {
    let path = state.config.routes_dir.join(SKELETON_FILE);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(skeleton) => Json(skeleton).into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub(crate) async fn all_routes(State(state): State<Arc<ServerState>>) -> Response {
    let routes_dir = &state.config.routes_dir;
    if !routes_dir.is_dir() {
        return not_found("Routes directory not found");
    }

    let routes: Vec<String> = discover_routes(routes_dir)
        .into_iter()
        .filter(|route| route.depth > 0)
        .map(|route| route.url_path())
        .collect();

    Json(routes).into_response()
}

async fn open_folder(path: PathBuf) -> Response {
    let target = path.clone();
    let opened = tokio::task::spawn_blocking(move || open::that(&target)).await;

    match opened {
        Ok(Ok(())) => Json(json!({ "success": true })).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub(crate) async fn open_routes_folder(State(state): State<Arc<ServerState>>) -> Response {
    open_folder(state.config.routes_dir.clone()).await
}

pub(crate) async fn open_static_folder(State(state): State<Arc<ServerState>>) -> Response {
    let static_dir = state.config.static_dir.clone();
    if let Err(e) = tokio::fs::create_dir_all(&static_dir).await {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, e);
    }
    open_folder(static_dir).await
}

/// Rebuild the site by running the configured build command.
pub(crate) async fn build(State(state): State<Arc<ServerState>>) -> Response {
    let config = &state.config;
    tracing::info!("Rebuilding {}", config.project_dir.display());

    let output = tokio::process::Command::new(&config.build_program)
        .args(&config.build_args)
        .current_dir(&config.project_dir)
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("Failed to run {}: {}", config.build_program.display(), e);
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let status = if output.status.success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(json!({
            "success": output.status.success(),
            "output": stdout,
            "error": stderr,
        })),
    )
        .into_response()
}

pub(crate) async fn initial_settings(State(state): State<Arc<ServerState>>) -> Response {
    let path = state.config.settings_dir.join(SETTINGS_FILE);
    if !path.is_file() {
        return not_found("settings.json file not found");
    }

    let parsed = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Value>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub(crate) async fn create_initial_settings(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> Response {
    let dir = &state.config.settings_dir;

    let json = match serde_json::to_string_pretty(&body) {
        Ok(json) => json,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, e);
    }

    match tokio::fs::write(dir.join(SETTINGS_FILE), json).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{router, test_state};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tempfile::tempdir;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn resolves_nested_sub_paths() {
        let base = FsPath::new("/project/routes");

        assert_eq!(
            resolve_sub_path(base, "blog/post"),
            Some(PathBuf::from("/project/routes/blog/post"))
        );
        assert_eq!(resolve_sub_path(base, ""), Some(base.to_path_buf()));
    }

    #[test]
    fn rejects_escaping_sub_paths() {
        let base = FsPath::new("/project/routes");

        assert_eq!(resolve_sub_path(base, "../secrets"), None);
        assert_eq!(resolve_sub_path(base, "blog/../../x"), None);
        assert_eq!(resolve_sub_path(base, "/etc"), None);
    }

    #[tokio::test]
    async fn saves_pretty_printed_skeleton() {
        let temp = tempdir().unwrap();

        let response = router(test_state(temp.path()))
            .oneshot(post_json(
                "/save-skeleton/blog",
                r#"{"element":"body","text":"hi"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "success": true }));
        assert_eq!(
            fs::read_to_string(temp.path().join("routes/blog").join(SKELETON_FILE)).unwrap(),
            "{\n  \"element\": \"body\",\n  \"text\": \"hi\"\n}"
        );
    }

    #[tokio::test]
    async fn saves_drafts_to_temp_dir() {
        let temp = tempdir().unwrap();

        let response = router(test_state(temp.path()))
            .oneshot(post_json("/save-skeleton-temp", r#"{"element":"body"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(temp.path().join("dist").join(SKELETON_FILE).exists());
    }

    #[tokio::test]
    async fn refuses_path_traversal() {
        let temp = tempdir().unwrap();

        let response = router(test_state(temp.path()))
            .oneshot(post_json("/save-skeleton/a/../../escape", r#"{}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!temp.path().join("escape").exists());
    }

    #[tokio::test]
    async fn returns_root_skeleton() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("routes")).unwrap();
        fs::write(
            temp.path().join("routes").join(SKELETON_FILE),
            r#"{"element": "body"}"#,
        )
        .unwrap();

        let response = router(test_state(temp.path()))
            .oneshot(Request::get("/api/skeleton").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "element": "body" }));
    }

    #[tokio::test]
    async fn lists_routes_in_pre_order() {
        let temp = tempdir().unwrap();
        let routes = temp.path().join("routes");
        fs::create_dir_all(routes.join("blog/post")).unwrap();
        fs::create_dir_all(routes.join("about")).unwrap();

        let response = router(test_state(temp.path()))
            .oneshot(Request::get("/api/all-routes").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!(["about", "blog", "blog/post"])
        );
    }

    #[tokio::test]
    async fn missing_routes_dir_is_not_found() {
        let temp = tempdir().unwrap();

        let response = router(test_state(temp.path()))
            .oneshot(Request::get("/api/all-routes").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn settings_round_trip_through_settings_dir() {
        let temp = tempdir().unwrap();
        let app = router(test_state(temp.path()));

        let missing = app
            .clone()
            .oneshot(Request::get("/api/initial-settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let created = app
            .clone()
            .oneshot(post_json("/api/create-initial-settings", r#"{"theme":"dark"}"#))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::OK);

        let found = app
            .oneshot(Request::get("/api/initial-settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(body_json(found).await, json!({ "theme": "dark" }));
    }
}
