use std::{
    io,
    net::SocketAddr,
    path::{Component, Path as FsPath, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use dispatch::{EngineHandle, WebFrontEnd};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info, warn};

const MAX_COMMAND_BYTES: usize = 1024;
const NOT_FOUND_BODY: &str = "File Not Found.";
const COMMAND_ACK: &str = "success";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub static_root: PathBuf,
    pub index_file: String,
}

#[derive(Clone)]
struct AppState {
    static_root: PathBuf,
    index_file: String,
    engine: EngineHandle,
}

/// The web front end: static assets plus the `/command` route.
pub struct PresentationServer {
    config: ServerConfig,
    engine: EngineHandle,
}

impl PresentationServer {
    pub fn new(config: ServerConfig, engine: EngineHandle) -> Self {
        Self { config, engine }
    }
}

#[async_trait]
impl WebFrontEnd for PresentationServer {
    async fn start(&self) -> io::Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        let addr = listener.local_addr()?;
        let app = build_router(&self.config, self.engine.clone());

        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app).await {
                error!(%error, "web server stopped");
            }
        });
        info!(%addr, "server listening");
        Ok(addr)
    }
}

pub fn build_router(config: &ServerConfig, engine: EngineHandle) -> Router {
    let state = Arc::new(AppState {
        static_root: config.static_root.clone(),
        index_file: config.index_file.clone(),
        engine,
    });

    Router::new()
        .route("/", get(serve_index))
        .route("/command", post(submit_command))
        .route("/*path", get(serve_path))
        .layer(RequestBodyLimitLayer::new(MAX_COMMAND_BYTES))
        .with_state(state)
}

async fn serve_index(State(state): State<Arc<AppState>>) -> Response {
    serve_file(&state, &state.index_file).await
}

async fn serve_path(State(state): State<Arc<AppState>>, Path(path): Path<String>) -> Response {
    serve_file(&state, &path).await
}

async fn submit_command(State(state): State<Arc<AppState>>, body: String) -> &'static str {
    info!(command = body.trim(), "[WEB] command received");
    if !state.engine.submit_command(body).await {
        warn!("[WEB] dispatch engine is not running; command dropped");
    }
    COMMAND_ACK
}

async fn serve_file(state: &AppState, relative: &str) -> Response {
    let Some(path) = resolve_static_path(&state.static_root, relative) else {
        debug!(path = relative, "rejected path outside static root");
        return not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = mime_guess::from_path(&path).first_or_octet_stream();
            info!(path = relative, "[WEB] web interface loaded");
            ([(header::CONTENT_TYPE, content_type.to_string())], bytes).into_response()
        }
        Err(error) => {
            debug!(path = %path.display(), %error, "static file unavailable");
            not_found()
        }
    }
}

fn resolve_static_path(root: &FsPath, relative: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in FsPath::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
