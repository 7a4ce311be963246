use super::*;
use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{body, body::Body, http::Request};
use dispatch::EngineEvent;
use tokio::sync::mpsc;
use tower::ServiceExt;

struct StaticRoot(PathBuf);

impl StaticRoot {
    fn new(label: &str) -> Self {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let root = env::temp_dir().join(format!("led_bridge_{label}_{suffix}"));
        fs::create_dir_all(root.join("css")).expect("temp root");
        fs::write(root.join("index.html"), "<html>led</html>").expect("index");
        fs::write(root.join("css").join("site.css"), "body {}").expect("css");
        Self(root)
    }
}

impl Drop for StaticRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn test_app(root: &StaticRoot) -> (Router, mpsc::Receiver<EngineEvent>) {
    let (engine, events) = EngineHandle::channel();
    let config = ServerConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        static_root: root.0.clone(),
        index_file: "index.html".to_string(),
    };
    (build_router(&config, engine), events)
}

async fn body_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn root_serves_index_document() {
    let root = StaticRoot::new("index");
    let (app, _events) = test_app(&root);

    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html"
    );
    assert_eq!(body_text(response).await, "<html>led</html>");
}

#[tokio::test]
async fn nested_asset_uses_extension_content_type() {
    let root = StaticRoot::new("asset");
    let (app, _events) = test_app(&root);

    let request = Request::get("/css/site.css")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
}

#[tokio::test]
async fn missing_file_and_directory_are_not_found() {
    let root = StaticRoot::new("missing");
    let (app, _events) = test_app(&root);

    for uri in ["/nope.txt", "/css"] {
        let request = Request::get(uri).body(Body::empty()).expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
        assert_eq!(body_text(response).await, "File Not Found.");
    }
}

#[tokio::test]
async fn command_route_acknowledges_and_forwards_body() {
    let root = StaticRoot::new("command");
    let (app, mut events) = test_app(&root);

    let request = Request::post("/command")
        .body(Body::from("/value/1"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "success");

    assert_eq!(
        events.recv().await,
        Some(EngineEvent::Command("/value/1".to_string()))
    );
}

#[tokio::test]
async fn command_route_still_acknowledges_when_engine_is_gone() {
    let root = StaticRoot::new("gone");
    let (app, events) = test_app(&root);
    drop(events);

    let request = Request::post("/command")
        .body(Body::from("/value/0"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(body_text(response).await, "success");
}

#[tokio::test]
async fn oversized_command_is_rejected() {
    let root = StaticRoot::new("oversized");
    let (app, _events) = test_app(&root);

    let request = Request::post("/command")
        .body(Body::from("x".repeat(MAX_COMMAND_BYTES + 1)))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn static_paths_cannot_escape_root() {
    let root = FsPath::new("/srv/public");
    assert_eq!(
        resolve_static_path(root, "css/./site.css"),
        Some(PathBuf::from("/srv/public/css/site.css"))
    );
    assert_eq!(resolve_static_path(root, "../etc/passwd"), None);
    assert_eq!(resolve_static_path(root, "css/../../etc/passwd"), None);
}

#[tokio::test]
async fn start_binds_listener_before_reporting_ready() {
    let (engine, _events) = EngineHandle::channel();
    let server = PresentationServer::new(
        ServerConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            static_root: PathBuf::from("."),
            index_file: "index.html".to_string(),
        },
        engine,
    );
    let addr = server.start().await.expect("start");
    assert_ne!(addr.port(), 0);
}

#[tokio::test]
async fn start_fails_when_port_is_taken() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let (engine, _events) = EngineHandle::channel();
    let server = PresentationServer::new(
        ServerConfig {
            bind_addr: taken.local_addr().expect("addr"),
            static_root: PathBuf::from("."),
            index_file: "index.html".to_string(),
        },
        engine,
    );
    assert!(server.start().await.is_err());
}
