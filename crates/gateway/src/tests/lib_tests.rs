use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct AgentState {
    seen: Arc<Mutex<Vec<String>>>,
}

async fn handle_agent(
    State(state): State<AgentState>,
    Query(query): Query<HashMap<String, String>>,
) -> String {
    let led = query.get("led").cloned().unwrap_or_default();
    state.seen.lock().await.push(led.clone());
    format!("led set to {led}")
}

async fn handle_broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "agent offline")
}

async fn spawn_agent() -> (String, AgentState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = AgentState::default();
    let app = Router::new()
        .route("/agent", get(handle_agent))
        .route("/broken", get(handle_broken))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

fn gateway_for(url: &str) -> HttpActuatorGateway {
    HttpActuatorGateway::new(GatewayConfig {
        endpoint: Url::parse(url).expect("url"),
        request_timeout: Duration::from_secs(5),
    })
    .expect("gateway")
}

#[tokio::test]
async fn sends_led_query_and_returns_response_text() {
    let (base, state) = spawn_agent().await;
    let gateway = gateway_for(&format!("{base}/agent"));

    let on = gateway.set_state(ActuatorState::On).await.expect("on");
    assert_eq!(on, "led set to 1");
    let off = gateway.set_state(ActuatorState::Off).await.expect("off");
    assert_eq!(off, "led set to 0");

    assert_eq!(*state.seen.lock().await, vec!["1", "0"]);
}

#[tokio::test]
async fn error_status_still_yields_body_text() {
    let (base, _state) = spawn_agent().await;
    let gateway = gateway_for(&format!("{base}/broken"));

    let body = gateway.set_state(ActuatorState::On).await.expect("body");
    assert_eq!(body, "agent offline");
}

#[tokio::test]
async fn connection_failure_surfaces_as_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let gateway = gateway_for(&format!("http://{addr}/agent"));
    let err = gateway
        .set_state(ActuatorState::Off)
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, GatewayError::Transport(_)), "unexpected: {err}");
}

#[test]
fn request_url_appends_led_parameter() {
    let gateway = gateway_for("https://agent.example.com/FlA7isVKL8K-");
    assert_eq!(
        gateway.request_url(ActuatorState::On).as_str(),
        "https://agent.example.com/FlA7isVKL8K-?led=1"
    );
    assert_eq!(
        gateway.request_url(ActuatorState::Off).as_str(),
        "https://agent.example.com/FlA7isVKL8K-?led=0"
    );
}

#[test]
fn rejects_endpoint_without_base() {
    let result = HttpActuatorGateway::new(GatewayConfig {
        endpoint: Url::parse("mailto:led@example.com").expect("url"),
        request_timeout: DEFAULT_REQUEST_TIMEOUT,
    });
    assert!(matches!(result, Err(GatewayError::InvalidEndpoint(_))));
}
