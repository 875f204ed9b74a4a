#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::{get, post},
};
use reqwest::Url;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use whatsapp_gateway::{
    routes::create_router,
    services::{upstream::UpstreamClient, users::UserStore},
    state::{AppState, SharedState},
};

/// Stand-in for the WhatsApp service, recording every send it receives.
#[derive(Clone)]
pub struct StubService {
    pub sends: Arc<Mutex<Vec<Value>>>,
    pub qr: Option<String>,
    pub send_status: StatusCode,
}

impl Default for StubService {
    fn default() -> Self {
        Self {
            sends: Arc::new(Mutex::new(Vec::new())),
            qr: None,
            send_status: StatusCode::OK,
        }
    }
}

impl StubService {
    pub fn sends(&self) -> Vec<Value> {
        self.sends.lock().unwrap().clone()
    }

    /// Serve the stub on an ephemeral loopback port.
    pub async fn spawn(self) -> Url {
        let app = Router::new()
            .route("/status", get(stub_status))
            .route("/qr", get(stub_qr))
            .route("/send-message", post(stub_send))
            .route("/logout", post(stub_logout))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }
}

async fn stub_status(State(stub): State<StubService>) -> Json<Value> {
    Json(json!({
        "status": if stub.qr.is_some() { "qr_ready" } else { "connected" },
        "connected": stub.qr.is_none(),
        "qr": stub.qr,
    }))
}

async fn stub_qr(State(stub): State<StubService>) -> (StatusCode, Json<Value>) {
    match stub.qr {
        Some(qr) => (StatusCode::OK, Json(json!({ "qr": qr }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "QR code not available" }))),
    }
}

async fn stub_send(State(stub): State<StubService>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    stub.sends.lock().unwrap().push(body.clone());
    if stub.send_status != StatusCode::OK {
        return (stub.send_status, Json(json!({ "error": "WhatsApp not connected" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "messageId": "3EB0C767D26A",
            "to": body["to"],
            "message": body["message"],
        })),
    )
}

async fn stub_logout() -> Json<Value> {
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// A loopback address with nothing listening on it.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

pub fn gateway(upstream: &Url) -> (Router, SharedState) {
    gateway_with_static(upstream, "static-dir-that-does-not-exist")
}

pub fn gateway_with_static(upstream: &Url, static_dir: impl Into<std::path::PathBuf>) -> (Router, SharedState) {
    let state = Arc::new(AppState::new(
        UpstreamClient::new(upstream).unwrap(),
        UserStore::in_memory().unwrap(),
        static_dir,
    ));
    (create_router().with_state(state.clone()), state)
}

/// Serve a gateway router on an ephemeral loopback port.
pub async fn serve(app: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let (status, bytes) = call_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn call_raw(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    if body.is_some() {
        req = req.header("content-type", "application/json");
    }
    let req = req
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}
