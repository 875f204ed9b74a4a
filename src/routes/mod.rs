// src/routes/mod.rs
pub mod realtime;
pub mod users;
pub mod whatsapp;

use crate::state::SharedState;
use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::util::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn create_router() -> Router<SharedState> {
    let whatsapp_routes = Router::new()
        .route("/status", get(whatsapp::status_handler))
        .route("/qr", get(whatsapp::qr_handler))
        .route("/send", post(whatsapp::send_handler))
        .route("/logout", post(whatsapp::logout_handler))
        .route("/receive", post(whatsapp::receive_handler));

    Router::new()
        .nest("/api/whatsapp", whatsapp_routes)
        .route("/api/webhook", post(realtime::webhook_handler))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/ws", get(realtime::ws_handler))
        .route("/health", get(|| async { "OK" }))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
}

/// Serve a file from the static directory, falling back to `index.html` for client-side routes.
async fn static_handler(State(state): State<SharedState>, req: Request) -> Response {
    let index = state.static_dir.join("index.html");
    let files = ServeDir::new(&state.static_dir).fallback(ServeFile::new(index));

    match files.oneshot(req).await {
        Ok(res) if res.status() == StatusCode::NOT_FOUND => {
            (StatusCode::NOT_FOUND, "index.html not found").into_response()
        }
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}
