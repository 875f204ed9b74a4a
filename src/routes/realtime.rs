// src/routes/realtime.rs
use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};

use crate::{
    routes::whatsapp::relay_response,
    services::{broadcast::Broadcaster, relay},
    state::SharedState,
};

/// Generic inbound webhook; the payload is rebroadcast to every realtime client.
pub async fn webhook_handler(State(state): State<SharedState>, body: Bytes) -> Response {
    relay_response(relay::handle_generic_webhook(&state.broadcaster, &body).await)
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    let hub = state.broadcaster.clone();
    ws.on_upgrade(move |socket| client_session(socket, hub))
}

async fn client_session(socket: WebSocket, hub: Broadcaster) {
    let (id, mut events) = hub.connect().await;
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Clients have nothing to say; only watch for the close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    hub.disconnect(id).await;
}
