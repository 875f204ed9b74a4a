mod common;

use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use common::{call, gateway, serve, unreachable_url};

async fn next_event<S>(ws: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("socket closed")
        .unwrap();
    match frame {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn websocket_clients_receive_greeting_and_webhooks() {
    let (app, state) = gateway(&unreachable_url().await);
    let addr = serve(app.clone()).await;

    let (mut ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    assert_eq!(
        next_event(&mut ws).await,
        json!({ "event": "status", "data": { "message": "Connected" } })
    );
    assert_eq!(state.broadcaster.len().await, 1);

    let payload = json!({ "from": "628123", "text": "order shipped", "meta": [1, 2] });
    let (status, _) = call(&app, "POST", "/api/webhook", Some(&payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        next_event(&mut ws).await,
        json!({ "event": "webhook_message", "data": payload })
    );
    // Exactly one frame per publish.
    assert!(
        tokio::time::timeout(Duration::from_millis(200), ws.next())
            .await
            .is_err()
    );

    ws.close(None).await.unwrap();
    for _ in 0..50 {
        if state.broadcaster.is_empty().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(state.broadcaster.is_empty().await, "client was not deregistered");
}

#[tokio::test]
async fn each_websocket_client_gets_its_own_copy() {
    let (app, state) = gateway(&unreachable_url().await);
    let addr = serve(app.clone()).await;

    let (mut first, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    let (mut second, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    assert_eq!(next_event(&mut first).await["event"], "status");
    assert_eq!(next_event(&mut second).await["event"], "status");
    assert_eq!(state.broadcaster.len().await, 2);

    let (status, _) = call(&app, "POST", "/api/webhook", Some(r#"{"n":1}"#)).await;
    assert_eq!(status, StatusCode::OK);

    for ws in [&mut first, &mut second] {
        let event = next_event(ws).await;
        assert_eq!(event["event"], "webhook_message");
        assert_eq!(event["data"], json!({ "n": 1 }));
    }
}
