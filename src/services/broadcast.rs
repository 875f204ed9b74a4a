// src/services/broadcast.rs
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use serde_json::{Value, json};
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::message::Event;

pub const STATUS_TOPIC: &str = "status";
pub const WEBHOOK_TOPIC: &str = "webhook_message";

pub type ClientId = Uuid;

/// Fan-out of events to connected realtime clients.
///
/// Every client gets its own unbounded queue, so publishing never waits on a slow socket.
/// Delivery is at-most-once; clients that connect later see nothing already published.
#[derive(Clone, Default)]
pub struct Broadcaster {
    clients: Arc<RwLock<HashMap<ClientId, mpsc::UnboundedSender<Event>>>>,
}

impl Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish_non_exhaustive()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client. Its queue already holds the `status` greeting.
    pub async fn connect(&self) -> (ClientId, mpsc::UnboundedReceiver<Event>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(Event::new(STATUS_TOPIC, json!({ "message": "Connected" })));

        self.clients.write().await.insert(id, tx);
        tracing::info!(client = %id, "realtime client connected");
        (id, rx)
    }

    pub async fn disconnect(&self, id: ClientId) -> bool {
        let removed = self.clients.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(client = %id, "realtime client disconnected");
        }
        removed
    }

    /// Queue `payload` under `topic` for every connected client. Returns how many accepted it.
    pub async fn publish(&self, topic: &str, payload: Value) -> usize {
        let targets: Vec<_> = {
            let guard = self.clients.read().await;
            guard.values().cloned().collect()
        };

        let event = Event::new(topic, payload);
        let delivered = targets
            .iter()
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count();
        tracing::debug!(topic, delivered, "event published");
        delivered
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
