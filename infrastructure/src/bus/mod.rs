//! In-process implementation of [`MessageBus`] — an in-process channel set,
//! the default bus (§4.C) used for tests and single-process deployments.
//!
//! Each channel name lazily gets its own `tokio::sync::broadcast` ring.
//! `subscribe` spawns a task that drains the channel's receiver and invokes
//! the handler for every message; `unsubscribe` aborts that task. Publishing
//! to a channel with no subscribers is not an error — "no listener yet" is a
//! normal pub/sub state, not a transport failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use maoc_domain::bus::{BusError, Message, MessageBus, SubscriptionToken};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const CHANNEL_CAPACITY: usize = 1024;

struct ChannelState {
    sender: broadcast::Sender<Message>,
}

/// Default, tokio-channel-backed [`MessageBus`]. One process, many tasks.
pub struct InProcessBus {
    channels: Mutex<HashMap<String, ChannelState>>,
    subscriptions: Mutex<HashMap<u64, JoinHandle<()>>>,
    next_token: AtomicU64,
}

impl Default for InProcessBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InProcessBus {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<Message> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(channel.to_string())
            .or_insert_with(|| ChannelState {
                sender: broadcast::channel(CHANNEL_CAPACITY).0,
            })
            .sender
            .clone()
    }
}

#[async_trait]
impl MessageBus for InProcessBus {
    async fn publish(&self, channel: &str, message: Message) -> Result<(), BusError> {
        let sender = self.sender_for(channel);
        // No receivers is a normal pub/sub state, not a transport failure.
        let _ = sender.send(message);
        Ok(())
    }

    async fn subscribe(
        &self,
        channel: &str,
        handler: Box<dyn Fn(Message) + Send + Sync>,
    ) -> Result<SubscriptionToken, BusError> {
        let mut receiver = self.sender_for(channel).subscribe();
        let join = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => handler(message),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token, join);
        Ok(SubscriptionToken(token))
    }

    async fn unsubscribe(&self, token: SubscriptionToken) -> Result<(), BusError> {
        let handle = self
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&token.0);
        if let Some(handle) = handle {
            handle.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maoc_domain::bus::MessageType;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn published_messages_reach_subscribers() {
        let bus = InProcessBus::new();
        let received = Arc::new(Mutex::new(None));
        let received_clone = received.clone();

        bus.subscribe(
            "crew.test.broadcast",
            Box::new(move |message| {
                *received_clone.lock().unwrap() = Some(message.payload);
            }),
        )
        .await
        .unwrap();

        bus.publish(
            "crew.test.broadcast",
            Message::new(MessageType::Broadcast, "solver", json!({"k": "v"}), 0),
        )
        .await
        .unwrap();

        // Let the spawned subscriber task drain the channel.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(received.lock().unwrap().as_ref(), Some(&json!({"k": "v"})));
    }

    #[tokio::test]
    async fn publishing_with_no_subscribers_is_not_an_error() {
        let bus = InProcessBus::new();
        let result = bus
            .publish(
                "crew.empty.broadcast",
                Message::new(MessageType::Broadcast, "solver", json!(null), 0),
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let bus = InProcessBus::new();
        let delivered = Arc::new(AtomicBool::new(false));
        let delivered_clone = delivered.clone();

        let token = bus
            .subscribe(
                "crew.test.broadcast",
                Box::new(move |_| delivered_clone.store(true, Ordering::SeqCst)),
            )
            .await
            .unwrap();

        bus.unsubscribe(token).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        bus.publish(
            "crew.test.broadcast",
            Message::new(MessageType::Broadcast, "solver", json!(null), 0),
        )
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(!delivered.load(Ordering::SeqCst));
    }
}
