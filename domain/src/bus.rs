//! Message Bus (§4.C) — a typed pub/sub abstraction the rest of the core
//! depends on as a trait only. Implementations (in-process channels, an
//! external broker, a cache-backed bus) live in the infrastructure layer;
//! this module defines the wire shape and the contract they must honor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ids::CrewId;

/// Closed set of message kinds carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    TaskRequest,
    TaskResponse,
    VoteRequest,
    VoteCast,
    Proposal,
    StatusUpdate,
    Broadcast,
    PeerMessage,
    Error,
}

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One message on the bus. `id` is used for at-least-once deduplication by
/// subscribers; the bus itself does not deduplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub message_type: MessageType,
    pub sender_id: String,
    pub receiver_id: Option<String>,
    pub crew_id: Option<CrewId>,
    pub payload: Value,
    pub correlation_id: Option<String>,
    pub timestamp_ms: u64,
}

impl Message {
    pub fn new(
        message_type: MessageType,
        sender_id: impl Into<String>,
        payload: Value,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            id: MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed),
            message_type,
            sender_id: sender_id.into(),
            receiver_id: None,
            crew_id: None,
            payload,
            correlation_id: None,
            timestamp_ms,
        }
    }

    pub fn to(mut self, receiver_id: impl Into<String>) -> Self {
        self.receiver_id = Some(receiver_id.into());
        self
    }

    pub fn for_crew(mut self, crew_id: CrewId) -> Self {
        self.crew_id = Some(crew_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Well-known broadcast channel name for a crew.
    pub fn broadcast_channel(crew_id: &CrewId) -> String {
        format!("crew.{crew_id}.broadcast")
    }

    /// Well-known direct channel name for one agent within a crew.
    pub fn agent_channel(crew_id: &CrewId, agent_id: &str) -> String {
        format!("crew.{crew_id}.agent.{agent_id}")
    }
}

/// Token returned by `subscribe`, used to `unsubscribe` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionToken(pub u64);

/// Errors a bus implementation may surface. Transport-specific failures are
/// folded into `Closed`/`SendFailed` rather than leaking transport types.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("channel closed: {0}")]
    Closed(String),
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Typed pub/sub the core depends on. Implementations may back this with an
/// in-process channel set, an AMQP-style broker, or a cache-based bus — the
/// core only ever calls through this trait.
///
/// Ordering guarantee: per-sender FIFO on each channel; no global ordering.
/// Broadcast is at-least-once; direct delivery is exactly-once only when the
/// transport guarantees it, so message IDs exist for idempotent handling.
#[async_trait::async_trait]
pub trait MessageBus: Send + Sync {
    /// Fan out `message` to every listener subscribed to `channel`.
    async fn publish(&self, channel: &str, message: Message) -> Result<(), BusError>;

    /// Register a handler for every message published to `channel`.
    async fn subscribe(
        &self,
        channel: &str,
        handler: Box<dyn Fn(Message) + Send + Sync>,
    ) -> Result<SubscriptionToken, BusError>;

    /// Remove a previously registered subscription.
    async fn unsubscribe(&self, token: SubscriptionToken) -> Result<(), BusError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_follow_well_known_pattern() {
        let crew_id = CrewId::new("crew-1");
        assert_eq!(Message::broadcast_channel(&crew_id), "crew.crew-1.broadcast");
        assert_eq!(
            Message::agent_channel(&crew_id, "agent-7"),
            "crew.crew-1.agent.agent-7"
        );
    }

    #[test]
    fn message_ids_are_monotonically_assigned() {
        let a = Message::new(MessageType::Broadcast, "s1", Value::Null, 0);
        let b = Message::new(MessageType::Broadcast, "s1", Value::Null, 0);
        assert!(b.id > a.id);
    }

    #[test]
    fn builder_methods_set_optional_fields() {
        let crew_id = CrewId::new("crew-2");
        let msg = Message::new(MessageType::TaskRequest, "solver", Value::Null, 1)
            .to("agent-1")
            .for_crew(crew_id.clone())
            .with_correlation("corr-1");
        assert_eq!(msg.receiver_id.as_deref(), Some("agent-1"));
        assert_eq!(msg.crew_id, Some(crew_id));
        assert_eq!(msg.correlation_id.as_deref(), Some("corr-1"));
    }
}
