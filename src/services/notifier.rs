use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::warn;

use crate::{dto::outbound::OutboundMessage, state::RoomId};

/// Failure to hand a message over to the messaging platform.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Nobody is listening for outbound messages.
    #[error("no outbound subscriber is connected")]
    NoSubscriber,
}

/// Outbound messaging contract.
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `room`.
    fn send(&self, room: &RoomId, message: OutboundMessage)
    -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// Message addressed to a room, as published by [`ChannelNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    /// Target room.
    pub room: RoomId,
    /// Rendered message.
    pub message: OutboundMessage,
}

/// Notifier fanning deliveries out to every subscriber over a broadcast channel.
pub struct ChannelNotifier {
    sender: broadcast::Sender<Delivery>,
}

impl ChannelNotifier {
    /// Construct a notifier backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent deliveries.
    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.sender.subscribe()
    }
}

impl Notifier for ChannelNotifier {
    fn send(
        &self,
        room: &RoomId,
        message: OutboundMessage,
    ) -> BoxFuture<'static, Result<(), NotifyError>> {
        let result = self
            .sender
            .send(Delivery {
                room: room.clone(),
                message,
            })
            .map(|_| ())
            .map_err(|_| NotifyError::NoSubscriber);
        Box::pin(async move { result })
    }
}

/// Send `message` and log a failure instead of propagating it: a lost
/// notification never aborts a game operation.
pub async fn notify(notifier: &dyn Notifier, room: &RoomId, message: OutboundMessage) {
    if let Err(err) = notifier.send(room, message).await {
        warn!(%room, error = %err, "failed to deliver outbound message");
    }
}
