//! In-process notification hook for the simulated devices.
//!
//! The dispatcher hands every `call_service` and `state_changed` event to
//! this bus; the daemon and the tests read them back from a subscription.

use std::future::Future;

use tokio::sync::broadcast;

use mockhub_domain::error::MockHubError;
use mockhub_domain::event::Event;

use crate::ports::EventPublisher;

/// Broadcast fan-out of device events.
///
/// Events published while nobody listens are dropped, and a subscriber that
/// falls more than `capacity` events behind loses the oldest ones. Neither
/// case fails the service call that produced the event.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration rejects that value first.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MockHubError>> + Send {
        let kind = event.event_type;
        let entity_id = event.entity_id.clone();
        match self.sender.send(event) {
            Ok(delivered) => tracing::trace!(?kind, ?entity_id, delivered, "event published"),
            Err(_) => tracing::trace!(?kind, ?entity_id, "event dropped, no subscriber"),
        }
        async { Ok(()) }
    }
}
