//! Event bus port: the notification hook invoked after mutations.

use std::future::Future;

use mockhub_domain::error::MockHubError;
use mockhub_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MockHubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MockHubError>> + Send {
        (**self).publish(event)
    }
}
