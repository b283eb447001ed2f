use shared::protocol::ServerEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Fan-out for state transitions. Implementations must tolerate
/// subscribers joining or leaving while an event is being delivered.
pub trait ChangeNotifier: Send + Sync {
    fn publish(&self, event: ServerEvent);

    /// `None` when the strategy has no push channel and viewers are
    /// expected to re-query instead.
    fn subscribe(&self) -> Option<broadcast::Receiver<ServerEvent>>;

    fn subscriber_count(&self) -> usize;
}

/// Push strategy: every live receiver gets each event at most once. A
/// receiver that falls more than `capacity` events behind skips the
/// backlog.
#[derive(Clone)]
pub struct BroadcastNotifier {
    events: broadcast::Sender<ServerEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { events }
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn publish(&self, event: ServerEvent) {
        let kind = event.kind();
        match self.events.send(event) {
            Ok(delivered) => debug!(kind, delivered, "event published"),
            Err(_) => debug!(kind, "event published with no subscribers"),
        }
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ServerEvent>> {
        Some(self.events.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

/// Poll strategy: nothing is pushed. Viewers observe changes by calling
/// the read operations again.
#[derive(Clone, Copy, Default)]
pub struct PollNotifier;

impl ChangeNotifier for PollNotifier {
    fn publish(&self, event: ServerEvent) {
        debug!(kind = event.kind(), "state changed");
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ServerEvent>> {
        None
    }

    fn subscriber_count(&self) -> usize {
        0
    }
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
