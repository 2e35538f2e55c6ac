use tokio::sync::broadcast::{self, error::RecvError};

use crate::event::GrantEvent;

pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Fan-out of session lifecycle events. Observers are optional, so emitting
/// with nobody subscribed is not an error.
#[derive(Clone)]
pub struct Bus {
    sender: broadcast::Sender<GrantEvent>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Every event from every session.
    pub fn subscribe(&self) -> broadcast::Receiver<GrantEvent> {
        self.sender.subscribe()
    }

    /// Events of one session only.
    pub fn subscribe_session(&self, session_id: &str) -> SessionEvents {
        SessionEvents {
            session_id: session_id.to_string(),
            receiver: self.sender.subscribe(),
        }
    }

    pub(crate) fn emit(&self, event: GrantEvent) {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(kind, receivers, "event published"),
            Err(_) => tracing::trace!(kind, "event dropped; no subscribers"),
        }
    }
}

/// Receiver filtered to a single session. Lagging skips the lost events
/// instead of failing.
pub struct SessionEvents {
    session_id: String,
    receiver: broadcast::Receiver<GrantEvent>,
}

impl SessionEvents {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Next event of this session, or `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<GrantEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.session_id() == self.session_id => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(session_id = %self.session_id, skipped, "session events lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Events of this session already queued, without waiting.
    pub fn drain(&mut self) -> Vec<GrantEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.session_id() == self.session_id => events.push(event),
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return events,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AbandonReason, SessionAbandonedPayload, SessionResumedPayload};
    use tokio::time::{timeout, Duration};

    fn resumed(session_id: &str) -> GrantEvent {
        GrantEvent::SessionResumed(SessionResumedPayload {
            session_id: session_id.to_string(),
            suspension: 1,
            capability: None,
            at: crate::utils::time::now_rfc3339(),
        })
    }

    #[tokio::test]
    async fn session_subscription_filters_other_sessions() {
        let bus = Bus::new(8);
        let mut events = bus.subscribe_session("s2");

        bus.emit(resumed("s1"));
        bus.emit(resumed("s2"));

        let received = timeout(Duration::from_millis(100), events.next())
            .await
            .expect("timeout")
            .expect("event");
        assert_eq!(received.session_id(), "s2");
        assert!(events.drain().is_empty());
    }

    #[tokio::test]
    async fn next_returns_none_when_bus_dropped() {
        let bus = Bus::new(8);
        let mut events = bus.subscribe_session("s1");
        bus.emit(GrantEvent::SessionAbandoned(SessionAbandonedPayload {
            session_id: "s1".to_string(),
            reason: AbandonReason::SurfaceDestroyed,
            at: crate::utils::time::now_rfc3339(),
        }));
        drop(bus);

        assert!(matches!(events.next().await, Some(GrantEvent::SessionAbandoned(_))));
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn lagging_subscriber_keeps_latest_events() {
        let bus = Bus::new(2);
        let mut events = bus.subscribe_session("s1");
        for _ in 0..5 {
            bus.emit(resumed("s1"));
        }
        assert_eq!(events.drain().len(), 2);
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = Bus::default();
        bus.emit(resumed("s1"));
    }
}
