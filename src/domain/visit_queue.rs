//! Deferred dispatch of visit events.

use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::entities::NewVisitEvent;

/// Sender half of the visit accounting channel.
///
/// Dispatch is fire-and-forget relative to the HTTP response: the handler
/// never waits on accounting, a full queue drops the event, and the receiver
/// side gives no ordering guarantee across concurrent requests. Used to pass
/// visit facts from the redirect engine to
/// [`crate::domain::visit_worker::run_visit_worker`].
#[derive(Clone)]
pub struct VisitQueue {
    tx: mpsc::Sender<NewVisitEvent>,
}

impl VisitQueue {
    /// Creates a bounded queue, returning the dispatch handle and the
    /// receiver to hand to the worker.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NewVisitEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueues a visit event without blocking.
    ///
    /// Best effort: when the queue is full or the worker is gone the event
    /// is dropped with a warning. Failure here is never surfaced to the
    /// request that produced the event.
    pub fn dispatch(&self, event: NewVisitEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("visit event dropped: {}", e);
        }
    }

    /// Remaining queue capacity, for health reporting.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Whether the worker side is still attached.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ResolvedLink;
    use crate::utils::client_info::ClientInfo;
    use chrono::Utc;

    fn event() -> NewVisitEvent {
        let link = ResolvedLink {
            id: 1,
            domain_id: 1,
            code: "c".to_string(),
            target_url: "https://x.com".to_string(),
            redirect_http_code: 302,
            use_interstitial: false,
            template_id: None,
            password_hash: None,
            max_visits: None,
            expire_at: None,
            total_clicks: 0,
            password_template_id: None,
            domain_password_template_id: None,
        };
        NewVisitEvent::success(&link, &ClientInfo::default(), Utc::now())
    }

    #[tokio::test]
    async fn test_dispatch_delivers_event() {
        let (queue, mut rx) = VisitQueue::new(4);
        queue.dispatch(event());
        let received = rx.try_recv().unwrap();
        assert_eq!(received.code, "c");
    }

    #[tokio::test]
    async fn test_full_queue_drops_silently() {
        let (queue, _rx) = VisitQueue::new(1);
        queue.dispatch(event());
        // Second dispatch exceeds capacity; must not panic or block.
        queue.dispatch(event());
    }

    #[tokio::test]
    async fn test_closed_queue_drops_silently() {
        let (queue, rx) = VisitQueue::new(1);
        drop(rx);
        assert!(!queue.is_open());
        queue.dispatch(event());
    }
}
