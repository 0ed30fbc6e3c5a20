//! Background worker draining the visit accounting queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::entities::NewVisitEvent;
use crate::domain::repositories::{LinkRepository, VisitRepository};

/// Drains visit events and applies accounting writes.
///
/// Every event is appended to the visit log. Admitted (non-blocked) events
/// additionally advance the link's click counter; both writes run
/// concurrently. Failures are logged and swallowed, never retried; the
/// request that produced the event has usually already been answered.
///
/// Runs until the sender side of the channel is dropped.
pub async fn run_visit_worker(
    mut rx: mpsc::Receiver<NewVisitEvent>,
    visits: Arc<dyn VisitRepository>,
    links: Arc<dyn LinkRepository>,
) {
    while let Some(event) = rx.recv().await {
        let link_id = event.short_link_id;
        let visited_at = event.visited_at;
        let blocked = event.is_blocked;

        if blocked {
            if let Err(e) = visits.record(event).await {
                warn!("failed to record blocked visit for link {}: {:?}", link_id, e);
            }
            continue;
        }

        let (recorded, incremented) = tokio::join!(
            visits.record(event),
            links.increment_clicks(link_id, visited_at),
        );

        if let Err(e) = recorded {
            warn!("failed to record visit for link {}: {:?}", link_id, e);
        }
        if let Err(e) = incremented {
            warn!("failed to increment clicks for link {}: {:?}", link_id, e);
        }
    }
}
