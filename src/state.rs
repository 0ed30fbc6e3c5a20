use std::sync::Arc;

use crate::application::services::{AssetService, RedirectService};
use crate::domain::visit_queue::VisitQueue;

/// Shared application state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub asset_service: Arc<AssetService>,
    pub visit_queue: VisitQueue,
    /// Bearer token expected on `/api/*` requests.
    pub admin_token: String,
}
