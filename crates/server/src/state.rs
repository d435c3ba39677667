use std::sync::Arc;

use service::nights::NightService;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub nights: Arc<NightService>,
}

impl ServerState {
    pub fn new(nights: NightService) -> Self {
        Self { nights: Arc::new(nights) }
    }
}
