use crate::use_cases::SessionRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Registry of active sessions shared by all routes and sockets.
    pub session_registry: Arc<SessionRegistry>,
}
