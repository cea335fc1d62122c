//! Server state and configuration.

use std::collections::HashMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::GeneratorConfig;

use super::session::SessionHandle;

/// Idle time after which a session is dropped (1 hour).
pub const SESSION_EXPIRATION_SECS: u64 = 3600;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Settings every new session starts from
    pub generator: GeneratorConfig,
}

/// A live page session.
pub struct Session {
    pub handle: SessionHandle,
    pub last_accessed: Instant,
}

impl Session {
    pub fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            last_accessed: Instant::now(),
        }
    }

    /// Update last accessed time.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
    pub sessions: RwLock<HashMap<Uuid, Session>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            config,
            boot_time,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}
