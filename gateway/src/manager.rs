//! Session name registry and listener bookkeeping.
//!
//! The registry is the one piece of state genuinely shared across sessions:
//! every other field a session owns is touched only from that session's own
//! task.

use std::collections::HashMap;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{instrument, trace};

use crate::handler::SessionHandle;

const NAME_SUFFIX_LEN: usize = 20;

/// Owns the registry of live sessions, keyed by their generated name.
#[derive(Debug, Default, Clone)]
pub struct Manager {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a session name unique within this manager's registry, of the
    /// form `<listener>_<20 random alphanumerics>`.
    pub async fn unique_name(&self, listener: &str) -> String {
        let sessions = self.sessions.read().await;
        loop {
            let suffix: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(NAME_SUFFIX_LEN)
                .map(char::from)
                .collect();
            let name = format!("{listener}_{suffix}");
            if !sessions.contains_key(&name) {
                return name;
            }
        }
    }

    /// Register an established session, making it visible to lookups.
    #[instrument(level = "trace", skip(self, handle), fields(name = handle.name()))]
    pub async fn register(&self, handle: SessionHandle) {
        trace!("registering session");
        self.sessions
            .write()
            .await
            .insert(handle.name().to_string(), handle);
    }

    /// Remove a session from the registry, e.g. on disconnect.
    #[instrument(level = "trace", skip(self))]
    pub async fn deregister(&self, name: &str) {
        trace!("deregistering session");
        self.sessions.write().await.remove(name);
    }

    /// Look up a live session by name.
    pub async fn lookup(&self, name: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(name).cloned()
    }

    /// The number of currently registered sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::handler::{SessionInfo, Transport};
    use pretty_assertions::assert_eq;
    use tokio::sync::{mpsc, watch};

    fn handle(name: &str) -> SessionHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        let (_watch_tx, watch_rx) = watch::channel(Capabilities::default());
        SessionHandle {
            info: SessionInfo {
                name: name.to_string(),
                peer: "127.0.0.1:4000".parse().unwrap(),
                transport: Transport::Telnet,
                tls: false,
            },
            outbound: tx,
            capabilities: watch_rx,
        }
    }

    #[tokio::test]
    async fn register_then_lookup_then_deregister() {
        let manager = Manager::new();
        manager.register(handle("mud_abc")).await;
        assert_eq!(manager.len().await, 1);
        assert!(manager.lookup("mud_abc").await.is_some());

        manager.deregister("mud_abc").await;
        assert!(manager.lookup("mud_abc").await.is_none());
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn unique_name_avoids_collisions() {
        let manager = Manager::new();
        manager.register(handle("mud_fixed")).await;
        for _ in 0..50 {
            let name = manager.unique_name("mud").await;
            assert_ne!(name, "mud_fixed");
            assert!(name.starts_with("mud_"));
        }
    }
}
