use async_trait::async_trait;
use mudgate_core::{GatewayHandler, SessionHandle, SessionInfo};
use tokio_util::bytes::Bytes;
use tracing::info;

/// A [`GatewayHandler`] that only logs lifecycle and traffic events,
/// standing in for a real embedding application's business logic.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl GatewayHandler for LoggingHandler {
    async fn on_connect(&self, session: SessionHandle) {
        info!(name = session.name(), peer = %session.info().peer, "session connected");
    }

    async fn on_ready(&self, session: SessionHandle) {
        info!(name = session.name(), "session ready");
    }

    async fn on_command(&self, session: SessionHandle, line: Bytes) {
        info!(name = session.name(), line = %String::from_utf8_lossy(&line), "command");
    }

    async fn on_oob(&self, session: SessionHandle, option: u8, payload: Bytes) {
        info!(name = session.name(), option, len = payload.len(), "out-of-band message");
    }

    async fn on_update(&self, session: SessionHandle) {
        info!(name = session.name(), capabilities = ?session.capabilities(), "capabilities updated");
    }

    async fn on_disconnect(&self, info: SessionInfo) {
        info!(name = %info.name, "session disconnected");
    }
}
