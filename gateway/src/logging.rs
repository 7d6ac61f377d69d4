//! Tracing span helpers shared by the session actors.
//!
//! `gateway` never installs a subscriber itself — that's the embedding
//! daemon's job (see `gatewayd::logging`) — it only emits events onto
//! whatever subscriber the process has installed.

use tracing::Span;

use crate::handler::SessionInfo;

/// The span every session actor runs its `select!` loop under, carrying the
/// fields useful to correlate log lines for one connection.
pub fn session_span(info: &SessionInfo) -> Span {
    tracing::info_span!(
        "session",
        name = %info.name,
        peer = %info.peer,
        transport = %info.transport,
        tls = info.tls,
    )
}
