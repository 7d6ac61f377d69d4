//! The embedding application's view of a session: the [`GatewayHandler`]
//! trait it implements, and the [`SessionHandle`] the core hands back.

use std::fmt::{self, Display, Formatter};
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tokio_util::bytes::Bytes;

use crate::capabilities::Capabilities;

/// Which transport a session was accepted over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Telnet,
    WebSocket,
}

impl Display for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Telnet => write!(f, "telnet"),
            Transport::WebSocket => write!(f, "websocket"),
        }
    }
}

/// Static identity of a session, handed to `on_connect`/`on_disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionInfo {
    pub name: String,
    pub peer: SocketAddr,
    pub transport: Transport,
    pub tls: bool,
}

/// A payload destined for the outbound queue.
///
/// `activate_outbound_compression` marks the MCCP2 announcement message:
/// everything enqueued *after* this one is written through the deflate
/// stream, this message itself is not. `half_close` ends the session after
/// the write task drains it. `application` marks a genuine
/// [`SessionHandle::send`] write: only those get the trailing `IAC GA` when
/// go-ahead suppression isn't in effect — negotiation replies, subnegotiation
/// responses, and the compression announcement itself are protocol framing,
/// not application output, and must reach the wire byte-for-byte.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub data: Bytes,
    pub activate_outbound_compression: bool,
    pub half_close: bool,
    pub(crate) application: bool,
}

impl OutboundMessage {
    /// An application-level write, eligible for the trailing `IAC GA`.
    #[must_use]
    pub fn data(data: Bytes) -> Self {
        Self {
            data,
            activate_outbound_compression: false,
            half_close: false,
            application: true,
        }
    }

    /// A protocol-internal reply (negotiation, subnegotiation, status
    /// report): never gets a go-ahead appended.
    #[must_use]
    pub(crate) fn protocol(data: Bytes) -> Self {
        Self {
            data,
            activate_outbound_compression: false,
            half_close: false,
            application: false,
        }
    }

    #[must_use]
    pub(crate) fn compression_activation(data: Bytes) -> Self {
        Self {
            data,
            activate_outbound_compression: true,
            half_close: false,
            application: false,
        }
    }

    #[must_use]
    pub fn half_close() -> Self {
        Self {
            data: Bytes::new(),
            activate_outbound_compression: false,
            half_close: true,
            application: false,
        }
    }
}

/// A cheap-to-clone reference to a running session.
///
/// Cloning does not clone session state: the outbound sender and capability
/// watch are themselves cheap handles, so many clones can coexist (e.g. one
/// held by the manager's registry, one handed to the embedding application).
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) info: SessionInfo,
    pub(crate) outbound: UnboundedSender<OutboundMessage>,
    pub(crate) capabilities: watch::Receiver<Capabilities>,
}

impl SessionHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    #[must_use]
    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.borrow().clone()
    }

    /// Enqueue an application-level write. The session owns framing (the
    /// trailing `IAC GA` when go-ahead suppression isn't in effect).
    pub fn send(&self, data: impl Into<Bytes>) {
        let _ = self.outbound.send(OutboundMessage::data(data.into()));
    }

    /// End the session after any queued writes drain.
    pub fn close(&self) {
        let _ = self.outbound.send(OutboundMessage::half_close());
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Callbacks the embedding application implements to observe session
/// lifecycle and traffic.
///
/// Every method has a no-op default, matching the original "all callbacks
/// optional" design; implementors override only the ones they need.
#[async_trait]
pub trait GatewayHandler: Send + Sync {
    /// The session was accepted and announced.
    async fn on_connect(&self, _session: SessionHandle) {}

    /// The handshake quorum drained, or the grace timer elapsed.
    async fn on_ready(&self, _session: SessionHandle) {}

    /// One inbound logical line.
    async fn on_command(&self, _session: SessionHandle, _line: Bytes) {}

    /// One out-of-band (GMCP/MSDP) message, opaque beyond its option code.
    async fn on_oob(&self, _session: SessionHandle, _option: u8, _payload: Bytes) {}

    /// A capability changed.
    async fn on_update(&self, _session: SessionHandle) {}

    /// The session is ending.
    async fn on_disconnect(&self, _session: SessionInfo) {}
}

/// A [`GatewayHandler`] with every callback a no-op; useful as a placeholder
/// or in tests that only care about wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

#[async_trait]
impl GatewayHandler for NoopHandler {}
