//! The WebSocket session actor.
//!
//! Mirrors [`crate::session::telnet`]'s shape but is considerably simpler:
//! there is no byte-level framing to drive (each WebSocket frame is one
//! command) and no handshake to wait on, so the barrier is drained by
//! construction and readiness fires on the first loop iteration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, instrument, trace, warn, Instrument};

use crate::capabilities::Capabilities;
use crate::handler::{GatewayHandler, OutboundMessage, SessionHandle, SessionInfo, Transport};
use crate::logging::session_span;
use crate::manager::Manager;

const KEEPALIVE_PERIOD: Duration = Duration::from_secs(30);

/// Spawn a WebSocket session actor over an already-upgraded stream.
/// Registers the session with `manager`, calls `on_connect`, then fires
/// `on_ready` immediately since there is no handshake to wait on.
#[instrument(level = "trace", skip(stream, manager, gateway_handler))]
pub async fn spawn<S>(
    stream: WebSocketStream<S>,
    peer: SocketAddr,
    tls: bool,
    listener: &str,
    manager: Manager,
    gateway_handler: Arc<dyn GatewayHandler>,
) -> (SessionHandle, JoinHandle<()>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let name = manager.unique_name(listener).await;
    let info = SessionInfo {
        name,
        peer,
        transport: Transport::WebSocket,
        tls,
    };

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let mut capabilities = Capabilities::with_tls(tls);
    capabilities.suppress_ga = true;
    let (caps_tx, caps_rx) = watch::channel(capabilities.clone());

    let handle = SessionHandle {
        info: info.clone(),
        outbound: outbound_tx.clone(),
        capabilities: caps_rx,
    };

    manager.register(handle.clone()).await;
    gateway_handler.on_connect(handle.clone()).await;

    let span = session_span(&info);
    let task = tokio::spawn(
        Session {
            info,
            stream,
            manager,
            gateway_handler,
            capabilities,
            capabilities_tx: caps_tx,
            outbound_tx,
            outbound_rx,
        }
        .run()
        .instrument(span),
    );

    (handle, task)
}

struct Session<S> {
    info: SessionInfo,
    stream: WebSocketStream<S>,
    manager: Manager,
    gateway_handler: Arc<dyn GatewayHandler>,
    capabilities: Capabilities,
    capabilities_tx: watch::Sender<Capabilities>,
    outbound_tx: UnboundedSender<OutboundMessage>,
    outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

enum Step {
    Continue,
    Disconnect,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn run(mut self) {
        trace!("websocket session starting");

        // No handshake to drain: fire readiness on the spot.
        self.gateway_handler.on_ready(self.current_handle()).await;

        let mut keepalive = tokio::time::interval(KEEPALIVE_PERIOD);
        keepalive.tick().await;

        loop {
            let step = tokio::select! {
                msg = self.stream.next() => {
                    self.handle_read(msg).await
                }
                msg = self.outbound_rx.recv() => {
                    self.handle_outbound(msg).await
                }
                _ = keepalive.tick() => {
                    self.handle_keepalive().await;
                    Step::Continue
                }
            };

            if let Step::Disconnect = step {
                break;
            }
        }

        self.manager.deregister(&self.info.name).await;
        self.gateway_handler.on_disconnect(self.info.clone()).await;
        trace!("websocket session ended");
    }

    async fn handle_read(
        &mut self,
        msg: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
    ) -> Step {
        match msg {
            Some(Ok(Message::Text(text))) => {
                self.gateway_handler
                    .on_command(self.current_handle(), text.into_bytes().into())
                    .await;
                Step::Continue
            }
            Some(Ok(Message::Binary(data))) => {
                self.gateway_handler
                    .on_command(self.current_handle(), data.into())
                    .await;
                Step::Continue
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => Step::Continue,
            Some(Ok(Message::Close(_))) => {
                debug!("peer sent close frame");
                Step::Disconnect
            }
            Some(Ok(Message::Frame(_))) => Step::Continue,
            Some(Err(err)) => {
                warn!(error = %err, "websocket read error, disconnecting");
                Step::Disconnect
            }
            None => {
                debug!("websocket stream ended");
                Step::Disconnect
            }
        }
    }

    async fn handle_outbound(&mut self, msg: Option<OutboundMessage>) -> Step {
        let Some(msg) = msg else {
            return Step::Disconnect;
        };

        if !msg.data.is_empty() {
            let text = String::from_utf8_lossy(&msg.data).into_owned();
            if let Err(err) = self.stream.send(Message::Text(text.into())).await {
                warn!(error = %err, "websocket write error, disconnecting");
                return Step::Disconnect;
            }
        }

        if msg.half_close {
            let _ = self.stream.close(None).await;
            return Step::Disconnect;
        }

        Step::Continue
    }

    async fn handle_keepalive(&mut self) {
        if !self.capabilities.keepalive {
            return;
        }
        if let Err(err) = self.stream.send(Message::Ping(Vec::new().into())).await {
            warn!(error = %err, "keepalive ping failed");
        }
    }

    fn current_handle(&self) -> SessionHandle {
        SessionHandle {
            info: self.info.clone(),
            outbound: self.outbound_tx.clone(),
            capabilities: self.capabilities_tx.subscribe(),
        }
    }
}
