//! The Telnet session actor: one `tokio::spawn`ed task per connection
//! running a single `select!` loop over read, write, keepalive and the
//! readiness grace timer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, error, instrument, trace, warn, Instrument};

use crate::capabilities::Capabilities;
use crate::handler::{GatewayHandler, OutboundMessage, SessionHandle, SessionInfo, Transport};
use crate::logging::session_span;
use crate::manager::Manager;
use crate::session::drain_commands;
use crate::telnet::barrier::Barrier;
use crate::telnet::codec::{Codec, Event};
use crate::telnet::command::{GA, IAC, NOP};
use crate::telnet::compress::{Deflate, Inflate};
use crate::telnet::handler::Registry;
use crate::telnet::negotiation::Table;

const READ_CHUNK: usize = 4096;
const KEEPALIVE_PERIOD: Duration = Duration::from_secs(30);
const READY_GRACE: Duration = Duration::from_millis(300);

/// Spawn a Telnet session actor over an already-accepted stream. Registers
/// the session with `manager` and calls `on_connect` before returning.
#[instrument(level = "trace", skip(socket, manager, gateway_handler, registry))]
pub async fn spawn<S>(
    socket: S,
    peer: SocketAddr,
    tls: bool,
    listener: &str,
    manager: Manager,
    gateway_handler: Arc<dyn GatewayHandler>,
    registry: Registry,
) -> (SessionHandle, JoinHandle<()>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let name = manager.unique_name(listener).await;
    let info = SessionInfo {
        name,
        peer,
        transport: Transport::Telnet,
        tls,
    };

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (caps_tx, caps_rx) = watch::channel(Capabilities::with_tls(tls));

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
            socket,
            manager,
            gateway_handler,
            registry,
            table: Table::default(),
            barrier: Barrier::default(),
            capabilities: Capabilities::with_tls(tls),
            capabilities_tx: caps_tx,
            codec: Codec::new(),
            decode_buf: BytesMut::new(),
            command_buf: BytesMut::new(),
            inflate: None,
            deflate: None,
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
    socket: S,
    manager: Manager,
    gateway_handler: Arc<dyn GatewayHandler>,
    registry: Registry,
    table: Table,
    barrier: Barrier,
    capabilities: Capabilities,
    capabilities_tx: watch::Sender<Capabilities>,
    codec: Codec,
    decode_buf: BytesMut,
    command_buf: BytesMut,
    inflate: Option<Inflate>,
    deflate: Option<Deflate>,
    outbound_tx: UnboundedSender<OutboundMessage>,
    outbound_rx: UnboundedReceiver<OutboundMessage>,
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
        trace!("telnet session starting");

        self.registry.start(&mut self.table, &mut self.barrier, &self.outbound_tx);

        let mut keepalive = tokio::time::interval(KEEPALIVE_PERIOD);
        keepalive.tick().await; // first tick fires immediately; consume it

        let ready_timer = tokio::time::sleep(READY_GRACE);
        tokio::pin!(ready_timer);
        let mut ready_timer_active = true;

        let mut read_buf = [0u8; READ_CHUNK];

        loop {
            let step = tokio::select! {
                result = self.socket.read(&mut read_buf) => {
                    self.handle_read(result, &read_buf).await
                }
                msg = self.outbound_rx.recv() => {
                    self.handle_outbound(msg).await
                }
                _ = keepalive.tick() => {
                    self.handle_keepalive().await;
                    Step::Continue
                }
                () = &mut ready_timer, if ready_timer_active => {
                    ready_timer_active = false;
                    self.handle_ready_timer().await;
                    Step::Continue
                }
            };

            if let Step::Disconnect = step {
                break;
            }
        }

        self.manager.deregister(&self.info.name).await;
        self.gateway_handler.on_disconnect(self.info.clone()).await;
        trace!("telnet session ended");
    }

    #[instrument(level = "trace", skip(self, result, buf))]
    async fn handle_read(&mut self, result: std::io::Result<usize>, buf: &[u8]) -> Step {
        let n = match result {
            Ok(0) => {
                debug!("peer closed connection");
                return Step::Disconnect;
            }
            Ok(n) => n,
            Err(err) => {
                warn!(error = %err, "read error, disconnecting");
                return Step::Disconnect;
            }
        };

        let chunk = &buf[..n];
        let plaintext = match &mut self.inflate {
            Some(inflate) => match inflate.decompress(chunk) {
                Ok(data) => data,
                Err(err) => {
                    error!(error = %err, "mccp3 decompression failed, disconnecting");
                    return Step::Disconnect;
                }
            },
            None => Bytes::copy_from_slice(chunk),
        };
        self.decode_buf.extend_from_slice(&plaintext);

        loop {
            let event = match self.codec.decode(&mut self.decode_buf) {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(err) => {
                    error!(error = %err, "telnet parse error, disconnecting");
                    return Step::Disconnect;
                }
            };
            self.handle_event(event).await;
        }

        self.maybe_fire_ready(false).await;
        Step::Continue
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Data(data) => {
                self.command_buf.extend_from_slice(&data);
                let lines = drain_commands(&mut self.command_buf);
                for line in lines {
                    self.gateway_handler
                        .on_command(self.current_handle(), line)
                        .await;
                }
            }
            Event::Negotiation(neg) => {
                let updated = self.registry.dispatch_negotiation(
                    &mut self.table,
                    neg,
                    &mut self.capabilities,
                    &mut self.barrier,
                    &self.outbound_tx,
                );
                if updated {
                    self.publish_capabilities().await;
                }
            }
            Event::Subnegotiation(opt, payload) => {
                if self.is_oob_opcode(opt) && self.table.option(opt).remote_enabled() {
                    self.gateway_handler
                        .on_oob(self.current_handle(), opt, payload.clone())
                        .await;
                }

                let outcome = self.registry.dispatch_subnegotiation(
                    opt,
                    &payload,
                    &mut self.capabilities,
                    &mut self.barrier,
                    &self.outbound_tx,
                );
                if outcome.activate_inbound_compression && self.inflate.is_none() {
                    self.activate_inbound_compression();
                }
                if outcome.updated {
                    self.publish_capabilities().await;
                }
            }
            Event::Command(_) => {}
        }
    }

    fn is_oob_opcode(&self, opt: u8) -> bool {
        opt == crate::telnet::option::GMCP || opt == crate::telnet::option::MSDP
    }

    /// Install the MCCP3 inflate stream and replay any bytes already
    /// buffered (but not yet parsed) through it, since they may be the
    /// first compressed bytes arriving in the same TCP segment.
    fn activate_inbound_compression(&mut self) {
        let mut inflate = Inflate::new();
        if !self.decode_buf.is_empty() {
            match inflate.decompress(&self.decode_buf) {
                Ok(plain) => {
                    self.decode_buf.clear();
                    self.decode_buf.extend_from_slice(&plain);
                }
                Err(err) => {
                    warn!(error = %err, "failed decompressing mccp3 lookahead, dropping buffered bytes");
                    self.decode_buf.clear();
                }
            }
        }
        self.inflate = Some(inflate);
    }

    async fn handle_outbound(&mut self, msg: Option<OutboundMessage>) -> Step {
        let Some(msg) = msg else {
            return Step::Disconnect;
        };

        if !msg.data.is_empty() {
            let framed = if msg.application && !self.capabilities.suppress_ga {
                let mut with_ga = BytesMut::from(&msg.data[..]);
                with_ga.extend_from_slice(&[IAC, GA]);
                Bytes::from(with_ga)
            } else {
                msg.data
            };

            let wire = match &mut self.deflate {
                Some(deflate) => match deflate.compress(&framed) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        error!(error = %err, "mccp2 compression failed, disconnecting");
                        return Step::Disconnect;
                    }
                },
                None => framed,
            };

            if let Err(err) = self.socket.write_all(&wire).await {
                warn!(error = %err, "write error, disconnecting");
                return Step::Disconnect;
            }
        }

        if msg.activate_outbound_compression && self.deflate.is_none() {
            self.deflate = Some(Deflate::new());
        }

        if msg.half_close {
            if let Some(deflate) = self.deflate.take() {
                match deflate.finish() {
                    Ok(trailer) => {
                        let _ = self.socket.write_all(&trailer).await;
                    }
                    Err(err) => warn!(error = %err, "failed flushing mccp2 trailer on close"),
                }
            }
            let _ = self.socket.shutdown().await;
            return Step::Disconnect;
        }

        Step::Continue
    }

    async fn handle_keepalive(&mut self) {
        if !self.capabilities.keepalive {
            return;
        }
        if let Err(err) = self.socket.write_all(&[IAC, NOP]).await {
            warn!(error = %err, "keepalive write failed");
        }
    }

    async fn handle_ready_timer(&mut self) {
        self.maybe_fire_ready(true).await;
    }

    async fn maybe_fire_ready(&mut self, force: bool) {
        if self.barrier.check_ready(force) {
            self.gateway_handler.on_ready(self.current_handle()).await;
        }
    }

    async fn publish_capabilities(&mut self) {
        let _ = self.capabilities_tx.send(self.capabilities.clone());
        self.gateway_handler.on_update(self.current_handle()).await;
    }

    fn current_handle(&self) -> SessionHandle {
        SessionHandle {
            info: self.info.clone(),
            outbound: self.outbound_tx.clone(),
            capabilities: self.capabilities_tx.subscribe(),
        }
    }
}
