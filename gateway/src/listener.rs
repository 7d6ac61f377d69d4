//! Accept loops for the two transports, driven by a [`ListenerConfig`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener as TokioTcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::config::{self, ListenerConfig, Protocol};
use crate::error::{Error, ErrorKind};
use crate::handler::GatewayHandler;
use crate::manager::Manager;
use crate::session::{telnet, websocket};
use crate::telnet::handler::Registry;

fn resolve_bind_addr(interface: &str, port: u32) -> Option<SocketAddr> {
    let ip = config::resolve_interface(interface)?;
    format!("{ip}:{port}").parse().ok()
}

/// A running accept loop for one configured listener.
pub struct Listener {
    config: ListenerConfig,
    _task: JoinHandle<()>,
}

impl Listener {
    /// Bind and spawn the accept loop for `config`.
    ///
    /// Every accepted telnet connection gets a fresh [`Registry`] built by
    /// `registry_factory`, since handlers carry per-session negotiation
    /// state and can't be shared across sessions.
    #[instrument(level = "trace", skip(manager, gateway_handler, registry_factory))]
    pub async fn bind(
        config: ListenerConfig,
        manager: Manager,
        gateway_handler: Arc<dyn GatewayHandler>,
        registry_factory: impl Fn() -> Registry + Send + Sync + 'static,
    ) -> Result<Self, Error> {
        let addr = resolve_bind_addr(&config.interface, config.port)
            .ok_or_else(|| ErrorKind::UnknownInterface(config.interface.clone()))?;

        let tcp = TokioTcpListener::bind(addr).await?;
        info!(name = %config.name, %addr, protocol = ?config.protocol, "listener bound");

        let task = match config.protocol {
            Protocol::Telnet => tokio::spawn(telnet_accept_loop(
                tcp,
                config.name.clone(),
                manager,
                gateway_handler,
                registry_factory,
            )),
            Protocol::Websocket => tokio::spawn(websocket_accept_loop(
                tcp,
                config.name.clone(),
                manager,
                gateway_handler,
            )),
        };

        Ok(Self { config, _task: task })
    }

    #[must_use]
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }
}

async fn telnet_accept_loop(
    tcp: TokioTcpListener,
    name: String,
    manager: Manager,
    gateway_handler: Arc<dyn GatewayHandler>,
    registry_factory: impl Fn() -> Registry,
) {
    loop {
        let (socket, peer) = match tcp.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(listener = %name, error = %err, "accept failed");
                continue;
            }
        };

        if let Err(err) = socket.set_nodelay(true) {
            warn!(listener = %name, error = %err, "failed to set TCP_NODELAY");
        }

        let (_handle, _task) = telnet::spawn(
            socket,
            peer,
            false,
            &name,
            manager.clone(),
            gateway_handler.clone(),
            registry_factory(),
        )
        .await;
    }
}

async fn websocket_accept_loop(
    tcp: TokioTcpListener,
    name: String,
    manager: Manager,
    gateway_handler: Arc<dyn GatewayHandler>,
) {
    loop {
        let (socket, peer) = match tcp.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(listener = %name, error = %err, "accept failed");
                continue;
            }
        };

        let stream = match tokio_tungstenite::accept_async(socket).await {
            Ok(stream) => stream,
            Err(err) => {
                error!(listener = %name, error = %err, "websocket upgrade failed");
                continue;
            }
        };

        let (_handle, _task) =
            websocket::spawn(stream, peer, false, &name, manager.clone(), gateway_handler.clone())
                .await;
    }
}
