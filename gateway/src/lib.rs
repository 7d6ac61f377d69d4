//! Telnet/MUD option negotiation, MCCP framing and session lifecycle core
//! of the mudgate session gateway.
//!
//! This crate owns the protocol-level work: byte-level Telnet parsing
//! ([`telnet::codec`]), per-option handshake state machines
//! ([`telnet::handler`], [`telnet::options`]), the readiness barrier
//! ([`telnet::barrier`]), MCCP2/MCCP3 compression ([`telnet::compress`]),
//! and the two transport session actors ([`session::telnet`],
//! [`session::websocket`]) coordinated through a [`manager::Manager`].
//!
//! It does not install a logging subscriber, parse a config file, or
//! interpret GMCP/MSDP payloads beyond their opaque delivery — those are
//! the embedding application's job (see the `mudgated` reference daemon).

pub mod capabilities;
pub mod config;
pub mod error;
pub mod handler;
pub mod listener;
pub mod logging;
pub mod manager;
pub mod session;
pub mod telnet;

pub use capabilities::Capabilities;
pub use error::{Error, ErrorKind};
pub use handler::{GatewayHandler, NoopHandler, OutboundMessage, SessionHandle, SessionInfo, Transport};
pub use listener::Listener;
pub use manager::Manager;

pub type Result<T, E = Error> = core::result::Result<T, E>;
