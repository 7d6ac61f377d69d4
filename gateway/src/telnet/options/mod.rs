//! Per-option handshake implementations, registered into a
//! [`crate::telnet::handler::Registry`].

mod linemode;
mod mccp2;
mod mccp3;
mod mnes;
pub mod mssp;
mod naws;
mod oob;
mod sga;
mod ttype;

pub use linemode::LinemodeHandler;
pub use mccp2::Mccp2Handler;
pub use mccp3::Mccp3Handler;
pub use mnes::MnesHandler;
pub use mssp::{MsspHandler, MsspValue};
pub use naws::NawsHandler;
pub use oob::OobHandler;
pub use sga::SgaHandler;
pub use ttype::TtypeHandler;
