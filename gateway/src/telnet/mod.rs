//! Telnet option negotiation and framing engine.
//!
//! [`codec`] turns a byte stream into [`codec::Event`]s, [`negotiation`] tracks
//! per-option handshake state, [`barrier`] decides readiness, [`compress`]
//! wraps the MCCP2/MCCP3 zlib streams, and [`handler`] dispatches negotiation
//! and subnegotiation events to the option implementations in [`options`].

pub mod barrier;
pub mod codec;
pub mod compress;
pub mod handler;
pub mod negotiation;
pub mod options;

/// RFC 854 command bytes.
pub mod command {
    pub const SE: u8 = 240;
    pub const NOP: u8 = 241;
    pub const GA: u8 = 249;
    pub const SB: u8 = 250;
    pub const WILL: u8 = 251;
    pub const WONT: u8 = 252;
    pub const DO: u8 = 253;
    pub const DONT: u8 = 254;
    pub const IAC: u8 = 255;
}

/// Telnet/MUD option codes used on the wire.
pub mod option {
    pub const MSDP: u8 = 69;
    pub const SGA: u8 = 3;
    pub const TELOPT_EOR: u8 = 25;
    pub const TTYPE: u8 = 24;
    pub const NAWS: u8 = 31;
    pub const LINEMODE: u8 = 34;
    pub const MNES: u8 = 39;
    pub const MSSP: u8 = 70;
    pub const MCCP2: u8 = 86;
    pub const MCCP3: u8 = 87;
    pub const MXP: u8 = 91;
    pub const GMCP: u8 = 201;
}
