use crate::capabilities::Capabilities;
use crate::telnet::handler::{HandlerContext, OptionHandler};

/// GMCP/MSDP: opaque out-of-band channels. Negotiation only grants remote
/// support (no handshake side effects beyond the capability flag); actual
/// payload delivery happens at the session layer via `on_oob`, since it
/// needs the async `GatewayHandler` callback that option handlers don't
/// have access to.
pub struct OobHandler {
    opcode: u8,
    set_enabled: fn(&mut Capabilities, bool),
}

impl OobHandler {
    #[must_use]
    pub fn gmcp() -> Self {
        Self {
            opcode: crate::telnet::option::GMCP,
            set_enabled: |c, v| c.gmcp = v,
        }
    }

    #[must_use]
    pub fn msdp() -> Self {
        Self {
            opcode: crate::telnet::option::MSDP,
            set_enabled: |c, v| c.msdp = v,
        }
    }
}

impl OptionHandler for OobHandler {
    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn supports_remote(&self) -> bool {
        true
    }

    fn enable_remote(&mut self, ctx: &mut HandlerContext) {
        (self.set_enabled)(ctx.capabilities, true);
        ctx.mark_updated();
    }

    fn disable_remote(&mut self, ctx: &mut HandlerContext) {
        (self.set_enabled)(ctx.capabilities, false);
        ctx.mark_updated();
    }
}
