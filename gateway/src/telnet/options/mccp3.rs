use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

/// Inbound compression, opt-in via `Registry::with_mccp3`. The client
/// announces it is about to start sending deflated data with an empty
/// SB MCCP3 subnegotiation; the session actor installs the inflate stream
/// and replays any bytes already buffered ahead of it through that stream.
#[derive(Debug, Default)]
pub struct Mccp3Handler;

impl OptionHandler for Mccp3Handler {
    fn opcode(&self) -> u8 {
        option::MCCP3
    }

    fn start_will(&self) -> bool {
        true
    }

    fn barrier_local(&self) -> bool {
        true
    }

    fn subnegotiate(&mut self, _data: &[u8], ctx: &mut HandlerContext) {
        ctx.capabilities.mccp3 = true;
        ctx.mark_inbound_compression_activated();
        ctx.mark_updated();
    }
}
