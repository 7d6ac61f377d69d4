use crate::telnet::codec::Frame;
use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

/// Outbound compression. Enabling sends an empty SB MCCP2 subnegotiation
/// flagged so that everything written after it on the wire passes through
/// a deflate stream; the session actor owns the actual [`crate::telnet::compress::Deflate`].
#[derive(Debug, Default)]
pub struct Mccp2Handler;

impl OptionHandler for Mccp2Handler {
    fn opcode(&self) -> u8 {
        option::MCCP2
    }

    fn start_will(&self) -> bool {
        true
    }

    fn barrier_local(&self) -> bool {
        true
    }

    fn enable_local(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.mccp2 = true;
        ctx.enqueue_compression_activation(Frame::Subnegotiation(
            option::MCCP2,
            tokio_util::bytes::Bytes::new(),
        ));
        ctx.mark_updated();
    }

    fn disable_local(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.mccp2 = false;
        ctx.mark_updated();
    }
}
