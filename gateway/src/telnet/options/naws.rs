use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

/// Negotiate About Window Size: remote reports a `width, height` pair
/// whenever its terminal size changes.
#[derive(Debug, Default)]
pub struct NawsHandler;

impl OptionHandler for NawsHandler {
    fn opcode(&self) -> u8 {
        option::NAWS
    }

    fn start_do(&self) -> bool {
        true
    }

    fn barrier_remote(&self) -> bool {
        true
    }

    fn enable_remote(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.naws = true;
        ctx.mark_updated();
    }

    fn subnegotiate(&mut self, data: &[u8], ctx: &mut HandlerContext) {
        if data.len() < 4 {
            return;
        }
        let width = u16::from_be_bytes([data[0], data[1]]);
        let height = u16::from_be_bytes([data[2], data[3]]);
        if width != ctx.capabilities.width || height != ctx.capabilities.height {
            ctx.capabilities.width = width;
            ctx.capabilities.height = height;
            ctx.mark_updated();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::telnet::barrier::Barrier;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn parses_big_endian_width_height() {
        let mut handler = NawsHandler::default();
        let mut caps = Capabilities::default();
        let mut barrier = Barrier::default();
        let (tx, _rx) = unbounded_channel();
        let mut ctx = HandlerContext {
            capabilities: &mut caps,
            barrier: &mut barrier,
            outbound: &tx,
            updated: false,
            activate_inbound_compression: false,
        };
        handler.subnegotiate(&[0x00, 0x50, 0x00, 0x18], &mut ctx);
        assert_eq!(caps.width, 80);
        assert_eq!(caps.height, 24);
    }
}
