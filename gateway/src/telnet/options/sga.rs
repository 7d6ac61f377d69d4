use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

/// Suppress Go-Ahead: once enabled locally, outbound data frames stop
/// carrying the trailing `IAC GA` sentinel.
#[derive(Debug, Default)]
pub struct SgaHandler;

impl OptionHandler for SgaHandler {
    fn opcode(&self) -> u8 {
        option::SGA
    }

    fn start_will(&self) -> bool {
        true
    }

    fn enable_local(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.suppress_ga = true;
        ctx.mark_updated();
    }

    fn disable_local(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.suppress_ga = false;
        ctx.mark_updated();
    }
}
