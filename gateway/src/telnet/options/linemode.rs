use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

/// Client-side line editing. This crate only tracks whether the remote
/// enabled it; it does not negotiate LINEMODE's own sub-options.
#[derive(Debug, Default)]
pub struct LinemodeHandler;

impl OptionHandler for LinemodeHandler {
    fn opcode(&self) -> u8 {
        option::LINEMODE
    }

    fn start_do(&self) -> bool {
        true
    }

    fn enable_remote(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.linemode = true;
        ctx.mark_updated();
    }

    fn disable_remote(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.linemode = false;
        ctx.mark_updated();
    }
}
