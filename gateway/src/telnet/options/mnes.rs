use tokio_util::bytes::{BufMut, Bytes, BytesMut};

use crate::telnet::codec::Frame;
use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

const SEND: u8 = 1;
const IS: u8 = 0;

/// Mud New-Environ Standard, opt-in via `Registry::with_mnes`. Responds to
/// `SEND` requests for a handful of well-known variables by echoing back
/// values already known from the session's capabilities; performs no
/// capability mutation of its own.
#[derive(Debug, Default)]
pub struct MnesHandler;

impl OptionHandler for MnesHandler {
    fn opcode(&self) -> u8 {
        option::MNES
    }

    fn start_do(&self) -> bool {
        true
    }

    fn barrier_remote(&self) -> bool {
        true
    }

    fn subnegotiate(&mut self, data: &[u8], ctx: &mut HandlerContext) {
        if data.first() != Some(&SEND) {
            return;
        }
        let mut reply = BytesMut::new();
        reply.put_u8(IS);
        for var in data[1..].split(|&b| b == 0).filter(|v| !v.is_empty()) {
            if let Some(pair) = resolve(ctx, var) {
                reply.put_slice(&pair);
            }
        }
        if reply.len() > 1 {
            ctx.enqueue(Frame::Subnegotiation(option::MNES, reply.freeze()));
        }
    }
}

/// `VAR <name> VAL <value>` for one known variable, or `None` if unrecognized.
fn resolve(ctx: &HandlerContext, var: &[u8]) -> Option<Bytes> {
    const VAR: u8 = 0;
    const VAL: u8 = 1;

    let value: String = match var {
        b"CLIENT_NAME" => ctx.capabilities.client_name.clone(),
        b"CLIENT_VERSION" => ctx.capabilities.client_version.clone(),
        b"TERMINAL_TYPE" => ctx.capabilities.terminal_type.clone(),
        b"MTTS" => u8::from(ctx.capabilities.mtts).to_string(),
        // IPADDRESS/CHARSET aren't part of the capability snapshot a
        // handler can see; left unanswered.
        _ => return None,
    };

    let mut out = BytesMut::with_capacity(var.len() + value.len() + 2);
    out.put_u8(VAR);
    out.put_slice(var);
    out.put_u8(VAL);
    out.put_slice(value.as_bytes());
    Some(out.freeze())
}
