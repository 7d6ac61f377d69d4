use std::collections::BTreeMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::bytes::{BufMut, BytesMut};

use crate::handler::OutboundMessage;
use crate::telnet::command::{IAC, SE};
use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

const VAR: u8 = 1;
const VAL: u8 = 2;

/// A single MSSP value: most fields are a single string, but a handful
/// (e.g. `CRAWL DELAY`, multi-value `AREAS`) are reported as a repeated
/// VAR/VAL run sharing one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsspValue {
    One(String),
    Many(Vec<String>),
}

/// Mud Server Status Protocol: an on-demand key/value status report.
#[derive(Debug, Default)]
pub struct MsspHandler;

impl OptionHandler for MsspHandler {
    fn opcode(&self) -> u8 {
        option::MSSP
    }

    fn start_will(&self) -> bool {
        true
    }

    fn enable_local(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.mssp = true;
        ctx.mark_updated();
    }

    fn disable_local(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.mssp = false;
        ctx.mark_updated();
    }
}

/// Encode and enqueue an MSSP status report.
///
/// Free function rather than a method on [`MsspHandler`] so callers holding
/// only a [`crate::handler::SessionHandle`] (outside the negotiation loop)
/// can send a report without borrowing the handler registry.
pub fn send(values: &BTreeMap<String, MsspValue>, outbound: &UnboundedSender<OutboundMessage>) {
    let mut buf = BytesMut::new();
    buf.put_slice(&[IAC, crate::telnet::command::SB, option::MSSP]);
    for (key, value) in values {
        match value {
            MsspValue::One(v) => {
                buf.put_u8(VAR);
                buf.put_slice(key.as_bytes());
                buf.put_u8(VAL);
                buf.put_slice(v.as_bytes());
            }
            MsspValue::Many(items) => {
                for item in items {
                    buf.put_u8(VAR);
                    buf.put_slice(key.as_bytes());
                    buf.put_u8(VAL);
                    buf.put_slice(item.as_bytes());
                }
            }
        }
    }
    buf.put_slice(&[IAC, SE]);
    let _ = outbound.send(OutboundMessage::protocol(buf.freeze()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn encodes_var_val_delimiters() {
        let mut values = BTreeMap::new();
        values.insert("NAME".to_string(), MsspValue::One("MyMud".to_string()));
        let (tx, mut rx) = unbounded_channel();
        send(&values, &tx);
        let msg = rx.try_recv().unwrap();
        let expected = [
            &[IAC, crate::telnet::command::SB, option::MSSP][..],
            &[VAR],
            b"NAME",
            &[VAL],
            b"MyMud",
            &[IAC, SE],
        ]
        .concat();
        assert_eq!(&msg.data[..], &expected[..]);
    }

    #[test]
    fn many_values_repeat_the_key() {
        let mut values = BTreeMap::new();
        values.insert(
            "CRAWL DELAY".to_string(),
            MsspValue::Many(vec!["-1".to_string(), "60".to_string()]),
        );
        let (tx, mut rx) = unbounded_channel();
        send(&values, &tx);
        let msg = rx.try_recv().unwrap();
        let expected = [
            &[IAC, crate::telnet::command::SB, option::MSSP][..],
            &[VAR],
            b"CRAWL DELAY",
            &[VAL],
            b"-1",
            &[VAR],
            b"CRAWL DELAY",
            &[VAL],
            b"60",
            &[IAC, SE],
        ]
        .concat();
        assert_eq!(&msg.data[..], &expected[..]);
    }
}
