//! Option handler registry and the `IAC {WILL,WONT,DO,DONT}` dispatcher.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;

use crate::capabilities::Capabilities;
use crate::handler::OutboundMessage;
use crate::telnet::barrier::Barrier;
use crate::telnet::codec::{encode_frame, Frame, Negotiation};
use crate::telnet::negotiation::Table;
use crate::telnet::option;
use crate::telnet::options::{
    LinemodeHandler, Mccp2Handler, Mccp3Handler, MnesHandler, MsspHandler, NawsHandler,
    SgaHandler, TtypeHandler,
};

/// What a dispatched subnegotiation changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubnegotiationOutcome {
    pub updated: bool,
    pub activate_inbound_compression: bool,
}

/// Mutable access an [`OptionHandler`] gets while reacting to a negotiation
/// or subnegotiation event.
pub struct HandlerContext<'a> {
    pub capabilities: &'a mut Capabilities,
    pub barrier: &'a mut Barrier,
    pub(crate) outbound: &'a UnboundedSender<OutboundMessage>,
    pub(crate) updated: bool,
    pub(crate) activate_inbound_compression: bool,
}

impl<'a> HandlerContext<'a> {
    pub fn enqueue(&self, frame: Frame) {
        let _ = self.outbound.send(OutboundMessage::protocol(encode_frame(frame)));
    }

    /// Enqueue a frame and mark that everything written after it should be
    /// passed through the outbound deflate stream (the MCCP2 announcement).
    pub fn enqueue_compression_activation(&self, frame: Frame) {
        let _ = self
            .outbound
            .send(OutboundMessage::compression_activation(encode_frame(frame)));
    }

    pub fn mark_updated(&mut self) {
        self.updated = true;
    }

    /// Tell the session actor to install an inflate stream on the inbound
    /// path, starting immediately after the subnegotiation that requested it.
    pub fn mark_inbound_compression_activated(&mut self) {
        self.activate_inbound_compression = true;
    }
}

/// A per-option handshake and subnegotiation implementation.
///
/// Mirrors the shape of a Telnet option's behavior rather than the wire
/// format: the dispatcher in [`Registry`] already handles the generic
/// WILL/WONT/DO/DONT bookkeeping, so handlers only implement what makes
/// their option distinct.
pub trait OptionHandler: Send {
    fn opcode(&self) -> u8;

    /// Send an initial `WILL` when the session starts.
    fn start_will(&self) -> bool {
        false
    }

    /// Send an initial `DO` when the session starts.
    fn start_do(&self) -> bool {
        false
    }

    /// Whether an unsolicited `WILL` from the peer should be accepted.
    /// Defaults to whatever `start_do` says; options that support a side
    /// being enabled without the server ever asking for it (e.g. GMCP)
    /// override this independently.
    fn supports_remote(&self) -> bool {
        self.start_do()
    }

    /// Whether an unsolicited `DO` from the peer should be accepted.
    fn supports_local(&self) -> bool {
        self.start_will()
    }

    /// Register this option's opcode in the barrier's `local_pending` set.
    fn barrier_local(&self) -> bool {
        false
    }

    /// Register this option's opcode in the barrier's `remote_pending` set.
    fn barrier_remote(&self) -> bool {
        false
    }

    /// Extra `special_pending` codes this option owns (e.g. TTYPE's rounds).
    fn barrier_special(&self) -> &[u8] {
        &[]
    }

    fn enable_local(&mut self, _ctx: &mut HandlerContext) {}
    fn disable_local(&mut self, _ctx: &mut HandlerContext) {}
    fn enable_remote(&mut self, _ctx: &mut HandlerContext) {}
    fn disable_remote(&mut self, _ctx: &mut HandlerContext) {}
    fn subnegotiate(&mut self, _data: &[u8], _ctx: &mut HandlerContext) {}
}

/// Maps option codes to their handler and drives the WILL/WONT/DO/DONT
/// state machine described for `§4.3` against the shared negotiation table.
pub struct Registry {
    handlers: HashMap<u8, Box<dyn OptionHandler>>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut handlers: HashMap<u8, Box<dyn OptionHandler>> = HashMap::new();
        for handler in [
            Box::new(SgaHandler::default()) as Box<dyn OptionHandler>,
            Box::new(TtypeHandler::default()),
            Box::new(NawsHandler::default()),
            Box::new(LinemodeHandler::default()),
            Box::new(MsspHandler::default()),
            Box::new(Mccp2Handler::default()),
        ] {
            handlers.insert(handler.opcode(), handler);
        }
        Self { handlers }
    }
}

impl Registry {
    /// Opt in to the MCCP3 handler (off by default, matching the reference
    /// server's handler list).
    #[must_use]
    pub fn with_mccp3(mut self) -> Self {
        let handler = Box::<Mccp3Handler>::default();
        self.handlers.insert(handler.opcode(), handler);
        self
    }

    /// Opt in to the MNES handler.
    #[must_use]
    pub fn with_mnes(mut self) -> Self {
        let handler = Box::<MnesHandler>::default();
        self.handlers.insert(handler.opcode(), handler);
        self
    }

    /// Opt in to the GMCP out-of-band channel.
    #[must_use]
    pub fn with_gmcp(mut self) -> Self {
        let handler = Box::new(crate::telnet::options::OobHandler::gmcp());
        self.handlers.insert(handler.opcode(), handler);
        self
    }

    /// Opt in to the MSDP out-of-band channel.
    #[must_use]
    pub fn with_msdp(mut self) -> Self {
        let handler = Box::new(crate::telnet::options::OobHandler::msdp());
        self.handlers.insert(handler.opcode(), handler);
        self
    }

    /// Enqueue each handler's initial `WILL`/`DO`, and populate the barrier
    /// with everything the handshake must resolve before readiness fires.
    pub fn start(
        &self,
        table: &mut Table,
        barrier: &mut Barrier,
        outbound: &UnboundedSender<OutboundMessage>,
    ) {
        for handler in self.handlers.values() {
            let opcode = handler.opcode();
            let entry = table.option_mut(opcode);

            if handler.supports_local() {
                entry.set_local_support();
            }
            if handler.supports_remote() {
                entry.set_remote_support();
            }

            if handler.start_will() {
                entry.set_local_negotiating();
                entry.set_local_asked();
                let _ = outbound.send(OutboundMessage::protocol(encode_frame(Frame::Negotiation(
                    Negotiation::Will(opcode),
                ))));
            }
            if handler.start_do() {
                entry.set_remote_negotiating();
                entry.set_remote_asked();
                let _ = outbound.send(OutboundMessage::protocol(encode_frame(Frame::Negotiation(
                    Negotiation::Do(opcode),
                ))));
            }

            if handler.barrier_local() {
                barrier.add_local(opcode);
            }
            if handler.barrier_remote() {
                barrier.add_remote(opcode);
            }
            barrier.add_special(handler.barrier_special().iter().copied());
        }
    }

    /// Dispatch a `WILL`/`WONT`/`DO`/`DONT` against the shared table. Returns
    /// whether a capability changed (the caller fires `on_update` at most
    /// once per inbound event regardless of how many handlers ran).
    pub fn dispatch_negotiation(
        &mut self,
        table: &mut Table,
        neg: Negotiation,
        capabilities: &mut Capabilities,
        barrier: &mut Barrier,
        outbound: &UnboundedSender<OutboundMessage>,
    ) -> bool {
        let opcode = neg.option();
        let Some(handler) = self.handlers.get_mut(&opcode) else {
            let reply = match neg {
                Negotiation::Will(_) => Some(Negotiation::Dont(opcode)),
                Negotiation::Do(_) => Some(Negotiation::Wont(opcode)),
                Negotiation::Wont(_) | Negotiation::Dont(_) => None,
            };
            if let Some(reply) = reply {
                let _ = outbound.send(OutboundMessage::protocol(encode_frame(Frame::Negotiation(
                    reply,
                ))));
            }
            return false;
        };

        let entry = table.option_mut(opcode);
        let mut ctx = HandlerContext {
            capabilities,
            barrier,
            outbound,
            updated: false,
            activate_inbound_compression: false,
        };

        match neg {
            Negotiation::Will(_) => {
                if !entry.remote_support() {
                    ctx.enqueue(Frame::Negotiation(Negotiation::Dont(opcode)));
                } else if !entry.remote_enabled() {
                    // The `negotiating` flag distinguishes "this WILL answers
                    // our own DO" (no counter-reply needed) from a
                    // peer-initiated request (we must reply DO).
                    let was_negotiating = entry.remote_negotiating();
                    entry.clear_remote_negotiating();
                    entry.set_remote_enabled();
                    if !was_negotiating {
                        ctx.enqueue(Frame::Negotiation(Negotiation::Do(opcode)));
                    }
                    handler.enable_remote(&mut ctx);
                    ctx.barrier.drain_remote(opcode);
                }
            }
            Negotiation::Do(_) => {
                if !entry.local_support() {
                    ctx.enqueue(Frame::Negotiation(Negotiation::Wont(opcode)));
                } else if !entry.local_enabled() {
                    let was_negotiating = entry.local_negotiating();
                    entry.clear_local_negotiating();
                    entry.set_local_enabled();
                    if !was_negotiating {
                        ctx.enqueue(Frame::Negotiation(Negotiation::Will(opcode)));
                    }
                    handler.enable_local(&mut ctx);
                    ctx.barrier.drain_local(opcode);
                }
            }
            Negotiation::Wont(_) => {
                let was_negotiating = entry.remote_negotiating();
                entry.clear_remote_negotiating();
                if entry.remote_enabled() {
                    entry.clear_remote_enabled();
                    handler.disable_remote(&mut ctx);
                    ctx.barrier.drain_remote(opcode);
                } else if was_negotiating {
                    ctx.barrier.drain_remote(opcode);
                }
            }
            Negotiation::Dont(_) => {
                let was_negotiating = entry.local_negotiating();
                entry.clear_local_negotiating();
                if entry.local_enabled() {
                    entry.clear_local_enabled();
                    handler.disable_local(&mut ctx);
                    ctx.barrier.drain_local(opcode);
                } else if was_negotiating {
                    ctx.barrier.drain_local(opcode);
                }
            }
        }

        ctx.updated
    }

    /// Dispatch a completed subnegotiation payload. No-op if no handler is
    /// registered for the option.
    pub fn dispatch_subnegotiation(
        &mut self,
        opt: u8,
        data: &[u8],
        capabilities: &mut Capabilities,
        barrier: &mut Barrier,
        outbound: &UnboundedSender<OutboundMessage>,
    ) -> SubnegotiationOutcome {
        let Some(handler) = self.handlers.get_mut(&opt) else {
            return SubnegotiationOutcome::default();
        };
        let mut ctx = HandlerContext {
            capabilities,
            barrier,
            outbound,
            updated: false,
            activate_inbound_compression: false,
        };
        handler.subnegotiate(data, &mut ctx);
        SubnegotiationOutcome {
            updated: ctx.updated,
            activate_inbound_compression: ctx.activate_inbound_compression,
        }
    }

    /// Send an MSSP status report, if the MSSP handler is registered.
    pub fn send_mssp(
        &self,
        values: &std::collections::BTreeMap<String, crate::telnet::options::mssp::MsspValue>,
        outbound: &UnboundedSender<OutboundMessage>,
    ) {
        if self.handlers.contains_key(&option::MSSP) {
            crate::telnet::options::mssp::send(values, outbound);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn unknown_option_is_refused() {
        let mut registry = Registry::default();
        let mut table = Table::default();
        let mut caps = Capabilities::default();
        let mut barrier = Barrier::default();
        let (tx, mut rx) = unbounded_channel();

        let updated =
            registry.dispatch_negotiation(&mut table, Negotiation::Will(0x5B), &mut caps, &mut barrier, &tx);
        assert!(!updated);
        let msg = rx.try_recv().unwrap();
        assert_eq!(&msg.data[..], &[255, 254, 0x5B]); // IAC DONT MXP
    }

    #[test]
    fn negotiating_suppresses_counter_reply() {
        let mut registry = Registry::default();
        let mut table = Table::default();
        let mut caps = Capabilities::default();
        let mut barrier = Barrier::default();
        let (tx, mut rx) = unbounded_channel();

        registry.start(&mut table, &mut barrier, &tx);
        // Drain the start-up WILL/DO messages.
        while rx.try_recv().is_ok() {}

        // MCCP2 is a start_will option; the peer's DO is the answer to our ask.
        registry.dispatch_negotiation(
            &mut table,
            Negotiation::Do(86),
            &mut caps,
            &mut barrier,
            &tx,
        );
        assert!(rx.try_recv().is_err(), "no counter-reply when we already asked");
        assert!(table.option(86).local_enabled());
    }
}
