use crate::telnet::codec::Frame;
use crate::telnet::handler::{HandlerContext, OptionHandler};
use crate::telnet::option;

const SEND: u8 = 1;
const IS: u8 = 0;

/// `(bitmask, capability)` table for the MTTS byte sent in TTYPE's third round.
const MTTS_BITS: &[(u32, fn(&mut crate::capabilities::Capabilities))] = &[
    (128, |c| c.proxy = true),
    (64, |c| c.screen_reader = true),
    (32, |c| c.osc_color_palette = true),
    (16, |c| c.mouse_tracking = true),
    (8, |c| c.xterm256 = true),
    (4, |c| c.utf8 = true),
    (2, |c| c.vt100 = true),
    (1, |c| c.ansi = true),
];

const XTERM256_ALLOWLIST: &[&str] = &[
    "ATLANTIS",
    "CMUD",
    "KILDCLIENT",
    "MUDLET",
    "MUSHCLIENT",
    "PUTTY",
    "BEIP",
    "POTATO",
    "TINYFUGUE",
];

/// Terminal Type / MTTS: a three-round handshake that discovers the client's
/// name, declared terminal type, and capability bitmask.
#[derive(Debug, Default)]
pub struct TtypeHandler {
    stage: u8,
    previous: Option<Vec<u8>>,
}

impl OptionHandler for TtypeHandler {
    fn opcode(&self) -> u8 {
        option::TTYPE
    }

    fn start_do(&self) -> bool {
        true
    }

    fn barrier_remote(&self) -> bool {
        true
    }

    fn barrier_special(&self) -> &[u8] {
        &[0, 1, 2]
    }

    fn enable_remote(&mut self, ctx: &mut HandlerContext) {
        ctx.capabilities.mtts = true;
        ctx.mark_updated();
        request(ctx);
    }

    fn subnegotiate(&mut self, data: &[u8], ctx: &mut HandlerContext) {
        if self.previous.as_deref() == Some(data) {
            // No further rounds will teach us anything new.
            for stage in [0u8, 1, 2] {
                ctx.barrier.drain_special(stage);
            }
            self.previous = None;
            return;
        }

        if data.first() != Some(&IS) || data.len() < 2 {
            return;
        }
        self.previous = Some(data.to_vec());
        let text = String::from_utf8_lossy(&data[1..]).into_owned();
        if text.is_empty() {
            return;
        }

        match self.stage {
            0 => {
                receive_stage_0(ctx, &text);
                self.stage = 1;
                request(ctx);
            }
            1 => {
                receive_stage_1(ctx, &text);
                self.stage = 2;
            }
            _ => {
                receive_stage_2(ctx, &text);
                self.stage = 3;
            }
        }
        ctx.barrier.drain_special(self.stage.saturating_sub(1));
        ctx.mark_updated();
    }
}

fn request(ctx: &HandlerContext) {
    ctx.enqueue(Frame::Subnegotiation(option::TTYPE, vec![SEND].into()));
}

fn receive_stage_0(ctx: &mut HandlerContext, data: &str) {
    let upper = data.to_ascii_uppercase();
    let (client_name, client_version) = match upper.split_once(' ') {
        Some((name, version)) => (name.to_string(), version.to_string()),
        None => (upper.clone(), "UNKNOWN".to_string()),
    };
    ctx.capabilities.client_name = client_name.clone();
    ctx.capabilities.client_version = client_version;

    if client_name == "MUDLET" {
        ctx.capabilities.force_endline = false;
    }
    if client_name == "TINTIN++" {
        ctx.capabilities.force_endline = true;
    }

    let xterm256 = client_name.starts_with("XTERM")
        || client_name.ends_with("-256COLOR")
        || XTERM256_ALLOWLIST.contains(&client_name.as_str());

    ctx.capabilities.ansi = true;
    if xterm256 {
        ctx.capabilities.xterm256 = true;
    }
}

fn receive_stage_1(ctx: &mut HandlerContext, term: &str) {
    let upper = term.to_ascii_uppercase();
    let xterm256 =
        upper.ends_with("-256COLOR") || (upper.ends_with("XTERM") && !upper.ends_with("-COLOR"));
    if xterm256 {
        ctx.capabilities.ansi = true;
        ctx.capabilities.xterm256 = true;
    }
    ctx.capabilities.terminal_type = term.to_string();
}

fn receive_stage_2(ctx: &mut HandlerContext, option: &str) {
    if let Some(digits) = option.to_ascii_uppercase().strip_prefix("MTTS") {
        let digits = digits.trim();
        if let Ok(bits) = digits.parse::<u32>() {
            for (mask, apply) in MTTS_BITS {
                if bits & mask != 0 {
                    apply(ctx.capabilities);
                }
            }
        } else {
            ctx.capabilities.mtts = true;
        }
    }
    ctx.capabilities.ttype = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capabilities;
    use crate::telnet::barrier::Barrier;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;

    fn ctx<'a>(
        caps: &'a mut Capabilities,
        barrier: &'a mut Barrier,
        tx: &'a tokio::sync::mpsc::UnboundedSender<crate::handler::OutboundMessage>,
    ) -> HandlerContext<'a> {
        HandlerContext {
            capabilities: caps,
            barrier,
            outbound: tx,
            updated: false,
            activate_inbound_compression: false,
        }
    }

    #[test]
    fn three_round_handshake_matches_scenario() {
        let mut handler = TtypeHandler::default();
        let mut caps = Capabilities::default();
        let mut barrier = Barrier::default();
        barrier.add_special([0, 1, 2]);
        let (tx, _rx) = unbounded_channel();

        let mut c = ctx(&mut caps, &mut barrier, &tx);
        handler.enable_remote(&mut c);
        let mut c = ctx(&mut caps, &mut barrier, &tx);
        handler.subnegotiate(b"\x00MUDLET 4.10", &mut c);
        let mut c = ctx(&mut caps, &mut barrier, &tx);
        handler.subnegotiate(b"\x00XTERM-256COLOR", &mut c);
        let mut c = ctx(&mut caps, &mut barrier, &tx);
        handler.subnegotiate(b"\x00MTTS 41", &mut c);

        assert_eq!(caps.client_name, "MUDLET");
        assert_eq!(caps.client_version, "4.10");
        assert_eq!(caps.terminal_type, "XTERM-256COLOR");
        assert!(caps.ansi);
        assert!(caps.xterm256);
        assert!(!caps.utf8);
        assert!(!caps.mouse_tracking);
        assert!(caps.osc_color_palette);
        assert!(caps.ttype);
        assert!(caps.mtts);
        assert!(barrier.is_drained());
    }

    #[test]
    fn repeated_payload_drains_remaining_rounds() {
        let mut handler = TtypeHandler::default();
        let mut caps = Capabilities::default();
        let mut barrier = Barrier::default();
        barrier.add_special([0, 1, 2]);
        let (tx, _rx) = unbounded_channel();

        let mut c = ctx(&mut caps, &mut barrier, &tx);
        handler.subnegotiate(b"\x00DUMBTERM", &mut c);
        let mut c = ctx(&mut caps, &mut barrier, &tx);
        handler.subnegotiate(b"\x00DUMBTERM", &mut c);

        assert!(barrier.is_drained());
    }
}
