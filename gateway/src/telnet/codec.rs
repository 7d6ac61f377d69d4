//! Byte-level Telnet parser and framer.
//!
//! Deliberately not wrapped in a [`tokio_util::codec::Framed`]: MCCP2
//! activation needs to know the exact byte offset where compression begins
//! (the byte immediately after the `IAC SE` that announced it), which a
//! generic framed transport would obscure. Callers drive [`Codec::decode`]
//! directly against a buffer they control.

use tokio_util::bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Error;
use crate::telnet::command::{DO, DONT, IAC, SB, SE, WILL, WONT};

/// A telnet negotiation command (`WILL`/`WONT`/`DO`/`DONT`) paired with its option code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Negotiation {
    Will(u8),
    Wont(u8),
    Do(u8),
    Dont(u8),
}

impl Negotiation {
    #[must_use]
    pub fn option(&self) -> u8 {
        match self {
            Negotiation::Will(opt)
            | Negotiation::Wont(opt)
            | Negotiation::Do(opt)
            | Negotiation::Dont(opt) => *opt,
        }
    }
}

/// An event produced by decoding inbound bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A run of application data destined for the command buffer.
    Data(Bytes),
    /// A negotiation command.
    Negotiation(Negotiation),
    /// A completed subnegotiation: `IAC SB <opt> ...payload... IAC SE`.
    Subnegotiation(u8, Bytes),
    /// Any other IAC-prefixed command byte (e.g. NOP, GA).
    Command(u8),
}

/// An item to be written to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Raw application bytes; any embedded `IAC` is escaped as `IAC IAC`.
    Data(Bytes),
    Negotiation(Negotiation),
    Subnegotiation(u8, Bytes),
    Command(u8),
}

/// The manually-driven Telnet byte parser.
#[derive(Debug, Default)]
pub struct Codec;

impl Codec {
    #[must_use]
    pub fn new() -> Self {
        Codec
    }
}

impl Decoder for Codec {
    type Item = Event;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        if src[0] != IAC {
            let end = src.iter().position(|&b| b == IAC).unwrap_or(src.len());
            let chunk = src.split_to(end).freeze();
            return Ok(Some(Event::Data(chunk)));
        }

        // Only an IAC buffered so far: need more to know what follows.
        if src.len() < 2 {
            return Ok(None);
        }

        match src[1] {
            IAC => {
                src.advance(2);
                Ok(Some(Event::Data(Bytes::from_static(&[0xFF]))))
            }
            WILL | WONT | DO | DONT => {
                if src.len() < 3 {
                    return Ok(None);
                }
                let cmd = src[1];
                let opt = src[2];
                src.advance(3);
                let neg = match cmd {
                    WILL => Negotiation::Will(opt),
                    WONT => Negotiation::Wont(opt),
                    DO => Negotiation::Do(opt),
                    DONT => Negotiation::Dont(opt),
                    _ => unreachable!("matched above"),
                };
                Ok(Some(Event::Negotiation(neg)))
            }
            SB => {
                // Need at least the option byte before we can look for a terminator.
                if src.len() < 3 {
                    return Ok(None);
                }
                let option = src[2];
                match find_iac_se(&src[3..]) {
                    Some(rel) => {
                        let end = 3 + rel;
                        let payload = Bytes::copy_from_slice(&src[3..end]);
                        src.advance(end + 2);
                        Ok(Some(Event::Subnegotiation(option, payload)))
                    }
                    None => Ok(None),
                }
            }
            other => {
                src.advance(2);
                Ok(Some(Event::Command(other)))
            }
        }
    }
}

impl Encoder<Frame> for Codec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Frame::Data(data) => dst.put_slice(&escape_iac(&data)),
            Frame::Negotiation(Negotiation::Will(opt)) => dst.put_slice(&[IAC, WILL, opt]),
            Frame::Negotiation(Negotiation::Wont(opt)) => dst.put_slice(&[IAC, WONT, opt]),
            Frame::Negotiation(Negotiation::Do(opt)) => dst.put_slice(&[IAC, DO, opt]),
            Frame::Negotiation(Negotiation::Dont(opt)) => dst.put_slice(&[IAC, DONT, opt]),
            Frame::Subnegotiation(opt, data) => {
                dst.put_slice(&[IAC, SB, opt]);
                dst.put_slice(&data);
                dst.put_slice(&[IAC, SE]);
            }
            Frame::Command(cmd) => dst.put_slice(&[IAC, cmd]),
        }
        Ok(())
    }
}

/// Encode a single [`Frame`] to bytes without requiring a live `Codec` + buffer.
///
/// `Codec` carries no state on the encode side, so option handlers that need
/// to turn a reply into wire bytes right away can use this instead of
/// round-tripping through the `Encoder` trait.
pub fn encode_frame(frame: Frame) -> Bytes {
    let mut buf = BytesMut::new();
    Codec.encode(frame, &mut buf).expect("encoding a Frame is infallible");
    buf.freeze()
}

/// Find the byte offset of the first `IAC SE` pair in `buf`.
fn find_iac_se(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == [IAC, SE])
}

/// Escape `IAC` bytes in outbound data so they survive as literal 0xFF on the wire.
fn escape_iac(data: &Bytes) -> Bytes {
    if !data.contains(&IAC) {
        return data.clone();
    }
    let mut out = BytesMut::with_capacity(data.len() + 4);
    for byte in data {
        out.put_u8(*byte);
        if *byte == IAC {
            out.put_u8(IAC);
        }
    }
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_all(mut buf: BytesMut) -> Vec<Event> {
        let mut codec = Codec::new();
        let mut events = Vec::new();
        while let Some(event) = codec.decode(&mut buf).unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn plain_data_is_identity() {
        let events = decode_all(BytesMut::from(&b"hello world"[..]));
        assert_eq!(events, vec![Event::Data(Bytes::from_static(b"hello world"))]);
    }

    #[test]
    fn iac_iac_round_trips_to_single_0xff() {
        let events = decode_all(BytesMut::from(&[IAC, IAC][..]));
        assert_eq!(events, vec![Event::Data(Bytes::from_static(&[0xFF]))]);
    }

    #[test]
    fn negotiation_do_mccp2() {
        let events = decode_all(BytesMut::from(&[IAC, DO, 86][..]));
        assert_eq!(
            events,
            vec![Event::Negotiation(Negotiation::Do(86))]
        );
    }

    #[test]
    fn naws_subnegotiation_80x24() {
        let buf = BytesMut::from(&[IAC, SB, 31, 0x00, 0x50, 0x00, 0x18, IAC, SE][..]);
        let events = decode_all(buf);
        assert_eq!(
            events,
            vec![Event::Subnegotiation(
                31,
                Bytes::from_static(&[0x00, 0x50, 0x00, 0x18])
            )]
        );
    }

    #[test]
    fn empty_subnegotiation_has_no_length_floor() {
        // Five bytes total: IAC SB <opt> IAC SE -- no payload.
        let buf = BytesMut::from(&[IAC, SB, 86, IAC, SE][..]);
        let events = decode_all(buf);
        assert_eq!(events, vec![Event::Subnegotiation(86, Bytes::new())]);
    }

    #[test]
    fn truncated_subnegotiation_waits_for_more() {
        let mut codec = Codec::new();
        let mut buf = BytesMut::from(&[IAC, SB, 24, 0x01][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&[IAC, SE]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Event::Subnegotiation(24, Bytes::from_static(&[0x01])))
        );
    }

    #[test]
    fn truncated_negotiation_waits_for_more() {
        let mut codec = Codec::new();
        let mut buf = BytesMut::from(&[IAC, WILL][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.put_u8(86);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(Event::Negotiation(Negotiation::Will(86)))
        );
    }

    #[test]
    fn bare_iac_waits_for_more() {
        let mut codec = Codec::new();
        let mut buf = BytesMut::from(&[IAC][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn iac_escape_round_trip() {
        let mut codec = Codec::new();
        let mut out = BytesMut::new();
        codec
            .encode(Frame::Data(Bytes::from_static(&[1, IAC, 2])), &mut out)
            .unwrap();
        assert_eq!(&out[..], &[1, IAC, IAC, 2]);

        let events = decode_all(out);
        assert_eq!(
            events,
            vec![
                Event::Data(Bytes::from_static(&[1])),
                Event::Data(Bytes::from_static(&[0xFF])),
                Event::Data(Bytes::from_static(&[2])),
            ]
        );
    }

    #[test]
    fn other_command_passthrough() {
        let events = decode_all(BytesMut::from(&[IAC, 249][..]));
        assert_eq!(events, vec![Event::Command(249)]);
    }
}
