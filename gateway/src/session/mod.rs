//! Per-transport session actors.
//!
//! Both [`telnet`] and [`websocket`] implement the same lifecycle (accept,
//! run a single cooperative `select!` loop, disconnect) but differ enough in
//! framing and readiness that each transport owns its own actor rather than
//! sharing one generic over a trait object.

pub mod telnet;
pub mod websocket;

use tokio_util::bytes::{Buf, Bytes, BytesMut};

/// Split `buf` on `\n`, stripping a trailing `\r`, returning each completed
/// line. Bytes after the last `\n` remain buffered for the next call.
pub(crate) fn drain_commands(buf: &mut BytesMut) -> Vec<Bytes> {
    let mut lines = Vec::new();
    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
        let mut line = buf.split_to(pos);
        buf.advance(1); // drop the '\n' itself
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        if !line.is_empty() {
            lines.push(line.freeze());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_lf_and_strips_cr() {
        let mut buf = BytesMut::from(&b"look\r\nsay hi\r\npartial"[..]);
        let lines = drain_commands(&mut buf);
        assert_eq!(lines, vec![Bytes::from_static(b"look"), Bytes::from_static(b"say hi")]);
        assert_eq!(&buf[..], b"partial");
    }

    #[test]
    fn empty_lines_are_skipped() {
        let mut buf = BytesMut::from(&b"\r\n\r\nok\n"[..]);
        let lines = drain_commands(&mut buf);
        assert_eq!(lines, vec![Bytes::from_static(b"ok")]);
    }
}
