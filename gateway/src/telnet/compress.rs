//! MCCP2 (outbound) / MCCP3 (inbound) zlib streams.
//!
//! Activation is a protocol event, not a connection-time option: the inbound
//! decompressor and outbound compressor are installed mid-stream, so both
//! wrappers are plain `Option<_>` fields on the session rather than baked
//! into a transport type.

use std::io::Write;

use tokio_util::bytes::Bytes;

use crate::error::{Error, ErrorKind};

/// Inbound MCCP3 decompressor.
pub struct Inflate {
    inner: flate2::Decompress,
}

impl Inflate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: flate2::Decompress::new(true),
        }
    }

    /// Decompress `input`, returning the produced plaintext bytes.
    pub fn decompress(&mut self, input: &[u8]) -> Result<Bytes, Error> {
        // Compressed MUD text rarely expands more than 8x; grow generously
        // so a single call almost always drains the input in one shot.
        let cap = (input.len() * 8).max(4096);
        let mut out = vec![0u8; cap];
        let before = self.inner.total_out();
        self.inner
            .decompress(input, &mut out, flate2::FlushDecompress::None)
            .map_err(|e| ErrorKind::Decompression(e.to_string()))?;
        let produced = (self.inner.total_out() - before) as usize;
        out.truncate(produced);
        Ok(Bytes::from(out))
    }
}

impl Default for Inflate {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound MCCP2 compressor.
///
/// Every write is followed by a `SYNC_FLUSH` so data reaches the peer
/// promptly instead of sitting in zlib's internal window.
pub struct Deflate {
    encoder: flate2::write::ZlibEncoder<Vec<u8>>,
}

impl Deflate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            encoder: flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::new(9)),
        }
    }

    /// Compress `input` and flush with `SYNC_FLUSH`, returning the produced bytes.
    pub fn compress(&mut self, input: &[u8]) -> Result<Bytes, Error> {
        self.encoder
            .write_all(input)
            .and_then(|()| self.encoder.flush())
            .map_err(|e| ErrorKind::Compression(e.to_string()))?;
        Ok(Bytes::from(std::mem::take(self.encoder.get_mut())))
    }

    /// Flush with `FINISH`, producing the zlib trailer. Consumes the stream;
    /// called once at half-close.
    pub fn finish(self) -> Result<Bytes, Error> {
        let buf = self
            .encoder
            .finish()
            .map_err(|e| ErrorKind::Compression(e.to_string()))?;
        Ok(Bytes::from(buf))
    }
}

impl Default for Deflate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mccp_round_trip() {
        let original = b"Hello, world! Hello, world! Hello, world!".repeat(4);
        let mut deflate = Deflate::new();
        let compressed = deflate.compress(&original).unwrap();

        let mut inflate = Inflate::new();
        let decompressed = inflate.decompress(&compressed).unwrap();
        assert_eq!(&decompressed[..], &original[..]);
    }

    #[test]
    fn multiple_writes_stay_in_one_stream() {
        let mut deflate = Deflate::new();
        let mut wire = Vec::new();
        wire.extend_from_slice(&deflate.compress(b"Hello\r\n").unwrap());
        wire.extend_from_slice(&deflate.compress(b"World\r\n").unwrap());
        wire.extend_from_slice(&deflate.finish().unwrap());

        let mut inflate = Inflate::new();
        let decompressed = inflate.decompress(&wire).unwrap();
        assert_eq!(&decompressed[..], b"Hello\r\nWorld\r\n");
    }

    #[test]
    fn finish_flushes_trailer_and_decompresses() {
        let original = b"g'night, Commander.".to_vec();
        let mut deflate = Deflate::new();
        let mut stream = Vec::new();
        stream.extend_from_slice(&deflate.compress(&original).unwrap());
        stream.extend_from_slice(&deflate.finish().unwrap());

        let mut inflate = Inflate::new();
        let decompressed = inflate.decompress(&stream).unwrap();
        assert_eq!(&decompressed[..], &original[..]);
    }
}
