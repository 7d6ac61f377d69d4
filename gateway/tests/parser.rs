//! Parser round-trip laws (§8): identity on plain bytes, IAC-escape
//! round-trip, over randomized byte sequences.

use mudgate_core::telnet::codec::{Codec, Event, Frame};
use proptest::prelude::*;
use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

fn decode_data_only(mut buf: BytesMut) -> Vec<u8> {
    let mut codec = Codec::new();
    let mut out = Vec::new();
    while let Some(event) = codec.decode(&mut buf).unwrap() {
        if let Event::Data(data) = event {
            out.extend_from_slice(&data);
        } else {
            panic!("unexpected non-data event: {event:?}");
        }
    }
    out
}

proptest! {
    #[test]
    fn parser_is_identity_on_non_iac_bytes(bytes in proptest::collection::vec(1u8..=254, 0..256)) {
        let decoded = decode_data_only(BytesMut::from(&bytes[..]));
        prop_assert_eq!(decoded, bytes);
    }

    #[test]
    fn iac_escape_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut codec = Codec::new();
        let mut wire = BytesMut::new();
        codec.encode(Frame::Data(Bytes::copy_from_slice(&bytes)), &mut wire).unwrap();
        let decoded = decode_data_only(wire);
        prop_assert_eq!(decoded, bytes);
    }
}
