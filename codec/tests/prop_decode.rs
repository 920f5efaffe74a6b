use bitstream::BitWriter;
use codec::{CaptureTime, DecoderSession, NullSink, RawPacket, SessionConfig};
use proptest::prelude::*;

fn packet(num_updates: u32, body: &[u8]) -> RawPacket {
    let mut w = BitWriter::new();
    w.write_u32(num_updates).unwrap();
    w.write_u16(1).unwrap();
    w.write_bit(false);
    w.align_to_byte();
    w.write_u32(body.len() as u32).unwrap();
    w.write_bytes(body).unwrap();
    RawPacket::new(0x1725, CaptureTime::from_millis(0), w.finish())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn arbitrary_entry_bytes_never_panic(
        num_updates in 0u32..16,
        body in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let session = DecoderSession::with_builtin_schema(SessionConfig::default());
        let packet = packet(num_updates, &body);
        let decoded = session.decode(&packet).unwrap();

        prop_assert!(decoded.entries.len() <= num_updates as usize);
        prop_assert!(decoded.entry_bytes + decoded.trailing_bytes <= body.len());
        if decoded.failure.is_none() {
            prop_assert_eq!(decoded.entries.len(), num_updates as usize);
        }

        // only complete entries reach the store
        let report = session.apply(&packet, &decoded, &mut NullSink);
        prop_assert!(report.failures.len() <= 1 + decoded.entries.len());
        prop_assert!(session.store().len() <= decoded.entries.len());
    }

    #[test]
    fn truncation_keeps_a_prefix_of_entries(cut in 0usize..64) {
        let mut body = BitWriter::new();
        for counter in 1..=4u8 {
            body.write_u8(3).unwrap();
            body.write_u32(1).unwrap();
            // packed identifier: low byte only
            body.write_u8(0x01).unwrap();
            body.write_u8(0x00).unwrap();
            body.write_u8(counter).unwrap();
        }
        let body = body.finish();
        let session = DecoderSession::with_builtin_schema(SessionConfig::default());

        let full = session.decode(&packet(4, &body)).unwrap();
        let cut = cut.min(body.len());
        let partial = session.decode(&packet(4, &body[..cut])).unwrap();

        prop_assert!(partial.entries.len() <= full.entries.len());
        for (a, b) in partial.entries.iter().zip(&full.entries) {
            prop_assert_eq!(&a.entry, &b.entry);
        }
        prop_assert_eq!(partial.failure.is_some(), partial.entries.len() < 4);
    }
}
