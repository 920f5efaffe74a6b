//! Property tests for the masked identifier codec.

use bitstream::BitReader;
use proptest::prelude::*;
use wire::{Guid, GuidCodec, GuidFormat, SlotOrder};

fn slot_order_strategy() -> impl Strategy<Value = SlotOrder> {
    Just([0u8, 1, 2, 3, 4, 5, 6, 7])
        .prop_shuffle()
        .prop_map(|order| SlotOrder::new(order).unwrap())
}

/// Values with a realistic share of zero bytes.
fn sparse_u64() -> impl Strategy<Value = u64> {
    prop::array::uniform8(prop_oneof![3 => Just(0u8), 2 => any::<u8>()])
        .prop_map(u64::from_le_bytes)
}

fn non_zero_bytes(value: u64) -> usize {
    value.to_le_bytes().iter().filter(|b| **b != 0).count()
}

proptest! {
    #[test]
    fn packed128_roundtrip(
        low in sparse_u64(),
        high in sparse_u64(),
        order in slot_order_strategy(),
    ) {
        let codec = GuidCodec::new(GuidFormat::Packed128, order);
        let guid = Guid::new(low, high);
        let bytes = codec.encode(guid).unwrap();

        let non_zero = non_zero_bytes(low) + non_zero_bytes(high);
        prop_assert_eq!(bytes.len(), 2 + non_zero);
        prop_assert_eq!(
            (bytes[0].count_ones() + bytes[1].count_ones()) as usize,
            non_zero
        );

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(codec.decode(&mut reader).unwrap(), guid);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn packed64_roundtrip(low in sparse_u64(), order in slot_order_strategy()) {
        let codec = GuidCodec::new(GuidFormat::Packed64, order);
        let guid = Guid::new(low, 0);
        let bytes = codec.encode(guid).unwrap();
        prop_assert_eq!(bytes.len(), 1 + non_zero_bytes(low));

        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(codec.decode(&mut reader).unwrap(), guid);
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn reencoding_reproduces_wire_bytes(
        mask in any::<u8>(),
        payload in prop::collection::vec(1u8..=255, 8),
    ) {
        // every announced byte is non-zero, so the mask is already minimal
        let mut bytes = vec![mask];
        bytes.extend_from_slice(&payload[..mask.count_ones() as usize]);

        let guid = GuidCodec::PACKED64.decode(&mut BitReader::new(&bytes)).unwrap();
        prop_assert_eq!(GuidCodec::PACKED64.encode(guid).unwrap(), bytes);
    }
}
