//! Compact entity identifiers.
//!
//! An identifier is a 128-bit value. On the wire only its non-zero bytes are
//! sent, preceded by a presence mask: bit `i` of the mask says whether the byte
//! slot assigned to bit `i` follows. The slot assignment is a per-protocol
//! table ([`SlotOrder`]).

use std::fmt;

use bitstream::{BitReader, BitWriter};

use crate::error::{WireError, WireResult};

/// Category discriminant stored in bits 58..64 of the high half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HighType {
    Null,
    Uniq,
    Player,
    Item,
    StaticDoor,
    Transport,
    Conversation,
    Creature,
    Vehicle,
    Pet,
    GameObject,
    DynamicObject,
    AreaTrigger,
    Corpse,
    LootObject,
    SceneObject,
    Scenario,
    AiGroup,
    DynamicDoor,
    ClientActor,
    Vignette,
    CallForHelp,
    AiResource,
    AiLock,
    AiLockTicket,
    ChatChannel,
    Party,
    Guild,
    WowAccount,
    BNetAccount,
    GmTask,
    MobileSession,
    RaidGroup,
    Spell,
    Mail,
    WebObj,
    LfgObject,
    LfgList,
    UserRouter,
    PvpQueueGroup,
    UserClient,
    PetBattle,
    UniqueUserClient,
    BattlePet,
    Other(u8),
}

const HIGH_TYPES: [HighType; 44] = [
    HighType::Null,
    HighType::Uniq,
    HighType::Player,
    HighType::Item,
    HighType::StaticDoor,
    HighType::Transport,
    HighType::Conversation,
    HighType::Creature,
    HighType::Vehicle,
    HighType::Pet,
    HighType::GameObject,
    HighType::DynamicObject,
    HighType::AreaTrigger,
    HighType::Corpse,
    HighType::LootObject,
    HighType::SceneObject,
    HighType::Scenario,
    HighType::AiGroup,
    HighType::DynamicDoor,
    HighType::ClientActor,
    HighType::Vignette,
    HighType::CallForHelp,
    HighType::AiResource,
    HighType::AiLock,
    HighType::AiLockTicket,
    HighType::ChatChannel,
    HighType::Party,
    HighType::Guild,
    HighType::WowAccount,
    HighType::BNetAccount,
    HighType::GmTask,
    HighType::MobileSession,
    HighType::RaidGroup,
    HighType::Spell,
    HighType::Mail,
    HighType::WebObj,
    HighType::LfgObject,
    HighType::LfgList,
    HighType::UserRouter,
    HighType::PvpQueueGroup,
    HighType::UserClient,
    HighType::PetBattle,
    HighType::UniqueUserClient,
    HighType::BattlePet,
];

impl HighType {
    /// Maps the raw six-bit discriminant.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        HIGH_TYPES
            .get(raw as usize)
            .copied()
            .unwrap_or(Self::Other(raw))
    }

    /// Returns the raw discriminant.
    #[must_use]
    pub fn raw(self) -> u8 {
        match self {
            Self::Other(raw) => raw,
            known => HIGH_TYPES
                .iter()
                .position(|t| *t == known)
                .map_or(0, |idx| idx as u8),
        }
    }

    /// Returns `true` for categories whose identifiers carry a template entry.
    #[must_use]
    pub const fn has_entry(self) -> bool {
        matches!(
            self,
            Self::Creature
                | Self::Vehicle
                | Self::Pet
                | Self::GameObject
                | Self::DynamicObject
                | Self::AreaTrigger
                | Self::Corpse
                | Self::LootObject
                | Self::SceneObject
                | Self::Scenario
                | Self::AiGroup
                | Self::DynamicDoor
                | Self::Transport
                | Self::StaticDoor
                | Self::Conversation
                | Self::CallForHelp
                | Self::Vignette
        )
    }
}

/// A 128-bit entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid {
    high: u64,
    low: u64,
}

impl Guid {
    /// The all-zero identifier.
    pub const EMPTY: Self = Self { high: 0, low: 0 };

    /// Creates an identifier from its two halves.
    #[must_use]
    pub const fn new(low: u64, high: u64) -> Self {
        Self { high, low }
    }

    /// Builds an identifier from its structured parts.
    #[must_use]
    pub fn compose(high_type: HighType, map_id: u16, entry: u32, counter: u64) -> Self {
        let high = (u64::from(high_type.raw()) & 0x3F) << 58
            | (u64::from(map_id) & 0x1FFF) << 29
            | (u64::from(entry) & 0x7F_FFFF) << 6;
        Self::new(counter & 0xFF_FFFF_FFFF, high)
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self::new(value as u64, (value >> 64) as u64)
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        (self.high as u128) << 64 | self.low as u128
    }

    #[must_use]
    pub const fn low(self) -> u64 {
        self.low
    }

    #[must_use]
    pub const fn high(self) -> u64 {
        self.high
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.low == 0 && self.high == 0
    }

    #[must_use]
    pub fn high_type(self) -> HighType {
        if self.is_empty() {
            return HighType::Null;
        }
        HighType::from_raw((self.high >> 58) as u8 & 0x3F)
    }

    #[must_use]
    pub const fn sub_type(self) -> u8 {
        (self.high & 0x3F) as u8
    }

    #[must_use]
    pub const fn realm_id(self) -> u16 {
        ((self.high >> 42) & 0x1FFF) as u16
    }

    #[must_use]
    pub const fn map_id(self) -> u16 {
        ((self.high >> 29) & 0x1FFF) as u16
    }

    #[must_use]
    pub const fn server_id(self) -> u32 {
        ((self.low >> 40) & 0xFF_FFFF) as u32
    }

    /// The per-server spawn counter.
    #[must_use]
    pub const fn counter(self) -> u64 {
        self.low & 0xFF_FFFF_FFFF
    }

    /// Returns `true` if the category carries a template entry.
    #[must_use]
    pub fn has_entry(self) -> bool {
        self.high_type().has_entry()
    }

    /// The template entry, for categories that have one.
    #[must_use]
    pub fn entry(self) -> Option<u32> {
        self.has_entry()
            .then_some(((self.high >> 6) & 0x7F_FFFF) as u32)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0x0");
        }
        write!(
            f,
            "0x{:016X}{:016X} {:?}",
            self.high,
            self.low,
            self.high_type()
        )?;
        if let Some(entry) = self.entry() {
            write!(f, "/Entry: {entry}")?;
        }
        write!(f, "/Low: {}", self.counter())
    }
}

/// Assignment of presence-mask bits to byte slots of a 64-bit half.
///
/// `order[i]` is the byte slot (0 = least significant) carried when mask bit
/// `i` is set. Bytes travel on the wire in mask-bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOrder([u8; 8]);

impl SlotOrder {
    /// Mask bit `i` carries byte `i`.
    pub const ASCENDING: Self = Self([0, 1, 2, 3, 4, 5, 6, 7]);

    /// Creates a slot order; `None` unless `order` is a permutation of `0..8`.
    #[must_use]
    pub const fn new(order: [u8; 8]) -> Option<Self> {
        let mut seen = 0u8;
        let mut i = 0;
        while i < 8 {
            if order[i] >= 8 || seen & (1 << order[i]) != 0 {
                return None;
            }
            seen |= 1 << order[i];
            i += 1;
        }
        Some(Self(order))
    }

    #[must_use]
    pub const fn slots(&self) -> [u8; 8] {
        self.0
    }
}

impl Default for SlotOrder {
    fn default() -> Self {
        Self::ASCENDING
    }
}

/// Wire framing of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuidFormat {
    /// One mask byte over the low half; the high half is always zero.
    Packed64,
    /// Low mask, high mask, low bytes, high bytes.
    Packed128,
}

/// Encoder/decoder for masked identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuidCodec {
    format: GuidFormat,
    slots: SlotOrder,
}

impl GuidCodec {
    pub const PACKED64: Self = Self::new(GuidFormat::Packed64, SlotOrder::ASCENDING);
    pub const PACKED128: Self = Self::new(GuidFormat::Packed128, SlotOrder::ASCENDING);

    #[must_use]
    pub const fn new(format: GuidFormat, slots: SlotOrder) -> Self {
        Self { format, slots }
    }

    #[must_use]
    pub const fn format(&self) -> GuidFormat {
        self.format
    }

    /// Size in bytes of the shortest encoding, the empty identifier.
    #[must_use]
    pub const fn min_encoded_len(&self) -> usize {
        match self.format {
            GuidFormat::Packed64 => 1,
            GuidFormat::Packed128 => 2,
        }
    }

    /// Decodes one identifier at the current (aligned) cursor position.
    pub fn decode(&self, reader: &mut BitReader<'_>) -> WireResult<Guid> {
        match self.format {
            GuidFormat::Packed64 => {
                let mask = reader.read_u8()?;
                ensure_payload(reader, mask.count_ones() as usize)?;
                Ok(Guid::new(self.read_half(reader, mask)?, 0))
            }
            GuidFormat::Packed128 => {
                let low_mask = reader.read_u8()?;
                let high_mask = reader.read_u8()?;
                ensure_payload(
                    reader,
                    (low_mask.count_ones() + high_mask.count_ones()) as usize,
                )?;
                let low = self.read_half(reader, low_mask)?;
                let high = self.read_half(reader, high_mask)?;
                Ok(Guid::new(low, high))
            }
        }
    }

    /// Encodes an identifier with the minimal presence mask.
    pub fn encode(&self, guid: Guid) -> WireResult<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(18);
        self.encode_into(guid, &mut writer)?;
        Ok(writer.finish())
    }

    /// Encodes an identifier into an aligned writer.
    pub fn encode_into(&self, guid: Guid, writer: &mut BitWriter) -> WireResult<()> {
        match self.format {
            GuidFormat::Packed64 => {
                if guid.high() != 0 {
                    return Err(WireError::GuidOutOfRange {
                        guid: guid.as_u128(),
                        format: self.format,
                    });
                }
                let (mask, bytes) = self.pack_half(guid.low());
                writer.write_u8(mask)?;
                writer.write_bytes(&bytes)?;
            }
            GuidFormat::Packed128 => {
                let (low_mask, low_bytes) = self.pack_half(guid.low());
                let (high_mask, high_bytes) = self.pack_half(guid.high());
                writer.write_u8(low_mask)?;
                writer.write_u8(high_mask)?;
                writer.write_bytes(&low_bytes)?;
                writer.write_bytes(&high_bytes)?;
            }
        }
        Ok(())
    }

    fn read_half(&self, reader: &mut BitReader<'_>, mask: u8) -> WireResult<u64> {
        let mut value = 0u64;
        for (bit, slot) in self.slots.slots().iter().enumerate() {
            if mask & (1 << bit) != 0 {
                value |= u64::from(reader.read_u8()?) << (u32::from(*slot) * 8);
            }
        }
        Ok(value)
    }

    fn pack_half(&self, value: u64) -> (u8, Vec<u8>) {
        let mut mask = 0u8;
        let mut bytes = Vec::with_capacity(8);
        for (bit, slot) in self.slots.slots().iter().enumerate() {
            let byte = (value >> (u32::from(*slot) * 8)) as u8;
            if byte != 0 {
                mask |= 1 << bit;
                bytes.push(byte);
            }
        }
        (mask, bytes)
    }
}

fn ensure_payload(reader: &BitReader<'_>, needed: usize) -> WireResult<()> {
    let available = reader.bytes_remaining();
    if needed > available {
        return Err(WireError::Truncated {
            what: "guid",
            needed,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_slot_scenario() {
        let mut reader = BitReader::new(&[0x01, 0x05]);
        let guid = GuidCodec::PACKED64.decode(&mut reader).unwrap();
        assert_eq!(guid.as_u128(), 0x05);
        assert!(reader.is_empty());
        assert_eq!(GuidCodec::PACKED64.encode(guid).unwrap(), vec![0x01, 0x05]);
    }

    #[test]
    fn empty_guid_is_just_the_mask() {
        assert_eq!(GuidCodec::PACKED64.encode(Guid::EMPTY).unwrap(), vec![0]);
        assert_eq!(
            GuidCodec::PACKED128.encode(Guid::EMPTY).unwrap(),
            vec![0, 0]
        );
        for codec in [GuidCodec::PACKED64, GuidCodec::PACKED128] {
            assert_eq!(
                codec.encode(Guid::EMPTY).unwrap().len(),
                codec.min_encoded_len()
            );
        }
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut reader = BitReader::new(&[0b0000_0111, 0xAA, 0xBB]);
        let err = GuidCodec::PACKED64.decode(&mut reader).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                what: "guid",
                needed: 3,
                available: 2
            }
        );
    }

    #[test]
    fn packed128_layout() {
        let guid = Guid::compose(HighType::Creature, 1, 3_100, 42);
        let bytes = GuidCodec::PACKED128.encode(guid).unwrap();
        // low mask, high mask, then payload bytes
        assert_eq!(bytes[0], 0b0000_0001);
        assert_eq!(bytes[2], 42);
        let mut reader = BitReader::new(&bytes);
        let decoded = GuidCodec::PACKED128.decode(&mut reader).unwrap();
        assert_eq!(decoded, guid);
        assert!(reader.is_empty());
    }

    #[test]
    fn structured_fields() {
        let guid = Guid::compose(HighType::Vehicle, 571, 27_894, 0x12_3456);
        assert_eq!(guid.high_type(), HighType::Vehicle);
        assert_eq!(guid.entry(), Some(27_894));
        assert_eq!(guid.map_id(), 571);
        assert_eq!(guid.counter(), 0x12_3456);

        let player = Guid::compose(HighType::Player, 0, 0, 7);
        assert_eq!(player.high_type(), HighType::Player);
        assert_eq!(player.entry(), None);
    }

    #[test]
    fn scrambled_slot_order_roundtrips() {
        let order = SlotOrder::new([7, 0, 6, 1, 5, 2, 4, 3]).unwrap();
        let codec = GuidCodec::new(GuidFormat::Packed64, order);
        let guid = Guid::new(0xFF00_0000_0000_0011, 0);
        let bytes = codec.encode(guid).unwrap();
        // slot 7 is carried by bit 0, slot 0 by bit 1
        assert_eq!(bytes, vec![0b0000_0011, 0xFF, 0x11]);
        let decoded = codec.decode(&mut BitReader::new(&bytes)).unwrap();
        assert_eq!(decoded, guid);
    }

    #[test]
    fn slot_order_rejects_non_permutation() {
        assert!(SlotOrder::new([0, 1, 2, 3, 4, 5, 6, 6]).is_none());
        assert!(SlotOrder::new([0, 1, 2, 3, 4, 5, 6, 8]).is_none());
    }

    #[test]
    fn packed64_rejects_high_half() {
        let guid = Guid::new(1, 1);
        assert!(matches!(
            GuidCodec::PACKED64.encode(guid),
            Err(WireError::GuidOutOfRange { .. })
        ));
    }

    #[test]
    fn high_type_raw_roundtrip() {
        for raw in 0..64u8 {
            assert_eq!(HighType::from_raw(raw).raw(), raw);
        }
    }
}
