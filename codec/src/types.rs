//! Core types for the codec.

use schema::ObjectType;
use wire::{Guid, HighType};

/// Capture time of a packet, in milliseconds since the capture started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureTime(u64);

impl CaptureTime {
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl From<u64> for CaptureTime {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}

/// One captured packet as handed over by the capture source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub opcode: u32,
    pub timestamp: CaptureTime,
    pub data: Vec<u8>,
}

impl RawPacket {
    #[must_use]
    pub fn new(opcode: u32, timestamp: CaptureTime, data: Vec<u8>) -> Self {
        Self {
            opcode,
            timestamp,
            data,
        }
    }
}

/// Why an identifier left the client's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DestroyReason {
    /// Listed in a `DestroyObjects` entry or the header's destroyed prefix.
    Destroyed,
    /// Listed after the destroyed prefix of the header.
    OutOfRange,
}

/// A passenger observed sitting in a vehicle seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSeatAccessory {
    /// Template entry of the vehicle.
    pub vehicle_entry: u32,
    /// Template entry of the passenger.
    pub accessory_entry: u32,
    pub seat: u8,
}

/// Object type implied by an identifier's high type.
///
/// Values entries carry no type byte, so their field layout is chosen from
/// the identifier alone.
#[must_use]
pub fn object_type_of(guid: Guid) -> ObjectType {
    match guid.high_type() {
        HighType::Player => ObjectType::Player,
        HighType::Creature | HighType::Vehicle | HighType::Pet => ObjectType::Unit,
        HighType::Item => ObjectType::Item,
        HighType::GameObject
        | HighType::Transport
        | HighType::StaticDoor
        | HighType::DynamicDoor => ObjectType::GameObject,
        HighType::DynamicObject => ObjectType::DynamicObject,
        HighType::Corpse => ObjectType::Corpse,
        HighType::AreaTrigger => ObjectType::AreaTrigger,
        HighType::SceneObject => ObjectType::SceneObject,
        _ => ObjectType::Object,
    }
}
