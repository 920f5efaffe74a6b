//! Object type tags carried by create entries.

use std::fmt;

/// Category of a world object, as sent in the create entry's type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ObjectType {
    Object = 0,
    Item = 1,
    Container = 2,
    Unit = 3,
    Player = 4,
    GameObject = 5,
    DynamicObject = 6,
    Corpse = 7,
    AreaTrigger = 8,
    SceneObject = 9,
}

impl ObjectType {
    /// Every type, in wire order.
    pub const ALL: [Self; 10] = [
        Self::Object,
        Self::Item,
        Self::Container,
        Self::Unit,
        Self::Player,
        Self::GameObject,
        Self::DynamicObject,
        Self::Corpse,
        Self::AreaTrigger,
        Self::SceneObject,
    ];

    /// Maps the wire type byte; `None` for bytes outside the known range.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        if (raw as usize) < Self::ALL.len() {
            Some(Self::ALL[raw as usize])
        } else {
            None
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Item => "Item",
            Self::Container => "Container",
            Self::Unit => "Unit",
            Self::Player => "Player",
            Self::GameObject => "GameObject",
            Self::DynamicObject => "DynamicObject",
            Self::Corpse => "Corpse",
            Self::AreaTrigger => "AreaTrigger",
            Self::SceneObject => "SceneObject",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
