//! Per-version wire layouts.
//!
//! Client builds that share a wire format share one [`ProtocolLayout`]. The
//! layout names the identifier framing, the order of the create-block
//! presence bits and the widths of the packed flag words.

use std::fmt;

use wire::GuidCodec;

/// A supported client build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolVersion {
    #[default]
    V6_0_2_19033,
    V6_0_2_19034,
    V6_0_3_19103,
    V6_0_3_19116,
    V6_0_3_19243,
    V6_0_3_19342,
}

impl ProtocolVersion {
    pub const ALL: [Self; 6] = [
        Self::V6_0_2_19033,
        Self::V6_0_2_19034,
        Self::V6_0_3_19103,
        Self::V6_0_3_19116,
        Self::V6_0_3_19243,
        Self::V6_0_3_19342,
    ];

    /// The client build number.
    #[must_use]
    pub const fn build(self) -> u32 {
        match self {
            Self::V6_0_2_19033 => 19033,
            Self::V6_0_2_19034 => 19034,
            Self::V6_0_3_19103 => 19103,
            Self::V6_0_3_19116 => 19116,
            Self::V6_0_3_19243 => 19243,
            Self::V6_0_3_19342 => 19342,
        }
    }

    #[must_use]
    pub fn from_build(build: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.build() == build)
    }

    /// The wire layout used by this build.
    #[must_use]
    pub fn layout(self) -> &'static ProtocolLayout {
        // every supported build shares the 6.0.2 format
        &V6_0_2
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patch = match self {
            Self::V6_0_2_19033 | Self::V6_0_2_19034 => "6.0.2",
            _ => "6.0.3",
        };
        write!(f, "{patch}.{}", self.build())
    }
}

/// One presence bit at the start of a create block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreateGate {
    NoBirthAnim,
    EnablePortals,
    PlayHoverAnim,
    IsSuppressingGreetings,
    MovementUpdate,
    MovementTransport,
    Stationary,
    CombatVictim,
    ServerTime,
    VehicleCreate,
    AnimKitCreate,
    Rotation,
    AreaTrigger,
    GameObject,
    ThisIsYou,
    ReplaceActive,
    SceneObjCreate,
    ScenePendingInstances,
}

impl CreateGate {
    /// Name used in field traces.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoBirthAnim => "NoBirthAnim",
            Self::EnablePortals => "EnablePortals",
            Self::PlayHoverAnim => "PlayHoverAnim",
            Self::IsSuppressingGreetings => "IsSuppressingGreetings",
            Self::MovementUpdate => "HasMovementUpdate",
            Self::MovementTransport => "HasMovementTransport",
            Self::Stationary => "Stationary",
            Self::CombatVictim => "HasCombatVictim",
            Self::ServerTime => "HasServerTime",
            Self::VehicleCreate => "HasVehicleCreate",
            Self::AnimKitCreate => "HasAnimKitCreate",
            Self::Rotation => "HasRotation",
            Self::AreaTrigger => "HasAreaTrigger",
            Self::GameObject => "GameObject",
            Self::ThisIsYou => "ThisIsYou",
            Self::ReplaceActive => "ReplaceActive",
            Self::SceneObjCreate => "SceneObjCreate",
            Self::ScenePendingInstances => "ScenePendingInstances",
        }
    }

    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Set of create gates read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreateFlags(u32);

impl CreateFlags {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn contains(self, gate: CreateGate) -> bool {
        self.0 & gate.bit() != 0
    }

    pub fn insert(&mut self, gate: CreateGate) {
        self.0 |= gate.bit();
    }

    #[must_use]
    pub const fn with(mut self, gate: CreateGate) -> Self {
        self.0 |= gate.bit();
        self
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Wire layout shared by a group of client builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLayout {
    /// Framing of every identifier in the update-object packet.
    pub guids: GuidCodec,
    /// Create-block presence bits, in wire order.
    pub create_gates: &'static [CreateGate],
    pub movement_flag_bits: u8,
    pub movement_extra_flag_bits: u8,
    pub spline_flag_bits: u8,
}

/// Layout of client builds 6.0.2 and 6.0.3.
pub static V6_0_2: ProtocolLayout = ProtocolLayout {
    guids: GuidCodec::PACKED128,
    create_gates: &[
        CreateGate::NoBirthAnim,
        CreateGate::EnablePortals,
        CreateGate::PlayHoverAnim,
        CreateGate::IsSuppressingGreetings,
        CreateGate::MovementUpdate,
        CreateGate::MovementTransport,
        CreateGate::Stationary,
        CreateGate::CombatVictim,
        CreateGate::ServerTime,
        CreateGate::VehicleCreate,
        CreateGate::AnimKitCreate,
        CreateGate::Rotation,
        CreateGate::AreaTrigger,
        CreateGate::GameObject,
        CreateGate::ThisIsYou,
        CreateGate::ReplaceActive,
        CreateGate::SceneObjCreate,
        CreateGate::ScenePendingInstances,
    ],
    movement_flag_bits: 30,
    movement_extra_flag_bits: 15,
    spline_flag_bits: 25,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_roundtrip() {
        for version in ProtocolVersion::ALL {
            assert_eq!(ProtocolVersion::from_build(version.build()), Some(version));
        }
        assert_eq!(ProtocolVersion::from_build(18_414), None);
    }

    #[test]
    fn all_builds_share_the_layout() {
        for version in ProtocolVersion::ALL {
            assert!(std::ptr::eq(version.layout(), &V6_0_2));
        }
    }

    #[test]
    fn display_includes_patch() {
        assert_eq!(ProtocolVersion::V6_0_2_19034.to_string(), "6.0.2.19034");
        assert_eq!(ProtocolVersion::V6_0_3_19342.to_string(), "6.0.3.19342");
    }

    #[test]
    fn gate_table_has_no_duplicates() {
        let mut seen = CreateFlags::empty();
        for gate in V6_0_2.create_gates {
            assert!(!seen.contains(*gate), "{gate:?} listed twice");
            seen.insert(*gate);
        }
        assert_eq!(V6_0_2.create_gates.len(), 18);
    }

    #[test]
    fn flags_are_independent() {
        let flags = CreateFlags::empty()
            .with(CreateGate::Stationary)
            .with(CreateGate::ScenePendingInstances);
        assert!(flags.contains(CreateGate::Stationary));
        assert!(flags.contains(CreateGate::ScenePendingInstances));
        assert!(!flags.contains(CreateGate::MovementUpdate));
        assert!(!flags.is_empty());
    }
}
