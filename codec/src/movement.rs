//! Movement and transform records of create entries.
//!
//! A create block opens with a group of presence bits (see
//! [`ProtocolLayout::create_gates`]) followed by the pause-time count. Each
//! set gate is then followed by its payload, in a fixed order. Nested groups
//! repeat the pattern: align, read the group's bits, align, read payloads.
//!
//! Decoding is a single forward pass. Any failure aborts the whole record.

use tracing::trace;
use wire::{Guid, HighType, PackedTime, Quaternion, Vector2, Vector3, Vector4};

use crate::area_trigger::{decode_area_trigger, AreaTrigger};
use crate::error::CodecResult;
use crate::layout::{CreateFlags, CreateGate, ProtocolLayout};
use crate::reader::EntryReader;
use crate::scene::{decode_scene_object, SceneObjectCreate};
use crate::types::VehicleSeatAccessory;

/// Everything a create block says about an object's placement and motion.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementRecord {
    /// Gates that were set on the wire, including payload-less ones.
    pub flags: CreateFlags,
    pub movement: Option<MovementUpdate>,
    pub transport: Option<MovementTransport>,
    /// Position and facing of an object that does not move.
    pub stationary: Option<Vector4>,
    pub combat_victim: Option<Guid>,
    pub server_time: Option<PackedTime>,
    pub vehicle: Option<VehicleCreate>,
    pub anim_kit: Option<AnimKit>,
    pub rotation: Option<Quaternion>,
    pub area_trigger: Option<AreaTrigger>,
    pub game_object: Option<GameObjectCreate>,
    pub scene_object: Option<SceneObjectCreate>,
    pub scene_pending_instances: Option<Vec<i32>>,
    pub pause_times: Vec<i32>,
}

impl MovementRecord {
    /// World position: the movement status if present, else the stationary one.
    #[must_use]
    pub fn position(&self) -> Option<Vector3> {
        self.movement
            .as_ref()
            .map(|m| m.status.position.position())
            .or_else(|| self.stationary.map(|s| s.position()))
    }

    /// Seat association implied by a creature riding a vehicle.
    ///
    /// Both identifiers must carry a template entry; `guid` is the passenger.
    #[must_use]
    pub fn vehicle_accessory(&self, guid: Guid) -> Option<VehicleSeatAccessory> {
        let transport = self.transport.as_ref()?;
        if transport.transport.high_type() != HighType::Vehicle
            || guid.high_type() != HighType::Creature
        {
            return None;
        }
        Some(VehicleSeatAccessory {
            vehicle_entry: transport.transport.entry()?,
            accessory_entry: guid.entry()?,
            seat: transport.seat,
        })
    }
}

/// Full movement state of a moving object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementUpdate {
    pub status: MovementStatus,
    pub speeds: Speeds,
    pub forces: Vec<MovementForce>,
    pub spline: Option<SplineData>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementStatus {
    pub mover: Guid,
    pub move_index: u32,
    pub position: Vector4,
    pub pitch: f32,
    pub step_up_start_elevation: f32,
    pub removed_forces: Vec<Guid>,
    pub move_time: i32,
    pub flags: u32,
    pub extra_flags: u32,
    pub transport: Option<StatusTransport>,
    pub fall: Option<FallData>,
    pub has_spline: bool,
    pub height_change_failed: bool,
}

/// Transport the mover is standing on, as part of its status.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusTransport {
    pub transport: Guid,
    pub offset: Vector4,
    pub seat: i8,
    pub move_time: i32,
    pub prev_move_time: Option<u32>,
    pub vehicle_rec_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallData {
    pub time: u32,
    pub jump_velocity: f32,
    pub direction: Option<FallDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallDirection {
    pub direction: Vector2,
    pub horizontal_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Speeds {
    pub walk: f32,
    pub run: f32,
    pub run_back: f32,
    pub swim: f32,
    pub swim_back: f32,
    pub flight: f32,
    pub flight_back: f32,
    pub turn_rate: f32,
    pub pitch_rate: f32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementForce {
    pub id: Guid,
    pub direction: Vector3,
    pub transport_id: i32,
    pub magnitude: f32,
    pub kind: u8,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplineData {
    pub id: i32,
    pub destination: Vector3,
    pub movement: Option<SplineMove>,
}

/// Where a spline mover faces while travelling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplineFace {
    #[default]
    None,
    Spot(Vector3),
    Target(Guid),
    Direction(f32),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplineMove {
    pub flags: u32,
    pub face: SplineFace,
    pub mode: u8,
    pub elapsed: u32,
    pub duration: u32,
    pub duration_modifier: f32,
    pub next_duration_modifier: f32,
    pub jump_gravity: Option<f32>,
    pub special_time: Option<i32>,
    pub filter: Option<SplineFilter>,
    pub points: Vec<Vector3>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplineFilter {
    pub keys: Vec<FilterKey>,
    pub flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterKey {
    pub input: f32,
    pub output: f32,
}

/// Transport attachment gated by its own create bit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementTransport {
    pub transport: Guid,
    pub offset: Vector4,
    pub seat: u8,
    pub move_time: u32,
    pub prev_move_time: Option<u32>,
    pub vehicle_rec_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleCreate {
    pub rec_id: u32,
    pub initial_raw_facing: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimKit {
    pub ai_id: u16,
    pub movement_id: u16,
    pub melee_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameObjectCreate {
    pub world_effect_id: i32,
    pub extra: Option<i32>,
}

/// Decodes the movement block of a create entry.
pub(crate) fn decode_movement(
    r: &mut EntryReader<'_, '_>,
    layout: &ProtocolLayout,
) -> CodecResult<MovementRecord> {
    r.align();
    let mut flags = CreateFlags::empty();
    for gate in layout.create_gates {
        if r.bit(gate.name())? {
            flags.insert(*gate);
        }
    }
    r.align();
    trace!(?flags, "create gates");

    let pause_times_count = r.u32("PauseTimesCount")?;

    let mut record = MovementRecord {
        flags,
        ..MovementRecord::default()
    };

    if flags.contains(CreateGate::MovementUpdate) {
        record.movement = Some(decode_movement_update(r, layout)?);
    }

    if flags.contains(CreateGate::MovementTransport) {
        record.transport = Some(decode_movement_transport(r)?);
    }

    if flags.contains(CreateGate::Stationary) {
        let position = r.vector3("Stationary Position")?;
        let o = r.f32("Stationary Orientation")?;
        record.stationary = Some(Vector4 {
            x: position.x,
            y: position.y,
            z: position.z,
            o,
        });
    }

    if flags.contains(CreateGate::CombatVictim) {
        record.combat_victim = Some(r.guid("CombatVictim Guid")?);
    }

    if flags.contains(CreateGate::ServerTime) {
        record.server_time = Some(r.packed_time("ServerTime")?);
    }

    if flags.contains(CreateGate::VehicleCreate) {
        record.vehicle = Some(VehicleCreate {
            rec_id: r.u32("RecID")?,
            initial_raw_facing: r.f32("InitialRawFacing")?,
        });
    }

    if flags.contains(CreateGate::AnimKitCreate) {
        record.anim_kit = Some(AnimKit {
            ai_id: r.u16("AiID")?,
            movement_id: r.u16("MovementID")?,
            melee_id: r.u16("MeleeID")?,
        });
    }

    if flags.contains(CreateGate::Rotation) {
        record.rotation = Some(r.quaternion("GameObject Rotation")?);
    }

    if flags.contains(CreateGate::AreaTrigger) {
        record.area_trigger = Some(decode_area_trigger(r)?);
    }

    if flags.contains(CreateGate::GameObject) {
        let world_effect_id = r.i32("WorldEffectID")?;
        r.align();
        let has_extra = r.bit("HasWorldEffectExtra")?;
        r.align();
        let extra = if has_extra {
            Some(r.i32("WorldEffectExtra")?)
        } else {
            None
        };
        record.game_object = Some(GameObjectCreate {
            world_effect_id,
            extra,
        });
    }

    if flags.contains(CreateGate::SceneObjCreate) {
        record.scene_object = Some(decode_scene_object(r)?);
    }

    if flags.contains(CreateGate::ScenePendingInstances) {
        let count = r.i32("SceneInstanceIDsCount")?;
        let count = r.check_signed_count(count, 4)?;
        record.scene_pending_instances = Some(r.array(count, |r| r.i32("SceneInstanceIDs"))?);
    }

    let count = r.check_count(pause_times_count, 4)?;
    record.pause_times = r.array(count, |r| r.i32("PauseTimes"))?;

    Ok(record)
}

fn decode_movement_update(
    r: &mut EntryReader<'_, '_>,
    layout: &ProtocolLayout,
) -> CodecResult<MovementUpdate> {
    let status = decode_status(r, layout)?;

    let speeds = Speeds {
        walk: r.f32("WalkSpeed")?,
        run: r.f32("RunSpeed")?,
        run_back: r.f32("RunBackSpeed")?,
        swim: r.f32("SwimSpeed")?,
        swim_back: r.f32("SwimBackSpeed")?,
        flight: r.f32("FlightSpeed")?,
        flight_back: r.f32("FlightBackSpeed")?,
        turn_rate: r.f32("TurnRate")?,
        pitch_rate: r.f32("PitchRate")?,
    };

    let count = r.i32("MovementForceCount")?;
    // empty id (2) + vector (12) + i32 + f32 + u8
    let count = r.check_signed_count(count, 23)?;
    let forces = r.array(count, |r| {
        Ok(MovementForce {
            id: r.guid("Id")?,
            direction: r.vector3("Direction")?,
            transport_id: r.i32("TransportID")?,
            magnitude: r.f32("Magnitude")?,
            kind: r.u8("Type")?,
        })
    })?;

    r.align();
    let has_spline = r.bit("HasMovementSpline")?;
    r.align();
    let spline = if has_spline {
        Some(decode_spline(r, layout)?)
    } else {
        None
    };

    Ok(MovementUpdate {
        status,
        speeds,
        forces,
        spline,
    })
}

fn decode_status(
    r: &mut EntryReader<'_, '_>,
    layout: &ProtocolLayout,
) -> CodecResult<MovementStatus> {
    let mover = r.guid("MoverGUID")?;
    let move_index = r.u32("MoveIndex")?;
    let position = r.vector4("Position")?;
    let pitch = r.f32("Pitch")?;
    let step_up_start_elevation = r.f32("StepUpStartElevation")?;
    let removed_count = r.i32("RemoveForcesCount")?;
    let move_time = r.i32("MoveTime")?;
    let removed_count = r.check_signed_count(removed_count, r.guids.min_encoded_len())?;
    let removed_forces = r.array(removed_count, |r| r.guid("RemoveForcesIDs"))?;

    r.align();
    let flags = r.bits("Movement Flags", layout.movement_flag_bits)?;
    let extra_flags = r.bits("Extra Movement Flags", layout.movement_extra_flag_bits)?;
    let has_transport = r.bit("Has Transport Data")?;
    let has_fall = r.bit("Has Fall Data")?;
    let has_spline = r.bit("HasSpline")?;
    let height_change_failed = r.bit("HeightChangeFailed")?;
    r.align();

    let transport = if has_transport {
        let transport = r.guid("Transport Guid")?;
        let offset = r.vector4("Transport Position")?;
        let seat = r.i8("Transport Seat")?;
        let move_time = r.i32("Transport Time")?;
        r.align();
        let has_prev_move_time = r.bit("HasPrevMoveTime")?;
        let has_vehicle_rec_id = r.bit("HasVehicleRecID")?;
        r.align();
        let prev_move_time = if has_prev_move_time {
            Some(r.u32("PrevMoveTime")?)
        } else {
            None
        };
        let vehicle_rec_id = if has_vehicle_rec_id {
            Some(r.u32("VehicleRecID")?)
        } else {
            None
        };
        Some(StatusTransport {
            transport,
            offset,
            seat,
            move_time,
            prev_move_time,
            vehicle_rec_id,
        })
    } else {
        None
    };

    let fall = if has_fall {
        let time = r.u32("Fall Time")?;
        let jump_velocity = r.f32("JumpVelocity")?;
        r.align();
        let has_direction = r.bit("Has Fall Direction")?;
        r.align();
        let direction = if has_direction {
            Some(FallDirection {
                direction: r.vector2("Fall")?,
                horizontal_speed: r.f32("Horizontal Speed")?,
            })
        } else {
            None
        };
        Some(FallData {
            time,
            jump_velocity,
            direction,
        })
    } else {
        None
    };

    Ok(MovementStatus {
        mover,
        move_index,
        position,
        pitch,
        step_up_start_elevation,
        removed_forces,
        move_time,
        flags,
        extra_flags,
        transport,
        fall,
        has_spline,
        height_change_failed,
    })
}

fn decode_spline(r: &mut EntryReader<'_, '_>, layout: &ProtocolLayout) -> CodecResult<SplineData> {
    let id = r.i32("ID")?;
    let destination = r.vector3("Destination")?;

    r.align();
    let has_move = r.bit("MovementSplineMove")?;
    r.align();
    let movement = if has_move {
        Some(decode_spline_move(r, layout)?)
    } else {
        None
    };

    Ok(SplineData {
        id,
        destination,
        movement,
    })
}

fn decode_spline_move(
    r: &mut EntryReader<'_, '_>,
    layout: &ProtocolLayout,
) -> CodecResult<SplineMove> {
    r.align();
    let flags = r.bits("SplineFlags", layout.spline_flag_bits)?;
    let face_kind = r.bits("Face", 2)?;
    let has_jump_gravity = r.bit("HasJumpGravity")?;
    let has_special_time = r.bit("HasSpecialTime")?;
    let mode = r.bits("Mode", 2)? as u8;
    let has_filter = r.bit("HasSplineFilterKey")?;
    r.align();

    let elapsed = r.u32("Elapsed")?;
    let duration = r.u32("Duration")?;
    let duration_modifier = r.f32("DurationModifier")?;
    let next_duration_modifier = r.f32("NextDurationModifier")?;
    let points_count = r.u32("PointsCount")?;

    let face = match face_kind {
        3 => SplineFace::Direction(r.f32("FaceDirection")?),
        2 => SplineFace::Target(r.guid("FaceGUID")?),
        1 => SplineFace::Spot(r.vector3("FaceSpot")?),
        _ => SplineFace::None,
    };

    let jump_gravity = if has_jump_gravity {
        Some(r.f32("JumpGravity")?)
    } else {
        None
    };
    let special_time = if has_special_time {
        Some(r.i32("SpecialTime")?)
    } else {
        None
    };

    let filter = if has_filter {
        let count = r.u32("FilterKeysCount")?;
        let count = r.check_count(count, 8)?;
        let keys = r.array(count, |r| {
            Ok(FilterKey {
                input: r.f32("In")?,
                output: r.f32("Out")?,
            })
        })?;
        r.align();
        let flags = r.bits("FilterFlags", 2)? as u8;
        r.align();
        Some(SplineFilter { keys, flags })
    } else {
        None
    };

    let points_count = r.check_count(points_count, 12)?;
    let points = r.array(points_count, |r| r.vector3("Points"))?;

    Ok(SplineMove {
        flags,
        face,
        mode,
        elapsed,
        duration,
        duration_modifier,
        next_duration_modifier,
        jump_gravity,
        special_time,
        filter,
        points,
    })
}

fn decode_movement_transport(r: &mut EntryReader<'_, '_>) -> CodecResult<MovementTransport> {
    let transport = r.guid("PassengerGUID")?;
    let offset = r.vector4("TransportOffset")?;
    let seat = r.u8("VehicleSeatIndex")?;
    let move_time = r.u32("MoveTime")?;

    r.align();
    let has_prev_move_time = r.bit("HasPrevMoveTime")?;
    let has_vehicle_rec_id = r.bit("HasVehicleRecID")?;
    r.align();

    let prev_move_time = if has_prev_move_time {
        Some(r.u32("PrevMoveTime")?)
    } else {
        None
    };
    let vehicle_rec_id = if has_vehicle_rec_id {
        Some(r.i32("VehicleRecID")?)
    } else {
        None
    };

    Ok(MovementTransport {
        transport,
        offset,
        seat,
        move_time,
        prev_move_time,
        vehicle_rec_id,
    })
}
