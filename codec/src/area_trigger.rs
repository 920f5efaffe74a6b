//! Area-trigger payload of a create block.

use wire::{Vector2, Vector3};

use crate::error::CodecResult;
use crate::reader::EntryReader;

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaTrigger {
    pub elapsed_ms: i32,
    pub roll_pitch_yaw: Vector3,
    pub absolute_orientation: bool,
    pub dynamic_shape: bool,
    pub attached: bool,
    pub face_movement_dir: bool,
    pub follows_terrain: bool,
    pub target_roll_pitch_yaw: Option<Vector3>,
    pub scale_curve_id: Option<i32>,
    pub morph_curve_id: Option<i32>,
    pub facing_curve_id: Option<i32>,
    pub move_curve_id: Option<i32>,
    pub sphere: Option<Sphere>,
    pub box_shape: Option<BoxShape>,
    pub polygon: Option<Polygon>,
    pub cylinder: Option<Cylinder>,
    pub spline: Option<TriggerSpline>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    pub radius: f32,
    pub radius_target: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxShape {
    pub extents: Vector3,
    pub extents_target: Vector3,
}

/// Prism with a current and a target outline.
///
/// The two vertex arrays are counted independently and need not match.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    pub height: f32,
    pub height_target: f32,
    pub vertices: Vec<Vector2>,
    pub vertices_target: Vec<Vector2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cylinder {
    pub radius: f32,
    pub radius_target: f32,
    pub height: f32,
    pub height_target: f32,
    pub location_z_offset: f32,
    pub location_z_offset_target: f32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerSpline {
    pub time_to_target: i32,
    pub elapsed_time_for_movement: i32,
    pub points: Vec<Vector3>,
}

fn optional<T>(
    r: &mut EntryReader<'_, '_>,
    present: bool,
    read: impl FnOnce(&mut EntryReader<'_, '_>) -> CodecResult<T>,
) -> CodecResult<Option<T>> {
    if present {
        read(r).map(Some)
    } else {
        Ok(None)
    }
}

pub(crate) fn decode_area_trigger(r: &mut EntryReader<'_, '_>) -> CodecResult<AreaTrigger> {
    let elapsed_ms = r.i32("ElapsedMs")?;
    let roll_pitch_yaw = r.vector3("RollPitchYaw1")?;

    r.align();
    let absolute_orientation = r.bit("HasAbsoluteOrientation")?;
    let dynamic_shape = r.bit("HasDynamicShape")?;
    let attached = r.bit("HasAttached")?;
    let face_movement_dir = r.bit("HasFaceMovementDir")?;
    let follows_terrain = r.bit("HasFollowsTerrain")?;
    let has_target_rpy = r.bit("HasTargetRollPitchYaw")?;
    let has_scale_curve = r.bit("HasScaleCurveID")?;
    let has_morph_curve = r.bit("HasMorphCurveID")?;
    let has_facing_curve = r.bit("HasFacingCurveID")?;
    let has_move_curve = r.bit("HasMoveCurveID")?;
    let has_sphere = r.bit("HasAreaTriggerSphere")?;
    let has_box = r.bit("HasAreaTriggerBox")?;
    let has_polygon = r.bit("HasAreaTriggerPolygon")?;
    let has_cylinder = r.bit("HasAreaTriggerCylinder")?;
    let has_spline = r.bit("HasAreaTriggerSpline")?;
    r.align();

    let target_roll_pitch_yaw = optional(r, has_target_rpy, |r| r.vector3("TargetRollPitchYaw"))?;
    let scale_curve_id = optional(r, has_scale_curve, |r| r.i32("ScaleCurveID"))?;
    let morph_curve_id = optional(r, has_morph_curve, |r| r.i32("MorphCurveID"))?;
    let facing_curve_id = optional(r, has_facing_curve, |r| r.i32("FacingCurveID"))?;
    let move_curve_id = optional(r, has_move_curve, |r| r.i32("MoveCurveID"))?;

    let sphere = optional(r, has_sphere, |r| {
        Ok(Sphere {
            radius: r.f32("Radius")?,
            radius_target: r.f32("RadiusTarget")?,
        })
    })?;

    let box_shape = optional(r, has_box, |r| {
        Ok(BoxShape {
            extents: r.vector3("Extents")?,
            extents_target: r.vector3("ExtentsTarget")?,
        })
    })?;

    let polygon = optional(r, has_polygon, |r| {
        let count = r.i32("VerticesCount")?;
        let target_count = r.i32("VerticesTargetCount")?;
        let height = r.f32("Height")?;
        let height_target = r.f32("HeightTarget")?;
        let count = r.check_signed_count(count, 8)?;
        let vertices = r.array(count, |r| r.vector2("Vertices"))?;
        let target_count = r.check_signed_count(target_count, 8)?;
        let vertices_target = r.array(target_count, |r| r.vector2("VerticesTarget"))?;
        Ok(Polygon {
            height,
            height_target,
            vertices,
            vertices_target,
        })
    })?;

    let cylinder = optional(r, has_cylinder, |r| {
        Ok(Cylinder {
            radius: r.f32("Radius")?,
            radius_target: r.f32("RadiusTarget")?,
            height: r.f32("Height")?,
            height_target: r.f32("HeightTarget")?,
            location_z_offset: r.f32("LocationZOffset")?,
            location_z_offset_target: r.f32("LocationZOffsetTarget")?,
        })
    })?;

    let spline = optional(r, has_spline, |r| {
        let time_to_target = r.i32("TimeToTarget")?;
        let elapsed_time_for_movement = r.i32("ElapsedTimeForMovement")?;
        let count = r.i32("VerticesCount")?;
        let count = r.check_signed_count(count, 12)?;
        let points = r.array(count, |r| r.vector3("Points"))?;
        Ok(TriggerSpline {
            time_to_target,
            elapsed_time_for_movement,
            points,
        })
    })?;

    Ok(AreaTrigger {
        elapsed_ms,
        roll_pitch_yaw,
        absolute_orientation,
        dynamic_shape,
        attached,
        face_movement_dir,
        follows_terrain,
        target_roll_pitch_yaw,
        scale_curve_id,
        morph_curve_id,
        facing_curve_id,
        move_curve_id,
        sphere,
        box_shape,
        polygon,
        cylinder,
        spline,
    })
}
