//! Consumers of decode output.

use schema::ObjectType;
use wire::Guid;

use crate::error::EntryFailure;
use crate::store::Entity;
use crate::trace::FieldEvent;
use crate::types::{DestroyReason, VehicleSeatAccessory};

/// Receives what a session learns while applying packets.
///
/// Every method defaults to doing nothing, so a sink implements only what it
/// consumes. Calls arrive in wire order.
pub trait DecodeSink {
    /// A named value read from an applied entry.
    fn field(&mut self, _event: &FieldEvent) {}

    /// The state of an entity right after a create was applied.
    fn entity(&mut self, _entity: &Entity) {}

    fn destroyed(&mut self, _guid: Guid, _reason: DestroyReason) {}

    fn vehicle_accessory(&mut self, _accessory: VehicleSeatAccessory) {}

    /// A unit or game object with a template entry was created.
    fn spawned(&mut self, _object_type: ObjectType, _entry: u32) {}

    /// A values update was dropped because its entity was never created.
    fn orphan_update(&mut self, _guid: Guid) {}

    /// A non-fatal problem with an entry.
    fn warning(&mut self, _warning: &EntryFailure) {}

    /// An entry that failed to decode or apply.
    fn malformed_entry(&mut self, _failure: &EntryFailure) {}
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DecodeSink for NullSink {}

/// A sink that keeps everything it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub fields: Vec<FieldEvent>,
    pub entities: Vec<Entity>,
    pub destroyed: Vec<(Guid, DestroyReason)>,
    pub accessories: Vec<VehicleSeatAccessory>,
    pub spawns: Vec<(ObjectType, u32)>,
    pub orphans: Vec<Guid>,
    pub warnings: Vec<EntryFailure>,
    pub malformed: Vec<EntryFailure>,
}

impl DecodeSink for RecordingSink {
    fn field(&mut self, event: &FieldEvent) {
        self.fields.push(event.clone());
    }

    fn entity(&mut self, entity: &Entity) {
        self.entities.push(entity.clone());
    }

    fn destroyed(&mut self, guid: Guid, reason: DestroyReason) {
        self.destroyed.push((guid, reason));
    }

    fn vehicle_accessory(&mut self, accessory: VehicleSeatAccessory) {
        self.accessories.push(accessory);
    }

    fn spawned(&mut self, object_type: ObjectType, entry: u32) {
        self.spawns.push((object_type, entry));
    }

    fn orphan_update(&mut self, guid: Guid) {
        self.orphans.push(guid);
    }

    fn warning(&mut self, warning: &EntryFailure) {
        self.warnings.push(warning.clone());
    }

    fn malformed_entry(&mut self, failure: &EntryFailure) {
        self.malformed.push(failure.clone());
    }
}
