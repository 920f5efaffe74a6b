//! The entity store.
//!
//! Entities are keyed by identifier and never removed: a destroy only means
//! the object left the client's view. All access goes through the store so
//! that concurrent readers see whole entities.

use std::collections::{BTreeSet, HashMap};

use parking_lot::RwLock;
use schema::ObjectType;
use wire::{Guid, HighType, Vector3};

use crate::movement::MovementRecord;
use crate::types::CaptureTime;
use crate::update::CreateObject;
use crate::values::FieldUpdateSet;

/// World state stamped onto entities as they are created.
///
/// Other packet handlers learn the current area and phases; the session only
/// holds what they last reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldContext {
    pub area_id: u32,
    pub phase_mask: u32,
    pub active_phases: BTreeSet<u16>,
}

/// Everything known about one world object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub guid: Guid,
    pub object_type: ObjectType,
    /// Field state from creates, merged key by key.
    pub create_fields: FieldUpdateSet,
    /// One diff per applied values update, oldest first.
    pub history: Vec<FieldUpdateSet>,
    pub movement: MovementRecord,
    pub map_id: u16,
    pub area_id: u32,
    pub phase_mask: u32,
    pub phases: BTreeSet<u16>,
    /// A creature seen at different positions by successive creates.
    pub moved_between_creates: bool,
    pub first_seen: CaptureTime,
    pub last_seen: CaptureTime,
}

impl Entity {
    /// Builds an entity from a create entry.
    #[must_use]
    pub fn from_create(
        create: &CreateObject,
        map_id: u16,
        world: &WorldContext,
        seen: CaptureTime,
    ) -> Self {
        Self {
            guid: create.guid,
            object_type: create.object_type,
            create_fields: create.fields.clone(),
            history: Vec::new(),
            movement: create.movement.clone(),
            map_id,
            area_id: world.area_id,
            phase_mask: world.phase_mask,
            phases: world.active_phases.clone(),
            moved_between_creates: false,
            first_seen: seen,
            last_seen: seen,
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<Vector3> {
        self.movement.position()
    }

    /// Folds a newer sighting of the same object into this one.
    ///
    /// Movement, type and location come from `newer`. Create fields merge
    /// with `newer` winning, history is appended, phases accumulate.
    pub fn merge(&mut self, newer: Self) {
        if self.guid.high_type() == HighType::Creature && self.position() != newer.position() {
            self.moved_between_creates = true;
        }
        self.moved_between_creates |= newer.moved_between_creates;

        self.object_type = newer.object_type;
        self.movement = newer.movement;
        self.create_fields.merge_from(&newer.create_fields);
        self.history.extend(newer.history);
        self.map_id = newer.map_id;
        self.area_id = newer.area_id;
        self.phase_mask |= newer.phase_mask;
        self.phases.extend(newer.phases);
        self.first_seen = self.first_seen.min(newer.first_seen);
        self.last_seen = self.last_seen.max(newer.last_seen);
    }
}

/// Result of [`EntityStore::merge_or_insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Merged,
}

/// Identifier-keyed entity map behind a read-write lock.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: RwLock<HashMap<Guid, Entity>>,
}

impl EntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    #[must_use]
    pub fn contains(&self, guid: Guid) -> bool {
        self.entities.read().contains_key(&guid)
    }

    /// A copy of the entity.
    #[must_use]
    pub fn get(&self, guid: Guid) -> Option<Entity> {
        self.entities.read().get(&guid).cloned()
    }

    /// Runs `f` on the entity under the read lock.
    pub fn with_entity<R>(&self, guid: Guid, f: impl FnOnce(&Entity) -> R) -> Option<R> {
        self.entities.read().get(&guid).map(f)
    }

    /// Runs `f` on the entity under the write lock.
    pub fn with_entity_mut<R>(&self, guid: Guid, f: impl FnOnce(&mut Entity) -> R) -> Option<R> {
        self.entities.write().get_mut(&guid).map(f)
    }

    /// Inserts `entity`, or merges it into the one already stored.
    pub fn merge_or_insert(&self, entity: Entity) -> MergeOutcome {
        let mut entities = self.entities.write();
        match entities.get_mut(&entity.guid) {
            Some(existing) => {
                existing.merge(entity);
                MergeOutcome::Merged
            }
            None => {
                entities.insert(entity.guid, entity);
                MergeOutcome::Inserted
            }
        }
    }

    /// Appends a values diff to the entity's history.
    ///
    /// Returns `false`, leaving the store untouched, if the entity is unknown.
    pub fn append_update(&self, guid: Guid, updates: FieldUpdateSet, seen: CaptureTime) -> bool {
        self.with_entity_mut(guid, |entity| {
            entity.history.push(updates);
            entity.last_seen = entity.last_seen.max(seen);
        })
        .is_some()
    }

    /// Copies of all entities, ordered by identifier.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Entity> {
        let mut entities: Vec<_> = self.entities.read().values().cloned().collect();
        entities.sort_by_key(|e| e.guid);
        entities
    }
}
