//! Decoder sessions: decode packets and apply them to an entity store.
//!
//! A session owns everything a capture accumulates: the entity store, the
//! vehicle accessory table, the current world context and statistics.
//! Decoding borrows the session immutably and can run on any thread;
//! applying must follow capture order.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use schema::{FieldSchema, ObjectType};
use tracing::{debug, warn};
use wire::Limits;

use crate::error::{CodecError, CodecResult, EntryFailure};
use crate::layout::{ProtocolLayout, ProtocolVersion};
use crate::sink::DecodeSink;
use crate::store::{Entity, EntityStore, MergeOutcome, WorldContext};
use crate::types::{DestroyReason, RawPacket, VehicleSeatAccessory};
use crate::update::{UpdateDecoder, UpdateEntry, UpdateObject};

/// What to do with a values update for an entity that was never created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrphanPolicy {
    /// Drop the update, log it and tell the sink.
    #[default]
    Drop,
    /// Report the update as a failed entry.
    Reject,
}

/// Configuration for a [`DecoderSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    pub version: ProtocolVersion,
    pub limits: Limits,
    pub orphan_policy: OrphanPolicy,
    /// Record `(name, value, path)` events for the sink.
    pub trace_fields: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::default(),
            limits: Limits::default(),
            orphan_policy: OrphanPolicy::default(),
            trace_fields: true,
        }
    }
}

/// Running totals over every applied packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionStats {
    pub packets: u64,
    pub entries: u64,
    pub creates: u64,
    pub merges: u64,
    pub updates: u64,
    pub orphan_updates: u64,
    pub destroys: u64,
    pub unknown_entries: u64,
    pub malformed_entries: u64,
}

/// Distinct vehicle seat accessories seen so far.
#[derive(Debug, Default)]
pub struct VehicleAccessoryTable {
    seen: Mutex<BTreeSet<VehicleSeatAccessory>>,
}

impl VehicleAccessoryTable {
    /// Returns `true` if the accessory was not known before.
    pub fn insert(&self, accessory: VehicleSeatAccessory) -> bool {
        self.seen.lock().insert(accessory)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    /// All accessories, ordered by vehicle, passenger and seat.
    #[must_use]
    pub fn snapshot(&self) -> Vec<VehicleSeatAccessory> {
        self.seen.lock().iter().copied().collect()
    }
}

/// Outcome of applying one packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Entries that changed the store or produced events.
    pub applied: usize,
    /// Entries that failed to decode or were rejected while applying.
    pub failures: Vec<EntryFailure>,
}

impl ApplyReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decoding state for one capture.
pub struct DecoderSession {
    config: SessionConfig,
    layout: &'static ProtocolLayout,
    schema: Arc<dyn FieldSchema>,
    store: EntityStore,
    accessories: VehicleAccessoryTable,
    world: RwLock<WorldContext>,
    stats: Mutex<SessionStats>,
}

impl DecoderSession {
    #[must_use]
    pub fn new(config: SessionConfig, schema: Arc<dyn FieldSchema>) -> Self {
        let layout = config.version.layout();
        Self {
            config,
            layout,
            schema,
            store: EntityStore::new(),
            accessories: VehicleAccessoryTable::default(),
            world: RwLock::new(WorldContext::default()),
            stats: Mutex::new(SessionStats::default()),
        }
    }

    /// A session using the field table compiled into the schema crate.
    #[must_use]
    pub fn with_builtin_schema(config: SessionConfig) -> Self {
        Self::new(config, Arc::new(schema::v6_0_2()))
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    #[must_use]
    pub const fn accessories(&self) -> &VehicleAccessoryTable {
        &self.accessories
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        *self.stats.lock()
    }

    #[must_use]
    pub fn world(&self) -> WorldContext {
        self.world.read().clone()
    }

    /// Replaces the world context stamped onto subsequent creates.
    pub fn set_world(&self, world: WorldContext) {
        *self.world.write() = world;
    }

    /// Decodes a packet without touching the store.
    pub fn decode(&self, packet: &RawPacket) -> CodecResult<UpdateObject> {
        UpdateDecoder::new(self.layout, self.schema.as_ref(), &self.config.limits)
            .with_trace(self.config.trace_fields)
            .decode(packet)
    }

    /// Decodes and applies a packet.
    pub fn process(
        &self,
        packet: &RawPacket,
        sink: &mut dyn DecodeSink,
    ) -> CodecResult<ApplyReport> {
        let decoded = self.decode(packet)?;
        Ok(self.apply(packet, &decoded, sink))
    }

    /// Applies a decoded packet to the store.
    ///
    /// Only entries that decoded completely are applied.
    pub fn apply(
        &self,
        packet: &RawPacket,
        decoded: &UpdateObject,
        sink: &mut dyn DecodeSink,
    ) -> ApplyReport {
        let mut stats = SessionStats {
            packets: 1,
            ..SessionStats::default()
        };
        let mut report = ApplyReport::default();

        if let Some(removed) = &decoded.header.removed {
            for guid in removed.destroyed() {
                sink.destroyed(*guid, DestroyReason::Destroyed);
            }
            for guid in removed.out_of_range() {
                sink.destroyed(*guid, DestroyReason::OutOfRange);
            }
            stats.destroys += removed.guids.len() as u64;
        }

        let world = self.world();
        for decoded_entry in &decoded.entries {
            stats.entries += 1;
            for event in &decoded_entry.trace {
                sink.field(event);
            }

            match &decoded_entry.entry {
                UpdateEntry::Values { guid, updates } => {
                    if self.store.append_update(*guid, updates.clone(), packet.timestamp) {
                        stats.updates += 1;
                        report.applied += 1;
                        continue;
                    }
                    stats.orphan_updates += 1;
                    match self.config.orphan_policy {
                        OrphanPolicy::Drop => {
                            warn!(
                                opcode = decoded.opcode,
                                entry = decoded_entry.index,
                                guid = %guid,
                                "values update for unknown entity dropped"
                            );
                            sink.orphan_update(*guid);
                        }
                        OrphanPolicy::Reject => {
                            let failure = EntryFailure {
                                opcode: decoded.opcode,
                                entry_index: decoded_entry.index,
                                error: CodecError::OrphanUpdate { guid: *guid },
                            };
                            warn!(%failure, "values update for unknown entity rejected");
                            stats.malformed_entries += 1;
                            sink.malformed_entry(&failure);
                            report.failures.push(failure);
                        }
                    }
                }
                UpdateEntry::Create(create) => {
                    let map_id = decoded.header.map_id;
                    let entity = Entity::from_create(create, map_id, &world, packet.timestamp);
                    stats.creates += 1;
                    if self.store.merge_or_insert(entity) == MergeOutcome::Merged {
                        debug!(guid = %create.guid, "re-create merged");
                        stats.merges += 1;
                    }

                    if let Some(accessory) = create.movement.vehicle_accessory(create.guid) {
                        if self.accessories.insert(accessory) {
                            sink.vehicle_accessory(accessory);
                        }
                    }

                    if matches!(create.object_type, ObjectType::Unit | ObjectType::GameObject) {
                        if let Some(entry) = create.guid.entry() {
                            sink.spawned(create.object_type, entry);
                        }
                    }

                    if let Some(entity) = self.store.get(create.guid) {
                        sink.entity(&entity);
                    }
                    report.applied += 1;
                }
                UpdateEntry::Destroy { guids } => {
                    for guid in guids {
                        sink.destroyed(*guid, DestroyReason::Destroyed);
                    }
                    stats.destroys += guids.len() as u64;
                    report.applied += 1;
                }
                UpdateEntry::Unknown { .. } => {
                    stats.unknown_entries += 1;
                }
            }
        }

        for warning in &decoded.warnings {
            sink.warning(warning);
        }

        if let Some(failure) = &decoded.failure {
            stats.malformed_entries += 1;
            sink.malformed_entry(failure);
            report.failures.push(failure.clone());
        }

        self.stats.lock().add(&stats);
        report
    }
}

impl SessionStats {
    fn add(&mut self, other: &Self) {
        self.packets += other.packets;
        self.entries += other.entries;
        self.creates += other.creates;
        self.merges += other.merges;
        self.updates += other.updates;
        self.orphan_updates += other.orphan_updates;
        self.destroys += other.destroys;
        self.unknown_entries += other.unknown_entries;
        self.malformed_entries += other.malformed_entries;
    }
}
