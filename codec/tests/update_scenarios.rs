mod common;

use codec::{
    CreateGate, DecoderSession, DestroyReason, ErrorKind, FieldValue, NullSink, OrphanPolicy,
    RecordingSink, SessionConfig, UpdateEntry,
};
use common::{f32s, gates, guid, stationary, PacketBuilder};
use schema::ObjectType;
use wire::{Guid, HighType, Vector3};

const HEALTH: u16 = 0x3B;
const ENTRY_ID: u16 = 0x09;

fn creature(counter: u64) -> Guid {
    Guid::compose(HighType::Creature, 571, 26_125, counter)
}

fn session() -> DecoderSession {
    DecoderSession::with_builtin_schema(SessionConfig::default())
}

#[test]
fn create_values_create_keeps_history_and_takes_new_position() {
    let id = creature(1);
    let mut builder = PacketBuilder::new(571);
    builder
        .create(
            id,
            ObjectType::Unit,
            stationary(10.0, 20.0, 30.0, 0.0),
            &[(ENTRY_ID, 26_125), (HEALTH, 100)],
        )
        .values(id, &[(HEALTH, 80)])
        .create(
            id,
            ObjectType::Unit,
            stationary(11.0, 20.0, 30.0, 0.0),
            &[(ENTRY_ID, 26_125), (HEALTH, 100)],
        );
    let packet = builder.build(1_000);

    let session = session();
    let report = session.process(&packet, &mut NullSink).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.applied, 3);

    let entity = session.store().get(id).unwrap();
    assert_eq!(entity.object_type, ObjectType::Unit);
    assert_eq!(entity.position(), Some(Vector3::new(11.0, 20.0, 30.0)));
    assert_eq!(entity.history.len(), 1);
    assert_eq!(entity.history[0].get(HEALTH), Some(&FieldValue::UInt32(80)));
    assert!(entity.moved_between_creates);

    let stats = session.stats();
    assert_eq!(stats.creates, 2);
    assert_eq!(stats.merges, 1);
    assert_eq!(stats.updates, 1);
}

#[test]
fn destroy_of_unknown_identifier_only_emits_an_event() {
    let id = creature(99);
    let mut builder = PacketBuilder::new(571);
    builder.destroy(&[id]);
    let packet = builder.build(0);

    let session = session();
    let mut sink = RecordingSink::default();
    let report = session.process(&packet, &mut sink).unwrap();

    assert!(report.is_clean());
    assert_eq!(sink.destroyed, vec![(id, DestroyReason::Destroyed)]);
    assert!(session.store().is_empty());
    assert!(sink.malformed.is_empty());
}

#[test]
fn destroy_keeps_store_state() {
    let id = creature(2);
    let mut builder = PacketBuilder::new(571);
    builder
        .create(id, ObjectType::Unit, stationary(0.0, 0.0, 0.0, 0.0), &[])
        .destroy(&[id]);

    let session = session();
    session.process(&builder.build(0), &mut NullSink).unwrap();
    assert!(session.store().contains(id));
}

#[test]
fn applying_the_same_create_twice_is_a_merge() {
    let id = creature(3);
    let mut builder = PacketBuilder::new(571);
    builder
        .create(id, ObjectType::Unit, stationary(1.0, 2.0, 3.0, 0.5), &[(HEALTH, 7)])
        .values(id, &[(HEALTH, 6)]);
    let first = builder.build(0);

    let mut builder = PacketBuilder::new(571);
    builder.create(id, ObjectType::Unit, stationary(4.0, 5.0, 6.0, 1.5), &[(HEALTH, 7)]);
    let second = builder.build(10);

    let session = session();
    session.process(&first, &mut NullSink).unwrap();
    session.process(&second, &mut NullSink).unwrap();
    session.process(&second, &mut NullSink).unwrap();

    let decoded = session.decode(&second).unwrap();
    let UpdateEntry::Create(create) = &decoded.entries[0].entry else {
        panic!("expected a create");
    };

    let entity = session.store().get(id).unwrap();
    assert_eq!(entity.movement, create.movement);
    assert_eq!(entity.object_type, create.object_type);
    assert_eq!(entity.history.len(), 1);
    assert_eq!(session.store().len(), 1);
}

#[test]
fn failed_movement_decode_leaves_store_unchanged() {
    let id = creature(4);
    let mut builder = PacketBuilder::new(571);
    builder.raw(|w| {
        w.write_u8(2).unwrap();
        guid(w, id);
        w.write_u8(ObjectType::Unit.raw()).unwrap();
        // five pause times declared, two present
        gates(w, &[], 5);
        w.write_i32(1).unwrap();
        w.write_i32(2).unwrap();
    });
    let packet = builder.build(0);

    let session = session();
    let mut sink = RecordingSink::default();
    let report = session.process(&packet, &mut sink).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].entry_index, 0);
    assert_eq!(report.failures[0].opcode, common::OPCODE);
    assert!(session.store().is_empty());
    assert!(sink.fields.is_empty());
    assert_eq!(sink.malformed.len(), 1);
    assert_eq!(session.stats().malformed_entries, 1);
}

#[test]
fn failure_keeps_earlier_entries_and_drops_later_ones() {
    let a = creature(5);
    let b = creature(6);
    let mut builder = PacketBuilder::new(571);
    builder
        .create(a, ObjectType::Unit, stationary(0.0, 0.0, 0.0, 0.0), &[])
        .raw(|w| {
            w.write_u8(1).unwrap();
            guid(w, b);
            w.write_u8(ObjectType::Unit.raw()).unwrap();
            gates(w, &[CreateGate::Stationary], 0);
            f32s(w, &[1.0, 2.0]);
        });
    let packet = builder.build(0);

    let session = session();
    let report = session.process(&packet, &mut NullSink).unwrap();
    assert_eq!(report.applied, 1);
    assert_eq!(report.failures[0].entry_index, 1);
    assert_eq!(report.failures[0].error.kind(), ErrorKind::OutOfRange);
    assert!(session.store().contains(a));
    assert!(!session.store().contains(b));
}

#[test]
fn well_formed_packet_is_consumed_exactly() {
    let id = creature(7);
    let mut builder = PacketBuilder::new(571);
    builder
        .removed(1, &[creature(100), creature(101)])
        .create(
            id,
            ObjectType::Unit,
            stationary(1.0, 1.0, 1.0, 1.0),
            &[(ENTRY_ID, 26_125), (HEALTH, 10), (0x3C, 5), (0x3F, 9)],
        )
        .values(id, &[(HEALTH, 9)])
        .destroy(&[id]);
    let packet = builder.build(0);

    let decoded = session().decode(&packet).unwrap();
    assert!(decoded.is_exhaustive());
    assert_eq!(decoded.entries.len(), 3);
    assert_eq!(decoded.entry_bytes, decoded.header.data_size as usize);
    assert_eq!(decoded.header.removed.as_ref().unwrap().destroyed(), &[creature(100)]);
}

#[test]
fn unknown_discriminant_is_skipped_with_a_warning() {
    let id = creature(8);
    let mut builder = PacketBuilder::new(571);
    builder
        .raw(|w| w.write_u8(0x17).unwrap())
        .create(id, ObjectType::Unit, stationary(0.0, 0.0, 0.0, 0.0), &[]);
    let packet = builder.build(0);

    let session = session();
    let mut sink = RecordingSink::default();
    let report = session.process(&packet, &mut sink).unwrap();

    assert!(report.is_clean());
    assert_eq!(sink.warnings.len(), 1);
    assert_eq!(sink.warnings[0].error.kind(), ErrorKind::UnknownDiscriminant);
    assert!(session.store().contains(id));
    assert_eq!(session.stats().unknown_entries, 1);
}

#[test]
fn orphan_values_follow_the_policy() {
    let id = creature(9);
    let mut builder = PacketBuilder::new(571);
    builder.values(id, &[(HEALTH, 1)]);
    let packet = builder.build(0);

    let lenient = session();
    let mut sink = RecordingSink::default();
    let report = lenient.process(&packet, &mut sink).unwrap();
    assert!(report.is_clean());
    assert_eq!(sink.orphans, vec![id]);
    assert_eq!(lenient.stats().orphan_updates, 1);

    let strict = DecoderSession::with_builtin_schema(SessionConfig {
        orphan_policy: OrphanPolicy::Reject,
        ..SessionConfig::default()
    });
    let report = strict.process(&packet, &mut NullSink).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error.kind(), ErrorKind::OrphanUpdate);
    assert!(strict.store().is_empty());
}

#[test]
fn unknown_block_in_values_is_skipped_with_warning() {
    let id = creature(10);
    let mut builder = PacketBuilder::new(571);
    builder
        .create(id, ObjectType::Unit, stationary(0.0, 0.0, 0.0, 0.0), &[])
        .values(id, &[(HEALTH, 3), (0x1F0, 0xFFFF)]);
    let packet = builder.build(0);

    let session = session();
    let mut sink = RecordingSink::default();
    let report = session.process(&packet, &mut sink).unwrap();

    assert!(report.is_clean());
    assert_eq!(sink.warnings.len(), 1);
    assert_eq!(sink.warnings[0].error.kind(), ErrorKind::SchemaMismatch);
    let entity = session.store().get(id).unwrap();
    assert_eq!(entity.history[0].skipped(), &[0x1F0]);
    assert_eq!(entity.history[0].get(HEALTH), Some(&FieldValue::UInt32(3)));
}

#[test]
fn field_events_reach_the_sink_with_entry_paths() {
    let id = creature(11);
    let mut builder = PacketBuilder::new(571);
    builder
        .destroy(&[creature(50)])
        .create(id, ObjectType::Unit, stationary(0.0, 0.0, 0.0, 0.0), &[(HEALTH, 1)]);
    let packet = builder.build(0);

    let session = session();
    let mut sink = RecordingSink::default();
    session.process(&packet, &mut sink).unwrap();

    let health = sink
        .fields
        .iter()
        .find(|e| e.name == "UNIT_FIELD_HEALTH")
        .unwrap();
    assert_eq!(health.path, vec![1]);
    assert!(sink.fields.iter().any(|e| e.name == "Stationary Position"));
    assert_eq!(sink.entities.len(), 1);
    assert_eq!(sink.spawns, vec![(ObjectType::Unit, 26_125)]);
}
