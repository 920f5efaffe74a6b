//! Update-object decoding and entity state for snoop.
//!
//! This is the main crate: it ties together bitstream, wire and schema to turn
//! captured update-object packets into typed entries and to reconcile those
//! entries into an entity store.
//!
//! # Features
//!
//! - Conditional movement/transform records driven by per-version layouts
//! - Schema-driven update-field sets, including dynamic fields
//! - Create / Values / Destroy reconciliation with merge on re-create
//! - Named field traces delivered to a [`DecodeSink`]
//!
//! # Design Principles
//!
//! - **Decode, then apply** - Decoding is pure; nothing reaches the store
//!   before an entry has decoded completely.
//! - **Bounded decoding** - Every wire count is checked against [`Limits`]
//!   and the remaining buffer before allocation.
//! - **No globals** - A [`DecoderSession`] owns the store, the accessory table
//!   and the world context.

mod area_trigger;
mod error;
mod layout;
mod message;
mod movement;
mod reader;
mod scene;
mod session;
mod sink;
mod store;
mod trace;
mod types;
mod update;
mod values;

pub use area_trigger::{AreaTrigger, BoxShape, Cylinder, Polygon, Sphere, TriggerSpline};
pub use error::{CodecError, CodecResult, EntryFailure, ErrorKind};
pub use layout::{CreateFlags, CreateGate, ProtocolLayout, ProtocolVersion, V6_0_2};
pub use message::CorpseTransportQuery;
pub use movement::{
    AnimKit, FallData, FallDirection, FilterKey, GameObjectCreate, MovementForce, MovementRecord,
    MovementStatus, MovementTransport, MovementUpdate, Speeds, SplineData, SplineFace,
    SplineFilter, SplineMove, StatusTransport, VehicleCreate,
};
pub use scene::{
    PetAbility, PetAura, PetBattleEnvironment, PetBattleFullUpdate, PetBattlePet, PetBattlePlayer,
    PetState, SceneObjectCreate,
};
pub use session::{
    ApplyReport, DecoderSession, OrphanPolicy, SessionConfig, SessionStats, VehicleAccessoryTable,
};
pub use sink::{DecodeSink, NullSink, RecordingSink};
pub use store::{Entity, EntityStore, MergeOutcome, WorldContext};
pub use trace::{FieldEvent, FieldTrace, TraceValue};
pub use types::{object_type_of, CaptureTime, DestroyReason, RawPacket, VehicleSeatAccessory};
pub use update::{
    decode_update_object, CreateObject, DecodedEntry, UpdateDecoder, UpdateEntry, UpdateObject,
};
pub use values::{DynamicField, FieldUpdateSet, FieldValue, UpdateMode};
pub use wire::Limits;
