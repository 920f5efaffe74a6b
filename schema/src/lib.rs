//! Versioned update-field schema tables.
//!
//! The value section of an update entry is a bitmask over 32-bit blocks. This
//! crate describes what those blocks mean:
//! - Object types and their base chain (a player is a unit is an object)
//! - Field definitions: block index, name and [`ValueShape`]
//! - Validation of a table (overlaps, missing bases, cycles)
//! - Deterministic schema hashing
//!
//! # Design Principles
//!
//! - **Runtime tables** - Tables are plain data, built in code or loaded from
//!   JSON with the `serde` feature.
//! - **One lookup seam** - Decoders depend on [`FieldSchema`] only.
//! - **Deterministic hashing** - The hash is stable given the same layout.

mod builtin;
mod error;
mod field;
mod hash;
mod object;
mod schema;

pub use builtin::{v6_0_2, OBJECT_END};
pub use error::{SchemaError, SchemaResult};
pub use field::{DynamicFieldDef, FieldDef, ValueShape};
pub use hash::schema_hash;
pub use object::ObjectType;
pub use schema::{BaseChain, FieldSchema, SchemaBuilder, SchemaTable, TypeLayout};
