//! Wire-level structures for captured update-object packets.
//!
//! This crate handles the pieces of the binary format that every record shares:
//! masked entity identifiers, packed vectors/quaternions/times, the
//! update-object header and the per-entry discriminant. It does not know about
//! movement records or update fields.
//!
//! # Design Principles
//!
//! - **Exact consumption** - An identifier consumes exactly the bytes its
//!   presence mask announces; `decode(encode(x)) == x`.
//! - **Bounded decoding** - All counts are validated against [`Limits`] and the
//!   remaining buffer before iteration.
//! - **Table-driven framing** - Identifier slot order and framing come from a
//!   [`GuidCodec`] chosen per protocol version.

mod error;
mod guid;
mod limits;
mod packet;
mod primitives;

pub use error::{LimitKind, WireError, WireResult};
pub use guid::{Guid, GuidCodec, GuidFormat, HighType, SlotOrder};
pub use limits::Limits;
pub use packet::{decode_update_header, RemovedObjects, UpdateObjectHeader, UpdateType};
pub use primitives::{PackedTime, Quaternion, Vector2, Vector3, Vector4};
