//! Deterministic schema hashing.

use blake3::Hasher;

use crate::{SchemaTable, ValueShape};

/// Computes a fingerprint of a schema table.
///
/// Layouts are hashed by object type and fields by index, so two tables
/// describing the same layout in a different declaration order hash equally.
/// The label is not part of the fingerprint.
#[must_use]
pub fn schema_hash(table: &SchemaTable) -> u64 {
    let mut hasher = Hasher::new();

    let mut layouts: Vec<_> = table.layouts.iter().collect();
    layouts.sort_by_key(|l| l.object_type);
    write_u32(&mut hasher, layouts.len() as u32);

    for layout in layouts {
        write_u8(&mut hasher, layout.object_type.raw());
        match layout.base {
            Some(base) => {
                write_u8(&mut hasher, 1);
                write_u8(&mut hasher, base.raw());
            }
            None => write_u8(&mut hasher, 0),
        }

        let mut fields: Vec<_> = layout.fields.iter().collect();
        fields.sort_by_key(|f| f.index);
        write_u32(&mut hasher, fields.len() as u32);
        for field in fields {
            write_u16(&mut hasher, field.index);
            write_str(&mut hasher, &field.name);
            write_shape(&mut hasher, field.shape);
        }

        let mut dynamic: Vec<_> = layout.dynamic.iter().collect();
        dynamic.sort_by_key(|f| f.index);
        write_u32(&mut hasher, dynamic.len() as u32);
        for field in dynamic {
            write_u16(&mut hasher, field.index);
            write_str(&mut hasher, &field.name);
        }
    }

    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

fn write_shape(hasher: &mut Hasher, shape: ValueShape) {
    match shape {
        ValueShape::UInt32 => write_u8(hasher, 0),
        ValueShape::Int32 => write_u8(hasher, 1),
        ValueShape::Float => write_u8(hasher, 2),
        ValueShape::Bytes => write_u8(hasher, 3),
        ValueShape::Shorts => write_u8(hasher, 4),
        ValueShape::UInt64 => write_u8(hasher, 5),
        ValueShape::Guid => write_u8(hasher, 6),
        ValueShape::Floats { count } => {
            write_u8(hasher, 7);
            write_u16(hasher, count);
        }
        ValueShape::UInts { count } => {
            write_u8(hasher, 8);
            write_u16(hasher, count);
        }
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
