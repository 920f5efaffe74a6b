//! Schema-driven decoding of the update-field section.
//!
//! The section opens with a block mask: a count byte and that many 32-bit
//! words, bit `i` of the mask living in word `i / 32` at bit `i % 32`. Every
//! set bit announces one 32-bit block; the blocks follow in ascending order.
//! The schema groups blocks into typed fields.
//!
//! The dynamic section follows the same pattern with a second mask over
//! dynamic fields, each set field carrying its own nested mask.

use std::collections::BTreeMap;
use std::fmt;

use schema::{FieldDef, FieldSchema, ObjectType, ValueShape};
use tracing::warn;
use wire::Guid;

use crate::error::{CodecError, CodecResult};
use crate::reader::EntryReader;

/// Set in a dynamic field's flag byte when a 16-bit value follows it.
const DYNAMIC_EXTRA_FLAG: u8 = 0x80;

/// How unknown blocks are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// A partial update; unknown blocks are skipped with a warning.
    Values,
    /// The full create state; unknown blocks are an error.
    Create,
}

/// A typed update-field value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    UInt32(u32),
    Int32(i32),
    Float(f32),
    Bytes([u8; 4]),
    Shorts([u16; 2]),
    UInt64(u64),
    Guid(Guid),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bytes([a, b, c, d]) => write!(f, "{a}/{b}/{c}/{d}"),
            Self::Shorts([lo, hi]) => write!(f, "{lo}/{hi}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Guid(v) => write!(f, "{v}"),
        }
    }
}

/// One dynamic field of an update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicField {
    /// The 16-bit value announced by the `0x80` flag bit.
    pub extra: Option<u16>,
    /// `(element, value)` pairs in element order.
    pub values: Vec<(u16, u32)>,
}

/// Field updates keyed by block index.
///
/// Array fields are stored one entry per element, keyed by the element's
/// block. Later inserts for the same key overwrite earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldUpdateSet {
    values: BTreeMap<u16, FieldValue>,
    dynamic: BTreeMap<u16, DynamicField>,
    skipped: Vec<u16>,
}

impl FieldUpdateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert(&mut self, index: u16, value: FieldValue) -> Option<FieldValue> {
        self.values.insert(index, value)
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&FieldValue> {
        self.values.get(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.dynamic.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &FieldValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Values of one dynamic field as `(element, value)` pairs.
    #[must_use]
    pub fn dynamic(&self, index: u16) -> Option<&[(u16, u32)]> {
        self.dynamic.get(&index).map(|field| field.values.as_slice())
    }

    /// One dynamic field, including its extra value.
    #[must_use]
    pub fn dynamic_field(&self, index: u16) -> Option<&DynamicField> {
        self.dynamic.get(&index)
    }

    pub fn dynamic_fields(&self) -> impl Iterator<Item = (u16, &DynamicField)> {
        self.dynamic.iter().map(|(k, v)| (*k, v))
    }

    /// Blocks that had no field definition and were skipped.
    #[must_use]
    pub fn skipped(&self) -> &[u16] {
        &self.skipped
    }

    /// Overlays `other` on `self`; values from `other` win key by key.
    pub fn merge_from(&mut self, other: &Self) {
        self.values.extend(other.values.iter().map(|(k, v)| (*k, *v)));
        self.dynamic
            .extend(other.dynamic.iter().map(|(k, v)| (*k, v.clone())));
        for block in &other.skipped {
            if !self.skipped.contains(block) {
                self.skipped.push(*block);
            }
        }
    }
}

impl FromIterator<(u16, FieldValue)> for FieldUpdateSet {
    fn from_iter<I: IntoIterator<Item = (u16, FieldValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

fn mask_bit(mask: &[u32], bit: usize) -> bool {
    mask.get(bit / 32)
        .is_some_and(|word| word & (1 << (bit % 32)) != 0)
}

fn read_mask(r: &mut EntryReader<'_, '_>, count_name: &'static str) -> CodecResult<Vec<u32>> {
    let count = r.u8(count_name)?;
    let count = r.check_count(u32::from(count), 4)?;
    let mut mask = Vec::with_capacity(count);
    for _ in 0..count {
        mask.push(r.bits.read_u32()?);
    }
    Ok(mask)
}

/// Decodes the value and dynamic sections of an entry.
pub(crate) fn decode_values(
    r: &mut EntryReader<'_, '_>,
    schema: &dyn FieldSchema,
    object_type: ObjectType,
    mode: UpdateMode,
) -> CodecResult<FieldUpdateSet> {
    let mut set = FieldUpdateSet::new();

    let mask = read_mask(r, "ValuesMaskCount")?;
    let total = mask.len() * 32;
    let mut block = 0usize;
    while block < total {
        if !mask_bit(&mask, block) {
            block += 1;
            continue;
        }
        // at most 255 words, so the index fits
        let index = block as u16;
        match schema.field(object_type, index) {
            Some(field) => {
                decode_field(r, field, &mask, &mut set)?;
                block = field.end() as usize;
            }
            None if mode == UpdateMode::Values => {
                let raw = r.bits.read_u32()?;
                r.record(&format!("Block {index}"), raw);
                warn!(%object_type, block = index, raw, "no field definition, block skipped");
                set.skipped.push(index);
                block += 1;
            }
            None => {
                return Err(CodecError::SchemaMismatch {
                    object_type,
                    block: index,
                })
            }
        }
    }

    decode_dynamic(r, schema, object_type, &mut set)?;
    Ok(set)
}

fn decode_field(
    r: &mut EntryReader<'_, '_>,
    field: &FieldDef,
    mask: &[u32],
    set: &mut FieldUpdateSet,
) -> CodecResult<()> {
    let start = usize::from(field.index);
    let end = field.end() as usize;

    let value = match field.shape {
        ValueShape::UInt32 => FieldValue::UInt32(r.bits.read_u32()?),
        ValueShape::Int32 => FieldValue::Int32(r.bits.read_i32()?),
        ValueShape::Float => FieldValue::Float(r.bits.read_f32()?),
        ValueShape::Bytes => FieldValue::Bytes(r.bits.read_u32()?.to_le_bytes()),
        ValueShape::Shorts => {
            let raw = r.bits.read_u32()?;
            FieldValue::Shorts([raw as u16, (raw >> 16) as u16])
        }
        ValueShape::UInt64 | ValueShape::Guid => {
            // absent blocks of a wide field are zero
            let mut words = [0u32; 4];
            for (slot, block) in (start..end).enumerate() {
                if mask_bit(mask, block) {
                    words[slot] = r.bits.read_u32()?;
                }
            }
            let low = u64::from(words[0]) | (u64::from(words[1]) << 32);
            if field.shape == ValueShape::UInt64 {
                FieldValue::UInt64(low)
            } else {
                let high = u64::from(words[2]) | (u64::from(words[3]) << 32);
                FieldValue::Guid(Guid::new(low, high))
            }
        }
        ValueShape::Floats { .. } | ValueShape::UInts { .. } => {
            let floats = matches!(field.shape, ValueShape::Floats { .. });
            for block in (start..end).filter(|b| mask_bit(mask, *b)) {
                let value = if floats {
                    FieldValue::Float(r.bits.read_f32()?)
                } else {
                    FieldValue::UInt32(r.bits.read_u32()?)
                };
                r.indexed(block - start, |r| {
                    r.record(&field.name, value);
                    Ok(())
                })?;
                set.insert(block as u16, value);
            }
            return Ok(());
        }
    };

    r.record(&field.name, value);
    set.insert(field.index, value);
    Ok(())
}

fn decode_dynamic(
    r: &mut EntryReader<'_, '_>,
    schema: &dyn FieldSchema,
    object_type: ObjectType,
    set: &mut FieldUpdateSet,
) -> CodecResult<()> {
    let mask = read_mask(r, "DynamicMaskCount")?;
    for field in (0..mask.len() * 32).filter(|b| mask_bit(&mask, *b)) {
        let index = field as u16;
        let name = schema
            .dynamic_field(object_type, index)
            .map_or_else(|| format!("Dynamic {index}"), |def| def.name.clone());

        let flag = r.u8("DynamicFlag")?;
        let extra = if flag & DYNAMIC_EXTRA_FLAG != 0 {
            Some(r.u16("DynamicExtra")?)
        } else {
            None
        };
        let words = r.check_count(u32::from(flag & !DYNAMIC_EXTRA_FLAG), 4)?;
        let mut inner = Vec::with_capacity(words);
        for _ in 0..words {
            inner.push(r.bits.read_u32()?);
        }

        let mut values = Vec::new();
        for element in (0..words * 32).filter(|b| mask_bit(&inner, *b)) {
            let value = r.bits.read_u32()?;
            r.indexed(element, |r| {
                r.record(&name, value);
                Ok(())
            })?;
            values.push((element as u16, value));
        }
        set.dynamic.insert(index, DynamicField { extra, values });
    }
    Ok(())
}
