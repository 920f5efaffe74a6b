//! Update-field definitions.
//!
//! The value section of an update entry is a sequence of 32-bit blocks. A
//! field owns one or more consecutive blocks starting at its index; its
//! [`ValueShape`] says how the blocks are interpreted.

/// How a field's blocks are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueShape {
    /// One unsigned 32-bit block.
    UInt32,
    /// One signed 32-bit block.
    Int32,
    /// One IEEE-754 single.
    Float,
    /// One block read as four independent bytes.
    Bytes,
    /// One block read as two 16-bit halves.
    Shorts,
    /// Two blocks, low word first.
    UInt64,
    /// Four blocks holding a 128-bit identifier, low half first.
    Guid,
    /// A run of singles.
    Floats { count: u16 },
    /// A run of unsigned blocks.
    UInts { count: u16 },
}

impl ValueShape {
    /// Number of 32-bit blocks the shape occupies.
    #[must_use]
    pub const fn blocks(self) -> u16 {
        match self {
            Self::UInt32 | Self::Int32 | Self::Float | Self::Bytes | Self::Shorts => 1,
            Self::UInt64 => 2,
            Self::Guid => 4,
            Self::Floats { count } | Self::UInts { count } => count,
        }
    }
}

/// A named field in the value section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    /// Absolute index of the field's first block.
    pub index: u16,
    pub name: String,
    pub shape: ValueShape,
}

impl FieldDef {
    /// Creates a field definition.
    #[must_use]
    pub fn new(index: u16, name: impl Into<String>, shape: ValueShape) -> Self {
        Self {
            index,
            name: name.into(),
            shape,
        }
    }

    /// One past the last block the field covers.
    #[must_use]
    pub fn end(&self) -> u32 {
        u32::from(self.index) + u32::from(self.shape.blocks())
    }

    /// Returns `true` if `index` falls inside the field.
    #[must_use]
    pub fn covers(&self, index: u16) -> bool {
        index >= self.index && u32::from(index) < self.end()
    }
}

/// A named dynamic (variable-length) field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicFieldDef {
    pub index: u16,
    pub name: String,
}

impl DynamicFieldDef {
    #[must_use]
    pub fn new(index: u16, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}
