//! Packed geometric and time primitives shared by several records.

use bitstream::{BitReader, BitResult};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }
}

/// A position plus facing (`o`, radians).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub o: f32,
}

impl Vector4 {
    pub fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
            o: reader.read_f32()?,
        })
    }

    #[must_use]
    pub const fn position(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// A rotation unpacked from its 64-bit wire form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    const X_SCALE: f32 = 1.0 / 2_097_152.0;
    const YZ_SCALE: f32 = 1.0 / 1_048_576.0;

    /// Unpacks `x` (22 bits), `y` and `z` (21 bits each); `w` is derived.
    #[must_use]
    pub fn from_packed(packed: i64) -> Self {
        let x = (packed >> 42) as f32 * Self::X_SCALE;
        let y = ((packed << 22) >> 43) as f32 * Self::YZ_SCALE;
        let z = ((packed << 43) >> 43) as f32 * Self::YZ_SCALE;
        let norm = x * x + y * y + z * z;
        let w = if (norm - 1.0).abs() >= Self::YZ_SCALE {
            (1.0 - norm).max(0.0).sqrt()
        } else {
            0.0
        };
        Self { x, y, z, w }
    }

    pub fn read_packed(reader: &mut BitReader<'_>) -> BitResult<Self> {
        Ok(Self::from_packed(reader.read_i64()?))
    }
}

/// A calendar time packed into 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedTime(u32);

impl PackedTime {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn read(reader: &mut BitReader<'_>) -> BitResult<Self> {
        Ok(Self(reader.read_u32()?))
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn minute(self) -> u32 {
        self.0 & 0x3F
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        (self.0 >> 6) & 0x1F
    }

    #[must_use]
    pub const fn weekday(self) -> u32 {
        (self.0 >> 11) & 0x7
    }

    /// Day of month, 1-based.
    #[must_use]
    pub const fn day(self) -> u32 {
        ((self.0 >> 14) & 0x3F) + 1
    }

    /// Month, 1-based.
    #[must_use]
    pub const fn month(self) -> u32 {
        ((self.0 >> 20) & 0xF) + 1
    }

    #[must_use]
    pub const fn year(self) -> u32 {
        ((self.0 >> 24) & 0x1F) + 2000
    }
}

impl std::fmt::Display for PackedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute()
        )
    }
}
