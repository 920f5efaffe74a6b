//! Named field events produced while decoding.
//!
//! Every value the decoders read can be recorded as a `(name, value, path)`
//! event. The path holds the positional context: the entry index first, then
//! one index per enclosing array.

use std::borrow::Cow;
use std::fmt;

use wire::{Guid, PackedTime, Quaternion, Vector2, Vector3, Vector4};

use crate::values::FieldValue;

/// A decoded value, as seen by a trace consumer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraceValue {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f32),
    Guid(Guid),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Quaternion(Quaternion),
    Time(PackedTime),
    Text(String),
    Field(FieldValue),
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Guid(v) => write!(f, "{v}"),
            Self::Vector2(v) => write!(f, "X: {} Y: {}", v.x, v.y),
            Self::Vector3(v) => write!(f, "X: {} Y: {} Z: {}", v.x, v.y, v.z),
            Self::Vector4(v) => write!(f, "X: {} Y: {} Z: {} O: {}", v.x, v.y, v.z, v.o),
            Self::Quaternion(v) => write!(f, "X: {} Y: {} Z: {} W: {}", v.x, v.y, v.z, v.w),
            Self::Time(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Field(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! trace_value_from {
    ($($ty:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for TraceValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value $(as $cast)?)
                }
            }
        )*
    };
}

trace_value_from! {
    bool => Bool,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    f32 => Float,
    Guid => Guid,
    Vector2 => Vector2,
    Vector3 => Vector3,
    Vector4 => Vector4,
    Quaternion => Quaternion,
    PackedTime => Time,
    String => Text,
    FieldValue => Field,
}

/// One recorded value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldEvent {
    pub name: Cow<'static, str>,
    pub value: TraceValue,
    pub path: Vec<usize>,
}

impl fmt::Display for FieldEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.path {
            write!(f, "[{index}] ")?;
        }
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Collector for field events with a stack of array indices.
///
/// A disabled trace still tracks the path but records nothing.
#[derive(Debug, Clone, Default)]
pub struct FieldTrace {
    enabled: bool,
    path: Vec<usize>,
    events: Vec<FieldEvent>,
}

impl FieldTrace {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            path: Vec::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records a value under the current path.
    pub fn record(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<TraceValue>) {
        if self.enabled {
            self.events.push(FieldEvent {
                name: name.into(),
                value: value.into(),
                path: self.path.clone(),
            });
        }
    }

    pub fn push_index(&mut self, index: usize) {
        self.path.push(index);
    }

    pub fn pop_index(&mut self) {
        self.path.pop();
    }

    #[must_use]
    pub fn events(&self) -> &[FieldEvent] {
        &self.events
    }

    /// Takes the recorded events, leaving the trace empty.
    pub fn take(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.events)
    }
}
