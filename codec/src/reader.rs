//! Traced, bounded reads shared by the entry decoders.

use std::borrow::Cow;

use bitstream::BitReader;
use wire::{Guid, GuidCodec, Limits, PackedTime, Quaternion, Vector2, Vector3, Vector4};

use crate::error::CodecResult;
use crate::trace::{FieldTrace, TraceValue};

/// A cursor paired with the trace and limits of the entry being decoded.
///
/// Every named read records a trace event. Counts go through [`Limits`]
/// before anything is allocated.
pub(crate) struct EntryReader<'r, 'a> {
    pub(crate) bits: &'r mut BitReader<'a>,
    pub(crate) trace: &'r mut FieldTrace,
    pub(crate) limits: &'r Limits,
    pub(crate) guids: GuidCodec,
}

impl<'r, 'a> EntryReader<'r, 'a> {
    pub(crate) fn new(
        bits: &'r mut BitReader<'a>,
        trace: &'r mut FieldTrace,
        limits: &'r Limits,
        guids: GuidCodec,
    ) -> Self {
        Self {
            bits,
            trace,
            limits,
            guids,
        }
    }

    fn traced<T: Copy + Into<TraceValue>>(&mut self, name: &'static str, value: T) -> T {
        self.trace.record(name, value);
        value
    }

    /// Runs `f` with `index` pushed onto the trace path.
    pub(crate) fn indexed<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> CodecResult<T>,
    ) -> CodecResult<T> {
        self.trace.push_index(index);
        let result = f(self);
        self.trace.pop_index();
        result
    }

    /// Records a value under a name only known at run time.
    pub(crate) fn record(&mut self, name: &str, value: impl Into<TraceValue>) {
        if self.trace.is_enabled() {
            self.trace.record(Cow::Owned(name.to_owned()), value);
        }
    }

    pub(crate) fn align(&mut self) {
        self.bits.align_to_byte();
    }

    pub(crate) fn bit(&mut self, name: &'static str) -> CodecResult<bool> {
        let value = self.bits.read_bit()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn bits(&mut self, name: &'static str, count: u8) -> CodecResult<u32> {
        let value = self.bits.read_bits(count)?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn u8(&mut self, name: &'static str) -> CodecResult<u8> {
        let value = self.bits.read_u8()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn i8(&mut self, name: &'static str) -> CodecResult<i8> {
        let value = self.bits.read_i8()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn u16(&mut self, name: &'static str) -> CodecResult<u16> {
        let value = self.bits.read_u16()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn i16(&mut self, name: &'static str) -> CodecResult<i16> {
        let value = self.bits.read_i16()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn u32(&mut self, name: &'static str) -> CodecResult<u32> {
        let value = self.bits.read_u32()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn i32(&mut self, name: &'static str) -> CodecResult<i32> {
        let value = self.bits.read_i32()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn f32(&mut self, name: &'static str) -> CodecResult<f32> {
        let value = self.bits.read_f32()?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn guid(&mut self, name: &'static str) -> CodecResult<Guid> {
        let value = self.guids.decode(self.bits)?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn vector2(&mut self, name: &'static str) -> CodecResult<Vector2> {
        let value = Vector2::read(self.bits)?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn vector3(&mut self, name: &'static str) -> CodecResult<Vector3> {
        let value = Vector3::read(self.bits)?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn vector4(&mut self, name: &'static str) -> CodecResult<Vector4> {
        let value = Vector4::read(self.bits)?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn quaternion(&mut self, name: &'static str) -> CodecResult<Quaternion> {
        let value = Quaternion::read_packed(self.bits)?;
        Ok(self.traced(name, value))
    }

    pub(crate) fn packed_time(&mut self, name: &'static str) -> CodecResult<PackedTime> {
        let value = PackedTime::read(self.bits)?;
        Ok(self.traced(name, value))
    }

    /// Validates a count read from the wire.
    ///
    /// `min_elem_bytes` is the smallest encoding of one element.
    pub(crate) fn check_count(&self, count: u32, min_elem_bytes: usize) -> CodecResult<usize> {
        Ok(self
            .limits
            .check_array(count, min_elem_bytes, self.bits.bytes_remaining())?)
    }

    /// Validates a signed count. A negative count reads no elements.
    pub(crate) fn check_signed_count(
        &self,
        count: i32,
        min_elem_bytes: usize,
    ) -> CodecResult<usize> {
        self.check_count(u32::try_from(count).unwrap_or(0), min_elem_bytes)
    }

    /// Reads `count` elements, each under its own path index.
    pub(crate) fn array<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> CodecResult<T>,
    ) -> CodecResult<Vec<T>> {
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            items.push(self.indexed(i, &mut read)?);
        }
        Ok(items)
    }

    /// Reads a string whose length is a 7-bit group of its own.
    pub(crate) fn short_string(&mut self, name: &'static str) -> CodecResult<String> {
        self.align();
        let len = self.bits.read_bits(7)? as usize;
        self.align();
        let len = self.limits.check_string(len, self.bits.bytes_remaining())?;
        let value = self.bits.read_string(len)?;
        self.trace.record(name, value.clone());
        Ok(value)
    }
}
