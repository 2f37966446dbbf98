//! Dual-region evaluation stack.
//!
//! Scalars (`int`, `float`, `bool`) are written as little-endian bytes into
//! a fixed-size arena, so evaluating arithmetic never allocates. Strings and
//! host objects live in a parallel object table; the arena holds a 4-byte
//! slot with the value's table index.
//!
//! Both regions grow and shrink together in strict LIFO order. Popping an
//! object checks that the index stored in the arena is the top of the table,
//! which catches callers that pop with the wrong [`ValueInfo`](crate::ValueInfo).

use cdl_ir::Value;

use crate::errors::CapacityError;

/// Largest arena the stack will allocate. Offsets are `i32`.
const MAX_ARENA_BYTES: usize = 0x7fff_ffff;

/// Sizing of an [`EvaluationStack`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StackConfig {
    pub arena_bytes: usize,
    pub object_slots: usize,
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfig {
            arena_bytes: 4096,
            object_slots: 128,
        }
    }
}

impl StackConfig {
    #[must_use]
    pub fn with_arena_bytes(mut self, bytes: usize) -> Self {
        self.arena_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_object_slots(mut self, slots: usize) -> Self {
        self.object_slots = slots;
        self
    }
}

/// Fixed-width value that can live in the arena.
pub trait Scalar: Copy {
    const SIZE: usize;

    /// Writes exactly `SIZE` bytes into `out`.
    fn write(self, out: &mut [u8]);

    /// Reads from exactly `SIZE` bytes.
    fn read(bytes: &[u8]) -> Self;
}

impl Scalar for i32 {
    const SIZE: usize = 4;

    fn write(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> Self {
        let mut buf = [0; 4];
        buf.copy_from_slice(bytes);
        i32::from_le_bytes(buf)
    }
}

impl Scalar for u32 {
    const SIZE: usize = 4;

    fn write(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> Self {
        let mut buf = [0; 4];
        buf.copy_from_slice(bytes);
        u32::from_le_bytes(buf)
    }
}

impl Scalar for f32 {
    const SIZE: usize = 4;

    fn write(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read(bytes: &[u8]) -> Self {
        let mut buf = [0; 4];
        buf.copy_from_slice(bytes);
        f32::from_le_bytes(buf)
    }
}

impl Scalar for bool {
    const SIZE: usize = 1;

    fn write(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }

    fn read(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Saved stack height, restored with [`EvaluationStack::reset_to`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StackMark {
    top: usize,
    objects: usize,
}

pub struct EvaluationStack {
    arena: Box<[u8]>,
    top: usize,
    objects: Vec<Value>,
    object_capacity: usize,
}

impl EvaluationStack {
    pub fn new(config: StackConfig) -> Self {
        let arena_bytes = config.arena_bytes.min(MAX_ARENA_BYTES);
        EvaluationStack {
            arena: vec![0; arena_bytes].into_boxed_slice(),
            top: 0,
            objects: Vec::with_capacity(config.object_slots.min(64)),
            object_capacity: config.object_slots,
        }
    }

    /// Arena size in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    pub fn object_capacity(&self) -> usize {
        self.object_capacity
    }

    /// Bytes currently in use.
    pub fn len(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Pushes a scalar and returns its offset.
    pub fn push_scalar<T: Scalar>(&mut self, value: T) -> Result<i32, CapacityError> {
        let start = self.top;
        let end = self.reserve(T::SIZE)?;
        value.write(&mut self.arena[start..end]);
        self.top = end;
        Ok(to_offset(start))
    }

    pub fn pop_scalar<T: Scalar>(&mut self) -> Result<T, CapacityError> {
        let start = self.top.checked_sub(T::SIZE).ok_or(CapacityError::Underflow {
            requested: T::SIZE,
            available: self.top,
        })?;
        let value = T::read(&self.arena[start..self.top]);
        self.top = start;
        Ok(value)
    }

    /// Reads a scalar at `offset` without popping it.
    pub fn get_scalar<T: Scalar>(&self, offset: i32) -> Result<T, CapacityError> {
        let start = self.live_start(offset, T::SIZE)?;
        Ok(T::read(&self.arena[start..start + T::SIZE]))
    }

    /// Pushes a string or object value and returns the offset of its slot.
    pub fn push_object(&mut self, value: Value) -> Result<i32, CapacityError> {
        if self.objects.len() >= self.object_capacity {
            return Err(CapacityError::ObjectTableOverflow {
                capacity: self.object_capacity,
            });
        }
        let index = u32::try_from(self.objects.len()).map_err(|_| {
            CapacityError::ObjectTableOverflow {
                capacity: self.object_capacity,
            }
        })?;
        let offset = self.push_scalar(index)?;
        self.objects.push(value);
        Ok(offset)
    }

    pub fn pop_object(&mut self) -> Result<Value, CapacityError> {
        let start = self.top.checked_sub(u32::SIZE).ok_or(CapacityError::Underflow {
            requested: u32::SIZE,
            available: self.top,
        })?;
        let stored = u32::read(&self.arena[start..self.top]);
        let mismatch = CapacityError::ObjectIndexMismatch {
            stored,
            objects: self.objects.len(),
        };
        if self.objects.len().checked_sub(1) != Some(stored as usize) {
            return Err(mismatch);
        }
        let value = self.objects.pop().ok_or(mismatch)?;
        self.top = start;
        Ok(value)
    }

    /// Borrows the object whose slot is at `offset`.
    pub fn get_object(&self, offset: i32) -> Result<&Value, CapacityError> {
        let index: u32 = self.get_scalar(offset)?;
        self.objects
            .get(index as usize)
            .ok_or(CapacityError::InvalidOffset {
                offset,
                len: self.top,
            })
    }

    pub fn clear(&mut self) {
        self.top = 0;
        self.objects.clear();
    }

    pub fn mark(&self) -> StackMark {
        StackMark {
            top: self.top,
            objects: self.objects.len(),
        }
    }

    /// Drops everything pushed since `mark`. Marks above the current top are
    /// ignored.
    pub fn reset_to(&mut self, mark: StackMark) {
        if mark.top <= self.top {
            self.top = mark.top;
            self.objects.truncate(mark.objects);
        }
    }

    fn reserve(&self, size: usize) -> Result<usize, CapacityError> {
        let overflow = CapacityError::ArenaOverflow {
            requested: size,
            available: self.arena.len() - self.top,
            capacity: self.arena.len(),
        };
        match self.top.checked_add(size) {
            Some(end) if end <= self.arena.len() => Ok(end),
            _ => Err(overflow),
        }
    }

    fn live_start(&self, offset: i32, size: usize) -> Result<usize, CapacityError> {
        let invalid = CapacityError::InvalidOffset {
            offset,
            len: self.top,
        };
        let start = usize::try_from(offset).map_err(|_| invalid.clone())?;
        match start.checked_add(size) {
            Some(end) if end <= self.top => Ok(start),
            _ => Err(invalid),
        }
    }
}

impl Default for EvaluationStack {
    fn default() -> Self {
        EvaluationStack::new(StackConfig::default())
    }
}

impl std::fmt::Debug for EvaluationStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationStack")
            .field("used", &self.top)
            .field("capacity", &self.arena.len())
            .field("objects", &self.objects.len())
            .finish_non_exhaustive()
    }
}

fn to_offset(pos: usize) -> i32 {
    // The arena never exceeds MAX_ARENA_BYTES, so this cannot saturate.
    i32::try_from(pos).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests;
