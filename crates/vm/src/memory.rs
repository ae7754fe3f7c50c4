use crate::{
    constants::{MEMORY_EXPANSION_QUOTIENT, WORD_SIZE_IN_BYTES_USIZE},
    errors::{ExceptionalHalt, InternalError, VMError},
    gas_schedule::GasSchedule,
};
use ExceptionalHalt::OutOfGas;
use etna_common::{
    utils::{u256_from_big_endian_const, u256_to_big_endian},
    U256,
};

/// Byte-addressable, lazily zero-extending frame memory.
///
/// The buffer length is the high-water mark, always rounded up to a
/// 32-byte multiple, and only ever grows. Expansion is gas-gated: every
/// access charges `expansion_cost` before touching the buffer, so the
/// quadratic cost term bounds the largest allocation that can ever happen.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    buffer: Vec<u8>,
}

impl Memory {
    pub fn new() -> Self {
        Memory { buffer: Vec::new() }
    }

    /// Active memory size in bytes (a multiple of 32).
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Grows the high-water mark to cover `new_size` bytes. Shrinking never
    /// happens; a zero `new_size` is a no-op.
    pub fn resize(&mut self, new_size: usize) {
        if new_size <= self.buffer.len() {
            return;
        }
        let aligned = new_size.next_multiple_of(WORD_SIZE_IN_BYTES_USIZE);
        self.buffer.resize(aligned, 0);
    }

    /// Reads `size` bytes at `offset`, extending the high-water mark.
    /// A zero-size read returns empty without growing memory.
    pub fn load_range(&mut self, offset: usize, size: usize) -> Result<Vec<u8>, VMError> {
        if size == 0 {
            return Ok(Vec::new());
        }
        let end = offset.checked_add(size).ok_or(InternalError::Overflow)?;
        self.resize(end);
        self.buffer
            .get(offset..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| InternalError::Slicing.into())
    }

    pub fn load_word(&mut self, offset: usize) -> Result<U256, VMError> {
        let end = offset
            .checked_add(WORD_SIZE_IN_BYTES_USIZE)
            .ok_or(InternalError::Overflow)?;
        self.resize(end);
        let bytes: [u8; WORD_SIZE_IN_BYTES_USIZE] = self
            .buffer
            .get(offset..end)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(InternalError::Slicing)?;
        Ok(u256_from_big_endian_const(bytes))
    }

    /// Writes `data` at `offset`, extending the high-water mark. Writing
    /// nothing grows nothing.
    pub fn store_data(&mut self, offset: usize, data: &[u8]) -> Result<(), VMError> {
        if data.is_empty() {
            return Ok(());
        }
        let end = offset
            .checked_add(data.len())
            .ok_or(InternalError::Overflow)?;
        self.resize(end);
        self.buffer
            .get_mut(offset..end)
            .ok_or(InternalError::Slicing)?
            .copy_from_slice(data);
        Ok(())
    }

    pub fn store_word(&mut self, offset: usize, word: U256) -> Result<(), VMError> {
        self.store_data(offset, &u256_to_big_endian(word))
    }
}

/// When memory expands, only the additional words are paid for.
pub fn expansion_cost(
    new_memory_size: usize,
    current_memory_size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    let cost = if new_memory_size <= current_memory_size {
        0
    } else {
        cost(new_memory_size, schedule)?
            .checked_sub(cost(current_memory_size, schedule)?)
            .ok_or(InternalError::Underflow)?
    };
    Ok(cost)
}

/// Total cost of a memory of `memory_size` bytes:
/// `memory · words + words² / 512`.
fn cost(memory_size: usize, schedule: &GasSchedule) -> Result<u64, VMError> {
    let memory_size_word: u64 = memory_size
        .div_ceil(WORD_SIZE_IN_BYTES_USIZE)
        .try_into()
        .map_err(|_| OutOfGas)?;

    let linear = schedule
        .memory
        .checked_mul(memory_size_word)
        .ok_or(OutOfGas)?;
    let quadratic = memory_size_word
        .checked_pow(2)
        .ok_or(OutOfGas)?
        / MEMORY_EXPANSION_QUOTIENT;

    linear.checked_add(quadratic).ok_or(OutOfGas.into())
}

/// Word-aligned memory size needed to cover the access `[offset, offset+size)`.
///
/// A zero-size access needs no memory at all, whatever the offset. An end
/// that does not fit a machine word prices as unpayable.
pub fn calculate_memory_size(offset: usize, size: usize) -> Result<usize, VMError> {
    if size == 0 {
        return Ok(0);
    }

    offset
        .checked_add(size)
        .and_then(|end| end.checked_next_multiple_of(WORD_SIZE_IN_BYTES_USIZE))
        .ok_or(OutOfGas.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas_schedule::FRONTIER_SCHEDULE;

    #[test]
    fn high_water_mark_is_word_aligned_and_monotonic() {
        let mut memory = Memory::new();
        assert_eq!(memory.len(), 0);

        memory.store_data(0, &[1]).unwrap();
        assert_eq!(memory.len(), 32);

        memory.load_range(0, 33).unwrap();
        assert_eq!(memory.len(), 64);

        // Reads below the mark do not shrink it.
        memory.load_range(0, 1).unwrap();
        assert_eq!(memory.len(), 64);
    }

    #[test]
    fn zero_size_access_does_not_grow() {
        let mut memory = Memory::new();
        assert!(memory.load_range(1_000_000, 0).unwrap().is_empty());
        memory.store_data(1_000_000, &[]).unwrap();
        assert_eq!(memory.len(), 0);
    }

    #[test]
    fn loads_beyond_the_mark_read_zeros() {
        let mut memory = Memory::new();
        memory.store_word(0, U256::from(7)).unwrap();
        assert_eq!(memory.load_word(32).unwrap(), U256::zero());
        assert_eq!(memory.load_word(0).unwrap(), U256::from(7));
    }

    #[test]
    fn expansion_cost_matches_formula() {
        // One word: 3*1 + 1/512 = 3. 32 words: 3*32 + 1024/512 = 98.
        assert_eq!(expansion_cost(32, 0, &FRONTIER_SCHEDULE).unwrap(), 3);
        assert_eq!(expansion_cost(1024, 0, &FRONTIER_SCHEDULE).unwrap(), 98);
        // Already covered accesses are free.
        assert_eq!(expansion_cost(32, 64, &FRONTIER_SCHEDULE).unwrap(), 0);
    }

    #[test]
    fn memory_size_is_rounded_up() {
        assert_eq!(calculate_memory_size(0, 1).unwrap(), 32);
        assert_eq!(calculate_memory_size(31, 2).unwrap(), 64);
        assert_eq!(calculate_memory_size(64, 32).unwrap(), 96);
        assert_eq!(calculate_memory_size(usize::MAX, 0).unwrap(), 0);
        assert!(calculate_memory_size(usize::MAX, 1).is_err());
    }
}
