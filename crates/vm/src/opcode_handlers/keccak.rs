//! # SHA3
//!
//! The Keccak-256 digest of a memory range; the only cryptographic
//! primitive the interpreter consumes.

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    gas_cost,
    memory::calculate_memory_size,
    utils::size_offset_to_usize,
    vm::VM,
};
use etna_common::utils::h256_to_u256;
use keccak_hash::keccak;

impl<W: World> VM<W> {
    // SHA3 operation
    pub fn op_sha3(&mut self) -> Result<OpcodeResult, VMError> {
        let [offset, size] = self.call_frame.stack.pop()?;
        let (size, offset) = size_offset_to_usize(size, offset)?;

        self.call_frame.increase_consumed_gas(gas_cost::sha3(
            calculate_memory_size(offset, size)?,
            self.call_frame.memory.len(),
            size,
            self.schedule(),
        )?)?;

        let data = self.call_frame.memory.load_range(offset, size)?;
        self.call_frame.stack.push(h256_to_u256(keccak(data)))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
