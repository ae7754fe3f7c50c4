//! # Logging operations
//!
//! `LOG0` through `LOG4`.

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    gas_cost,
    memory::calculate_memory_size,
    utils::size_offset_to_usize,
    vm::VM,
};
use bytes::Bytes;
use etna_common::{types::Log, utils::u256_to_h256};

impl<W: World> VM<W> {
    // Generic LOG operation; N is the topic count.
    pub fn op_log<const N: usize>(&mut self) -> Result<OpcodeResult, VMError> {
        let [offset, size] = self.call_frame.stack.pop()?;
        let topics = self.call_frame.stack.pop::<N>()?.map(u256_to_h256);
        let (size, offset) = size_offset_to_usize(size, offset)?;

        self.call_frame.increase_consumed_gas(gas_cost::log(
            calculate_memory_size(offset, size)?,
            self.call_frame.memory.len(),
            size,
            N,
            self.schedule(),
        )?)?;

        let data = self.call_frame.memory.load_range(offset, size)?;
        self.substate.logs.push(Log {
            address: self.call_frame.to,
            topics: topics.to_vec(),
            data: Bytes::from(data),
        });

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
