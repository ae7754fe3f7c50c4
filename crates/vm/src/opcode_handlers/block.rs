//! # Block information operations
//!
//! Includes the following opcodes:
//!   - `BLOCKHASH`
//!   - `COINBASE`
//!   - `TIMESTAMP`
//!   - `NUMBER`
//!   - `DIFFICULTY`
//!   - `GASLIMIT`

use crate::{
    constants::LAST_AVAILABLE_BLOCK_LIMIT,
    db::World,
    errors::{OpcodeResult, VMError},
    utils::address_to_word,
    vm::VM,
};
use etna_common::{utils::h256_to_u256, U256};

impl<W: World> VM<W> {
    // BLOCKHASH operation: zero outside the 256-block window
    pub fn op_blockhash(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().block_hash)?;

        let block_number = self.call_frame.stack.pop1()?;
        let current_block = self.env.block.number;

        let in_window = block_number < current_block
            && current_block - block_number <= LAST_AVAILABLE_BLOCK_LIMIT;
        let hash = if in_window {
            self.world
                .get_block_hash(block_number)
                .map(h256_to_u256)
                .unwrap_or_default()
        } else {
            U256::zero()
        };
        self.call_frame.stack.push(hash)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // COINBASE operation
    pub fn op_coinbase(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let beneficiary = self.env.block.beneficiary;
        self.call_frame.stack.push(address_to_word(beneficiary))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // TIMESTAMP operation
    pub fn op_timestamp(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let timestamp = self.env.block.timestamp;
        self.call_frame.stack.push(U256::from(timestamp))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // NUMBER operation
    pub fn op_number(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let number = self.env.block.number;
        self.call_frame.stack.push(number)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // DIFFICULTY operation
    pub fn op_difficulty(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let difficulty = self.env.block.difficulty;
        self.call_frame.stack.push(difficulty)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // GASLIMIT operation
    pub fn op_gaslimit(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let gas_limit = self.env.block.gas_limit;
        self.call_frame.stack.push(U256::from(gas_limit))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
