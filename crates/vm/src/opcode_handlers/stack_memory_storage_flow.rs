//! # Control flow, memory and storage operations
//!
//! Includes the following opcodes:
//!   - `POP`
//!   - `MLOAD`
//!   - `MSTORE`
//!   - `MSTORE8`
//!   - `SLOAD`
//!   - `SSTORE`
//!   - `JUMP`
//!   - `JUMPI`
//!   - `PC`
//!   - `MSIZE`
//!   - `GAS`
//!   - `JUMPDEST`

use crate::{
    constants::WORD_SIZE_IN_BYTES_USIZE,
    db::World,
    errors::{ExceptionalHalt, OpcodeResult, VMError},
    gas_cost,
    memory::calculate_memory_size,
    utils::u256_to_usize,
    vm::VM,
};
use etna_common::U256;

impl<W: World> VM<W> {
    // POP operation
    pub fn op_pop(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        self.call_frame.stack.pop1()?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MLOAD operation
    pub fn op_mload(&mut self) -> Result<OpcodeResult, VMError> {
        let offset = u256_to_usize(self.call_frame.stack.pop1()?)?;

        self.call_frame
            .increase_consumed_gas(gas_cost::mem_access(
                calculate_memory_size(offset, WORD_SIZE_IN_BYTES_USIZE)?,
                self.call_frame.memory.len(),
                self.schedule(),
            )?)?;

        let word = self.call_frame.memory.load_word(offset)?;
        self.call_frame.stack.push(word)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MSTORE operation
    pub fn op_mstore(&mut self) -> Result<OpcodeResult, VMError> {
        let [offset, value] = self.call_frame.stack.pop()?;
        let offset = u256_to_usize(offset)?;

        // The cost covers the fixed 32-byte window; the value operand
        // plays no part in it.
        self.call_frame
            .increase_consumed_gas(gas_cost::mem_access(
                calculate_memory_size(offset, WORD_SIZE_IN_BYTES_USIZE)?,
                self.call_frame.memory.len(),
                self.schedule(),
            )?)?;

        self.call_frame.memory.store_word(offset, value)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MSTORE8 operation: a single byte, `value mod 256`
    pub fn op_mstore8(&mut self) -> Result<OpcodeResult, VMError> {
        let [offset, value] = self.call_frame.stack.pop()?;
        let offset = u256_to_usize(offset)?;

        self.call_frame
            .increase_consumed_gas(gas_cost::mem_access(
                calculate_memory_size(offset, 1)?,
                self.call_frame.memory.len(),
                self.schedule(),
            )?)?;

        self.call_frame.memory.store_data(offset, &[value.byte(0)])?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SLOAD operation
    pub fn op_sload(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().sload)?;

        let key = self.call_frame.stack.pop1()?;
        let value = self.world.get_storage(self.call_frame.to, key);
        self.call_frame.stack.push(value)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SSTORE operation
    pub fn op_sstore(&mut self) -> Result<OpcodeResult, VMError> {
        let [key, new_value] = self.call_frame.stack.pop()?;
        let to = self.call_frame.to;

        // The price depends on the slot's current value, so the read
        // happens before the charge; the write only after it.
        let old_value = self.world.get_storage(to, key);
        let (cost, refund) = gas_cost::sstore(old_value, new_value, self.schedule());
        self.call_frame.increase_consumed_gas(cost)?;

        self.substate.refunded_gas = self.substate.refunded_gas.saturating_add(refund);
        self.world.set_storage(to, key, new_value);

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // JUMP operation
    pub fn op_jump(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().mid)?;

        let target = self.call_frame.stack.pop1()?;
        self.jump(target)?;

        Ok(OpcodeResult::Continue { pc_increment: 0 })
    }

    // JUMPI operation
    pub fn op_jumpi(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().high)?;

        let [target, condition] = self.call_frame.stack.pop()?;
        if condition.is_zero() {
            return Ok(OpcodeResult::Continue { pc_increment: 1 });
        }
        self.jump(target)?;

        Ok(OpcodeResult::Continue { pc_increment: 0 })
    }

    /// Moves the PC to `target` if it lands exactly on a valid JUMPDEST.
    /// Targets wider than a machine word cannot be valid, so they clamp
    /// into the failure path.
    fn jump(&mut self, target: U256) -> Result<(), VMError> {
        let position = usize::try_from(target).unwrap_or(usize::MAX);
        if !self.call_frame.program.is_valid_jump_destination(position) {
            return Err(ExceptionalHalt::InvalidJump(position).into());
        }
        self.call_frame.pc = position;
        Ok(())
    }

    // PC operation
    pub fn op_pc(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let pc = self.call_frame.pc;
        self.call_frame.stack.push(U256::from(pc))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MSIZE operation: active memory in bytes, always a word multiple
    pub fn op_msize(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let size = self.call_frame.memory.len();
        self.call_frame.stack.push(U256::from(size))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // GAS operation: gas left after paying for this opcode
    pub fn op_gas(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let remaining = self.call_frame.gas_remaining;
        self.call_frame.stack.push(U256::from(remaining))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // JUMPDEST operation: a charged no-op
    pub fn op_jumpdest(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().jumpdest)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
