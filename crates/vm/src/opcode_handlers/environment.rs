//! # Environment operations
//!
//! Includes the following opcodes:
//!   - `ADDRESS`
//!   - `BALANCE`
//!   - `ORIGIN`
//!   - `CALLER`
//!   - `CALLVALUE`
//!   - `CALLDATALOAD`
//!   - `CALLDATASIZE`
//!   - `CALLDATACOPY`
//!   - `CODESIZE`
//!   - `CODECOPY`
//!   - `GASPRICE`
//!   - `EXTCODESIZE`
//!   - `EXTCODECOPY`

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    gas_cost,
    memory::calculate_memory_size,
    utils::{address_to_word, padded_slice, size_offset_to_usize, word_to_address},
    vm::VM,
};
use etna_common::{utils::u256_from_big_endian, U256};

impl<W: World> VM<W> {
    // ADDRESS operation
    pub fn op_address(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let address = self.call_frame.to;
        self.call_frame.stack.push(address_to_word(address))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // BALANCE operation
    pub fn op_balance(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().balance)?;

        let address = word_to_address(self.call_frame.stack.pop1()?);
        let balance = self.world.get_balance(address);
        self.call_frame.stack.push(balance)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // ORIGIN operation
    pub fn op_origin(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let origin = self.env.origin;
        self.call_frame.stack.push(address_to_word(origin))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CALLER operation
    pub fn op_caller(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let caller = self.call_frame.msg_sender;
        self.call_frame.stack.push(address_to_word(caller))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CALLVALUE operation
    pub fn op_callvalue(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let value = self.call_frame.msg_value;
        self.call_frame.stack.push(value)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CALLDATALOAD operation: 32 bytes of calldata, zero-padded past the end
    pub fn op_calldataload(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let offset = self.call_frame.stack.pop1()?;
        let value = match usize::try_from(offset) {
            Ok(offset) => {
                let word = padded_slice(&self.call_frame.calldata, offset, 32);
                u256_from_big_endian(&word)
            }
            Err(_) => U256::zero(),
        };
        self.call_frame.stack.push(value)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CALLDATASIZE operation
    pub fn op_calldatasize(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let size = self.call_frame.calldata.len();
        self.call_frame.stack.push(U256::from(size))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CALLDATACOPY operation
    pub fn op_calldatacopy(&mut self) -> Result<OpcodeResult, VMError> {
        let [dst_offset, src_offset, size] = self.call_frame.stack.pop()?;
        let (size, dst_offset) = size_offset_to_usize(size, dst_offset)?;
        let src_offset = usize::try_from(src_offset).unwrap_or(usize::MAX);

        self.call_frame
            .increase_consumed_gas(gas_cost::calldatacopy(
                calculate_memory_size(dst_offset, size)?,
                self.call_frame.memory.len(),
                size,
                self.schedule(),
            )?)?;

        if size > 0 {
            let data = padded_slice(&self.call_frame.calldata, src_offset, size);
            self.call_frame.memory.store_data(dst_offset, &data)?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CODESIZE operation
    pub fn op_codesize(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let size = self.call_frame.program.len();
        self.call_frame.stack.push(U256::from(size))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CODECOPY operation
    pub fn op_codecopy(&mut self) -> Result<OpcodeResult, VMError> {
        let [dst_offset, src_offset, size] = self.call_frame.stack.pop()?;
        let (size, dst_offset) = size_offset_to_usize(size, dst_offset)?;
        let src_offset = usize::try_from(src_offset).unwrap_or(usize::MAX);

        self.call_frame.increase_consumed_gas(gas_cost::codecopy(
            calculate_memory_size(dst_offset, size)?,
            self.call_frame.memory.len(),
            size,
            self.schedule(),
        )?)?;

        if size > 0 {
            let data = padded_slice(self.call_frame.program.code(), src_offset, size);
            self.call_frame.memory.store_data(dst_offset, &data)?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // GASPRICE operation
    pub fn op_gasprice(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().base)?;

        let gas_price = self.env.gas_price;
        self.call_frame.stack.push(gas_price)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // EXTCODESIZE operation
    pub fn op_extcodesize(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().ext_code)?;

        let address = word_to_address(self.call_frame.stack.pop1()?);
        let size = self.world.get_code_size(address);
        self.call_frame.stack.push(U256::from(size))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // EXTCODECOPY operation
    pub fn op_extcodecopy(&mut self) -> Result<OpcodeResult, VMError> {
        let [address, dst_offset, src_offset, size] = self.call_frame.stack.pop()?;
        let address = word_to_address(address);
        let (size, dst_offset) = size_offset_to_usize(size, dst_offset)?;
        let src_offset = usize::try_from(src_offset).unwrap_or(usize::MAX);

        self.call_frame
            .increase_consumed_gas(gas_cost::extcodecopy(
                calculate_memory_size(dst_offset, size)?,
                self.call_frame.memory.len(),
                size,
                self.schedule(),
            )?)?;

        if size > 0 {
            let code = self.world.get_code(address);
            let data = padded_slice(&code, src_offset, size);
            self.call_frame.memory.store_data(dst_offset, &data)?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
