//! # Comparison and bitwise logic operations
//!
//! Includes the following opcodes:
//!   - `LT`
//!   - `GT`
//!   - `SLT`
//!   - `SGT`
//!   - `EQ`
//!   - `ISZERO`
//!   - `AND`
//!   - `OR`
//!   - `XOR`
//!   - `NOT`
//!   - `BYTE`

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    vm::VM,
};
use etna_common::U256;

fn u256_from_bool(value: bool) -> U256 {
    if value {
        U256::one()
    } else {
        U256::zero()
    }
}

impl<W: World> VM<W> {
    // LT operation
    #[inline]
    pub fn op_lt(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lho, rho] = self.call_frame.stack.pop()?;
        self.call_frame.stack.push(u256_from_bool(lho < rho))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // GT operation
    #[inline]
    pub fn op_gt(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lho, rho] = self.call_frame.stack.pop()?;
        self.call_frame.stack.push(u256_from_bool(lho > rho))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SLT operation (signed less than)
    pub fn op_slt(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lho, rho] = self.call_frame.stack.pop()?;
        let lho_is_negative = lho.bit(255);
        let rho_is_negative = rho.bit(255);
        let result = if lho_is_negative == rho_is_negative {
            // Same sign: the unsigned order is the signed order.
            u256_from_bool(lho < rho)
        } else {
            u256_from_bool(lho_is_negative)
        };
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SGT operation (signed greater than)
    pub fn op_sgt(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lho, rho] = self.call_frame.stack.pop()?;
        let lho_is_negative = lho.bit(255);
        let rho_is_negative = rho.bit(255);
        let result = if lho_is_negative == rho_is_negative {
            u256_from_bool(lho > rho)
        } else {
            u256_from_bool(rho_is_negative)
        };
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // EQ operation
    #[inline]
    pub fn op_eq(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lho, rho] = self.call_frame.stack.pop()?;
        self.call_frame.stack.push(u256_from_bool(lho == rho))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // ISZERO operation
    pub fn op_iszero(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let operand = self.call_frame.stack.pop1()?;
        self.call_frame
            .stack
            .push(u256_from_bool(operand.is_zero()))?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // AND operation
    #[inline]
    pub fn op_and(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [a, b] = self.call_frame.stack.pop()?;
        self.call_frame.stack.push(a & b)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // OR operation
    #[inline]
    pub fn op_or(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [a, b] = self.call_frame.stack.pop()?;
        self.call_frame.stack.push(a | b)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // XOR operation
    #[inline]
    pub fn op_xor(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [a, b] = self.call_frame.stack.pop()?;
        self.call_frame.stack.push(a ^ b)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // NOT operation
    pub fn op_not(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let operand = self.call_frame.stack.pop1()?;
        self.call_frame.stack.push(!operand)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // BYTE operation: big-endian byte `index` of `value`, indices of 32
    // and above yield zero
    pub fn op_byte(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [index, value] = self.call_frame.stack.pop()?;
        let result = match usize::try_from(index) {
            // U256::byte counts from the little end.
            Ok(index) if index < 32 => U256::from(value.byte(31 - index)),
            _ => U256::zero(),
        };
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
