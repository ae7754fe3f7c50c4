//! # Arithmetic operations
//!
//! Includes the following opcodes:
//!   - `ADD`
//!   - `SUB`
//!   - `MUL`
//!   - `DIV`
//!   - `SDIV`
//!   - `MOD`
//!   - `SMOD`
//!   - `ADDMOD`
//!   - `MULMOD`
//!   - `EXP`
//!   - `SIGNEXTEND`

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    gas_cost,
    vm::VM,
};
use etna_common::{U256, U512};

impl<W: World> VM<W> {
    // ADD operation, wrapping mod 2^256
    #[inline]
    pub fn op_add(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lhs, rhs] = self.call_frame.stack.pop()?;
        let (result, _) = lhs.overflowing_add(rhs);
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SUB operation, wrapping mod 2^256
    #[inline]
    pub fn op_sub(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        let [lhs, rhs] = self.call_frame.stack.pop()?;
        let (result, _) = lhs.overflowing_sub(rhs);
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MUL operation, wrapping mod 2^256
    #[inline]
    pub fn op_mul(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().low)?;

        let [lhs, rhs] = self.call_frame.stack.pop()?;
        let (result, _) = lhs.overflowing_mul(rhs);
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // DIV operation, division by zero yields zero
    #[inline]
    pub fn op_div(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().low)?;

        let [lhs, rhs] = self.call_frame.stack.pop()?;
        let result = lhs.checked_div(rhs).unwrap_or_default();
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SDIV operation, two's complement signed division truncating
    // toward zero. SDIV(INT_MIN, -1) wraps back to INT_MIN.
    pub fn op_sdiv(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().low)?;

        let [mut lhs, mut rhs] = self.call_frame.stack.pop()?;

        let mut negative = false;
        if lhs.bit(255) {
            lhs = U256::zero().overflowing_sub(lhs).0;
            negative = !negative;
        }
        if rhs.bit(255) {
            rhs = U256::zero().overflowing_sub(rhs).0;
            negative = !negative;
        }

        let result = match lhs.checked_div(rhs) {
            Some(mut quotient) => {
                if negative {
                    quotient = U256::zero().overflowing_sub(quotient).0;
                }
                quotient
            }
            None => U256::zero(),
        };
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MOD operation, modulo zero yields zero
    #[inline]
    pub fn op_mod(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().low)?;

        let [lhs, rhs] = self.call_frame.stack.pop()?;
        let result = lhs.checked_rem(rhs).unwrap_or_default();
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SMOD operation, the sign of the result follows the dividend
    pub fn op_smod(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().low)?;

        let [mut lhs, mut rhs] = self.call_frame.stack.pop()?;

        let negative = lhs.bit(255);
        if negative {
            lhs = U256::zero().overflowing_sub(lhs).0;
        }
        if rhs.bit(255) {
            rhs = U256::zero().overflowing_sub(rhs).0;
        }

        let result = match lhs.checked_rem(rhs) {
            Some(mut remainder) => {
                if negative {
                    remainder = U256::zero().overflowing_sub(remainder).0;
                }
                remainder
            }
            None => U256::zero(),
        };
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // ADDMOD operation, full 512-bit intermediate; modulus zero yields zero
    pub fn op_addmod(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().mid)?;

        let [lhs, rhs, modulus] = self.call_frame.stack.pop()?;
        if modulus.is_zero() {
            self.call_frame.stack.push(U256::zero())?;
        } else {
            let sum = U512::from(lhs) + U512::from(rhs);
            let result = sum % U512::from(modulus);
            self.call_frame
                .stack
                .push(U256([result.0[0], result.0[1], result.0[2], result.0[3]]))?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // MULMOD operation, full 512-bit intermediate; modulus zero yields zero
    pub fn op_mulmod(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().mid)?;

        let [lhs, rhs, modulus] = self.call_frame.stack.pop()?;
        if modulus.is_zero() {
            self.call_frame.stack.push(U256::zero())?;
        } else {
            let product = lhs.full_mul(rhs);
            let result = product % U512::from(modulus);
            self.call_frame
                .stack
                .push(U256([result.0[0], result.0[1], result.0[2], result.0[3]]))?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // EXP operation; the variable cost depends on the exponent width
    pub fn op_exp(&mut self) -> Result<OpcodeResult, VMError> {
        let [base, exponent] = self.call_frame.stack.pop()?;
        self.call_frame
            .increase_consumed_gas(gas_cost::exp(exponent, self.schedule())?)?;

        let (result, _) = base.overflowing_pow(exponent);
        self.call_frame.stack.push(result)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // SIGNEXTEND operation; byte indices of 31 and above leave the
    // value unchanged
    pub fn op_signextend(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame.increase_consumed_gas(self.schedule().low)?;

        let [byte_index, mut value] = self.call_frame.stack.pop()?;
        if let Ok(index) = usize::try_from(byte_index) {
            if index < 32 {
                if value.bit(8 * index + 7) {
                    value |= U256::MAX << (8 * (index + 1));
                } else if index != 31 {
                    value &= (U256::one() << (8 * (index + 1))) - 1;
                }
            }
        }
        self.call_frame.stack.push(value)?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
