//! Variable gas cost functions.
//!
//! Each function is a pure function of the machine state right before the
//! instruction executes. Everything is checked arithmetic: any overflow on
//! the way to a price means the price cannot be paid, which is `OutOfGas`.

use crate::{
    config::EvmConfig,
    constants::WORD_SIZE_IN_BYTES_USIZE,
    errors::{ExceptionalHalt, VMError},
    gas_schedule::GasSchedule,
    memory,
};
use ExceptionalHalt::OutOfGas;
use etna_common::{utils::u256_byte_size, U256};

/// EXP: `exp + exp_byte · byteSize(exponent)`.
pub fn exp(exponent: U256, schedule: &GasSchedule) -> Result<u64, VMError> {
    let byte_size_cost = schedule
        .exp_byte
        .checked_mul(u256_byte_size(exponent))
        .ok_or(OutOfGas)?;
    schedule.exp.checked_add(byte_size_cost).ok_or(OutOfGas.into())
}

/// SHA3: `sha3 + sha3_word · ceil(size / 32) + memory expansion`.
pub fn sha3(
    new_memory_size: usize,
    current_memory_size: usize,
    size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    word_copy_behavior(
        new_memory_size,
        current_memory_size,
        size,
        schedule.sha3,
        schedule.sha3_word,
        schedule,
    )
}

pub fn calldatacopy(
    new_memory_size: usize,
    current_memory_size: usize,
    size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    word_copy_behavior(
        new_memory_size,
        current_memory_size,
        size,
        schedule.very_low,
        schedule.copy,
        schedule,
    )
}

pub fn codecopy(
    new_memory_size: usize,
    current_memory_size: usize,
    size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    word_copy_behavior(
        new_memory_size,
        current_memory_size,
        size,
        schedule.very_low,
        schedule.copy,
        schedule,
    )
}

/// EXTCODECOPY prices like the other copies but from the `ext_code` base.
pub fn extcodecopy(
    new_memory_size: usize,
    current_memory_size: usize,
    size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    word_copy_behavior(
        new_memory_size,
        current_memory_size,
        size,
        schedule.ext_code,
        schedule.copy,
        schedule,
    )
}

fn word_copy_behavior(
    new_memory_size: usize,
    current_memory_size: usize,
    size: usize,
    static_cost: u64,
    per_word_cost: u64,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    let minimum_word_size: u64 = size
        .div_ceil(WORD_SIZE_IN_BYTES_USIZE)
        .try_into()
        .map_err(|_| OutOfGas)?;

    let memory_expansion_cost =
        memory::expansion_cost(new_memory_size, current_memory_size, schedule)?;

    let word_cost = per_word_cost
        .checked_mul(minimum_word_size)
        .ok_or(OutOfGas)?;
    static_cost
        .checked_add(word_cost)
        .ok_or(OutOfGas)?
        .checked_add(memory_expansion_cost)
        .ok_or(OutOfGas.into())
}

/// MLOAD/MSTORE/MSTORE8: static cost plus expansion over the accessed
/// window. The value operand never participates in the price.
pub fn mem_access(
    new_memory_size: usize,
    current_memory_size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    schedule
        .very_low
        .checked_add(memory::expansion_cost(
            new_memory_size,
            current_memory_size,
            schedule,
        )?)
        .ok_or(OutOfGas.into())
}

/// RETURN: only the memory expansion is charged.
pub fn exit_opcode(
    new_memory_size: usize,
    current_memory_size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    memory::expansion_cost(new_memory_size, current_memory_size, schedule)
}

/// LOGn: `log + n · log_topic + log_data · size + memory expansion`.
pub fn log(
    new_memory_size: usize,
    current_memory_size: usize,
    size: usize,
    number_of_topics: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    let memory_expansion_cost =
        memory::expansion_cost(new_memory_size, current_memory_size, schedule)?;

    let topics_cost = schedule
        .log_topic
        .checked_mul(number_of_topics.try_into().map_err(|_| OutOfGas)?)
        .ok_or(OutOfGas)?;
    let bytes_cost = schedule
        .log_data
        .checked_mul(size.try_into().map_err(|_| OutOfGas)?)
        .ok_or(OutOfGas)?;

    schedule
        .log
        .checked_add(topics_cost)
        .ok_or(OutOfGas)?
        .checked_add(bytes_cost)
        .ok_or(OutOfGas)?
        .checked_add(memory_expansion_cost)
        .ok_or(OutOfGas.into())
}

/// SSTORE: `(cost, refund)`. Setting a zero slot to non-zero pays `sset`,
/// everything else pays `sreset`; clearing a non-zero slot earns
/// `sclear_refund`.
pub fn sstore(old_value: U256, new_value: U256, schedule: &GasSchedule) -> (u64, u64) {
    let cost = if old_value.is_zero() && !new_value.is_zero() {
        schedule.sset
    } else {
        schedule.sreset
    };
    let refund = if !old_value.is_zero() && new_value.is_zero() {
        schedule.sclear_refund
    } else {
        0
    };
    (cost, refund)
}

/// CREATE: base cost plus expansion over the init code window.
pub fn create(
    new_memory_size: usize,
    current_memory_size: usize,
    schedule: &GasSchedule,
) -> Result<u64, VMError> {
    schedule
        .create
        .checked_add(memory::expansion_cost(
            new_memory_size,
            current_memory_size,
            schedule,
        )?)
        .ok_or(OutOfGas.into())
}

/// CALL/CALLCODE/DELEGATECALL pricing.
///
/// Returns `(cost, child_gas_limit)`: the amount charged to the caller and
/// the gas the child frame starts with (the forwarded amount plus the
/// stipend when value moves). Computing both here keeps the charge and the
/// forwarded gas in sync by construction.
pub fn call(
    new_memory_size: usize,
    current_memory_size: usize,
    gas_from_stack: U256,
    gas_left: u64,
    value: U256,
    charge_new_account: bool,
    config: &EvmConfig,
) -> Result<(u64, u64), VMError> {
    let schedule = config.schedule;
    let memory_expansion_cost =
        memory::expansion_cost(new_memory_size, current_memory_size, schedule)?;

    let positive_value_cost = if value.is_zero() {
        0
    } else {
        schedule.call_value
    };
    let new_account_cost = if charge_new_account {
        schedule.new_account
    } else {
        0
    };

    let extra = schedule
        .call
        .checked_add(positive_value_cost)
        .ok_or(OutOfGas)?
        .checked_add(new_account_cost)
        .ok_or(OutOfGas)?;
    let consumed = extra
        .checked_add(memory_expansion_cost)
        .ok_or(OutOfGas)?;

    // EIP-150: the forwarded gas is capped at all-but-1/64th of what is
    // left after the fixed costs. The cap only applies when those costs
    // are payable; otherwise the raw request stands and the charge below
    // exhausts the frame.
    let capped_gas = match config.sub_gas_cap_divisor {
        Some(_) => match gas_left.checked_sub(consumed) {
            Some(rest) => gas_from_stack.min(U256::from(config.gas_cap(rest))),
            None => gas_from_stack,
        },
        None => gas_from_stack,
    };
    let forwarded_gas: u64 = capped_gas.try_into().map_err(|_| OutOfGas)?;

    let stipend = if value.is_zero() {
        0
    } else {
        schedule.call_stipend
    };

    let cost = consumed.checked_add(forwarded_gas).ok_or(OutOfGas)?;
    let child_gas_limit = forwarded_gas.checked_add(stipend).ok_or(OutOfGas)?;

    Ok((cost, child_gas_limit))
}

/// SELFDESTRUCT: base cost, plus `new_account` when the beneficiary is
/// being conjured into existence (fork-dependent, decided by the caller).
pub fn selfdestruct(charge_new_account: bool, schedule: &GasSchedule) -> Result<u64, VMError> {
    let new_account_cost = if charge_new_account {
        schedule.new_account
    } else {
        0
    };
    schedule
        .selfdestruct
        .checked_add(new_account_cost)
        .ok_or(OutOfGas.into())
}
