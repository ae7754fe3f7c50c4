use crate::{
    constants::MAX_CODE_SIZE,
    gas_schedule::GasSchedule,
};
use etna_common::types::Fork;

/// Fork-selected execution policies.
///
/// The flags capture every behavioral (non-fee) difference between the
/// supported forks; the fee differences live in [`GasSchedule`].
#[derive(Clone, Copy, Debug)]
pub struct EvmConfig {
    pub fork: Fork,
    pub schedule: &'static GasSchedule,
    /// EIP-170 deployed-code size cap. `None` disables the check.
    pub max_code_size: Option<usize>,
    /// EIP-150: a child call receives at most `gas - gas / divisor`.
    pub sub_gas_cap_divisor: Option<u64>,
    /// Homestead: a CREATE that cannot pay the code deposit fails hard
    /// instead of keeping the account without code.
    pub exceptional_failed_code_deposit: bool,
    /// EIP-161: empty-account semantics (dead-account checks, start nonce).
    pub no_empty_accounts: bool,
    /// EIP-150: SELFDESTRUCT pays `new_account` when it conjures the
    /// beneficiary into existence.
    pub charge_self_destruct_for_new_account: bool,
    /// DELEGATECALL exists from Homestead on.
    pub has_delegatecall: bool,
}

impl EvmConfig {
    pub const fn for_fork(fork: Fork) -> Self {
        match fork {
            Fork::Frontier => EvmConfig {
                fork,
                schedule: GasSchedule::for_fork(fork),
                max_code_size: None,
                sub_gas_cap_divisor: None,
                exceptional_failed_code_deposit: false,
                no_empty_accounts: false,
                charge_self_destruct_for_new_account: false,
                has_delegatecall: false,
            },
            Fork::Homestead => EvmConfig {
                fork,
                schedule: GasSchedule::for_fork(fork),
                max_code_size: None,
                sub_gas_cap_divisor: None,
                exceptional_failed_code_deposit: true,
                no_empty_accounts: false,
                charge_self_destruct_for_new_account: false,
                has_delegatecall: true,
            },
            Fork::Tangerine => EvmConfig {
                fork,
                schedule: GasSchedule::for_fork(fork),
                max_code_size: None,
                sub_gas_cap_divisor: Some(64),
                exceptional_failed_code_deposit: true,
                no_empty_accounts: false,
                charge_self_destruct_for_new_account: true,
                has_delegatecall: true,
            },
            Fork::SpuriousDragon => EvmConfig {
                fork,
                schedule: GasSchedule::for_fork(fork),
                max_code_size: Some(MAX_CODE_SIZE),
                sub_gas_cap_divisor: Some(64),
                exceptional_failed_code_deposit: true,
                no_empty_accounts: true,
                charge_self_destruct_for_new_account: true,
                has_delegatecall: true,
            },
        }
    }

    /// Largest amount of gas a child frame may receive out of `gas`.
    ///
    /// EIP-150 keeps one 64th with the caller; earlier forks forward
    /// everything.
    pub fn gas_cap(&self, gas: u64) -> u64 {
        match self.sub_gas_cap_divisor {
            Some(divisor) => gas - gas / divisor,
            None => gas,
        }
    }
}
