//! Fork-aware gas schedules.
//!
//! Each supported hard fork carries a full fee table. Costs that never
//! changed are simply repeated across schedules so a single lookup answers
//! every pricing question.
//!
//! # Fork history (gas-relevant changes)
//!
//! - **Frontier/Homestead**: original Yellow Paper costs
//! - **Tangerine Whistle (EIP-150)**: IO repricing (SLOAD, BALANCE, CALL,
//!   EXTCODE*, SELFDESTRUCT) and the 63/64 forwarding cap
//! - **Spurious Dragon (EIP-160)**: EXP byte cost 10 → 50

use etna_common::types::Fork;

/// The named fee constants of the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasSchedule {
    pub zero: u64,
    pub base: u64,
    pub very_low: u64,
    pub low: u64,
    pub mid: u64,
    pub high: u64,

    pub ext_code: u64,
    pub balance: u64,
    pub sload: u64,
    pub jumpdest: u64,

    pub sset: u64,
    pub sreset: u64,
    pub sclear_refund: u64,

    pub selfdestruct: u64,
    pub selfdestruct_refund: u64,

    pub create: u64,
    pub code_deposit: u64,

    pub call: u64,
    pub call_value: u64,
    pub call_stipend: u64,
    pub new_account: u64,

    pub exp: u64,
    pub exp_byte: u64,

    pub memory: u64,
    pub copy: u64,
    pub block_hash: u64,

    pub log: u64,
    pub log_data: u64,
    pub log_topic: u64,

    pub sha3: u64,
    pub sha3_word: u64,
}

impl GasSchedule {
    /// Get the gas schedule for a specific fork.
    pub const fn for_fork(fork: Fork) -> &'static GasSchedule {
        match fork {
            Fork::Frontier | Fork::Homestead => &FRONTIER_SCHEDULE,
            Fork::Tangerine => &TANGERINE_WHISTLE_SCHEDULE,
            Fork::SpuriousDragon => &SPURIOUS_DRAGON_SCHEDULE,
        }
    }
}

/// Frontier/Homestead gas schedule (Homestead changed semantics, not fees).
pub static FRONTIER_SCHEDULE: GasSchedule = GasSchedule {
    zero: 0,
    base: 2,
    very_low: 3,
    low: 5,
    mid: 8,
    high: 10,

    ext_code: 20,
    balance: 20,
    sload: 50,
    jumpdest: 1,

    sset: 20000,
    sreset: 5000,
    sclear_refund: 15000,

    selfdestruct: 0,
    selfdestruct_refund: 24000,

    create: 32000,
    code_deposit: 200,

    call: 40,
    call_value: 9000,
    call_stipend: 2300,
    new_account: 25000,

    exp: 10,
    exp_byte: 10,

    memory: 3,
    copy: 3,
    block_hash: 20,

    log: 375,
    log_data: 8,
    log_topic: 375,

    sha3: 30,
    sha3_word: 6,
};

/// Tangerine Whistle gas schedule (EIP-150 IO repricing).
pub static TANGERINE_WHISTLE_SCHEDULE: GasSchedule = GasSchedule {
    ext_code: 700,
    balance: 400,
    sload: 200,
    selfdestruct: 5000,
    call: 700,
    ..FRONTIER_SCHEDULE
};

/// Spurious Dragon gas schedule (EIP-160 EXP repricing).
pub static SPURIOUS_DRAGON_SCHEDULE: GasSchedule = GasSchedule {
    exp_byte: 50,
    ..TANGERINE_WHISTLE_SCHEDULE
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontier_schedule() {
        let schedule = GasSchedule::for_fork(Fork::Frontier);
        assert_eq!(schedule.sload, 50);
        assert_eq!(schedule.balance, 20);
        assert_eq!(schedule.call, 40);
        assert_eq!(schedule.selfdestruct, 0);
        assert_eq!(schedule.exp_byte, 10);
    }

    #[test]
    fn homestead_reuses_frontier_fees() {
        assert_eq!(
            GasSchedule::for_fork(Fork::Homestead),
            GasSchedule::for_fork(Fork::Frontier)
        );
    }

    #[test]
    fn tangerine_whistle_schedule() {
        let schedule = GasSchedule::for_fork(Fork::Tangerine);
        assert_eq!(schedule.sload, 200);
        assert_eq!(schedule.balance, 400);
        assert_eq!(schedule.call, 700);
        assert_eq!(schedule.selfdestruct, 5000);
        // EIP-150 left EXP alone.
        assert_eq!(schedule.exp_byte, 10);
    }

    #[test]
    fn spurious_dragon_schedule() {
        let schedule = GasSchedule::for_fork(Fork::SpuriousDragon);
        assert_eq!(schedule.exp_byte, 50);
        assert_eq!(schedule.sload, 200);
    }
}
