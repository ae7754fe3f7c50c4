use etna_common::U256;

pub const WORD_SIZE_IN_BYTES_USIZE: usize = 32;

/// Word pushed by CALL-family opcodes on success.
pub const SUCCESS: U256 = U256::one();
/// Word pushed by CALL/CREATE-family opcodes on failure.
pub const FAIL: U256 = U256::zero();

pub const STACK_LIMIT: usize = 1024;
pub const MAX_CALL_DEPTH: u16 = 1024;

pub const MEMORY_EXPANSION_QUOTIENT: u64 = 512;

/// EIP-170 contract code size limit, active from Spurious Dragon.
pub const MAX_CODE_SIZE: usize = 0x6000;

/// BLOCKHASH reaches at most this many blocks into the past.
pub const LAST_AVAILABLE_BLOCK_LIMIT: U256 = U256([256, 0, 0, 0]);
