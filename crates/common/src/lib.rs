//! Shared primitive types for the Etna EVM.
//!
//! Everything the interpreter and its embedders agree on lives here: the
//! 256-bit word and hash types (re-exported from `ethereum-types`), the
//! account model, block headers, log entries, the hard-fork enum, and the
//! byte/word conversion helpers used on the hot path.

pub mod evm;
pub mod types;
pub mod utils;

pub use ethereum_types::{Address, H256, U256, U512};
