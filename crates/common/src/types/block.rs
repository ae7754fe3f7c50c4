use crate::{Address, U256};
use serde::{Deserialize, Serialize};

/// The block header fields the interpreter can observe.
///
/// Header sourcing and validation belong to the surrounding client; the VM
/// only reads these values through BLOCKHASH/COINBASE/TIMESTAMP/NUMBER/
/// DIFFICULTY/GASLIMIT.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub beneficiary: Address,
    pub number: U256,
    pub difficulty: U256,
    pub gas_limit: u64,
    pub timestamp: u64,
}
