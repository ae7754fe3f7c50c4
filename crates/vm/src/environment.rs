use crate::config::EvmConfig;
use etna_common::{types::BlockHeader, Address, U256};

/// Transaction- and block-level context, identical for every frame of one
/// execution.
#[derive(Clone, Debug)]
pub struct Environment {
    /// Externally-owned account that signed the enclosing transaction.
    pub origin: Address,
    pub gas_price: U256,
    pub block: BlockHeader,
    pub config: EvmConfig,
}

impl Environment {
    pub fn new(origin: Address, gas_price: U256, block: BlockHeader, config: EvmConfig) -> Self {
        Environment {
            origin,
            gas_price,
            block,
            config,
        }
    }
}
