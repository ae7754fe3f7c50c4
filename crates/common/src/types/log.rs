use crate::{Address, H256};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A log entry emitted by one of the LOG0..LOG4 opcodes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
}
