use crate::U256;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Balance and nonce of an account, without its code or storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance: U256,
    pub nonce: u64,
}

/// A full account as seen by the interpreter: info plus code and storage.
///
/// Storage keys are ordered so iteration (and therefore any serialized
/// snapshot) is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub info: AccountInfo,
    pub code: Bytes,
    pub storage: BTreeMap<U256, U256>,
}

impl Account {
    pub fn new(balance: U256, nonce: u64, code: Bytes) -> Self {
        Account {
            info: AccountInfo { balance, nonce },
            code,
            storage: BTreeMap::new(),
        }
    }

    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    pub fn has_nonce(&self) -> bool {
        self.info.nonce != 0
    }

    /// A create landing on this account must abort (EIP-684).
    pub fn has_code_or_nonce(&self) -> bool {
        self.has_code() || self.has_nonce()
    }

    /// Dead account per EIP-161: no code, zero nonce, zero balance.
    pub fn is_dead(&self) -> bool {
        !self.has_code() && !self.has_nonce() && self.info.balance.is_zero()
    }
}
