use crate::db::World;
use bytes::Bytes;
use etna_common::{
    evm::calculate_create_address,
    types::Account,
    Address, H256, U256,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference world state backed by plain maps.
///
/// Used by the test suites and as a scratch state for embedders; a real
/// node backs the [`World`] trait with its account trie instead. Cloning is
/// a deep copy, which is exactly what the child-frame snapshot contract
/// needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryWorld {
    accounts: BTreeMap<Address, Account>,
    block_hashes: BTreeMap<u64, H256>,
    /// Nonce newly initialised contract accounts start with: 0 before
    /// EIP-161, 1 after.
    account_start_nonce: u64,
}

impl InMemoryWorld {
    pub fn new(account_start_nonce: u64) -> Self {
        InMemoryWorld {
            account_start_nonce,
            ..Default::default()
        }
    }

    pub fn with_account(mut self, address: Address, account: Account) -> Self {
        self.accounts.insert(address, account);
        self
    }

    pub fn with_block_hash(mut self, number: u64, hash: H256) -> Self {
        self.block_hashes.insert(number, hash);
        self
    }

    pub fn account(&self, address: Address) -> Option<&Account> {
        self.accounts.get(&address)
    }

    fn increment_nonce(&mut self, address: Address) {
        let account = self.accounts.entry(address).or_default();
        account.info.nonce = account.info.nonce.wrapping_add(1);
    }
}

impl World for InMemoryWorld {
    fn get_balance(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|account| account.info.balance)
            .unwrap_or_default()
    }

    fn get_nonce(&self, address: Address) -> u64 {
        self.accounts
            .get(&address)
            .map(|account| account.info.nonce)
            .unwrap_or_default()
    }

    fn get_code(&self, address: Address) -> Bytes {
        self.accounts
            .get(&address)
            .map(|account| account.code.clone())
            .unwrap_or_default()
    }

    fn get_storage(&self, address: Address, key: U256) -> U256 {
        self.accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key))
            .copied()
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: Address, key: U256, value: U256) {
        let storage = &mut self.accounts.entry(address).or_default().storage;
        if value.is_zero() {
            storage.remove(&key);
        } else {
            storage.insert(key, value);
        }
    }

    fn get_block_hash(&self, block_number: U256) -> Option<H256> {
        u64::try_from(block_number)
            .ok()
            .and_then(|number| self.block_hashes.get(&number).copied())
    }

    fn account_exists(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    fn is_account_dead(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .map(Account::is_dead)
            .unwrap_or(true)
    }

    fn has_code_or_nonce(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .map(Account::has_code_or_nonce)
            .unwrap_or(false)
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) {
        if from == to {
            self.accounts.entry(to).or_default();
            return;
        }
        {
            let sender = self.accounts.entry(from).or_default();
            sender.info.balance = sender.info.balance.saturating_sub(value);
        }
        let receiver = self.accounts.entry(to).or_default();
        receiver.info.balance = receiver.info.balance.saturating_add(value);
    }

    fn remove_all_ether(&mut self, address: Address) {
        if let Some(account) = self.accounts.get_mut(&address) {
            account.info.balance = U256::zero();
        }
    }

    fn initialise_account(&mut self, address: Address) {
        let account = self.accounts.entry(address).or_default();
        account.info.nonce = self.account_start_nonce;
        account.code = Bytes::new();
        account.storage = BTreeMap::new();
    }

    fn create_address(&mut self, creator: Address) -> Address {
        let nonce = self.get_nonce(creator);
        let address = calculate_create_address(creator, nonce);
        self.increment_nonce(creator);
        address
    }

    fn save_code(&mut self, address: Address, code: Bytes) {
        self.accounts.entry(address).or_default().code = code;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_accounts_read_as_zero() {
        let world = InMemoryWorld::default();
        let address = Address::repeat_byte(1);
        assert_eq!(world.get_balance(address), U256::zero());
        assert_eq!(world.get_nonce(address), 0);
        assert!(world.get_code(address).is_empty());
        assert_eq!(world.get_storage(address, U256::one()), U256::zero());
        assert!(world.is_account_dead(address));
        assert!(!world.account_exists(address));
    }

    #[test]
    fn transfer_creates_the_receiver() {
        let from = Address::repeat_byte(1);
        let to = Address::repeat_byte(2);
        let mut world = InMemoryWorld::default()
            .with_account(from, Account::new(U256::from(100), 0, Bytes::new()));

        world.transfer(from, to, U256::from(30));
        assert_eq!(world.get_balance(from), U256::from(70));
        assert_eq!(world.get_balance(to), U256::from(30));
        assert!(world.account_exists(to));

        // Self transfers move nothing.
        world.transfer(from, from, U256::from(10));
        assert_eq!(world.get_balance(from), U256::from(70));
    }

    #[test]
    fn create_address_bumps_the_creator_nonce() {
        let creator = Address::repeat_byte(3);
        let mut world = InMemoryWorld::default();
        let first = world.create_address(creator);
        let second = world.create_address(creator);
        assert_ne!(first, second);
        assert_eq!(world.get_nonce(creator), 2);
    }

    #[test]
    fn initialise_account_keeps_the_balance() {
        let address = Address::repeat_byte(4);
        let mut account = Account::new(U256::from(5), 7, Bytes::from_static(b"\x60"));
        account.storage.insert(U256::one(), U256::one());
        let mut world = InMemoryWorld::new(1).with_account(address, account);

        world.initialise_account(address);
        let account = world.account(address).unwrap();
        assert_eq!(account.info.balance, U256::from(5));
        assert_eq!(account.info.nonce, 1);
        assert!(account.code.is_empty());
        assert!(account.storage.is_empty());
    }
}
