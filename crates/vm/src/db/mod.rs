use bytes::Bytes;
use etna_common::{Address, H256, U256};

pub mod in_memory;

pub use in_memory::InMemoryWorld;

/// Account-level state outside the current frame.
///
/// Every method is total: absent accounts read as balance 0, nonce 0, empty
/// code, and all-zero storage. Mutations only ever go through these methods,
/// which is what makes the child-frame contract work: the VM clones the
/// world for a child call and adopts the clone only when the child
/// succeeds, so a failed child leaves the parent's snapshot untouched.
pub trait World: Clone {
    fn get_balance(&self, address: Address) -> U256;
    fn get_nonce(&self, address: Address) -> u64;
    fn get_code(&self, address: Address) -> Bytes;
    fn get_code_size(&self, address: Address) -> usize {
        self.get_code(address).len()
    }

    /// Cold miss reads as zero.
    fn get_storage(&self, address: Address, key: U256) -> U256;
    fn set_storage(&mut self, address: Address, key: U256, value: U256);

    fn get_block_hash(&self, block_number: U256) -> Option<H256>;

    fn account_exists(&self, address: Address) -> bool;
    /// Dead per EIP-161: no code, zero nonce, zero balance (or absent).
    fn is_account_dead(&self, address: Address) -> bool;
    /// True when a create landing on `address` must abort (EIP-684).
    fn has_code_or_nonce(&self, address: Address) -> bool;

    /// Moves `value` between accounts; the caller has already checked the
    /// sender's balance. Transferring to an absent account brings it into
    /// existence.
    fn transfer(&mut self, from: Address, to: Address, value: U256);
    /// Burns the account's entire balance (SELFDESTRUCT to self).
    fn remove_all_ether(&mut self, address: Address);

    /// Resets `address` to a fresh contract account: start nonce, no code,
    /// empty storage. Any existing balance stays.
    fn initialise_account(&mut self, address: Address);
    /// Derives the address a CREATE by `creator` lands on and bumps the
    /// creator's nonce.
    fn create_address(&mut self, creator: Address) -> Address;
    fn save_code(&mut self, address: Address, code: Bytes);
}
