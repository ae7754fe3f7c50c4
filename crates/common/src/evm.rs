//! Contract address derivation.

use crate::Address;
use keccak_hash::keccak;

/// Derives the address of a contract created with the CREATE opcode (or a
/// create transaction): the low 20 bytes of `keccak256(rlp([sender, nonce]))`.
pub fn calculate_create_address(sender: Address, nonce: u64) -> Address {
    let payload = rlp_address_nonce(sender, nonce);
    Address::from_slice(&keccak(payload).0[12..])
}

/// RLP encoding of the two-item list `[sender, nonce]`.
///
/// The payload is at most 30 bytes, so the short-list header always applies.
fn rlp_address_nonce(sender: Address, nonce: u64) -> Vec<u8> {
    let nonce_bytes = if nonce == 0 {
        vec![0x80]
    } else {
        let be = nonce.to_be_bytes();
        let significant = &be[be.iter().position(|b| *b != 0).unwrap_or(7)..];
        if significant.len() == 1 && significant[0] < 0x80 {
            significant.to_vec()
        } else {
            let mut out = vec![0x80 + significant.len() as u8];
            out.extend_from_slice(significant);
            out
        }
    };

    let payload_len = 21 + nonce_bytes.len();
    let mut out = Vec::with_capacity(payload_len + 1);
    out.push(0xc0 + payload_len as u8);
    out.push(0x80 + 20);
    out.extend_from_slice(sender.as_bytes());
    out.extend(nonce_bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_address_known_vector() {
        // First contract deployed by 0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0
        // (nonce 0) lives at 0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d.
        let sender: Address = "6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0"
            .parse()
            .unwrap();
        let expected: Address = "cd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"
            .parse()
            .unwrap();
        assert_eq!(calculate_create_address(sender, 0), expected);
    }

    #[test]
    fn nonce_encoding_boundaries() {
        // 0 encodes as the empty string, 1..=0x7f as a single byte, larger
        // values get a length prefix. Distinct nonces must yield distinct
        // addresses.
        let sender = Address::repeat_byte(0x11);
        let a0 = calculate_create_address(sender, 0);
        let a1 = calculate_create_address(sender, 1);
        let a127 = calculate_create_address(sender, 127);
        let a128 = calculate_create_address(sender, 128);
        let all = [a0, a1, a127, a128];
        for (i, x) in all.iter().enumerate() {
            for y in &all[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }
}
