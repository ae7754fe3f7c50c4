use crate::errors::{ExceptionalHalt, VMError};
use etna_common::{utils::u256_from_big_endian_const, Address, U256};

#[inline]
pub fn word_to_address(word: U256) -> Address {
    let mut bytes = [0u8; 32];
    for i in 0..4 {
        bytes[8 * i..8 * (i + 1)].copy_from_slice(&word.0[3 - i].to_be_bytes());
    }
    Address::from_slice(&bytes[12..])
}

#[inline]
pub fn address_to_word(address: Address) -> U256 {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(&address.0);
    u256_from_big_endian_const(bytes)
}

/// Converts a word to a machine size. A value that does not fit can never
/// be paid for as an offset or size, so it is `OutOfGas`.
pub fn u256_to_usize(value: U256) -> Result<usize, VMError> {
    value
        .try_into()
        .map_err(|_| ExceptionalHalt::OutOfGas.into())
}

/// Converts a `(size, offset)` operand pair into machine sizes.
///
/// A size that does not fit a machine word can never be paid for, so it is
/// `OutOfGas`. An oversized offset only matters when the size is non-zero;
/// a zero-size access never touches memory, whatever the offset.
pub fn size_offset_to_usize(size: U256, offset: U256) -> Result<(usize, usize), VMError> {
    let size: usize = size.try_into().map_err(|_| ExceptionalHalt::OutOfGas)?;
    let offset: usize = match offset.try_into() {
        Ok(offset) => offset,
        Err(_) if size == 0 => 0,
        Err(_) => return Err(ExceptionalHalt::OutOfGas.into()),
    };
    Ok((size, offset))
}

/// The clamped slice `bytes[min(len, offset) .. min(len, offset+size)]`,
/// right-padded with zeros to exactly `size` bytes. Shared by the
/// CALLDATA/CODE/EXTCODE copies and CALLDATALOAD.
pub fn padded_slice(bytes: &[u8], offset: usize, size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    let data = bytes
        .get(offset..)
        .unwrap_or_default();
    let copy_len = data.len().min(size);
    out[..copy_len].copy_from_slice(&data[..copy_len]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_word_round_trip() {
        let address = Address::repeat_byte(0xab);
        assert_eq!(word_to_address(address_to_word(address)), address);
        // High 12 bytes of the word are ignored on the way back.
        let tainted = address_to_word(address) | (U256::one() << 200);
        assert_eq!(word_to_address(tainted), address);
    }

    #[test]
    fn padded_slice_clamps_and_pads() {
        let data = [1u8, 2, 3];
        assert_eq!(padded_slice(&data, 0, 5), vec![1, 2, 3, 0, 0]);
        assert_eq!(padded_slice(&data, 2, 2), vec![3, 0]);
        assert_eq!(padded_slice(&data, 7, 3), vec![0, 0, 0]);
        assert_eq!(padded_slice(&data, 0, 0), Vec::<u8>::new());
    }

    #[test]
    fn zero_size_ignores_huge_offsets() {
        assert_eq!(
            size_offset_to_usize(U256::zero(), U256::MAX).unwrap(),
            (0, 0)
        );
        assert!(size_offset_to_usize(U256::MAX, U256::zero()).is_err());
    }
}
