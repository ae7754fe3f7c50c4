//! # Exchange operations
//!
//! `SWAP1` through `SWAP16`.

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    vm::VM,
};

impl<W: World> VM<W> {
    // Generic SWAP operation; N is the one-based depth of the word the top
    // is exchanged with.
    pub fn op_swap<const N: usize>(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        self.call_frame.stack.swap::<N>()?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
