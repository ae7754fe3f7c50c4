//! # Duplication operations
//!
//! `DUP1` through `DUP16`.

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    vm::VM,
};

impl<W: World> VM<W> {
    // Generic DUP operation; N is the zero-based depth of the word to copy.
    pub fn op_dup<const N: usize>(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        self.call_frame.stack.dup::<N>()?;

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }
}
