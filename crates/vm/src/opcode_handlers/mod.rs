use crate::{
    db::World,
    errors::{ExceptionalHalt, OpcodeResult, VMError},
    vm::VM,
};

pub mod arithmetic;
pub mod bitwise_comparison;
pub mod block;
pub mod dup;
pub mod environment;
pub mod exchange;
pub mod keccak;
pub mod logging;
pub mod push;
pub mod stack_memory_storage_flow;
pub mod system;

impl<W: World> VM<W> {
    // STOP operation
    pub fn op_stop(&mut self) -> Result<OpcodeResult, VMError> {
        Ok(OpcodeResult::Halt)
    }

    // INVALID operation, also the fate of every unassigned byte.
    // Reports the byte actually read from the code.
    pub fn op_invalid(&mut self, raw_byte: u8) -> Result<OpcodeResult, VMError> {
        Err(ExceptionalHalt::InvalidOpcode(raw_byte).into())
    }
}
