use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Any way an opcode can fail to complete.
///
/// `ExceptionalHalt` variants are consensus faults: they freeze the current
/// frame, consume its remaining gas, and are reported as values on the
/// execution report. `Internal` variants are interpreter defects that must
/// never occur on any input; they bubble out of the driver as a hard error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VMError {
    #[error("exceptional halt: {0}")]
    ExceptionalHalt(#[from] ExceptionalHalt),
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

/// Terminal frame faults. The set is part of the consensus surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ExceptionalHalt {
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack overflow")]
    StackOverflow,
    #[error("out of gas")]
    OutOfGas,
    #[error("invalid jump destination {0}")]
    InvalidJump(usize),
    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),
}

/// Bookkeeping defects: arithmetic that cannot overflow overflowed, a gas
/// credit exceeded the frame budget, and the like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("slice out of bounds")]
    Slicing,
}

/// Outcome of a successfully executed opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpcodeResult {
    Continue { pc_increment: usize },
    Halt,
}
