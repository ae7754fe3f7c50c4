use crate::{
    constants::STACK_LIMIT,
    errors::{ExceptionalHalt, InternalError, VMError},
    memory::Memory,
    program::Program,
};
use bytes::Bytes;
use etna_common::{Address, U256};

/// The operand stack: at most 1024 words, top at the end.
///
/// The driver's preflight guarantees arity before an opcode runs, so the
/// bounds checks here are the backstop, not the primary defense.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    values: Vec<U256>,
}

impl Stack {
    pub fn new() -> Self {
        Stack {
            values: Vec::with_capacity(32),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: U256) -> Result<(), VMError> {
        if self.values.len() >= STACK_LIMIT {
            return Err(ExceptionalHalt::StackOverflow.into());
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop1(&mut self) -> Result<U256, VMError> {
        self.values
            .pop()
            .ok_or_else(|| ExceptionalHalt::StackUnderflow.into())
    }

    /// Pops `N` words, topmost first.
    pub fn pop<const N: usize>(&mut self) -> Result<[U256; N], VMError> {
        if self.values.len() < N {
            return Err(ExceptionalHalt::StackUnderflow.into());
        }
        let mut out = [U256::zero(); N];
        for slot in out.iter_mut() {
            *slot = self
                .values
                .pop()
                .ok_or(ExceptionalHalt::StackUnderflow)?;
        }
        Ok(out)
    }

    /// The word at `depth` below the top (0 = top) without popping.
    pub fn peek(&self, depth: usize) -> Result<U256, VMError> {
        self.values
            .len()
            .checked_sub(depth + 1)
            .and_then(|index| self.values.get(index).copied())
            .ok_or_else(|| ExceptionalHalt::StackUnderflow.into())
    }

    /// Duplicates the word at `depth` (0 = top) onto the top of the stack.
    pub fn dup<const N: usize>(&mut self) -> Result<(), VMError> {
        let value = self.peek(N)?;
        self.push(value)
    }

    /// Swaps the top with the word at `depth` (1 = just below the top).
    pub fn swap<const N: usize>(&mut self) -> Result<(), VMError> {
        let top = self
            .values
            .len()
            .checked_sub(1)
            .ok_or(ExceptionalHalt::StackUnderflow)?;
        let other = self
            .values
            .len()
            .checked_sub(N + 1)
            .ok_or(ExceptionalHalt::StackUnderflow)?;
        self.values.swap(top, other);
        Ok(())
    }
}

/// The mutable execution context of a single frame.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Address whose invocation created this frame (CALLER).
    pub msg_sender: Address,
    /// Account whose storage and balance this frame operates on (ADDRESS).
    pub to: Address,
    /// Account the running code was loaded from; differs from `to` for
    /// CALLCODE and DELEGATECALL.
    pub code_address: Address,
    pub msg_value: U256,
    pub calldata: Bytes,
    pub program: Program,
    pub stack: Stack,
    pub memory: Memory,
    pub pc: usize,
    pub gas_limit: u64,
    pub gas_remaining: u64,
    pub depth: u16,
    pub output: Bytes,
}

impl CallFrame {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        msg_sender: Address,
        to: Address,
        code_address: Address,
        program: Program,
        msg_value: U256,
        calldata: Bytes,
        gas_limit: u64,
        depth: u16,
    ) -> Self {
        CallFrame {
            msg_sender,
            to,
            code_address,
            msg_value,
            calldata,
            program,
            stack: Stack::new(),
            memory: Memory::new(),
            pc: 0,
            gas_limit,
            gas_remaining: gas_limit,
            depth,
            output: Bytes::new(),
        }
    }

    /// Charges `cost` gas; exhaustion is a terminal `OutOfGas`.
    pub fn increase_consumed_gas(&mut self, cost: u64) -> Result<(), VMError> {
        self.gas_remaining = self
            .gas_remaining
            .checked_sub(cost)
            .ok_or(ExceptionalHalt::OutOfGas)?;
        Ok(())
    }

    /// Credits gas back, e.g. a child frame's leftover. The call stipend
    /// can push the balance past the original limit, so this only guards
    /// against arithmetic overflow.
    pub fn return_gas(&mut self, gas: u64) -> Result<(), VMError> {
        self.gas_remaining = self
            .gas_remaining
            .checked_add(gas)
            .ok_or(InternalError::Overflow)?;
        Ok(())
    }

    pub fn next_opcode_byte(&self) -> u8 {
        self.program.opcode_byte_at(self.pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_returns_topmost_first() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();
        stack.push(U256::from(3)).unwrap();
        let [a, b] = stack.pop().unwrap();
        assert_eq!(a, U256::from(3));
        assert_eq!(b, U256::from(2));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn underflow_and_overflow_are_signalled() {
        let mut stack = Stack::new();
        assert!(stack.pop1().is_err());
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).unwrap();
        }
        assert!(stack.push(U256::zero()).is_err());
    }

    #[test]
    fn dup_copies_the_addressed_word_to_the_top() {
        let mut stack = Stack::new();
        stack.push(U256::from(10)).unwrap();
        stack.push(U256::from(20)).unwrap();

        // DUP2 copies the word one below the top.
        stack.dup::<1>().unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(10));
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn swap_exchanges_top_with_the_addressed_word() {
        let mut stack = Stack::new();
        for value in [1u64, 2, 3] {
            stack.push(U256::from(value)).unwrap();
        }

        // SWAP2 exchanges the top with the third word.
        stack.swap::<2>().unwrap();
        assert_eq!(stack.peek(0).unwrap(), U256::from(1));
        assert_eq!(stack.peek(1).unwrap(), U256::from(2));
        assert_eq!(stack.peek(2).unwrap(), U256::from(3));
    }

    #[test]
    fn gas_accounting() {
        let mut frame = CallFrame::new(
            Address::zero(),
            Address::zero(),
            Address::zero(),
            Program::default(),
            U256::zero(),
            Bytes::new(),
            100,
            0,
        );
        frame.increase_consumed_gas(60).unwrap();
        assert_eq!(frame.gas_remaining, 40);
        assert!(frame.increase_consumed_gas(41).is_err());
        frame.return_gas(10).unwrap();
        assert_eq!(frame.gas_remaining, 50);
    }
}
