//! # Push operations
//!
//! `PUSH1` through `PUSH32`.

use crate::{
    db::World,
    errors::{OpcodeResult, VMError},
    vm::VM,
};
use etna_common::{utils::u256_from_big_endian_const, U256};

impl<W: World> VM<W> {
    // Generic PUSH operation, monomorphized per immediate width.
    pub fn op_push<const N: usize>(&mut self) -> Result<OpcodeResult, VMError> {
        self.call_frame
            .increase_consumed_gas(self.schedule().very_low)?;

        // The immediate starts right after the opcode byte. Code may be
        // truncated mid-immediate; the missing bytes read as zeros on the
        // right.
        let start = self.call_frame.pc.wrapping_add(1);
        let code = self.call_frame.program.code();

        let mut immediate = [0u8; N];
        if let Some(available) = code.get(start..code.len().min(start.wrapping_add(N))) {
            immediate[..available.len()].copy_from_slice(available);
        }
        let value: U256 = u256_from_big_endian_const(immediate);
        self.call_frame.stack.push(value)?;

        // Skip the immediate plus the opcode itself.
        Ok(OpcodeResult::Continue {
            pc_increment: N.wrapping_add(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        call_frame::CallFrame,
        config::EvmConfig,
        db::InMemoryWorld,
        environment::Environment,
        program::Program,
        vm::VM,
    };
    use bytes::Bytes;
    use etna_common::{types::{BlockHeader, Fork}, Address, U256};

    fn vm_for(code: &[u8]) -> VM<InMemoryWorld> {
        let env = Environment::new(
            Address::zero(),
            U256::zero(),
            BlockHeader::default(),
            EvmConfig::for_fork(Fork::Homestead),
        );
        let frame = CallFrame::new(
            Address::zero(),
            Address::zero(),
            Address::zero(),
            Program::from(code),
            U256::zero(),
            Bytes::new(),
            100_000,
            0,
        );
        VM::new(env, InMemoryWorld::default(), frame)
    }

    #[test]
    fn truncated_immediate_is_right_padded() {
        // PUSH4 with only two immediate bytes present; the frame halts on
        // the implicit STOP past the end of code.
        let mut vm = vm_for(&[0x63, 0xaa, 0xbb]);
        let report = vm.run().unwrap();
        assert!(report.is_success());
        assert_eq!(
            vm.call_frame.stack.peek(0).unwrap(),
            U256::from(0xaabb0000u64)
        );
        assert_eq!(report.gas_remaining, 100_000 - 3);
    }

    #[test]
    fn push32_spans_a_full_word() {
        let mut code = vec![0x7f];
        code.extend(std::iter::repeat(0x11).take(32));
        code.push(0x00);
        let mut vm = vm_for(&code);
        let report = vm.run().unwrap();
        assert!(report.is_success());
        let word = vm.call_frame.stack.peek(0).unwrap();
        assert_eq!(word, U256::from_big_endian(&[0x11u8; 32]));
    }
}
