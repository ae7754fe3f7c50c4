use crate::{
    call_frame::CallFrame,
    constants::STACK_LIMIT,
    db::World,
    environment::Environment,
    errors::{ExceptionalHalt, InternalError, OpcodeResult, VMError},
    gas_schedule::GasSchedule,
    opcodes::Opcode,
};
use bytes::Bytes;
use etna_common::{types::Log, Address, U256};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Side effects accumulated by a frame and its committed children.
///
/// On child success the parent absorbs the child's substate; on child
/// failure it is dropped with the child's world. Sets are ordered so the
/// report is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Substate {
    pub logs: Vec<Log>,
    pub internal_txs: Vec<InternalTransaction>,
    pub addresses_to_delete: BTreeSet<Address>,
    pub touched_accounts: BTreeSet<Address>,
    pub refunded_gas: u64,
}

impl Substate {
    pub fn merge(&mut self, child: Substate) {
        self.logs.extend(child.logs);
        self.internal_txs.extend(child.internal_txs);
        self.addresses_to_delete.extend(child.addresses_to_delete);
        self.touched_accounts.extend(child.touched_accounts);
        self.refunded_gas = self.refunded_gas.saturating_add(child.refunded_gas);
    }
}

/// Trace record of a committed CALL-family or CREATE frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InternalTransaction {
    pub op: Opcode,
    pub from: Address,
    /// `None` for creations; the target address is the pushed word.
    pub to: Option<Address>,
    pub gas_limit: u64,
    pub data: Bytes,
    pub value: U256,
}

/// Everything a finished frame hands back to its caller.
#[derive(Clone, Debug)]
pub struct ExecutionReport<W> {
    pub output: Bytes,
    pub gas_remaining: u64,
    pub gas_refunded: u64,
    pub world: W,
    pub logs: Vec<Log>,
    pub internal_txs: Vec<InternalTransaction>,
    pub addresses_to_delete: BTreeSet<Address>,
    pub touched_accounts: BTreeSet<Address>,
    /// `None` means the frame halted normally; the parent distinguishes
    /// "error" from "halted with return data" by inspecting this.
    pub error: Option<ExceptionalHalt>,
}

impl<W> ExecutionReport<W> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// One frame of EVM execution.
///
/// Nested CREATE/CALL builds a child `VM` with a cloned world and runs it
/// recursively; the recursion is bounded by the 1024 call depth limit.
#[derive(Clone, Debug)]
pub struct VM<W: World> {
    pub call_frame: CallFrame,
    pub env: Environment,
    pub world: W,
    pub substate: Substate,
}

impl<W: World> VM<W> {
    pub fn new(env: Environment, world: W, call_frame: CallFrame) -> Self {
        VM {
            call_frame,
            env,
            world,
            substate: Substate::default(),
        }
    }

    /// Fetch-decode-execute until the frame halts or faults.
    ///
    /// Consensus faults land in `report.error` with the frame's gas fully
    /// consumed; only interpreter defects surface as `Err`. The machine
    /// itself stays inspectable after the run.
    pub fn run(&mut self) -> Result<ExecutionReport<W>, InternalError> {
        trace!(
            to = ?self.call_frame.to,
            depth = self.call_frame.depth,
            gas = self.call_frame.gas_limit,
            "frame start"
        );

        loop {
            let raw_byte = self.call_frame.next_opcode_byte();
            let opcode = self.decode(raw_byte);

            match self.execute_opcode(opcode, raw_byte) {
                Ok(OpcodeResult::Continue { pc_increment }) => {
                    self.call_frame.pc = self.call_frame.pc.wrapping_add(pc_increment);
                }
                Ok(OpcodeResult::Halt) => return Ok(self.into_report(None)),
                Err(VMError::ExceptionalHalt(halt)) => {
                    debug!(?halt, pc = self.call_frame.pc, "frame fault");
                    return Ok(self.into_report(Some(halt)));
                }
                Err(VMError::Internal(error)) => return Err(error),
            }
        }
    }

    /// Decodes a byte, hiding opcodes the configured fork does not have.
    fn decode(&self, byte: u8) -> Opcode {
        let opcode = Opcode::from(byte);
        if opcode == Opcode::DELEGATECALL && !self.env.config.has_delegatecall {
            return Opcode::INVALID;
        }
        opcode
    }

    /// Stack-arity preflight, strictly before any gas is charged:
    /// underflow first, then overflow.
    fn preflight(&self, opcode: Opcode) -> Result<(), VMError> {
        let (delta, alpha) = opcode.stack_io();
        let size = self.call_frame.stack.len();
        if size < delta {
            return Err(ExceptionalHalt::StackUnderflow.into());
        }
        if size - delta + alpha > STACK_LIMIT {
            return Err(ExceptionalHalt::StackOverflow.into());
        }
        Ok(())
    }

    fn execute_opcode(&mut self, opcode: Opcode, raw_byte: u8) -> Result<OpcodeResult, VMError> {
        self.preflight(opcode)?;

        match opcode {
            Opcode::STOP => self.op_stop(),
            Opcode::ADD => self.op_add(),
            Opcode::MUL => self.op_mul(),
            Opcode::SUB => self.op_sub(),
            Opcode::DIV => self.op_div(),
            Opcode::SDIV => self.op_sdiv(),
            Opcode::MOD => self.op_mod(),
            Opcode::SMOD => self.op_smod(),
            Opcode::ADDMOD => self.op_addmod(),
            Opcode::MULMOD => self.op_mulmod(),
            Opcode::EXP => self.op_exp(),
            Opcode::SIGNEXTEND => self.op_signextend(),
            Opcode::LT => self.op_lt(),
            Opcode::GT => self.op_gt(),
            Opcode::SLT => self.op_slt(),
            Opcode::SGT => self.op_sgt(),
            Opcode::EQ => self.op_eq(),
            Opcode::ISZERO => self.op_iszero(),
            Opcode::AND => self.op_and(),
            Opcode::OR => self.op_or(),
            Opcode::XOR => self.op_xor(),
            Opcode::NOT => self.op_not(),
            Opcode::BYTE => self.op_byte(),
            Opcode::SHA3 => self.op_sha3(),
            Opcode::ADDRESS => self.op_address(),
            Opcode::BALANCE => self.op_balance(),
            Opcode::ORIGIN => self.op_origin(),
            Opcode::CALLER => self.op_caller(),
            Opcode::CALLVALUE => self.op_callvalue(),
            Opcode::CALLDATALOAD => self.op_calldataload(),
            Opcode::CALLDATASIZE => self.op_calldatasize(),
            Opcode::CALLDATACOPY => self.op_calldatacopy(),
            Opcode::CODESIZE => self.op_codesize(),
            Opcode::CODECOPY => self.op_codecopy(),
            Opcode::GASPRICE => self.op_gasprice(),
            Opcode::EXTCODESIZE => self.op_extcodesize(),
            Opcode::EXTCODECOPY => self.op_extcodecopy(),
            Opcode::BLOCKHASH => self.op_blockhash(),
            Opcode::COINBASE => self.op_coinbase(),
            Opcode::TIMESTAMP => self.op_timestamp(),
            Opcode::NUMBER => self.op_number(),
            Opcode::DIFFICULTY => self.op_difficulty(),
            Opcode::GASLIMIT => self.op_gaslimit(),
            Opcode::POP => self.op_pop(),
            Opcode::MLOAD => self.op_mload(),
            Opcode::MSTORE => self.op_mstore(),
            Opcode::MSTORE8 => self.op_mstore8(),
            Opcode::SLOAD => self.op_sload(),
            Opcode::SSTORE => self.op_sstore(),
            Opcode::JUMP => self.op_jump(),
            Opcode::JUMPI => self.op_jumpi(),
            Opcode::PC => self.op_pc(),
            Opcode::MSIZE => self.op_msize(),
            Opcode::GAS => self.op_gas(),
            Opcode::JUMPDEST => self.op_jumpdest(),
            Opcode::PUSH1 => self.op_push::<1>(),
            Opcode::PUSH2 => self.op_push::<2>(),
            Opcode::PUSH3 => self.op_push::<3>(),
            Opcode::PUSH4 => self.op_push::<4>(),
            Opcode::PUSH5 => self.op_push::<5>(),
            Opcode::PUSH6 => self.op_push::<6>(),
            Opcode::PUSH7 => self.op_push::<7>(),
            Opcode::PUSH8 => self.op_push::<8>(),
            Opcode::PUSH9 => self.op_push::<9>(),
            Opcode::PUSH10 => self.op_push::<10>(),
            Opcode::PUSH11 => self.op_push::<11>(),
            Opcode::PUSH12 => self.op_push::<12>(),
            Opcode::PUSH13 => self.op_push::<13>(),
            Opcode::PUSH14 => self.op_push::<14>(),
            Opcode::PUSH15 => self.op_push::<15>(),
            Opcode::PUSH16 => self.op_push::<16>(),
            Opcode::PUSH17 => self.op_push::<17>(),
            Opcode::PUSH18 => self.op_push::<18>(),
            Opcode::PUSH19 => self.op_push::<19>(),
            Opcode::PUSH20 => self.op_push::<20>(),
            Opcode::PUSH21 => self.op_push::<21>(),
            Opcode::PUSH22 => self.op_push::<22>(),
            Opcode::PUSH23 => self.op_push::<23>(),
            Opcode::PUSH24 => self.op_push::<24>(),
            Opcode::PUSH25 => self.op_push::<25>(),
            Opcode::PUSH26 => self.op_push::<26>(),
            Opcode::PUSH27 => self.op_push::<27>(),
            Opcode::PUSH28 => self.op_push::<28>(),
            Opcode::PUSH29 => self.op_push::<29>(),
            Opcode::PUSH30 => self.op_push::<30>(),
            Opcode::PUSH31 => self.op_push::<31>(),
            Opcode::PUSH32 => self.op_push::<32>(),
            Opcode::DUP1 => self.op_dup::<0>(),
            Opcode::DUP2 => self.op_dup::<1>(),
            Opcode::DUP3 => self.op_dup::<2>(),
            Opcode::DUP4 => self.op_dup::<3>(),
            Opcode::DUP5 => self.op_dup::<4>(),
            Opcode::DUP6 => self.op_dup::<5>(),
            Opcode::DUP7 => self.op_dup::<6>(),
            Opcode::DUP8 => self.op_dup::<7>(),
            Opcode::DUP9 => self.op_dup::<8>(),
            Opcode::DUP10 => self.op_dup::<9>(),
            Opcode::DUP11 => self.op_dup::<10>(),
            Opcode::DUP12 => self.op_dup::<11>(),
            Opcode::DUP13 => self.op_dup::<12>(),
            Opcode::DUP14 => self.op_dup::<13>(),
            Opcode::DUP15 => self.op_dup::<14>(),
            Opcode::DUP16 => self.op_dup::<15>(),
            Opcode::SWAP1 => self.op_swap::<1>(),
            Opcode::SWAP2 => self.op_swap::<2>(),
            Opcode::SWAP3 => self.op_swap::<3>(),
            Opcode::SWAP4 => self.op_swap::<4>(),
            Opcode::SWAP5 => self.op_swap::<5>(),
            Opcode::SWAP6 => self.op_swap::<6>(),
            Opcode::SWAP7 => self.op_swap::<7>(),
            Opcode::SWAP8 => self.op_swap::<8>(),
            Opcode::SWAP9 => self.op_swap::<9>(),
            Opcode::SWAP10 => self.op_swap::<10>(),
            Opcode::SWAP11 => self.op_swap::<11>(),
            Opcode::SWAP12 => self.op_swap::<12>(),
            Opcode::SWAP13 => self.op_swap::<13>(),
            Opcode::SWAP14 => self.op_swap::<14>(),
            Opcode::SWAP15 => self.op_swap::<15>(),
            Opcode::SWAP16 => self.op_swap::<16>(),
            Opcode::LOG0 => self.op_log::<0>(),
            Opcode::LOG1 => self.op_log::<1>(),
            Opcode::LOG2 => self.op_log::<2>(),
            Opcode::LOG3 => self.op_log::<3>(),
            Opcode::LOG4 => self.op_log::<4>(),
            Opcode::CREATE => self.op_create(),
            Opcode::CALL => self.op_call(),
            Opcode::CALLCODE => self.op_callcode(),
            Opcode::RETURN => self.op_return(),
            Opcode::DELEGATECALL => self.op_delegatecall(),
            Opcode::INVALID => self.op_invalid(raw_byte),
            Opcode::SELFDESTRUCT => self.op_selfdestruct(),
        }
    }

    pub(crate) fn schedule(&self) -> &'static GasSchedule {
        self.env.config.schedule
    }

    fn into_report(&mut self, error: Option<ExceptionalHalt>) -> ExecutionReport<W> {
        if error.is_some() {
            // A terminal fault consumes everything the frame had left.
            self.call_frame.gas_remaining = 0;
        }

        trace!(
            to = ?self.call_frame.to,
            depth = self.call_frame.depth,
            gas_remaining = self.call_frame.gas_remaining,
            ?error,
            "frame end"
        );

        ExecutionReport {
            output: std::mem::take(&mut self.call_frame.output),
            gas_remaining: self.call_frame.gas_remaining,
            gas_refunded: self.substate.refunded_gas,
            world: self.world.clone(),
            logs: std::mem::take(&mut self.substate.logs),
            internal_txs: std::mem::take(&mut self.substate.internal_txs),
            addresses_to_delete: std::mem::take(&mut self.substate.addresses_to_delete),
            touched_accounts: std::mem::take(&mut self.substate.touched_accounts),
            error,
        }
    }
}
