//! # System operations
//!
//! Includes the following opcodes:
//!   - `CREATE`
//!   - `CALL`
//!   - `CALLCODE`
//!   - `DELEGATECALL`
//!   - `RETURN`
//!   - `SELFDESTRUCT`
//!
//! CREATE and the CALL family build a child frame with a clone of the
//! world and run it recursively. The parent adopts the child's world and
//! substate only when the child succeeds; a faulted child leaves nothing
//! behind but its consumed gas.

use crate::{
    call_frame::CallFrame,
    constants::{FAIL, MAX_CALL_DEPTH, SUCCESS},
    db::World,
    errors::{InternalError, OpcodeResult, VMError},
    gas_cost,
    memory::calculate_memory_size,
    opcodes::Opcode,
    program::Program,
    utils::{address_to_word, size_offset_to_usize, word_to_address},
    vm::{ExecutionReport, InternalTransaction, Substate, VM},
};
use bytes::Bytes;
use etna_common::{Address, U256};

/// Init code substituted on an EIP-684 collision: a single INVALID byte,
/// guaranteeing the creation aborts and consumes the forwarded gas.
const ABORTING_INIT_CODE: [u8; 1] = [Opcode::INVALID as u8];

impl<W: World> VM<W> {
    // RETURN operation: halt with `mem[offset, +size]` as return data
    pub fn op_return(&mut self) -> Result<OpcodeResult, VMError> {
        let [offset, size] = self.call_frame.stack.pop()?;
        let (size, offset) = size_offset_to_usize(size, offset)?;

        self.call_frame
            .increase_consumed_gas(gas_cost::exit_opcode(
                calculate_memory_size(offset, size)?,
                self.call_frame.memory.len(),
                self.schedule(),
            )?)?;

        if size != 0 {
            self.call_frame.output = Bytes::from(self.call_frame.memory.load_range(offset, size)?);
        }

        Ok(OpcodeResult::Halt)
    }

    // CREATE operation
    pub fn op_create(&mut self) -> Result<OpcodeResult, VMError> {
        let [endowment, code_offset, code_size] = self.call_frame.stack.pop()?;
        let (code_size, code_offset) = size_offset_to_usize(code_size, code_offset)?;

        let new_memory_size = calculate_memory_size(code_offset, code_size)?;
        self.call_frame.increase_consumed_gas(gas_cost::create(
            new_memory_size,
            self.call_frame.memory.len(),
            self.schedule(),
        )?)?;

        let init_code = Bytes::from(self.call_frame.memory.load_range(code_offset, code_size)?);

        let deployer = self.call_frame.to;
        let new_depth = self
            .call_frame
            .depth
            .checked_add(1)
            .ok_or(InternalError::Overflow)?;

        // Depth and balance rule out the creation before any state moves.
        if new_depth > MAX_CALL_DEPTH || self.world.get_balance(deployer) < endowment {
            self.call_frame.stack.push(FAIL)?;
            return Ok(OpcodeResult::Continue { pc_increment: 1 });
        }

        // The child gets everything left, minus the 64th EIP-150 keeps
        // with the caller.
        let child_gas = self.env.config.gas_cap(self.call_frame.gas_remaining);
        self.call_frame.increase_consumed_gas(child_gas)?;

        // The nonce bump is the one creation effect that survives failure.
        let new_address = self.world.create_address(deployer);

        // EIP-684: a landing spot with code or nonce aborts the creation.
        let running_code = if self.world.has_code_or_nonce(new_address) {
            Bytes::from_static(&ABORTING_INIT_CODE)
        } else {
            init_code.clone()
        };

        let mut child_world = self.world.clone();
        child_world.initialise_account(new_address);
        child_world.transfer(deployer, new_address, endowment);

        let child_frame = CallFrame::new(
            deployer,
            new_address,
            new_address,
            Program::new(running_code),
            endowment,
            Bytes::new(),
            child_gas,
            new_depth,
        );
        let mut child = VM::new(self.env.clone(), child_world, child_frame);
        child.substate.touched_accounts.insert(new_address);
        let report = child.run()?;

        let gas_used_in_vm = child_gas
            .checked_sub(report.gas_remaining)
            .ok_or(InternalError::Underflow)?;
        let deposit_cost = self
            .schedule()
            .code_deposit
            .checked_mul(report.output.len() as u64)
            .ok_or(InternalError::Overflow)?;
        let total_gas = gas_used_in_vm
            .checked_add(deposit_cost)
            .ok_or(InternalError::Overflow)?;

        let code_size_exceeded = self
            .env
            .config
            .max_code_size
            .is_some_and(|limit| report.output.len() > limit);
        let enough_gas_for_deposit = total_gas <= child_gas;

        if report.error.is_some()
            || code_size_exceeded
            || (!enough_gas_for_deposit && self.env.config.exceptional_failed_code_deposit)
        {
            // Hard failure: the forwarded gas is gone and the parent keeps
            // its own world, with the deployer nonce already bumped.
            self.call_frame.stack.push(FAIL)?;
        } else if !enough_gas_for_deposit {
            // Pre-Homestead soft failure: the account exists and keeps the
            // endowment, but never receives its code; only the gas the
            // child actually ran through is spent.
            self.call_frame.return_gas(report.gas_remaining)?;
            self.absorb_child(report);
            self.call_frame.stack.push(address_to_word(new_address))?;
        } else {
            let leftover = report
                .gas_remaining
                .checked_sub(deposit_cost)
                .ok_or(InternalError::Underflow)?;
            self.call_frame.return_gas(leftover)?;

            let deployed_code = report.output.clone();
            self.substate.internal_txs.push(InternalTransaction {
                op: Opcode::CREATE,
                from: deployer,
                to: None,
                gas_limit: child_gas,
                data: init_code,
                value: endowment,
            });
            self.absorb_child(report);
            self.world.save_code(new_address, deployed_code);
            self.call_frame.stack.push(address_to_word(new_address))?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    // CALL operation
    pub fn op_call(&mut self) -> Result<OpcodeResult, VMError> {
        let [gas, callee, value, args_offset, args_size, ret_offset, ret_size] =
            self.call_frame.stack.pop()?;
        let callee = word_to_address(callee);
        let (args_size, args_offset) = size_offset_to_usize(args_size, args_offset)?;
        let (ret_size, ret_offset) = size_offset_to_usize(ret_size, ret_offset)?;

        // Only CALL can bring an account into existence, and only CALL
        // pays for it. EIP-161 narrows the charge to value-bearing calls
        // landing on dead accounts.
        let charge_new_account = if self.env.config.no_empty_accounts {
            !value.is_zero() && self.world.is_account_dead(callee)
        } else {
            !self.world.account_exists(callee)
        };

        let new_memory_size = calculate_memory_size(args_offset, args_size)?
            .max(calculate_memory_size(ret_offset, ret_size)?);
        let (cost, child_gas) = gas_cost::call(
            new_memory_size,
            self.call_frame.memory.len(),
            gas,
            self.call_frame.gas_remaining,
            value,
            charge_new_account,
            &self.env.config,
        )?;
        self.call_frame.increase_consumed_gas(cost)?;

        // Both regions are paid for, so both are expanded, return data or
        // not.
        self.call_frame.memory.resize(new_memory_size);
        let calldata = Bytes::from(self.call_frame.memory.load_range(args_offset, args_size)?);

        self.generic_call(
            Opcode::CALL,
            child_gas,
            value,
            self.call_frame.to,
            callee,
            callee,
            true,
            calldata,
            ret_offset,
            ret_size,
        )
    }

    // CALLCODE operation: the callee's code runs against our own account
    pub fn op_callcode(&mut self) -> Result<OpcodeResult, VMError> {
        let [gas, callee, value, args_offset, args_size, ret_offset, ret_size] =
            self.call_frame.stack.pop()?;
        let callee = word_to_address(callee);
        let (args_size, args_offset) = size_offset_to_usize(args_size, args_offset)?;
        let (ret_size, ret_offset) = size_offset_to_usize(ret_size, ret_offset)?;

        let new_memory_size = calculate_memory_size(args_offset, args_size)?
            .max(calculate_memory_size(ret_offset, ret_size)?);
        let (cost, child_gas) = gas_cost::call(
            new_memory_size,
            self.call_frame.memory.len(),
            gas,
            self.call_frame.gas_remaining,
            value,
            false,
            &self.env.config,
        )?;
        self.call_frame.increase_consumed_gas(cost)?;

        self.call_frame.memory.resize(new_memory_size);
        let calldata = Bytes::from(self.call_frame.memory.load_range(args_offset, args_size)?);

        self.generic_call(
            Opcode::CALLCODE,
            child_gas,
            value,
            self.call_frame.to,
            self.call_frame.to,
            callee,
            false,
            calldata,
            ret_offset,
            ret_size,
        )
    }

    // DELEGATECALL operation: callee's code, our account, our caller's
    // identity and value
    pub fn op_delegatecall(&mut self) -> Result<OpcodeResult, VMError> {
        let [gas, callee, args_offset, args_size, ret_offset, ret_size] =
            self.call_frame.stack.pop()?;
        let callee = word_to_address(callee);
        let (args_size, args_offset) = size_offset_to_usize(args_size, args_offset)?;
        let (ret_size, ret_offset) = size_offset_to_usize(ret_size, ret_offset)?;

        let new_memory_size = calculate_memory_size(args_offset, args_size)?
            .max(calculate_memory_size(ret_offset, ret_size)?);
        // No value moves, so the gas side sees a zero endowment.
        let (cost, child_gas) = gas_cost::call(
            new_memory_size,
            self.call_frame.memory.len(),
            gas,
            self.call_frame.gas_remaining,
            U256::zero(),
            false,
            &self.env.config,
        )?;
        self.call_frame.increase_consumed_gas(cost)?;

        self.call_frame.memory.resize(new_memory_size);
        let calldata = Bytes::from(self.call_frame.memory.load_range(args_offset, args_size)?);

        self.generic_call(
            Opcode::DELEGATECALL,
            child_gas,
            self.call_frame.msg_value,
            self.call_frame.msg_sender,
            self.call_frame.to,
            callee,
            false,
            calldata,
            ret_offset,
            ret_size,
        )
    }

    // SELFDESTRUCT operation
    pub fn op_selfdestruct(&mut self) -> Result<OpcodeResult, VMError> {
        let beneficiary = word_to_address(self.call_frame.stack.pop1()?);
        let owner = self.call_frame.to;

        let charge_new_account = self.env.config.charge_self_destruct_for_new_account
            && if self.env.config.no_empty_accounts {
                !self.world.get_balance(owner).is_zero() && self.world.is_account_dead(beneficiary)
            } else {
                !self.world.account_exists(beneficiary)
            };
        self.call_frame
            .increase_consumed_gas(gas_cost::selfdestruct(charge_new_account, self.schedule())?)?;

        // One refund per destroyed account, however often it dies.
        if !self.substate.addresses_to_delete.contains(&owner) {
            self.substate.refunded_gas = self
                .substate
                .refunded_gas
                .checked_add(self.schedule().selfdestruct_refund)
                .ok_or(InternalError::Overflow)?;
        }

        let balance = self.world.get_balance(owner);
        if beneficiary == owner {
            // Destroying into yourself burns the ether.
            self.world.remove_all_ether(owner);
        } else {
            self.world.transfer(owner, beneficiary, balance);
            self.substate.touched_accounts.insert(beneficiary);
        }
        self.substate.addresses_to_delete.insert(owner);

        Ok(OpcodeResult::Halt)
    }

    /// Shared tail of the CALL family, entered with gas already charged
    /// and memory expanded over both regions.
    #[allow(clippy::too_many_arguments)]
    fn generic_call(
        &mut self,
        op: Opcode,
        child_gas: u64,
        value: U256,
        msg_sender: Address,
        to: Address,
        code_address: Address,
        should_transfer_value: bool,
        calldata: Bytes,
        ret_offset: usize,
        ret_size: usize,
    ) -> Result<OpcodeResult, VMError> {
        let new_depth = self
            .call_frame
            .depth
            .checked_add(1)
            .ok_or(InternalError::Overflow)?;

        // An invalid call never runs: the forwarded gas (stipend included)
        // flows straight back and the caller sees a failure word.
        if new_depth > MAX_CALL_DEPTH || self.world.get_balance(self.call_frame.to) < value {
            self.call_frame.return_gas(child_gas)?;
            self.call_frame.stack.push(FAIL)?;
            return Ok(OpcodeResult::Continue { pc_increment: 1 });
        }

        let code = self.world.get_code(code_address);
        let child_frame = CallFrame::new(
            msg_sender,
            to,
            code_address,
            Program::new(code),
            value,
            calldata.clone(),
            child_gas,
            new_depth,
        );
        let mut child = VM::new(self.env.clone(), self.world.clone(), child_frame);
        if should_transfer_value {
            child.world.transfer(self.call_frame.to, to, value);
            child.substate.touched_accounts.insert(to);
        }
        let report = child.run()?;

        if report.is_success() {
            self.call_frame.return_gas(report.gas_remaining)?;

            let copy_len = ret_size.min(report.output.len());
            if copy_len > 0 {
                self.call_frame
                    .memory
                    .store_data(ret_offset, &report.output[..copy_len])?;
            }

            self.substate.internal_txs.push(InternalTransaction {
                op,
                from: self.call_frame.to,
                to: Some(code_address),
                gas_limit: child_gas,
                data: calldata,
                value,
            });
            self.absorb_child(report);
            self.call_frame.stack.push(SUCCESS)?;
        } else {
            // A faulted child consumed its whole allowance; the parent
            // keeps its pre-call world.
            self.call_frame.stack.push(FAIL)?;
        }

        Ok(OpcodeResult::Continue { pc_increment: 1 })
    }

    /// Adopts a committed child's world and folds its side effects into
    /// this frame.
    fn absorb_child(&mut self, report: ExecutionReport<W>) {
        self.world = report.world;
        self.substate.merge(Substate {
            logs: report.logs,
            internal_txs: report.internal_txs,
            addresses_to_delete: report.addresses_to_delete,
            touched_accounts: report.touched_accounts,
            refunded_gas: report.gas_refunded,
        });
    }
}
